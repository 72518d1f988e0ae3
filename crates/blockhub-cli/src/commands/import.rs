//! Import command

use crate::app::{ImportArgs, OutputFormat};
use anyhow::Result;
use blockhub_core::{import_path, Database, Module};

pub async fn run(
    args: ImportArgs,
    db: &mut Database,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    if args.clear {
        for module in Module::ALL {
            let removed = db.clear_module(module)?;
            tracing::info!(module = %module, removed, "Cleared module");
        }
        db.vacuum()?;
    }

    let report = import_path(db, &args.path, &args.mask)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Imported {} items from {} files",
                report.items, report.files
            );
            for (module, count) in &report.per_module {
                println!("  {:<8} {}", module.label(), count);
            }
            if !report.skipped.is_empty() {
                println!("Skipped {} files", report.skipped.len());
                if verbose {
                    for skipped in &report.skipped {
                        println!("  {}: {}", skipped.path.display(), skipped.reason);
                    }
                }
            }
        }
    }
    Ok(())
}
