//! Suggest command

use crate::app::{OutputFormat, SuggestArgs};
use crate::output::format_suggestions;
use anyhow::Result;
use blockhub_core::SearchEngine;

pub async fn run(args: SuggestArgs, engine: &SearchEngine, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let response = engine.suggest(&query, args.module).await;
    print!("{}", format_suggestions(&response, format));
    Ok(())
}
