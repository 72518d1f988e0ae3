//! Blockhub CLI
//!
//! Search community content from the terminal.

use anyhow::Result;
use blockhub_core::error::exit_codes;
use blockhub_core::{
    BlockhubError, Config, Database, HttpRepository, RepositoryRegistry, SearchEngine,
    SqliteRepository,
};
use clap::Parser;
use std::sync::{Arc, Mutex};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<BlockhubError>()
            .map(BlockhubError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Import(args) => {
            let mut db = open_database()?;
            commands::import::run(args, &mut db, cli.format, cli.verbose).await
        }
        Commands::Status => {
            let db = if cli.remote {
                None
            } else {
                Some(open_database()?)
            };
            commands::status::run(&config, db.as_ref(), cli.format).await
        }
        Commands::Search(args) => {
            let (engine, _) = build_engine(&config, cli.remote)?;
            commands::search::run(args, &engine, cli.format).await
        }
        Commands::Suggest(args) => {
            let (engine, _) = build_engine(&config, cli.remote)?;
            commands::suggest::run(args, &engine, cli.format).await
        }
        Commands::Mcp => {
            let (engine, db) = build_engine(&config, cli.remote)?;
            blockhub_mcp::start_server(engine, db).await
        }
    }
}

/// Open the local store (use BLOCKHUB_DB if set, otherwise the cache directory)
fn open_database() -> Result<Database> {
    let db_path = Config::database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&db_path)?;
    db.initialize()?;
    Ok(db)
}

fn build_engine(
    config: &Config,
    remote: bool,
) -> Result<(SearchEngine, Option<Arc<Mutex<Database>>>)> {
    let (registry, db): (RepositoryRegistry, _) = if remote {
        (HttpRepository::registry(&config.remote)?, None)
    } else {
        let shared = Arc::new(Mutex::new(open_database()?));
        (SqliteRepository::shared_registry(shared.clone()), Some(shared))
    };
    Ok((SearchEngine::from_config(registry, config), db))
}
