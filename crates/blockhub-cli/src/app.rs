//! CLI argument definitions

use blockhub_core::search::{ContentStatus, Difficulty};
use blockhub_core::{Module, SortKey};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blockhub")]
#[command(
    author,
    version,
    about = "Search forum threads, blog articles and wiki guides in one place"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Query the platform REST API instead of the local store
    #[arg(long, global = true)]
    pub remote: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search across forum, blog and wiki
    Search(SearchArgs),

    /// Completions, corrections and popular searches for a partial query
    Suggest(SuggestArgs),

    /// Import JSON exports into the local store
    Import(ImportArgs),

    /// Show store and engine status
    Status,

    /// Start MCP server
    Mcp,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,

    /// Results to skip
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Restrict to a module (repeatable)
    #[arg(short, long = "module", value_parser = parse_module)]
    pub modules: Vec<Module>,

    /// Category filter (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Tag filter (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Author name filter (repeatable)
    #[arg(long = "author")]
    pub authors: Vec<String>,

    /// Wiki difficulty filter (repeatable)
    #[arg(long = "difficulty", value_parser = parse_difficulty)]
    pub difficulties: Vec<Difficulty>,

    /// Status filter, widens the default visibility (repeatable)
    #[arg(long = "status", value_parser = parse_status)]
    pub statuses: Vec<ContentStatus>,

    /// Sort order: relevance, date-desc, date-asc, views-desc, likes-desc, title-asc, author-asc
    #[arg(long, default_value = "relevance", value_parser = parse_sort)]
    pub sort: SortKey,

    /// Only items created at or after this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<DateTime<Utc>>,

    /// Only items created at or before this date (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<DateTime<Utc>>,

    /// Skip highlight extraction
    #[arg(long)]
    pub no_highlight: bool,

    /// Skip facet aggregation
    #[arg(long)]
    pub no_facets: bool,

    /// Show the score breakdown of each result
    #[arg(long)]
    pub explain: bool,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Partial query
    pub query: Vec<String>,

    /// Scope popular searches and completions to one module
    #[arg(short, long, value_parser = parse_module)]
    pub module: Option<Module>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file or directory of JSON files
    pub path: PathBuf,

    /// Glob pattern for files inside a directory
    #[arg(long, default_value = blockhub_core::import::DEFAULT_PATTERN)]
    pub mask: String,

    /// Remove existing items of every module first
    #[arg(long)]
    pub clear: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
    Md,
}

fn parse_module(s: &str) -> Result<Module, String> {
    s.parse().map_err(|e: blockhub_core::Error| e.to_string())
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    s.parse().map_err(|e: blockhub_core::Error| e.to_string())
}

fn parse_status(s: &str) -> Result<ContentStatus, String> {
    s.parse().map_err(|e: blockhub_core::Error| e.to_string())
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    s.parse().map_err(|e: std::convert::Infallible| e.to_string())
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{}' (expected RFC 3339 or YYYY-MM-DD)", s))
}
