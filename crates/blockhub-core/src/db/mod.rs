//! Database layer for blockhub
//!
//! Provides SQLite-based storage with:
//! - Module-native content items (JSON payload plus filter columns)
//! - FTS5 full-text index kept in sync by triggers

mod items;
mod schema;
mod stats;

pub use items::{fts_match_expression, fts_title_expression};
pub use schema::Database;
pub use stats::{DatabaseStats, ModuleCount};
