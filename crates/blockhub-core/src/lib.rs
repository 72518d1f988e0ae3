//! Blockhub Core Library
//!
//! Cross-module search and suggestions over community content: forum
//! threads, blog articles and wiki guides.
//!
//! # Features
//! - Concurrent per-module fan-out with graceful degradation
//! - Heuristic relevance scoring with engagement and recency boosts
//! - Highlight fragments and facet aggregation over the merged result set
//! - Typo-tolerant completions, corrections and popular searches
//! - Local SQLite FTS5 store, in-memory and REST repositories

pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod repository;
pub mod search;

pub use config::{Config, PaginationStrategy, RemoteConfig, SearchConfig};
pub use db::{Database, DatabaseStats, ModuleCount};
pub use error::{BlockhubError, Error, Result};
pub use import::{import_path, ImportReport};
pub use repository::{
    ContentRepository, HttpRepository, MemoryRepository, ModulePage, ModuleQuery, RawItem,
    RepositoryRegistry, SqliteRepository,
};
pub use search::{
    Module, SearchEngine, SearchFilters, SearchRequest, SearchResponse, SearchResultItem,
    SortKey, SuggestionConfig, SuggestionResponse,
};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "blockhub";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "blockhub";
