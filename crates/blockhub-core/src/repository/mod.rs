//! Content repository abstraction
//!
//! Each content module (forum, blog, wiki) is reached through a repository
//! that can run a module-scoped free-text search with filters, a sort hint
//! and pagination. Implementations:
//! - `MemoryRepository` (in-process items)
//! - `SqliteRepository` (local SQLite store with FTS5)
//! - `HttpRepository` (platform REST API)
//!
//! Repositories are bound per module in a `RepositoryRegistry`, so adding a
//! module is one enum variant plus one registry entry.

use crate::error::Result;
use crate::search::{
    query_terms, Author, ContentStatus, DateRange, Difficulty, Module, SearchFilters, SortHint,
    MAX_LIMIT,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod http;
pub mod memory;
pub mod sqlite;

pub use http::HttpRepository;
pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

/// Forum thread as stored by the forum module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub author: Author,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub replies_count: u64,
    pub status: ContentStatus,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Blog article as stored by the blog module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub author: Author,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    pub status: ContentStatus,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wiki guide as stored by the wiki module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiGuide {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub author: Author,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    pub status: ContentStatus,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Module-native item, tagged with its module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", rename_all = "lowercase")]
pub enum RawItem {
    Forum(ForumPost),
    Blog(BlogPost),
    Wiki(WikiGuide),
}

impl RawItem {
    pub fn module(&self) -> Module {
        match self {
            Self::Forum(_) => Module::Forum,
            Self::Blog(_) => Module::Blog,
            Self::Wiki(_) => Module::Wiki,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Forum(p) => &p.id,
            Self::Blog(p) => &p.id,
            Self::Wiki(g) => &g.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Forum(p) => &p.title,
            Self::Blog(p) => &p.title,
            Self::Wiki(g) => &g.title,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Forum(p) => &p.content,
            Self::Blog(p) => &p.content,
            Self::Wiki(g) => &g.content,
        }
    }

    pub fn excerpt(&self) -> Option<&str> {
        match self {
            Self::Forum(p) => p.excerpt.as_deref(),
            Self::Blog(p) => p.excerpt.as_deref(),
            Self::Wiki(g) => g.excerpt.as_deref(),
        }
    }

    pub fn author(&self) -> &Author {
        match self {
            Self::Forum(p) => &p.author,
            Self::Blog(p) => &p.author,
            Self::Wiki(g) => &g.author,
        }
    }

    /// Category display name (`categoryName` on forum threads)
    pub fn category(&self) -> &str {
        match self {
            Self::Forum(p) => &p.category_name,
            Self::Blog(p) => &p.category,
            Self::Wiki(g) => &g.category,
        }
    }

    pub fn tags(&self) -> &[String] {
        let tags = match self {
            Self::Forum(p) => &p.tags,
            Self::Blog(p) => &p.tags,
            Self::Wiki(g) => &g.tags,
        };
        tags.as_deref().unwrap_or(&[])
    }

    pub fn status(&self) -> ContentStatus {
        match self {
            Self::Forum(p) => p.status,
            Self::Blog(p) => p.status,
            Self::Wiki(g) => g.status,
        }
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        match self {
            Self::Wiki(g) => g.difficulty,
            _ => None,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Self::Forum(p) => &p.slug,
            Self::Blog(p) => &p.slug,
            Self::Wiki(g) => &g.slug,
        }
    }

    pub fn views_count(&self) -> u64 {
        match self {
            Self::Forum(p) => p.views_count,
            Self::Blog(p) => p.views_count,
            Self::Wiki(g) => g.views_count,
        }
    }

    pub fn likes_count(&self) -> u64 {
        match self {
            Self::Forum(p) => p.likes_count,
            Self::Blog(p) => p.likes_count,
            Self::Wiki(g) => g.likes_count,
        }
    }

    pub fn replies_count(&self) -> Option<u64> {
        match self {
            Self::Forum(p) => Some(p.replies_count),
            _ => None,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Forum(p) => p.created_at,
            Self::Blog(p) => p.created_at,
            Self::Wiki(g) => g.created_at,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Self::Forum(p) => p.updated_at,
            Self::Blog(p) => p.updated_at,
            Self::Wiki(g) => g.updated_at,
        }
    }
}

/// Filters, ordering and page window for one module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleQuery {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
    pub statuses: Vec<ContentStatus>,
    /// Only honoured by the wiki module
    pub difficulties: Vec<Difficulty>,
    pub date_range: Option<DateRange>,
    pub sort_hint: SortHint,
    pub limit: usize,
    pub offset: usize,
}

impl ModuleQuery {
    /// Unfiltered query showing only the module's default-visible items
    pub fn new(module: Module, limit: usize) -> Self {
        Self {
            categories: Vec::new(),
            tags: Vec::new(),
            authors: Vec::new(),
            statuses: vec![module.default_status()],
            difficulties: Vec::new(),
            date_range: None,
            sort_hint: SortHint::Popular,
            limit,
            offset: 0,
        }
    }

    /// Translate request filters into the module's query
    pub fn from_filters(
        module: Module,
        filters: &SearchFilters,
        date_range: Option<&DateRange>,
        sort_hint: SortHint,
        limit: usize,
        offset: usize,
    ) -> Self {
        Self {
            categories: filters.categories.clone(),
            tags: filters.tags.clone(),
            authors: filters.authors.clone(),
            statuses: filters.effective_status(module),
            difficulties: if module == Module::Wiki {
                filters.difficulty.clone()
            } else {
                Vec::new()
            },
            date_range: date_range.filter(|r| !r.is_empty()).cloned(),
            sort_hint,
            limit,
            offset,
        }
    }

    /// Whether an item passes every filter (text matching is the repository's concern)
    pub fn accepts(&self, item: &RawItem) -> bool {
        let ci_contains =
            |wanted: &[String], value: &str| wanted.iter().any(|w| w.eq_ignore_ascii_case(value));

        if !self.statuses.is_empty() && !self.statuses.contains(&item.status()) {
            return false;
        }
        if !self.categories.is_empty() && !ci_contains(&self.categories, item.category()) {
            return false;
        }
        if !self.authors.is_empty() && !ci_contains(&self.authors, &item.author().name) {
            return false;
        }
        if !self.tags.is_empty() && !item.tags().iter().any(|t| ci_contains(&self.tags, t)) {
            return false;
        }
        if !self.difficulties.is_empty() {
            match item.difficulty() {
                Some(d) if self.difficulties.contains(&d) => {}
                _ => return false,
            }
        }
        if let Some(range) = &self.date_range {
            if !range.contains(&item.created_at()) {
                return false;
            }
        }
        true
    }
}

/// One page of module-native items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModulePage {
    pub items: Vec<RawItem>,
    /// Total matches in the backing store, before pagination
    pub total: usize,
}

/// Module-scoped search primitive
#[async_trait::async_trait]
pub trait ContentRepository: Send + Sync {
    /// Module this repository serves
    fn module(&self) -> Module;

    /// Free-text search with filters, sort hint and pagination
    async fn search(&self, query: &str, params: &ModuleQuery) -> Result<ModulePage>;

    /// Up to `limit` titles matching the query, used for completions
    ///
    /// The default over-fetches through `search` and keeps items whose title
    /// matches; adapters that can scope the match to titles should override it.
    async fn titles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let terms = match_terms(query);
        let fetch = limit.saturating_mul(TITLE_OVERFETCH).min(MAX_LIMIT);
        let page = self
            .search(query, &ModuleQuery::new(self.module(), fetch))
            .await?;
        Ok(page
            .items
            .into_iter()
            .filter(|item| title_matches(item.title(), &terms))
            .take(limit)
            .map(|item| item.title().to_string())
            .collect())
    }
}

/// Candidates fetched per completion slot when titles are filtered after the search
const TITLE_OVERFETCH: usize = 5;

/// Lowercased terms to match; a query of only short words is matched whole
pub(crate) fn match_terms(query: &str) -> Vec<String> {
    let terms = query_terms(query);
    if !terms.is_empty() {
        return terms;
    }
    let trimmed = query.trim().to_lowercase();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed]
    }
}

/// Case-insensitive any-term match on a title
pub(crate) fn title_matches(title: &str, terms: &[String]) -> bool {
    let title = title.to_lowercase();
    terms.iter().any(|term| title.contains(term.as_str()))
}

/// Registry binding one repository per module
#[derive(Clone, Default)]
pub struct RepositoryRegistry {
    repositories: BTreeMap<Module, Arc<dyn ContentRepository>>,
}

impl RepositoryRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self {
            repositories: BTreeMap::new(),
        }
    }

    /// Registry of in-memory repositories, items grouped by their module
    pub fn in_memory(items: Vec<RawItem>) -> Self {
        let mut grouped: BTreeMap<Module, Vec<RawItem>> = BTreeMap::new();
        for item in items {
            grouped.entry(item.module()).or_default().push(item);
        }

        let mut registry = Self::new();
        for module in Module::ALL {
            let items = grouped.remove(&module).unwrap_or_default();
            registry.register(Arc::new(MemoryRepository::new(module, items)));
        }
        registry
    }

    /// Register a repository, replacing any previous binding for its module
    pub fn register(&mut self, repository: Arc<dyn ContentRepository>) {
        self.repositories.insert(repository.module(), repository);
    }

    /// Builder-style registration
    pub fn with(mut self, repository: Arc<dyn ContentRepository>) -> Self {
        self.register(repository);
        self
    }

    /// Get repository by module
    pub fn get(&self, module: Module) -> Option<Arc<dyn ContentRepository>> {
        self.repositories.get(&module).cloned()
    }

    /// Modules with a bound repository
    pub fn modules(&self) -> Vec<Module> {
        self.repositories.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

impl std::fmt::Debug for RepositoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryRegistry")
            .field("modules", &self.modules())
            .finish()
    }
}
