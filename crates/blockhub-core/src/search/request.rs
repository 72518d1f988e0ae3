//! Search request and response contract

use super::{ContentStatus, Difficulty, Module, SearchFacets, SearchResultItem};
use crate::error::{BlockhubError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest accepted query, in characters
pub const MAX_QUERY_LENGTH: usize = 500;

/// Default page size
pub const DEFAULT_LIMIT: usize = 20;

/// Largest accepted page size
pub const MAX_LIMIT: usize = 100;

/// Ordering applied to the combined result set
///
/// Unknown keys deserialize to `Relevance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    Relevance,
    DateDesc,
    DateAsc,
    ViewsDesc,
    LikesDesc,
    TitleAsc,
    AuthorAsc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::ViewsDesc => "views-desc",
            Self::LikesDesc => "likes-desc",
            Self::TitleAsc => "title-asc",
            Self::AuthorAsc => "author-asc",
        }
    }

    /// Ordering hint passed down to each module repository
    pub fn hint(&self) -> SortHint {
        match self {
            Self::DateDesc | Self::DateAsc => SortHint::Latest,
            Self::ViewsDesc => SortHint::Views,
            _ => SortHint::Popular,
        }
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "date-desc" => Self::DateDesc,
            "date-asc" => Self::DateAsc,
            "views-desc" => Self::ViewsDesc,
            "likes-desc" => Self::LikesDesc,
            "title-asc" => Self::TitleAsc,
            "author-asc" => Self::AuthorAsc,
            _ => Self::Relevance,
        })
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module-level ordering requested from a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortHint {
    Latest,
    Popular,
    Views,
}

impl SortHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Popular => "popular",
            Self::Views => "views",
        }
    }
}

/// Inclusive creation-date window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| *at >= from) && self.to.is_none_or(|to| *at <= to)
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Caller-supplied filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<Module>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub difficulty: Vec<Difficulty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<ContentStatus>,
}

impl SearchFilters {
    /// Modules to query, in merge order, without duplicates
    pub fn target_modules(&self) -> Vec<Module> {
        if self.modules.is_empty() {
            return Module::ALL.to_vec();
        }
        Module::ALL
            .into_iter()
            .filter(|m| self.modules.contains(m))
            .collect()
    }

    /// Statuses visible for a module: the caller's widened set, or the module default
    pub fn effective_status(&self, module: Module) -> Vec<ContentStatus> {
        if self.status.is_empty() {
            vec![module.default_status()]
        } else {
            self.status.clone()
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_true() -> bool {
    true
}

/// Full search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub q: String,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_true")]
    pub highlight: bool,
    #[serde(default = "default_true")]
    pub facets: bool,
}

impl SearchRequest {
    /// Request with defaults for everything but the query
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            filters: SearchFilters::default(),
            sort: SortKey::default(),
            date_range: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
            highlight: true,
            facets: true,
        }
    }

    pub fn with_modules(mut self, modules: Vec<Module>) -> Self {
        self.filters.modules = modules;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Reject malformed requests before any module is queried
    pub fn validate(&self, max_query_length: usize) -> Result<()> {
        let length = self.q.trim().chars().count();
        if length == 0 {
            return Err(BlockhubError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }
        if length > max_query_length {
            return Err(BlockhubError::InvalidInput(format!(
                "query must be at most {} characters (got {})",
                max_query_length, length
            )));
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(BlockhubError::InvalidInput(format!(
                "limit must be between 1 and {} (got {})",
                MAX_LIMIT, self.limit
            )));
        }
        if let Some(DateRange {
            from: Some(from),
            to: Some(to),
        }) = &self.date_range
        {
            if from > to {
                return Err(BlockhubError::InvalidInput(format!(
                    "date_range.from ({}) is after date_range.to ({})",
                    from.to_rfc3339(),
                    to.to_rfc3339()
                )));
            }
        }
        Ok(())
    }

    /// Echo of the request as returned alongside results
    pub fn echo(&self) -> QueryEcho {
        QueryEcho {
            q: self.q.clone(),
            filters: self.filters.clone(),
            sort: self.sort,
            date_range: self.date_range.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Request parameters echoed in the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEcho {
    pub q: String,
    pub filters: SearchFilters,
    pub sort: SortKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    pub limit: usize,
    pub offset: usize,
}

/// Response of a full search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total_count: usize,
    /// Milliseconds spent serving the request
    pub search_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<SearchFacets>,
    pub query: QueryEcho,
}
