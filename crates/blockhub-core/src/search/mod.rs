//! Cross-module search engine
//!
//! Provides:
//! - Normalization of forum/blog/wiki items into one result shape
//! - Heuristic relevance scoring with engagement and recency boosts
//! - Highlight fragments around matched terms
//! - Facet aggregation over the combined result set
//! - Typo-tolerant query suggestions

mod facets;
mod highlight;
mod normalize;
mod orchestrator;
mod request;
mod scoring;
mod sort;
mod stats;
mod suggestions;

pub use facets::*;
pub use highlight::*;
pub use normalize::*;
pub use orchestrator::*;
pub use request::*;
pub use scoring::*;
pub use sort::*;
pub use stats::*;
pub use suggestions::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content module a result originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Forum,
    Blog,
    Wiki,
}

impl Module {
    /// Every module, in merge order
    pub const ALL: [Module; 3] = [Module::Forum, Module::Blog, Module::Wiki];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forum => "forum",
            Self::Blog => "blog",
            Self::Wiki => "wiki",
        }
    }

    /// Display label used by the module facet
    pub fn label(&self) -> &'static str {
        match self {
            Self::Forum => "Forum",
            Self::Blog => "Blog",
            Self::Wiki => "Wiki",
        }
    }

    /// Item kind emitted by this module's normalizer
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Wiki => ItemKind::Guide,
            Self::Forum | Self::Blog => ItemKind::Post,
        }
    }

    /// Status an item must carry to be visible when the caller does not widen the filter
    pub fn default_status(&self) -> ContentStatus {
        match self {
            Self::Forum => ContentStatus::Active,
            Self::Blog | Self::Wiki => ContentStatus::Published,
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = crate::error::BlockhubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forum" => Ok(Self::Forum),
            "blog" => Ok(Self::Blog),
            "wiki" => Ok(Self::Wiki),
            other => Err(crate::error::BlockhubError::InvalidInput(format!(
                "unknown module '{}' (expected forum, blog or wiki)",
                other
            ))),
        }
    }
}

/// Sub-type of a result within its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Post,
    Guide,
    Reply,
}

/// Publication / moderation status across all modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Active,
    Locked,
    Hidden,
    Deleted,
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Locked => "locked",
            Self::Hidden => "hidden",
            Self::Deleted => "deleted",
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for ContentStatus {
    type Err = crate::error::BlockhubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "locked" => Ok(Self::Locked),
            "hidden" => Ok(Self::Hidden),
            "deleted" => Ok(Self::Deleted),
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(crate::error::BlockhubError::InvalidInput(format!(
                "unknown status '{}'",
                other
            ))),
        }
    }
}

/// Wiki guide difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

impl FromStr for Difficulty {
    type Err = crate::error::BlockhubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            other => Err(crate::error::BlockhubError::InvalidInput(format!(
                "unknown difficulty '{}'",
                other
            ))),
        }
    }
}

/// Author attached to a result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Engagement counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStats {
    pub views_count: u64,
    pub likes_count: u64,
    /// Only meaningful for forum threads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies_count: Option<u64>,
}

/// Field a highlight was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightField {
    Title,
    Content,
    Excerpt,
}

/// Marked fragments for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub field: HighlightField,
    pub fragments: Vec<String>,
}

/// Unified, module-tagged search result
///
/// `module` + `slug` identify a result; `id` is only unique within a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub id: String,
    pub module: Module,
    pub kind: ItemKind,
    pub title: String,
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub author: Author,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub stats: ItemStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<Highlight>>,
}

impl SearchResultItem {
    /// Canonical link path for the result
    pub fn url(&self) -> String {
        match self.module {
            Module::Forum => format!("/forum/post/{}", self.slug),
            Module::Blog => format!("/blog/{}", self.slug),
            Module::Wiki => format!("/wiki/guide/{}", self.slug),
        }
    }

    /// Score, treating an unscored item as zero
    pub fn score_or_zero(&self) -> u64 {
        self.score.unwrap_or(0)
    }
}

/// Split a query into lowercase terms longer than two characters
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| t.chars().count() > 2)
        .collect()
}

/// Uppercase the first character, leaving the rest untouched
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::Duration;

    pub fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    pub fn make_item(module: Module, id: &str, title: &str) -> SearchResultItem {
        let created = fixed_now() - Duration::days(365);
        SearchResultItem {
            id: id.to_string(),
            module,
            kind: module.kind(),
            title: title.to_string(),
            excerpt: String::new(),
            content: None,
            author: Author {
                id: format!("u-{}", id),
                name: "steve".to_string(),
                avatar: None,
            },
            category: "general".to_string(),
            tags: vec![],
            stats: ItemStats::default(),
            created_at: created,
            updated_at: created,
            slug: format!("{}-{}", module, id),
            score: None,
            highlights: None,
        }
    }
}
