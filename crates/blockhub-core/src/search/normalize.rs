//! Mapping of module-native items into the unified result shape

use super::{ContentStatus, ItemStats, SearchResultItem};
use crate::repository::RawItem;
use lazy_static::lazy_static;
use regex::Regex;

/// Excerpt budget in characters when the source has none
pub const DEFAULT_EXCERPT_LENGTH: usize = 200;

/// A word break is only used when it keeps at least this share of the budget
const WORD_BREAK_RATIO: f64 = 0.8;

lazy_static! {
    static ref HTML_TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalize a raw item with the default excerpt budget
pub fn normalize(raw: RawItem) -> SearchResultItem {
    normalize_with_excerpt(raw, DEFAULT_EXCERPT_LENGTH)
}

/// Normalize a raw item, deriving a missing excerpt within `excerpt_length` characters
pub fn normalize_with_excerpt(raw: RawItem, excerpt_length: usize) -> SearchResultItem {
    let module = raw.module();
    let stats = ItemStats {
        views_count: raw.views_count(),
        likes_count: raw.likes_count(),
        replies_count: raw.replies_count(),
    };
    let created_at = raw.created_at();
    let updated_at = raw.updated_at();

    let (id, title, content, excerpt, author, category, tags, slug) = match raw {
        RawItem::Forum(p) => (
            p.id,
            p.title,
            p.content,
            p.excerpt,
            p.author,
            p.category_name,
            p.tags,
            p.slug,
        ),
        RawItem::Blog(p) => (
            p.id, p.title, p.content, p.excerpt, p.author, p.category, p.tags, p.slug,
        ),
        RawItem::Wiki(g) => (
            g.id, g.title, g.content, g.excerpt, g.author, g.category, g.tags, g.slug,
        ),
    };

    let excerpt = match excerpt {
        Some(e) if !e.trim().is_empty() => e,
        _ => derive_excerpt(&content, excerpt_length),
    };

    SearchResultItem {
        id,
        module,
        kind: module.kind(),
        title,
        excerpt,
        content: if content.is_empty() {
            None
        } else {
            Some(content)
        },
        author,
        category,
        tags: tags.unwrap_or_default(),
        stats,
        created_at,
        updated_at,
        slug,
        score: None,
        highlights: None,
    }
}

/// Whether a raw item's status is inside the visible set
pub fn is_visible(raw: &RawItem, statuses: &[ContentStatus]) -> bool {
    statuses.is_empty() || statuses.contains(&raw.status())
}

/// Plain-text excerpt from HTML content
///
/// Breaks at the last whitespace before the budget when that keeps at least
/// 80% of it, otherwise cuts hard. Truncated excerpts end with `...`.
pub fn derive_excerpt(content: &str, budget: usize) -> String {
    let text = strip_html(content);
    if text.chars().count() <= budget {
        return text;
    }

    let head: String = text.chars().take(budget).collect();
    let min_break = (budget as f64 * WORD_BREAK_RATIO) as usize;

    let cut = head
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(byte_idx, _)| byte_idx)
        .next_back()
        .filter(|&byte_idx| head[..byte_idx].chars().count() >= min_break);

    let truncated = match cut {
        Some(byte_idx) => &head[..byte_idx],
        None => head.as_str(),
    };

    format!("{}...", truncated.trim_end())
}

/// Remove tags, decode the common entities and collapse whitespace
pub fn strip_html(content: &str) -> String {
    let without_tags = HTML_TAG_RE.replace_all(content, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}
