//! Heuristic relevance scoring
//!
//! Score = title band + excerpt hits + content occurrences + engagement + recency,
//! rounded to the nearest integer. `now` is passed in so scoring stays pure.

use super::{query_terms, SearchResultItem};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Title equals the term
const TITLE_EXACT: f64 = 100.0;
/// Title starts with the term
const TITLE_PREFIX: f64 = 80.0;
/// Term appears elsewhere in the title
const TITLE_CONTAINS: f64 = 60.0;
/// Term appears in the excerpt
const EXCERPT_HIT: f64 = 30.0;
/// Per occurrence in the content
const CONTENT_OCCURRENCE: f64 = 10.0;

const VIEWS_WEIGHT: f64 = 5.0;
const LIKES_WEIGHT: f64 = 10.0;
const REPLIES_WEIGHT: f64 = 8.0;

const RECENT_WEEK_BOOST: f64 = 20.0;
const RECENT_MONTH_BOOST: f64 = 10.0;

/// Per-component contributions behind a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub title: f64,
    pub excerpt: f64,
    pub content: f64,
    pub engagement: f64,
    pub recency: f64,
}

impl ScoreBreakdown {
    /// Rounded total
    pub fn total(&self) -> u64 {
        let sum = self.title + self.excerpt + self.content + self.engagement + self.recency;
        sum.max(0.0).round() as u64
    }
}

/// Relevance of `item` for `query` at time `now`
pub fn score(item: &SearchResultItem, query: &str, now: DateTime<Utc>) -> u64 {
    explain_score(item, query, now).total()
}

/// Component breakdown of [`score`]
pub fn explain_score(item: &SearchResultItem, query: &str, now: DateTime<Utc>) -> ScoreBreakdown {
    let terms = query_terms(query);
    let title = item.title.to_lowercase();
    let excerpt = item.excerpt.to_lowercase();
    let content = item
        .content
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let mut breakdown = ScoreBreakdown::default();

    for term in &terms {
        if title == *term {
            breakdown.title += TITLE_EXACT;
        } else if title.starts_with(term.as_str()) {
            breakdown.title += TITLE_PREFIX;
        } else if title.contains(term.as_str()) {
            breakdown.title += TITLE_CONTAINS;
        }

        if excerpt.contains(term.as_str()) {
            breakdown.excerpt += EXCERPT_HIT;
        }

        if !content.is_empty() {
            breakdown.content += CONTENT_OCCURRENCE * content.matches(term.as_str()).count() as f64;
        }
    }

    breakdown.engagement = engagement_boost(item);
    breakdown.recency = recency_boost(item.created_at, now);
    breakdown
}

fn engagement_boost(item: &SearchResultItem) -> f64 {
    let log = |n: u64| (n as f64 + 1.0).log10();
    let mut boost =
        VIEWS_WEIGHT * log(item.stats.views_count) + LIKES_WEIGHT * log(item.stats.likes_count);
    if let Some(replies) = item.stats.replies_count {
        boost += REPLIES_WEIGHT * log(replies);
    }
    boost
}

fn recency_boost(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age = now.signed_duration_since(created_at);
    if age <= Duration::days(7) {
        RECENT_WEEK_BOOST
    } else if age <= Duration::days(30) {
        RECENT_MONTH_BOOST
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::{fixed_now, make_item};
    use crate::search::Module;
    use proptest::prelude::*;

    #[test]
    fn test_title_bands() {
        let now = fixed_now();
        let item = make_item(Module::Wiki, "1", "Redstone");
        assert_eq!(score(&item, "redstone", now), 100);

        let item = make_item(Module::Wiki, "1", "Redstone Farm Tutorial");
        assert_eq!(score(&item, "redstone", now), 80);
        assert_eq!(score(&item, "tutorial", now), 60);
        assert_eq!(score(&item, "redstone farm", now), 140);
    }

    #[test]
    fn test_short_terms_ignored() {
        let item = make_item(Module::Blog, "1", "An ox");
        assert_eq!(score(&item, "an ox", fixed_now()), 0);
    }

    #[test]
    fn test_content_counts_every_occurrence() {
        let mut item = make_item(Module::Forum, "1", "Help");
        item.content = Some("Redstone dust, redstone torch and REDSTONE blocks".to_string());
        let breakdown = explain_score(&item, "redstone", fixed_now());
        assert_eq!(breakdown.content, 30.0);
        assert_eq!(breakdown.title, 0.0);
    }

    #[test]
    fn test_excerpt_hit_once_per_term() {
        let mut item = make_item(Module::Blog, "1", "News");
        item.excerpt = "farm farm farm".to_string();
        assert_eq!(explain_score(&item, "farm", fixed_now()).excerpt, 30.0);
    }

    #[test]
    fn test_engagement_boost() {
        let mut item = make_item(Module::Forum, "1", "Unrelated");
        item.stats.views_count = 999;
        item.stats.likes_count = 99;
        item.stats.replies_count = Some(9);
        // 5*3 + 10*2 + 8*1
        assert_eq!(score(&item, "nothing", fixed_now()), 43);

        item.stats.replies_count = None;
        assert_eq!(score(&item, "nothing", fixed_now()), 35);
    }

    #[test]
    fn test_recency_boost() {
        let now = fixed_now();
        let mut item = make_item(Module::Blog, "1", "x");
        item.created_at = now - Duration::days(3);
        assert_eq!(score(&item, "zzz", now), 20);
        item.created_at = now - Duration::days(7);
        assert_eq!(score(&item, "zzz", now), 20);
        item.created_at = now - Duration::days(20);
        assert_eq!(score(&item, "zzz", now), 10);
        item.created_at = now - Duration::days(31);
        assert_eq!(score(&item, "zzz", now), 0);
    }

    #[test]
    fn test_title_match_beats_content_only_match() {
        let now = fixed_now();
        let titled = make_item(Module::Wiki, "1", "Redstone Farm Tutorial");
        let mut body_only = make_item(Module::Forum, "2", "Question about my base");
        body_only.content = Some("my redstone keeps breaking".to_string());

        let titled_score = score(&titled, "redstone farm", now);
        assert!(titled_score >= 140);
        assert!(titled_score > score(&body_only, "redstone farm", now));
    }

    proptest! {
        #[test]
        fn prop_score_is_deterministic(
            title in "[a-z ]{0,40}",
            content in "[a-z ]{0,200}",
            query in "[a-z ]{0,30}",
            views in 0u64..100_000,
            likes in 0u64..10_000,
        ) {
            let mut item = make_item(Module::Blog, "p", &title);
            item.content = Some(content);
            item.stats.views_count = views;
            item.stats.likes_count = likes;
            let before = item.clone();
            let now = fixed_now();

            let first = score(&item, &query, now);
            let second = score(&item, &query, now);
            prop_assert_eq!(first, second);
            prop_assert_eq!(item, before);
        }

        #[test]
        fn prop_adding_title_term_never_lowers_score(
            words in prop::collection::vec("[a-z]{3,8}", 1..6),
            pick in 0usize..6,
            query in prop::collection::vec("[a-z]{3,8}", 0..4),
        ) {
            let title = words.join(" ");
            let item = make_item(Module::Wiki, "p", &title);
            let now = fixed_now();

            let base_query = query.join(" ");
            let extra = &words[pick % words.len()];
            let extended = format!("{} {}", base_query, extra);

            prop_assert!(score(&item, &extended, now) >= score(&item, &base_query, now));
        }
    }
}
