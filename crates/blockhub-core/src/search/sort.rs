//! Ordering of the combined result set

use super::{SearchResultItem, SortKey};
use std::cmp::Ordering;

/// Sorted copy of `results`; stable, so equal keys keep their input order
pub fn sort_results(results: &[SearchResultItem], key: SortKey) -> Vec<SearchResultItem> {
    let mut sorted = results.to_vec();
    sorted.sort_by(|a, b| compare(a, b, key));
    sorted
}

fn compare(a: &SearchResultItem, b: &SearchResultItem, key: SortKey) -> Ordering {
    match key {
        SortKey::Relevance => b.score_or_zero().cmp(&a.score_or_zero()),
        SortKey::DateDesc => b.created_at.cmp(&a.created_at),
        SortKey::DateAsc => a.created_at.cmp(&b.created_at),
        SortKey::ViewsDesc => b.stats.views_count.cmp(&a.stats.views_count),
        SortKey::LikesDesc => b.stats.likes_count.cmp(&a.stats.likes_count),
        SortKey::TitleAsc => collate(&a.title, &b.title),
        SortKey::AuthorAsc => collate(&a.author.name, &b.author.name),
    }
}

/// Case-insensitive ordering, falling back to the raw strings
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::test_support::{fixed_now, make_item};
    use crate::search::Module;
    use chrono::Duration;

    fn ids(results: &[SearchResultItem]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    fn scored(id: &str, score: Option<u64>) -> SearchResultItem {
        let mut item = make_item(Module::Forum, id, id);
        item.score = score;
        item
    }

    #[test]
    fn test_relevance_is_stable() {
        let input = vec![
            scored("a", Some(10)),
            scored("b", Some(50)),
            scored("c", Some(10)),
            scored("d", None),
        ];
        let sorted = sort_results(&input, SortKey::Relevance);
        assert_eq!(ids(&sorted), vec!["b", "a", "c", "d"]);
        assert_eq!(ids(&input), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_date_orders() {
        let now = fixed_now();
        let mut old = make_item(Module::Blog, "old", "x");
        old.created_at = now - Duration::days(10);
        let mut new = make_item(Module::Blog, "new", "x");
        new.created_at = now;
        let input = vec![old, new];

        assert_eq!(ids(&sort_results(&input, SortKey::DateDesc)), vec!["new", "old"]);
        assert_eq!(ids(&sort_results(&input, SortKey::DateAsc)), vec!["old", "new"]);
    }

    #[test]
    fn test_engagement_orders() {
        let mut a = make_item(Module::Wiki, "a", "x");
        a.stats.views_count = 5;
        a.stats.likes_count = 100;
        let mut b = make_item(Module::Wiki, "b", "x");
        b.stats.views_count = 50;
        b.stats.likes_count = 1;
        let input = vec![a, b];

        assert_eq!(ids(&sort_results(&input, SortKey::ViewsDesc)), vec!["b", "a"]);
        assert_eq!(ids(&sort_results(&input, SortKey::LikesDesc)), vec!["a", "b"]);
    }

    #[test]
    fn test_title_and_author_ignore_case() {
        let mut zed = make_item(Module::Forum, "1", "zombie farm");
        zed.author.name = "bob".to_string();
        let mut ace = make_item(Module::Forum, "2", "Apple trees");
        ace.author.name = "Zara".to_string();
        let mut mid = make_item(Module::Forum, "3", "Mangrove");
        mid.author.name = "alice".to_string();
        let input = vec![zed, ace, mid];

        assert_eq!(ids(&sort_results(&input, SortKey::TitleAsc)), vec!["2", "3", "1"]);
        assert_eq!(ids(&sort_results(&input, SortKey::AuthorAsc)), vec!["3", "1", "2"]);
    }
}
