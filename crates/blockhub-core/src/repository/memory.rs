//! In-process repository over a fixed set of items

use super::{match_terms, title_matches, ContentRepository, ModulePage, ModuleQuery, RawItem};
use crate::error::Result;
use crate::search::{Module, SortHint};
use async_trait::async_trait;

/// Repository serving one module from items held in memory
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    module: Module,
    items: Vec<RawItem>,
}

impl MemoryRepository {
    /// Create a repository; items belonging to other modules are discarded
    pub fn new(module: Module, items: Vec<RawItem>) -> Self {
        let items = items
            .into_iter()
            .filter(|item| item.module() == module)
            .collect();
        Self { module, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Case-insensitive any-term match over title, excerpt, content and tags
fn matches_query(item: &RawItem, terms: &[String]) -> bool {
    let haystacks = [
        item.title().to_lowercase(),
        item.excerpt().unwrap_or_default().to_lowercase(),
        item.content().to_lowercase(),
        item.tags().join(" ").to_lowercase(),
    ];
    terms
        .iter()
        .any(|term| haystacks.iter().any(|h| h.contains(term.as_str())))
}

fn sort_by_hint(items: &mut [&RawItem], hint: SortHint) {
    match hint {
        SortHint::Latest => items.sort_by_key(|i| std::cmp::Reverse(i.created_at())),
        SortHint::Views => items.sort_by_key(|i| std::cmp::Reverse(i.views_count())),
        SortHint::Popular => items.sort_by(|a, b| {
            b.likes_count()
                .cmp(&a.likes_count())
                .then_with(|| b.views_count().cmp(&a.views_count()))
        }),
    }
}

#[async_trait]
impl ContentRepository for MemoryRepository {
    fn module(&self) -> Module {
        self.module
    }

    async fn search(&self, query: &str, params: &ModuleQuery) -> Result<ModulePage> {
        let terms = match_terms(query);

        let mut matched: Vec<&RawItem> = self
            .items
            .iter()
            .filter(|item| params.accepts(item))
            .filter(|item| terms.is_empty() || matches_query(item, &terms))
            .collect();

        sort_by_hint(&mut matched, params.sort_hint);

        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .cloned()
            .collect();

        Ok(ModulePage { items, total })
    }

    async fn titles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let terms = match_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let params = ModuleQuery::new(self.module, limit);

        let mut matched: Vec<&RawItem> = self
            .items
            .iter()
            .filter(|item| params.accepts(item))
            .filter(|item| title_matches(item.title(), &terms))
            .collect();
        sort_by_hint(&mut matched, params.sort_hint);

        Ok(matched
            .into_iter()
            .take(limit)
            .map(|item| item.title().to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::*;
    use crate::search::test_support::fixed_now;
    use crate::search::ContentStatus;

    fn forum_repo() -> MemoryRepository {
        let now = fixed_now();
        let mut hidden = forum("3", "Redstone clock hidden", "", days_ago(now, 1));
        if let RawItem::Forum(post) = &mut hidden {
            post.status = ContentStatus::Hidden;
        }
        let mut popular = forum("2", "Best redstone contraptions", "", days_ago(now, 10));
        if let RawItem::Forum(post) = &mut popular {
            post.likes_count = 50;
        }
        MemoryRepository::new(
            Module::Forum,
            vec![
                forum("1", "Redstone door help", "piston doors", days_ago(now, 2)),
                popular,
                hidden,
                forum("4", "Server lag", "tps drops", days_ago(now, 5)),
                blog("9", "Redstone blog", "", now),
            ],
        )
    }

    #[tokio::test]
    async fn test_search_matches_and_filters_status() {
        let repo = forum_repo();
        assert_eq!(repo.len(), 4);

        let params = ModuleQuery::new(Module::Forum, 10);
        let page = repo.search("redstone", &params).await.unwrap();
        assert_eq!(page.total, 2);
        let ids: Vec<&str> = page.items.iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_search_latest_hint_and_pagination() {
        let repo = forum_repo();
        let mut params = ModuleQuery::new(Module::Forum, 1);
        params.sort_hint = SortHint::Latest;

        let page = repo.search("redstone", &params).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id(), "1");

        params.offset = 1;
        let page = repo.search("redstone", &params).await.unwrap();
        assert_eq!(page.items[0].id(), "2");
    }

    #[tokio::test]
    async fn test_short_query_uses_whole_string() {
        let repo = forum_repo();
        let params = ModuleQuery::new(Module::Forum, 10);
        let page = repo.search("tp", &params).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id(), "4");
    }

    #[tokio::test]
    async fn test_titles_match_title_only() {
        let repo = forum_repo();
        let titles = repo.titles("door", 10).await.unwrap();
        assert_eq!(titles, vec!["Redstone door help".to_string()]);

        // "piston" only appears in content
        assert!(repo.titles("piston", 10).await.unwrap().is_empty());

        let titles = repo.titles("redstone", 10).await.unwrap();
        assert_eq!(titles, vec!["Best redstone contraptions", "Redstone door help"]);
    }

    #[tokio::test]
    async fn test_titles_not_crowded_out_by_content_matches() {
        let repo = MemoryRepository::new(Module::Forum, title_crowded_forum(fixed_now()));
        let titles = repo.titles("redstone", 10).await.unwrap();
        assert_eq!(titles, vec!["Redstone basics".to_string()]);
    }
}
