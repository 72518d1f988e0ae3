//! Content item storage and module-scoped full-text search

use super::Database;
use crate::error::Result;
use crate::repository::{ModulePage, ModuleQuery, RawItem};
use crate::search::{Module, SortHint};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, ToSql};

/// Fixed-width timestamp so stored dates compare lexicographically
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Quoted, prefix-matched FTS5 terms; words without a letter or digit are dropped
fn fts_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|word| word.replace('"', ""))
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .map(|word| format!("\"{}\"*", word))
        .collect()
}

/// FTS5 match expression: every word quoted and prefix-matched, OR-joined
///
/// Returns `None` when the query has no searchable word.
pub fn fts_match_expression(query: &str) -> Option<String> {
    let terms = fts_terms(query);
    (!terms.is_empty()).then(|| terms.join(" OR "))
}

/// Like [`fts_match_expression`], restricted to the title column
pub fn fts_title_expression(query: &str) -> Option<String> {
    let terms = fts_terms(query);
    (!terms.is_empty()).then(|| {
        terms
            .iter()
            .map(|term| format!("title : {}", term))
            .collect::<Vec<_>>()
            .join(" OR ")
    })
}

/// SQLite integers are signed 64-bit
fn sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn order_clause(hint: SortHint) -> &'static str {
    match hint {
        SortHint::Latest => " ORDER BY i.created_at DESC, i.id ASC",
        SortHint::Views => " ORDER BY i.views_count DESC, i.id ASC",
        SortHint::Popular => " ORDER BY i.likes_count DESC, i.views_count DESC, i.id ASC",
    }
}

/// Accumulates SQL conditions with numbered placeholders
struct FilterBuilder {
    sql: String,
    params: Vec<Box<dyn ToSql>>,
}

impl FilterBuilder {
    fn new(sql: String, params: Vec<Box<dyn ToSql>>) -> Self {
        Self { sql, params }
    }

    fn placeholder(&mut self, value: Box<dyn ToSql>) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    fn placeholders(&mut self, values: Vec<String>) -> String {
        values
            .into_iter()
            .map(|v| self.placeholder(Box::new(v)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn push(&mut self, condition: &str) {
        self.sql.push_str(" AND ");
        self.sql.push_str(condition);
    }

    fn apply(&mut self, query: &ModuleQuery) {
        if !query.statuses.is_empty() {
            let list = self.placeholders(
                query.statuses.iter().map(|s| s.as_str().to_string()).collect(),
            );
            self.push(&format!("i.status IN ({})", list));
        }
        if !query.categories.is_empty() {
            let list = self.placeholders(lowercase(&query.categories));
            self.push(&format!("LOWER(i.category) IN ({})", list));
        }
        if !query.authors.is_empty() {
            let list = self.placeholders(lowercase(&query.authors));
            self.push(&format!("LOWER(i.author_name) IN ({})", list));
        }
        if !query.tags.is_empty() {
            let list = self.placeholders(lowercase(&query.tags));
            self.push(&format!(
                "EXISTS (SELECT 1 FROM json_each(i.tags) t WHERE LOWER(t.value) IN ({}))",
                list
            ));
        }
        if !query.difficulties.is_empty() {
            let list = self.placeholders(
                query
                    .difficulties
                    .iter()
                    .map(|d| d.as_str().to_string())
                    .collect(),
            );
            self.push(&format!("i.difficulty IN ({})", list));
        }
        if let Some(range) = &query.date_range {
            if let Some(from) = &range.from {
                let p = self.placeholder(Box::new(timestamp(from)));
                self.push(&format!("i.created_at >= {}", p));
            }
            if let Some(to) = &range.to {
                let p = self.placeholder(Box::new(timestamp(to)));
                self.push(&format!("i.created_at <= {}", p));
            }
        }
    }

    fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

fn lowercase(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

fn write_item(conn: &Connection, item: &RawItem) -> Result<()> {
    let tags = serde_json::to_string(item.tags())?;
    let payload = serde_json::to_string(item)?;

    conn.execute(
        "INSERT INTO content_items (
            module, item_id, title, excerpt, content, author_name, category, tags,
            status, difficulty, views_count, likes_count, created_at, updated_at,
            payload, imported_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
         ON CONFLICT(module, item_id) DO UPDATE SET
            title = excluded.title,
            excerpt = excluded.excerpt,
            content = excluded.content,
            author_name = excluded.author_name,
            category = excluded.category,
            tags = excluded.tags,
            status = excluded.status,
            difficulty = excluded.difficulty,
            views_count = excluded.views_count,
            likes_count = excluded.likes_count,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at,
            payload = excluded.payload,
            imported_at = excluded.imported_at",
        params![
            item.module().as_str(),
            item.id(),
            item.title(),
            item.excerpt(),
            item.content(),
            item.author().name,
            item.category(),
            tags,
            item.status().as_str(),
            item.difficulty().map(|d| d.as_str()),
            item.views_count() as i64,
            item.likes_count() as i64,
            timestamp(&item.created_at()),
            timestamp(&item.updated_at()),
            payload,
            timestamp(&Utc::now()),
        ],
    )?;
    Ok(())
}

impl Database {
    /// Insert or replace an item, keyed by module and item id
    pub fn upsert_item(&self, item: &RawItem) -> Result<()> {
        write_item(&self.conn, item)
    }

    /// Upsert many items in one transaction, returning how many were written
    pub fn upsert_items(&mut self, items: &[RawItem]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for item in items {
            write_item(&tx, item)?;
        }
        tx.commit()?;
        Ok(items.len())
    }

    /// Fetch one item by module and id
    pub fn get_item(&self, module: Module, item_id: &str) -> Result<Option<RawItem>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM content_items WHERE module = ?1 AND item_id = ?2",
                params![module.as_str(), item_id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(Into::into))
            .transpose()
    }

    /// Delete every item of a module, returning the number removed
    pub fn clear_module(&self, module: Module) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM content_items WHERE module = ?1",
            params![module.as_str()],
        )?;
        Ok(removed)
    }

    /// Module-scoped full-text search with filters, ordering and a page window
    pub fn search_items(
        &self,
        module: Module,
        query: &str,
        params: &ModuleQuery,
    ) -> Result<ModulePage> {
        match fts_match_expression(query) {
            Some(expression) => self.match_page(module, expression, params),
            None => Ok(ModulePage::default()),
        }
    }

    /// Titles of default-visible items whose title matches the query, most liked first
    pub fn search_titles(&self, module: Module, query: &str, limit: usize) -> Result<Vec<String>> {
        let Some(expression) = fts_title_expression(query) else {
            return Ok(Vec::new());
        };
        let page = self.match_page(module, expression, &ModuleQuery::new(module, limit))?;
        Ok(page
            .items
            .into_iter()
            .map(|item| item.title().to_string())
            .collect())
    }

    fn match_page(
        &self,
        module: Module,
        expression: String,
        params: &ModuleQuery,
    ) -> Result<ModulePage> {
        let base = String::from(
            "FROM content_fts f
             JOIN content_items i ON i.id = f.rowid
             WHERE content_fts MATCH ?1 AND i.module = ?2",
        );
        let mut filters = FilterBuilder::new(
            base,
            vec![Box::new(expression), Box::new(module.as_str().to_string())],
        );
        filters.apply(params);

        let count_sql = format!("SELECT COUNT(*) {}", filters.sql);
        let total: i64 = self
            .conn
            .query_row(&count_sql, filters.param_refs().as_slice(), |row| row.get(0))?;

        let page_sql = format!(
            "SELECT i.payload {}{} LIMIT {} OFFSET {}",
            filters.sql,
            order_clause(params.sort_hint),
            sql_count(params.limit),
            sql_count(params.offset)
        );
        let mut stmt = self.conn.prepare(&page_sql)?;
        let payloads = stmt
            .query_map(filters.param_refs().as_slice(), |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let items = payloads
            .iter()
            .map(|p| serde_json::from_str::<RawItem>(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(
            module = %module,
            total,
            returned = items.len(),
            "SQLite module search"
        );

        Ok(ModulePage {
            items,
            total: total as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::*;
    use crate::search::test_support::fixed_now;
    use crate::search::{ContentStatus, DateRange, Difficulty};

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let now = fixed_now();
        let mut popular = forum("f2", "Redstone clock help", "my clock stops", days_ago(now, 5));
        if let RawItem::Forum(post) = &mut popular {
            post.likes_count = 50;
        }
        db.upsert_items(&[
            forum("f1", "Redstone lag", "lag from redstone", days_ago(now, 1)),
            popular,
            forum("f3", "Trading hall", "villager trading", days_ago(now, 3)),
            wiki("w1", "Redstone Farm Tutorial", "build a farm", days_ago(now, 100)),
        ])
        .unwrap();
        db
    }

    #[test]
    fn test_match_expression_quotes_terms() {
        assert_eq!(
            fts_match_expression("redstone \"farm"),
            Some("\"redstone\"* OR \"farm\"*".to_string())
        );
        assert_eq!(fts_match_expression("  \"\" "), None);
    }

    #[test]
    fn test_match_expression_drops_punctuation_words() {
        assert_eq!(fts_match_expression("!!!"), None);
        assert_eq!(fts_match_expression("?? -- ..."), None);
        assert_eq!(
            fts_match_expression("redstone ?! tnt-cannon"),
            Some("\"redstone\"* OR \"tnt-cannon\"*".to_string())
        );
        assert_eq!(fts_title_expression("!!!"), None);

        let db = seeded();
        let params = ModuleQuery::new(Module::Forum, 10);
        let page = db.search_items(Module::Forum, "!!!", &params).unwrap();
        assert_eq!(page, ModulePage::default());
    }

    #[test]
    fn test_title_expression_scopes_to_title_column() {
        assert_eq!(
            fts_title_expression("redstone farm"),
            Some("title : \"redstone\"* OR title : \"farm\"*".to_string())
        );
    }

    #[test]
    fn test_search_titles_ignores_content_only_matches() {
        let mut db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.upsert_items(&title_crowded_forum(fixed_now())).unwrap();

        let page = db
            .search_items(Module::Forum, "redstone", &ModuleQuery::new(Module::Forum, 10))
            .unwrap();
        assert_eq!(page.total, 11);
        assert!(page.items.iter().all(|i| i.title() == "Question"));

        let titles = db.search_titles(Module::Forum, "redstone", 10).unwrap();
        assert_eq!(titles, vec!["Redstone basics".to_string()]);
        assert!(db.search_titles(Module::Blog, "redstone", 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_window_beyond_i64_is_clamped() {
        let db = seeded();
        let params = ModuleQuery::new(Module::Forum, usize::MAX);
        let page = db.search_items(Module::Forum, "redstone", &params).unwrap();
        assert_eq!(page.items.len(), 2);

        let mut params = ModuleQuery::new(Module::Forum, 10);
        params.offset = usize::MAX;
        let page = db.search_items(Module::Forum, "redstone", &params).unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_search_is_module_scoped() {
        let db = seeded();
        let params = ModuleQuery::new(Module::Forum, 10);
        let page = db.search_items(Module::Forum, "redstone", &params).unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|i| i.module() == Module::Forum));
        // Popular hint: likes first
        assert_eq!(page.items[0].id(), "f2");
    }

    #[test]
    fn test_prefix_match_and_pagination() {
        let db = seeded();
        let mut params = ModuleQuery::new(Module::Forum, 1);
        params.sort_hint = SortHint::Latest;
        let page = db.search_items(Module::Forum, "red", &params).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id(), "f1");

        params.offset = 1;
        let page = db.search_items(Module::Forum, "red", &params).unwrap();
        assert_eq!(page.items[0].id(), "f2");
    }

    #[test]
    fn test_filters() {
        let db = seeded();
        let now = fixed_now();

        let mut params = ModuleQuery::new(Module::Wiki, 10);
        params.tags = vec!["FARMING".to_string()];
        params.difficulties = vec![Difficulty::Beginner];
        assert_eq!(db.search_items(Module::Wiki, "farm", &params).unwrap().total, 1);

        params.difficulties = vec![Difficulty::Expert];
        assert_eq!(db.search_items(Module::Wiki, "farm", &params).unwrap().total, 0);

        let mut params = ModuleQuery::new(Module::Forum, 10);
        params.date_range = Some(DateRange {
            from: Some(days_ago(now, 2)),
            to: None,
        });
        let page = db.search_items(Module::Forum, "redstone", &params).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id(), "f1");

        params.date_range = None;
        params.statuses = vec![ContentStatus::Locked];
        assert_eq!(db.search_items(Module::Forum, "redstone", &params).unwrap().total, 0);

        params.statuses = vec![ContentStatus::Active];
        params.authors = vec!["alex".to_string()];
        params.categories = vec!["HELP".to_string()];
        assert_eq!(db.search_items(Module::Forum, "redstone", &params).unwrap().total, 2);
    }

    #[test]
    fn test_upsert_replaces_and_reindexes() {
        let db = seeded();
        let now = fixed_now();
        db.upsert_item(&forum("f3", "Iron farm", "golems", days_ago(now, 3)))
            .unwrap();

        let params = ModuleQuery::new(Module::Forum, 10);
        assert_eq!(db.search_items(Module::Forum, "trading", &params).unwrap().total, 0);
        assert_eq!(db.search_items(Module::Forum, "golems", &params).unwrap().total, 1);
        assert_eq!(
            db.get_item(Module::Forum, "f3").unwrap().unwrap().title(),
            "Iron farm"
        );
    }

    #[test]
    fn test_clear_module() {
        let db = seeded();
        assert_eq!(db.clear_module(Module::Forum).unwrap(), 3);
        let params = ModuleQuery::new(Module::Forum, 10);
        assert_eq!(db.search_items(Module::Forum, "redstone", &params).unwrap().total, 0);
        assert!(db.get_item(Module::Wiki, "w1").unwrap().is_some());
    }
}
