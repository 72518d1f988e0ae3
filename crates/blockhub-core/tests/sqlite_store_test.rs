//! Integration tests for the SQLite-backed store: import, search, stats

use blockhub_core::import::{import_path, DEFAULT_PATTERN};
use blockhub_core::{Database, Module, SearchEngine, SearchRequest, SqliteRepository};
use chrono::{DateTime, Utc};
use std::fs;
use tempfile::TempDir;

fn now() -> DateTime<Utc> {
    "2024-06-15T12:00:00Z".parse().unwrap()
}

const FORUM_EXPORT: &str = r#"[
  {
    "module": "forum",
    "id": "t1",
    "title": "Redstone clock keeps stopping",
    "content": "My clock stops after a few minutes",
    "author": {"id": "u1", "name": "Alex"},
    "categoryName": "Help",
    "repliesCount": 4,
    "likesCount": 3,
    "status": "active",
    "slug": "redstone-clock-keeps-stopping",
    "createdAt": "2024-06-13T10:00:00Z",
    "updatedAt": "2024-06-13T10:00:00Z"
  },
  {
    "module": "forum",
    "id": "t2",
    "title": "Hidden thread about redstone",
    "author": {"id": "u2", "name": "Griefer"},
    "status": "hidden",
    "slug": "hidden-thread",
    "createdAt": "2024-06-10T10:00:00Z",
    "updatedAt": "2024-06-10T10:00:00Z"
  }
]"#;

const WIKI_EXPORT: &str = r#"{
  "module": "wiki",
  "id": "g1",
  "title": "Redstone Basics",
  "content": "<h1>Redstone</h1><p>Dust, torches &amp; repeaters.</p>",
  "author": {"id": "u3", "name": "Notch"},
  "category": "mechanics",
  "tags": ["redstone", "beginner"],
  "difficulty": "beginner",
  "likesCount": 90,
  "status": "published",
  "slug": "redstone-basics",
  "createdAt": "2023-01-01T00:00:00Z",
  "updatedAt": "2024-01-01T00:00:00Z"
}"#;

fn seeded_store() -> (TempDir, Database) {
    let temp = TempDir::new().unwrap();
    let export = temp.path().join("export");
    fs::create_dir_all(export.join("wiki")).unwrap();
    fs::write(export.join("forum.json"), FORUM_EXPORT).unwrap();
    fs::write(export.join("wiki").join("basics.json"), WIKI_EXPORT).unwrap();

    let mut db = Database::open(temp.path().join("content.sqlite")).unwrap();
    db.initialize().unwrap();
    let report = import_path(&mut db, &export, DEFAULT_PATTERN).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.items, 3);
    (temp, db)
}

#[test]
fn test_stats_after_import() {
    let (_temp, db) = seeded_store();
    let stats = db.get_stats().unwrap();
    assert_eq!(stats.total_items, 3);
    let forum = stats
        .modules
        .iter()
        .find(|m| m.module == Module::Forum)
        .unwrap();
    assert_eq!(forum.items, 2);
    assert_eq!(forum.visible, 1);
}

#[tokio::test]
async fn test_engine_over_sqlite_store() {
    let (_temp, db) = seeded_store();
    let engine = SearchEngine::new(SqliteRepository::registry(db));

    let response = engine
        .search_at(&SearchRequest::new("redstone"), now())
        .await
        .unwrap();

    // The hidden thread is excluded by the default status filter
    assert_eq!(response.total_count, 2);
    let titles: Vec<&str> = response.results.iter().map(|r| r.title.as_str()).collect();
    assert!(titles.contains(&"Redstone Basics"));
    assert!(titles.contains(&"Redstone clock keeps stopping"));

    let wiki = response
        .results
        .iter()
        .find(|r| r.module == Module::Wiki)
        .unwrap();
    assert_eq!(wiki.excerpt, "Redstone Dust, torches & repeaters.");
    assert_eq!(wiki.url(), "/wiki/guide/redstone-basics");
}

#[tokio::test]
async fn test_completions_from_sqlite_store() {
    let (_temp, db) = seeded_store();
    let engine = SearchEngine::new(SqliteRepository::registry(db));

    let bundle = engine.suggest("redst", None).await;
    assert_eq!(
        bundle.completions,
        vec!["Redstone Basics", "Redstone clock keeps stopping"]
    );
}

#[test]
fn test_reimport_is_idempotent() {
    let (temp, mut db) = seeded_store();
    let report = import_path(&mut db, &temp.path().join("export"), DEFAULT_PATTERN).unwrap();
    assert_eq!(report.items, 3);
    assert_eq!(db.get_stats().unwrap().total_items, 3);
}
