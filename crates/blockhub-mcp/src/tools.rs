//! MCP tool definitions and handlers

use crate::protocol::*;
use anyhow::Result;
use blockhub_core::search::{ContentStatus, DateRange, Difficulty, DEFAULT_LIMIT};
use blockhub_core::{
    BlockhubError, Database, Module, SearchEngine, SearchFilters, SearchRequest, SortKey,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub fn search_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "search".to_string(),
        description: "Search forum threads, blog articles and wiki guides in one ranked list"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (1-500 characters)"
                },
                "modules": {
                    "type": "array",
                    "items": { "type": "string", "enum": ["forum", "blog", "wiki"] },
                    "description": "Modules to search (default: all)"
                },
                "categories": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Category filter"
                },
                "tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Tag filter"
                },
                "authors": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Author name filter"
                },
                "difficulty": {
                    "type": "array",
                    "items": { "type": "string", "enum": ["beginner", "intermediate", "advanced", "expert"] },
                    "description": "Wiki guide difficulty filter"
                },
                "status": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Statuses to include (default: active forum threads, published articles and guides)"
                },
                "sort": {
                    "type": "string",
                    "enum": ["relevance", "date-desc", "date-asc", "views-desc", "likes-desc", "title-asc", "author-asc"],
                    "default": "relevance"
                },
                "from": {
                    "type": "string",
                    "description": "Earliest creation date (RFC 3339)"
                },
                "to": {
                    "type": "string",
                    "description": "Latest creation date (RFC 3339)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum results (1-100, default: 20)",
                    "default": 20
                },
                "offset": {
                    "type": "integer",
                    "description": "Results to skip (default: 0)",
                    "default": 0
                },
                "highlight": {
                    "type": "boolean",
                    "description": "Extract highlight fragments (default: true)",
                    "default": true
                },
                "facets": {
                    "type": "boolean",
                    "description": "Aggregate facets (default: true)",
                    "default": true
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn suggest_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "suggest".to_string(),
        description: "Completions, spelling corrections and popular searches for a partial query"
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Partial query (at least 2 characters)"
                },
                "module": {
                    "type": "string",
                    "enum": ["forum", "blog", "wiki"],
                    "description": "Scope suggestions to one module"
                }
            },
            "required": ["query"]
        }),
    }
}

pub fn status_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "status".to_string(),
        description: "Show store contents and search counters".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    BlockhubError::InvalidInput(message.into()).into()
}

fn string_list(args: &Value, key: &str) -> Result<Vec<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| {
                v.as_str()
                    .map(String::from)
                    .ok_or_else(|| invalid(format!("{} must contain strings", key)))
            })
            .collect(),
        Some(_) => Err(invalid(format!("{} must be a string array", key))),
    }
}

fn parsed_list<T>(args: &Value, key: &str) -> Result<Vec<T>>
where
    T: FromStr<Err = BlockhubError>,
{
    string_list(args, key)?
        .iter()
        .map(|s| s.parse::<T>().map_err(anyhow::Error::from))
        .collect()
}

fn date_arg(args: &Value, key: &str) -> Result<Option<DateTime<Utc>>> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| invalid(format!("{} is not an RFC 3339 date: {}", key, e)))
        })
        .transpose()
}

/// Build a search request from tool arguments
pub fn parse_search_request(args: &Value) -> Result<SearchRequest> {
    let query = args
        .get("query")
        .or_else(|| args.get("q"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("Missing query"))?;

    let date_range = match (date_arg(args, "from")?, date_arg(args, "to")?) {
        (None, None) => None,
        (from, to) => Some(DateRange { from, to }),
    };

    Ok(SearchRequest {
        q: query.to_string(),
        filters: SearchFilters {
            modules: parsed_list::<Module>(args, "modules")?,
            authors: string_list(args, "authors")?,
            categories: string_list(args, "categories")?,
            tags: string_list(args, "tags")?,
            difficulty: parsed_list::<Difficulty>(args, "difficulty")?,
            status: parsed_list::<ContentStatus>(args, "status")?,
        },
        sort: args
            .get("sort")
            .and_then(|v| v.as_str())
            .map(|s| SortKey::from(s.to_string()))
            .unwrap_or_default(),
        date_range,
        limit: args
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|v| usize::try_from(v).unwrap_or(usize::MAX))
            .unwrap_or(DEFAULT_LIMIT),
        offset: args
            .get("offset")
            .and_then(|v| v.as_u64())
            .map(|v| usize::try_from(v).unwrap_or(usize::MAX))
            .unwrap_or(0),
        highlight: args
            .get("highlight")
            .and_then(|v| v.as_bool())
            .unwrap_or(true),
        facets: args.get("facets").and_then(|v| v.as_bool()).unwrap_or(true),
    })
}

pub async fn handle_search(engine: &SearchEngine, args: Value) -> Result<ToolResult> {
    let request = parse_search_request(&args)?;
    let response = engine.search(&request).await?;

    let mut summary = format!(
        "Found {} results for \"{}\" ({} ms)",
        response.total_count, request.q, response.search_time
    );
    for (i, r) in response.results.iter().enumerate() {
        summary.push_str(&format!(
            "\n{}. [{}] {} ({}) {}",
            request.offset.saturating_add(i + 1),
            r.module,
            r.title,
            r.score_or_zero(),
            r.url()
        ));
    }

    Ok(ToolResult::structured(
        summary,
        serde_json::to_value(&response)?,
    ))
}

pub async fn handle_suggest(engine: &SearchEngine, args: Value) -> Result<ToolResult> {
    let query = args
        .get("query")
        .or_else(|| args.get("q"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("Missing query"))?;
    let module = args
        .get("module")
        .and_then(|v| v.as_str())
        .map(Module::from_str)
        .transpose()?;

    let response = engine.suggest(query, module).await;

    let mut lines = Vec::new();
    if !response.completions.is_empty() {
        lines.push(format!("Completions: {}", response.completions.join(" | ")));
    }
    if !response.corrections.is_empty() {
        lines.push(format!("Did you mean: {}", response.corrections.join(" | ")));
    }
    if !response.popular.is_empty() {
        lines.push(format!("Popular: {}", response.popular.join(" | ")));
    }
    if lines.is_empty() {
        lines.push(format!("No suggestions for \"{}\"", query));
    }

    Ok(ToolResult::structured(
        lines.join("\n"),
        serde_json::to_value(&response)?,
    ))
}

pub async fn handle_status(
    engine: &SearchEngine,
    db: Option<Arc<Mutex<Database>>>,
) -> Result<ToolResult> {
    let counters = engine.stats().snapshot();

    let stats = match db {
        Some(db) => Some(
            tokio::task::spawn_blocking(move || {
                let db = db
                    .lock()
                    .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
                Ok::<_, anyhow::Error>(db.get_stats()?)
            })
            .await??,
        ),
        None => None,
    };

    let mut summary = format!(
        "Modules: {}\nSearches: {} ({} failed), suggestions: {}, module failures: {}",
        engine
            .registry()
            .modules()
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        counters.searches,
        counters.failed_searches,
        counters.suggestions,
        counters.module_failures
    );
    if let Some(stats) = &stats {
        summary.push_str(&format!("\nStore: {} items", stats.total_items));
        for count in &stats.modules {
            summary.push_str(&format!(
                "\n  - {}: {} items, {} visible",
                count.module, count.items, count.visible
            ));
        }
    }

    let structured = serde_json::json!({
        "modules": engine.registry().modules(),
        "pagination": engine.settings().pagination.as_str(),
        "stats": counters,
        "store": stats,
    });

    Ok(ToolResult::structured(summary, structured))
}
