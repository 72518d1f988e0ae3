//! Integration tests for the MCP server over an in-process transport

use blockhub_core::import::parse_items;
use blockhub_core::{Database, RawItem, RepositoryRegistry, SearchEngine};
use blockhub_mcp::McpServer;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::BufReader;

const ITEMS: &str = r#"[
  {
    "module": "forum",
    "id": "t1",
    "title": "Redstone clock keeps stopping",
    "content": "My redstone clock stops after a few minutes",
    "author": {"id": "u1", "name": "Alex"},
    "categoryName": "Help",
    "status": "active",
    "slug": "redstone-clock-keeps-stopping",
    "createdAt": "2024-06-13T10:00:00Z",
    "updatedAt": "2024-06-13T10:00:00Z"
  },
  {
    "module": "wiki",
    "id": "g1",
    "title": "Redstone Basics",
    "content": "<p>Dust, torches and repeaters.</p>",
    "author": {"id": "u3", "name": "Notch"},
    "category": "mechanics",
    "status": "published",
    "slug": "redstone-basics",
    "createdAt": "2023-01-01T00:00:00Z",
    "updatedAt": "2024-01-01T00:00:00Z"
  },
  {
    "module": "blog",
    "id": "b1",
    "title": "Draft: upcoming redstone changes",
    "author": {"id": "u4", "name": "Jeb"},
    "category": "news",
    "status": "draft",
    "slug": "draft-redstone",
    "createdAt": "2024-06-01T00:00:00Z",
    "updatedAt": "2024-06-01T00:00:00Z"
  }
]"#;

fn items() -> Vec<RawItem> {
    parse_items(ITEMS).unwrap()
}

fn server() -> McpServer {
    let mut db = Database::open_in_memory().unwrap();
    db.initialize().unwrap();
    db.upsert_items(&items()).unwrap();

    let engine = SearchEngine::new(RepositoryRegistry::in_memory(items()));
    McpServer::new(engine, Some(Arc::new(Mutex::new(db))))
}

async fn exchange(server: &McpServer, requests: &[Value]) -> Vec<Value> {
    let input: String = requests
        .iter()
        .map(|r| format!("{}\n", r))
        .collect();
    let mut output: Vec<u8> = Vec::new();
    server
        .serve(BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn call(id: u64, tool: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments }
    })
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let server = server();
    let responses = exchange(
        &server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        ],
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "blockhub");
    let names: Vec<&str> = responses[1]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["search", "suggest", "status"]);
}

#[tokio::test]
async fn test_protocol_errors() {
    let server = server();
    let input = "not json\n";
    let mut output: Vec<u8> = Vec::new();
    server
        .serve(BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();
    let parse_error: Value = serde_json::from_slice(output.trim_ascii_end()).unwrap();
    assert_eq!(parse_error["error"]["code"], -32700);

    let responses = exchange(
        &server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "resources/read"}),
            call(2, "vsearch", json!({"query": "redstone"})),
        ],
    )
    .await;
    assert_eq!(responses[0]["error"]["code"], -32601);
    assert_eq!(responses[1]["error"]["code"], -32602);
}

#[tokio::test]
async fn test_search_tool_returns_produced_interface() {
    let server = server();
    let responses = exchange(
        &server,
        &[call(1, "search", json!({"query": "redstone", "limit": 10}))],
    )
    .await;

    let result = &responses[0]["result"];
    assert!(result.get("isError").is_none());
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("Found 2 results for \"redstone\""));

    let structured = &result["structuredContent"];
    assert_eq!(structured["totalCount"], 2);
    assert_eq!(structured["query"]["q"], "redstone");
    assert!(structured["searchTime"].is_u64());
    assert_eq!(structured["facets"]["modules"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_tool_rejects_invalid_input() {
    let server = server();
    let responses = exchange(
        &server,
        &[
            call(1, "search", json!({"query": "   "})),
            call(2, "search", json!({"query": "redstone", "limit": 500})),
            call(3, "search", json!({"query": "redstone", "modules": ["news"]})),
            call(4, "search", json!({})),
        ],
    )
    .await;

    assert_eq!(responses.len(), 4);
    for response in &responses {
        assert_eq!(response["error"]["code"], -32602, "{}", response);
    }
}

#[tokio::test]
async fn test_search_tool_with_huge_offset_returns_empty_page() {
    let server = server();
    let responses = exchange(
        &server,
        &[call(1, "search", json!({"query": "redstone", "offset": u64::MAX}))],
    )
    .await;

    let result = &responses[0]["result"];
    assert!(result.get("isError").is_none());
    assert_eq!(result["structuredContent"]["totalCount"], 2);
    assert_eq!(result["structuredContent"]["results"], json!([]));
}

#[tokio::test]
async fn test_suggest_tool() {
    let server = server();
    let responses = exchange(
        &server,
        &[
            call(1, "suggest", json!({"query": "mincraft"})),
            call(2, "suggest", json!({"query": "redstone", "module": "wiki"})),
            call(3, "suggest", json!({"query": "r"})),
        ],
    )
    .await;

    assert_eq!(
        responses[0]["result"]["structuredContent"]["corrections"],
        json!(["minecraft"])
    );

    let scoped = &responses[1]["result"]["structuredContent"];
    assert_eq!(scoped["completions"], json!(["Redstone Basics"]));
    assert_eq!(scoped["popular"], json!(["redstone basics"]));

    let short = &responses[2]["result"]["structuredContent"];
    assert_eq!(short["completions"], json!([]));
    assert_eq!(short["popular"], json!([]));
}

#[tokio::test]
async fn test_status_tool_reports_store_and_counters() {
    let server = server();
    let responses = exchange(
        &server,
        &[
            call(1, "search", json!({"query": "redstone"})),
            call(2, "search", json!({"query": ""})),
            call(3, "status", json!({})),
        ],
    )
    .await;

    let status = &responses[2]["result"]["structuredContent"];
    assert_eq!(status["store"]["total_items"], 3);
    assert_eq!(status["stats"]["searches"], 1);
    assert_eq!(status["stats"]["failedSearches"], 1);
    assert_eq!(status["pagination"], "over-fetch");
    assert_eq!(status["modules"], json!(["forum", "blog", "wiki"]));
}
