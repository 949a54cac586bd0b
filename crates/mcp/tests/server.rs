//! End-to-end MCP exchanges against the fixture index.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::Arc;

use docindex_core::{DocIndex, ParseMode, SearchOptions};
use docindex_mcp::{AppContext, McpServer, build_server};
use serde_json::{Value, json};
use tokio::io::BufReader;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("core")
        .join("tests")
        .join("fixtures")
        .join("search_index.js")
}

fn server() -> McpServer<AppContext> {
    let index = DocIndex::load(&fixture_path(), ParseMode::Strict).unwrap();
    build_server(AppContext {
        index: Arc::new(index),
        defaults: SearchOptions::default(),
        source: fixture_path(),
    })
}

async fn call(server: &McpServer<AppContext>, id: u64, method: &str, params: Value) -> Value {
    let request = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
    let response = server
        .handle_message(&request.to_string())
        .await
        .unwrap();
    serde_json::from_str(&response).unwrap()
}

fn tool_text(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn test_lists_tools_and_resources() {
    let server = server();

    let tools = call(&server, 1, "tools/list", json!({})).await;
    let names: Vec<&str> = tools["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["list_pages", "lookup_location", "search_docs"]);

    let resources = call(&server, 2, "resources/list", json!({})).await;
    assert_eq!(resources["result"]["resources"][0]["uri"], "docindex://stats");
}

#[tokio::test]
async fn test_search_docs() {
    let server = server();
    let response = call(
        &server,
        1,
        "tools/call",
        json!({
            "name": "search_docs",
            "arguments": { "query": "quanticscrossinterpolate", "category": "method", "limit": 2 }
        }),
    )
    .await;
    assert_eq!(response["result"]["isError"], false);

    let body = tool_text(&response);
    assert_eq!(body["total"], 2);
    for result in body["results"].as_array().unwrap() {
        assert_eq!(result["category"], "method");
        assert_eq!(result["title"], "QuanticsTCI.quanticscrossinterpolate");
    }
}

#[tokio::test]
async fn test_search_docs_bad_category_is_tool_error() {
    let server = server();
    let response = call(
        &server,
        1,
        "tools/call",
        json!({ "name": "search_docs", "arguments": { "query": "x", "category": "function" } }),
    )
    .await;
    assert_eq!(response["result"]["isError"], true);
}

#[tokio::test]
async fn test_lookup_location() {
    let server = server();
    let response = call(
        &server,
        1,
        "tools/call",
        json!({ "name": "lookup_location", "arguments": { "location": "#Quickstart" } }),
    )
    .await;
    let records = tool_text(&response);
    assert_eq!(records[0]["title"], "Quickstart");
    assert_eq!(records[0]["category"], "section");

    let response = call(
        &server,
        2,
        "tools/call",
        json!({ "name": "lookup_location", "arguments": { "location": "nowhere/" } }),
    )
    .await;
    assert_eq!(response["result"]["isError"], true);
}

#[tokio::test]
async fn test_list_pages_without_arguments() {
    let server = server();
    let response = call(&server, 1, "tools/call", json!({ "name": "list_pages" })).await;
    let pages = tool_text(&response);
    let names: Vec<&str> = pages
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["page"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Home"));
    assert!(names.contains(&"API Reference"));
}

#[tokio::test]
async fn test_stats_resource() {
    let server = server();
    let response = call(
        &server,
        1,
        "resources/read",
        json!({ "uri": "docindex://stats" }),
    )
    .await;
    let content = &response["result"]["contents"][0];
    assert_eq!(content["mimeType"], "application/json");
    let stats: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(stats["records"], 26);
    assert_eq!(stats["var_name"], "documenterSearchIndex");
    assert_eq!(stats["digest"].as_str().unwrap().len(), 64);

    let missing = call(&server, 2, "resources/read", json!({ "uri": "docindex://nope" })).await;
    assert_eq!(missing["error"]["code"], -32602);
}

#[tokio::test]
async fn test_serve_session() {
    let server = server();
    let input = [
        json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }).to_string(),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
        json!({ "jsonrpc": "2.0", "id": 2, "method": "unknown/method" }).to_string(),
    ]
    .join("\n");

    let mut output = Vec::new();
    server
        .serve(BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["result"]["serverInfo"]["name"], "docindex");
    assert_eq!(lines[1]["error"]["code"], -32601);
}
