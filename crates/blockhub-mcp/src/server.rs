//! MCP server implementation

use crate::protocol::*;
use crate::tools;
use anyhow::Result;
use blockhub_core::{BlockhubError, Database, SearchEngine};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

pub struct McpServer {
    engine: SearchEngine,
    db: Option<Arc<Mutex<Database>>>,
}

impl McpServer {
    /// `db` backs the status tool when the engine serves the local store
    pub fn new(engine: SearchEngine, db: Option<Arc<Mutex<Database>>>) -> Self {
        Self { engine, db }
    }

    pub async fn run(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let mut writer = BufWriter::new(tokio::io::stdout());
        self.serve(reader, &mut writer).await
    }

    /// Answer newline-delimited requests from `reader` until end of input
    pub async fn serve<R, W>(&self, mut reader: R, writer: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWriteExt + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    let response = JsonRpcResponse::error(
                        None,
                        error_codes::PARSE_ERROR,
                        &format!("Parse error: {}", e),
                    );
                    self.write_response(writer, &response).await?;
                    continue;
                }
            };

            // Notifications carry no id and get no response
            if request.id.is_none() {
                tracing::debug!(method = %request.method, "Notification");
                continue;
            }

            let response = self.handle_request(&request).await;
            self.write_response(writer, &response).await?;
        }

        Ok(())
    }

    async fn write_response<W: AsyncWriteExt + Unpin>(
        &self,
        writer: &mut W,
        response: &JsonRpcResponse,
    ) -> Result<()> {
        let json = serde_json::to_string(response)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id.clone(), serde_json::json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(
                request.id.clone(),
                error_codes::METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let result = serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "blockhub",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        JsonRpcResponse::success(request.id.clone(), result)
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let tools = vec![
            tools::search_tool_definition(),
            tools::suggest_tool_definition(),
            tools::status_tool_definition(),
        ];

        JsonRpcResponse::success(request.id.clone(), serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let name = request
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        let result = match name {
            "search" => tools::handle_search(&self.engine, arguments).await,
            "suggest" => tools::handle_suggest(&self.engine, arguments).await,
            "status" => tools::handle_status(&self.engine, self.db.clone()).await,
            _ => {
                return JsonRpcResponse::error(
                    request.id.clone(),
                    error_codes::INVALID_PARAMS,
                    &format!("Unknown tool: {}", name),
                )
            }
        };

        let tool_result = match result {
            Ok(tool_result) => tool_result,
            Err(e) => {
                if let Some(err) = e.downcast_ref::<BlockhubError>() {
                    if err.is_client_error() {
                        return JsonRpcResponse::error(
                            request.id.clone(),
                            error_codes::INVALID_PARAMS,
                            &err.to_string(),
                        );
                    }
                }
                tracing::warn!(tool = name, error = %e, "Tool call failed");
                ToolResult::error(format!("Error: {}", e))
            }
        };

        match serde_json::to_value(tool_result) {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(e) => JsonRpcResponse::error(
                request.id.clone(),
                error_codes::INTERNAL_ERROR,
                &format!("Failed to encode result: {}", e),
            ),
        }
    }
}

pub async fn start_server(engine: SearchEngine, db: Option<Arc<Mutex<Database>>>) -> Result<()> {
    let server = McpServer::new(engine, db);
    server.run().await
}
