//! Stdio MCP server: newline-delimited JSON-RPC, one request at a time.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use browserd_core::Result;
use browserd_tools::{schema, Content, Dispatcher, ToolResult};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::protocol::{
    CallToolParams, JsonRpcRequest, JsonRpcResponse, ToolInfo, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
};

pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serve requests from stdin until EOF, then close the session.
    /// Responses and log output never share a stream: stdout carries the
    /// protocol, tracing goes to stderr.
    pub async fn run(&self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();

        info!("serving MCP over stdio");
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                stdout.write_all(response.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }
        info!("stdin closed, shutting down");
        self.shutdown().await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.dispatcher.shutdown().await
    }

    /// Handle one raw line. `None` means no response goes out (notification
    /// or unserializable response).
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let request = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "unparseable request");
                let response =
                    JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {e}"));
                return serde_json::to_string(&response).ok();
            }
        };
        let response = self.handle_request(request).await?;
        match serde_json::to_string(&response) {
            Ok(serialized) => Some(serialized),
            Err(e) => {
                warn!(error = %e, "failed to serialize response");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);
        if request.jsonrpc.as_deref() != Some("2.0") {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                "expected jsonrpc \"2.0\"",
            ));
        }

        debug!(method = %request.method, "request");
        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::result(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {"tools": {}},
                    "serverInfo": {
                        "name": "browserd",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            "ping" => JsonRpcResponse::result(id, json!({})),
            "tools/list" => JsonRpcResponse::result(id, json!({"tools": self.tool_list()})),
            "tools/call" => match serde_json::from_value::<CallToolParams>(request.params) {
                Ok(params) => {
                    let result = self
                        .dispatcher
                        .dispatch(&params.name, &params.arguments)
                        .await;
                    JsonRpcResponse::result(id, render_tool_result(result))
                }
                Err(e) => JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("malformed tools/call params: {e}"),
                ),
            },
            other => {
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("unknown method '{other}'"))
            }
        };
        Some(response)
    }

    fn tool_list(&self) -> Vec<ToolInfo> {
        self.dispatcher
            .registry()
            .list()
            .iter()
            .map(|descriptor| ToolInfo {
                name: descriptor.name,
                description: descriptor.description,
                input_schema: schema::to_json_schema(descriptor.args),
            })
            .collect()
    }
}

/// Serialize a tool result as MCP call-result content.
fn render_tool_result(result: ToolResult) -> Value {
    match result {
        ToolResult::Success(blocks) => {
            let content: Vec<Value> = blocks.iter().map(content_block).collect();
            json!({"content": content, "isError": false})
        }
        ToolResult::Failure { kind, message } => json!({
            "content": [{"type": "text", "text": format!("{}: {message}", kind.as_str())}],
            "isError": true,
        }),
    }
}

fn content_block(content: &Content) -> Value {
    match content {
        Content::Text(text) => json!({"type": "text", "text": text}),
        Content::Json(value) => {
            let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            json!({"type": "text", "text": text})
        }
        Content::Image { data, media_type } => json!({
            "type": "image",
            "data": BASE64.encode(data),
            "mimeType": media_type,
        }),
    }
}
