//! Minimal MCP server over newline-delimited JSON-RPC 2.0.
//!
//! Handles `initialize`, `ping`, `tools/list` and `tools/call`. Messages
//! without an `id` are notifications and get no reply. Tool failures are
//! reported inside the tool result (`isError: true`), never as JSON-RPC
//! errors.

use crate::tools::DocumentTools;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "docmistral-mcp";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;

fn result(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn rpc_error(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message.into() },
    })
}

/// Handle one decoded message. Returns the reply, or `None` for notifications.
pub async fn handle_message(tools: &DocumentTools, message: Value) -> Option<Value> {
    let Some(obj) = message.as_object() else {
        return Some(rpc_error(Value::Null, INVALID_REQUEST, "Request must be a JSON object"));
    };
    let id = obj.get("id").cloned();
    let Some(method) = obj.get("method").and_then(Value::as_str) else {
        return id.map(|id| rpc_error(id, INVALID_REQUEST, "Missing method"));
    };

    let Some(id) = id else {
        debug!("Notification: {}", method);
        return None;
    };
    let params = obj.get("params").cloned().unwrap_or(Value::Null);

    let reply = match method {
        "initialize" => {
            let version = params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(PROTOCOL_VERSION);
            result(
                id,
                json!({
                    "protocolVersion": version,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )
        }
        "ping" => result(id, json!({})),
        "tools/list" => result(id, json!({ "tools": DocumentTools::tool_definitions() })),
        "tools/call" => {
            let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
            let output = tools.call(name, arguments).await;
            result(id, output.to_json())
        }
        other => {
            warn!("Unknown method: {}", other);
            rpc_error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
        }
    };
    Some(reply)
}

/// Serve requests from `reader` until EOF, writing one reply per line.
pub async fn serve<R, W>(tools: &DocumentTools, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("{} ready on stdio", SERVER_NAME);
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Value>(&line) {
            Ok(message) => handle_message(tools, message).await,
            Err(e) => {
                warn!("Unparsable message: {}", e);
                Some(rpc_error(Value::Null, PARSE_ERROR, format!("Parse error: {e}")))
            }
        };

        if let Some(reply) = reply {
            let mut out = serde_json::to_vec(&reply)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
    }

    info!("Input closed, shutting down");
    Ok(())
}
