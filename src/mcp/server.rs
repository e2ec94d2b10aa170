//! MCP server over newline-delimited JSON-RPC

use super::prompts::{prompts_list_payload, Prompt};
use super::resources::{resources_list_payload, Resource};
use super::rpc::{error_response, success_response, RpcError};
use crate::error::Result;
use crate::http::SharedClient;
use crate::tools::{self, ToolCall};
use crate::types::JsonValue;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
pub const MCP_SERVER_NAME: &str = "unifi-mcp";

/// Dispatches MCP requests to the tool layer
#[derive(Debug, Clone)]
pub struct McpServer {
    shared: Arc<SharedClient>,
}

impl McpServer {
    pub fn new(shared: Arc<SharedClient>) -> Self {
        Self { shared }
    }

    /// The lazily built controller client
    pub fn shared(&self) -> &Arc<SharedClient> {
        &self.shared
    }

    /// Read one JSON-RPC message per line until EOF, answering each on `writer`
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("MCP server listening on stdio");
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let parsed = std::str::from_utf8(&buf)
                .map_err(|e| e.to_string())
                .map(str::trim)
                .and_then(|line| {
                    if line.is_empty() {
                        Ok(None)
                    } else {
                        serde_json::from_str::<JsonValue>(line)
                            .map(Some)
                            .map_err(|e| e.to_string())
                    }
                });

            let response = match parsed {
                Ok(Some(incoming)) => self.handle_message(incoming).await,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Discarding malformed message: {e}");
                    Some(error_response(
                        JsonValue::Null,
                        RpcError::parse_error(format!("Parse error: {e}")),
                    ))
                }
            };

            if let Some(response) = response {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                writer.write_all(&out).await?;
                writer.flush().await?;
            }
        }

        info!("Input closed, stopping MCP server");
        Ok(())
    }

    /// Answer one message or batch. Notifications produce no response.
    pub async fn handle_message(&self, incoming: JsonValue) -> Option<JsonValue> {
        let batch = match incoming {
            JsonValue::Array(batch) => batch,
            single => return self.handle_single_message(single).await,
        };

        if batch.is_empty() {
            return Some(error_response(
                JsonValue::Null,
                RpcError::invalid_request("Batch request must not be empty"),
            ));
        }

        let mut responses = Vec::new();
        for item in batch {
            if let Some(response) = self.handle_single_message(item).await {
                responses.push(response);
            }
        }
        if responses.is_empty() {
            None
        } else {
            Some(JsonValue::Array(responses))
        }
    }

    async fn handle_single_message(&self, incoming: JsonValue) -> Option<JsonValue> {
        let Some(obj) = incoming.as_object() else {
            return Some(error_response(
                JsonValue::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        if obj.get("jsonrpc").and_then(JsonValue::as_str) != Some("2.0") {
            let id = obj.get("id").cloned().unwrap_or(JsonValue::Null);
            return Some(error_response(
                id,
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        // A message without a method is a client response; nothing to answer
        let method = obj.get("method").and_then(JsonValue::as_str)?;

        let params = obj.get("params").cloned().unwrap_or(JsonValue::Null);
        let Some(id) = obj.get("id").cloned() else {
            debug!(method, "Ignoring notification");
            return None;
        };

        Some(match self.handle_request(method, params).await {
            Ok(payload) => success_response(id, payload),
            Err(err) => error_response(id, err),
        })
    }

    async fn handle_request(
        &self,
        method: &str,
        params: JsonValue,
    ) -> std::result::Result<JsonValue, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            "resources/list" => Ok(resources_list_payload()),
            "resources/read" => self.handle_resources_read(params).await,
            "prompts/list" => Ok(prompts_list_payload()),
            "prompts/get" => self.handle_prompts_get(params).await,
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn initialize_payload(&self) -> JsonValue {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "listChanged": false },
                "prompts": { "listChanged": false }
            },
            "serverInfo": {
                "name": MCP_SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn tools_list_payload(&self) -> JsonValue {
        let tools: Vec<JsonValue> = tools::tool_definitions()
            .into_iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema,
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn handle_tools_call(
        &self,
        params: JsonValue,
    ) -> std::result::Result<JsonValue, RpcError> {
        let name = params
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;
        let arguments = params.get("arguments").cloned().unwrap_or(JsonValue::Null);

        let call =
            ToolCall::parse(name, arguments).map_err(|e| RpcError::from_tool_error(name, &e))?;
        let payload = self
            .run_tool(&call)
            .await
            .map_err(|e| RpcError::from_tool_error(name, &e))?;

        let text = serde_json::to_string_pretty(&payload)
            .map_err(|e| RpcError::internal(format!("Error executing {name}: {e}")))?;
        Ok(json!({
            "content": [{ "type": "text", "text": text }]
        }))
    }

    /// Execute a parsed call against the shared controller client
    pub async fn run_tool(&self, call: &ToolCall) -> Result<JsonValue> {
        let client = self.shared.client()?;
        tools::execute(call, &*client, &self.shared.config().site).await
    }

    async fn handle_resources_read(
        &self,
        params: JsonValue,
    ) -> std::result::Result<JsonValue, RpcError> {
        let uri = params
            .get("uri")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| RpcError::invalid_params("resources/read requires string field 'uri'"))?;
        let resource = Resource::from_uri(uri)
            .ok_or_else(|| RpcError::invalid_params(format!("Unknown resource: {uri}")))?;

        let read_error =
            |e: crate::error::Error| RpcError::internal(format!("Error reading {uri}: {e}"));
        let client = self.shared.client().map_err(read_error)?;
        let content = resource
            .read(&*client, &self.shared.config().site, Utc::now())
            .await
            .map_err(read_error)?;
        let text = serde_json::to_string_pretty(&content)
            .map_err(|e| RpcError::internal(format!("Error reading {uri}: {e}")))?;

        Ok(json!({
            "contents": [{
                "uri": uri,
                "mimeType": "application/json",
                "text": text
            }]
        }))
    }

    async fn handle_prompts_get(
        &self,
        params: JsonValue,
    ) -> std::result::Result<JsonValue, RpcError> {
        let name = params
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| RpcError::invalid_params("prompts/get requires string field 'name'"))?;
        let prompt = Prompt::from_name(name)
            .ok_or_else(|| RpcError::invalid_params(format!("Unknown prompt: {name}")))?;

        let render_error =
            |e: crate::error::Error| RpcError::internal(format!("Error rendering {name}: {e}"));
        let client = self.shared.client().map_err(render_error)?;
        let text = prompt
            .render(&*client, &self.shared.config().site, Utc::now())
            .await
            .map_err(render_error)?;

        Ok(json!({
            "description": prompt.description(),
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": text }
            }]
        }))
    }
}
