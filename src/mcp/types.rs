//! MCP Client Types
//!
//! - [`Operation`]: the fixed vocabulary of remote operations the CLI issues
//! - [`CallRequest`]: one named tool call with its argument map
//! - [`CallResult`]: classified outcome (success payload or tool failure)
//! - [`ToolReply`] / [`ContentBlock`]: the `tools/call` result as sent by the server
//! - [`InitializeParams`] / [`InitializeResult`]: the capability handshake

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MaestroError;

/// MCP protocol version declared in the handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Code attached to failures detected from reply text.
pub const TOOL_ERROR_CODE: i64 = -1;

// ═══════════════════════════════════════════════════════════════
// OPERATIONS
// ═══════════════════════════════════════════════════════════════

/// Remote operations exposed by the Maestro MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAgents,
    CreateMcpTools,
    DeployWorkflow,
    RunWorkflow,
    ServeWorkflow,
    ServeAgent,
    ServeContainerAgent,
}

impl Operation {
    /// Tool name used on the wire.
    pub fn tool_name(self) -> &'static str {
        match self {
            Self::CreateAgents => "create_agents",
            Self::CreateMcpTools => "create_mcptools",
            Self::DeployWorkflow => "deploy_workflow",
            Self::RunWorkflow => "run_workflow",
            Self::ServeWorkflow => "serve_workflow",
            Self::ServeAgent => "serve_agent",
            Self::ServeContainerAgent => "serve_container_agent",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

// ═══════════════════════════════════════════════════════════════
// REQUEST
// ═══════════════════════════════════════════════════════════════

/// A named tool call with its arguments.
///
/// Built once by a command, then handed to [`Session::call`](crate::mcp::Session::call).
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    name: String,
    arguments: Map<String, Value>,
}

impl CallRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Map::new(),
        }
    }

    pub fn for_operation(operation: Operation) -> Self {
        Self::new(operation.tool_name())
    }

    /// Add one argument.
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    /// `tools/call` params: `{"name": ..., "arguments": {...}}`.
    pub fn to_params(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "arguments": self.arguments,
        })
    }
}

// ═══════════════════════════════════════════════════════════════
// RESULT
// ═══════════════════════════════════════════════════════════════

/// Success payload of a tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Reply text decoded as JSON.
    Json(Value),
    /// Reply text that is not JSON, kept verbatim.
    Text(String),
}

impl Payload {
    /// Look up a top-level key of a JSON object payload.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Json(value) => value.get(key),
            Self::Text(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => match serde_json::to_string_pretty(value) {
                Ok(pretty) => f.write_str(&pretty),
                Err(_) => write!(f, "{value}"),
            },
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Failure reported by the server inside an otherwise successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    pub code: i64,
    pub message: String,
}

/// Classified outcome of one tool call. Exactly one side is populated.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    /// The call succeeded; `None` when the reply had no content.
    Success(Option<Payload>),
    Failure(ToolFailure),
}

impl CallResult {
    pub fn success(payload: Payload) -> Self {
        Self::Success(Some(payload))
    }

    /// Success without content.
    pub fn empty() -> Self {
        Self::Success(None)
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self::Failure(ToolFailure {
            code,
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Success(payload) => payload.as_ref(),
            Self::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&ToolFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Turn a tool failure into `MaestroError::ToolError` for `tool`.
    pub fn into_result(self, tool: &str) -> Result<Option<Payload>, MaestroError> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(ToolFailure { code, message }) => Err(MaestroError::ToolError {
                tool: tool.to_string(),
                code,
                message,
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// WIRE SHAPES
// ═══════════════════════════════════════════════════════════════

/// Content block in a `tools/call` result.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ContentBlock {
    /// "text", "image", "resource", ...
    #[serde(rename = "type")]
    pub content_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: Some(text.into()),
            mime_type: None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.content_type == "text"
    }
}

/// `tools/call` result as sent by the server.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ToolReply {
    #[serde(default)]
    pub content: Vec<ContentBlock>,

    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ToolReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    /// Text of the first content block, when that block is text.
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .first()
            .filter(|block| block.is_text())
            .and_then(|block| block.text.as_deref())
    }
}

/// Name and version exchanged during the handshake.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Implementation {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// `initialize` params: protocol version and an empty capability set.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: Map<String, Value>,
    pub client_info: Implementation,
}

impl Default for InitializeParams {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: Map::new(),
            client_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// `initialize` result. Only the fields the client logs are kept.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub server_info: Option<Implementation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_operation_wire_names() {
        assert_eq!(Operation::CreateAgents.tool_name(), "create_agents");
        assert_eq!(Operation::RunWorkflow.to_string(), "run_workflow");
        assert_eq!(
            Operation::ServeContainerAgent.tool_name(),
            "serve_container_agent"
        );
    }

    #[test]
    fn test_call_request_params() {
        let request = CallRequest::for_operation(Operation::ServeWorkflow)
            .with_argument("host", "127.0.0.1")
            .with_argument("port", 8000);

        assert_eq!(
            request.to_params(),
            json!({
                "name": "serve_workflow",
                "arguments": {"host": "127.0.0.1", "port": 8000}
            })
        );
    }

    #[test]
    fn test_call_result_into_result_maps_failure() {
        let err = CallResult::failure(TOOL_ERROR_CODE, "Error: boom")
            .into_result("run_workflow")
            .unwrap_err();

        match err {
            MaestroError::ToolError {
                tool,
                code,
                message,
            } => {
                assert_eq!(tool, "run_workflow");
                assert_eq!(code, -1);
                assert_eq!(message, "Error: boom");
            }
            other => panic!("Expected ToolError, got: {other:?}"),
        }
    }

    #[test]
    fn test_payload_get_only_on_json() {
        let json = Payload::Json(json!({"final_prompt": "ok"}));
        let text = Payload::Text("final_prompt".to_string());

        assert_eq!(json.get("final_prompt"), Some(&json!("ok")));
        assert_eq!(text.get("final_prompt"), None);
    }

    #[test]
    fn test_tool_reply_deserializes_is_error() {
        let reply: ToolReply = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "bad"}],
            "isError": true
        }))
        .unwrap();

        assert!(reply.is_error);
        assert_eq!(reply.first_text(), Some("bad"));
    }

    #[test]
    fn test_first_text_ignores_non_text_first_block() {
        let reply: ToolReply = serde_json::from_value(json!({
            "content": [{"type": "image", "data": "AAAA", "mimeType": "image/png"}]
        }))
        .unwrap();

        assert_eq!(reply.first_text(), None);
    }

    #[test]
    fn test_initialize_params_shape() {
        let params = serde_json::to_value(InitializeParams::default()).unwrap();

        assert_eq!(params["protocolVersion"], "2024-11-05");
        assert_eq!(params["capabilities"], json!({}));
        assert_eq!(params["clientInfo"]["name"], "maestro");
    }
}
