//! JSON-RPC 2.0 envelope types used on the wire to the MCP server.
//!
//! ```json
//! // Request
//! {"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {...}}
//!
//! // Notification (no id, no reply)
//! {"jsonrpc": "2.0", "method": "notifications/initialized"}
//!
//! // Reply
//! {"jsonrpc": "2.0", "id": 2, "result": {...}}
//! {"jsonrpc": "2.0", "id": 2, "error": {"code": -32602, "message": "..."}}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Method name of the capability handshake request.
pub const METHOD_INITIALIZE: &str = "initialize";

/// Notification sent once the handshake reply has been received.
pub const METHOD_INITIALIZED: &str = "notifications/initialized";

/// Method name of a tool invocation.
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// JSON-RPC 2.0 Request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// Protocol version - always "2.0"
    pub jsonrpc: String,

    /// Request ID - used to correlate the reply
    pub id: u64,

    /// Method name (e.g., "initialize", "tools/call")
    pub method: String,

    /// Method parameters
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 Notification.
///
/// A request without an ID; the server does not reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,

    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params: None,
        }
    }
}

/// JSON-RPC 2.0 message received from the server.
///
/// Replies carry `id` plus `result` or `error`. Server-initiated requests and
/// notifications carry `method` and are not replies to us.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,

    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub result: Option<Value>,

    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Whether this message is the reply to request `id`.
    pub fn is_reply_to(&self, id: u64) -> bool {
        self.method.is_none() && self.id == Some(id)
    }

    /// Split the reply into its result or its error.
    ///
    /// A reply with neither field yields `Value::Null`.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// JSON-RPC 2.0 Error object.
///
/// | Code | Message |
/// |------|---------|
/// | -32700 | Parse error |
/// | -32600 | Invalid Request |
/// | -32601 | Method not found |
/// | -32602 | Invalid params |
/// | -32603 | Internal error |
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i64,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}
