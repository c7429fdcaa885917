//! Shared test fixtures: an in-memory MCP server behind the `Connector` seam.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use maestro::mcp::protocol::{JsonRpcError, JsonRpcNotification, JsonRpcRequest};
use maestro::mcp::{Connector, Endpoint, Transport, TransportFailure};
use serde_json::{json, Value};

/// What the fake server answers.
#[derive(Debug, Clone)]
pub struct Script {
    /// Fail `connect` with this network error text.
    pub connect_failure: Option<String>,
    /// Fail `initialize` with this JSON-RPC error.
    pub initialize_error: Option<JsonRpcError>,
    /// Answer `initialize` with this result instead of a well-formed one.
    pub initialize_result: Option<Value>,
    /// Fail `tools/call` with this failure.
    pub call_failure: Option<String>,
    /// Result of `tools/call`.
    pub tool_result: Value,
    /// Delay before answering `tools/call`.
    pub call_delay: Option<Duration>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            connect_failure: None,
            initialize_error: None,
            initialize_result: None,
            call_failure: None,
            tool_result: json!({"content": []}),
            call_delay: None,
        }
    }
}

impl Script {
    /// `tools/call` answers with one text block.
    pub fn replying_text(text: &str) -> Self {
        Self {
            tool_result: json!({"content": [{"type": "text", "text": text}]}),
            ..Self::default()
        }
    }
}

/// Every message the fake server saw, in order, plus the tool arguments.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
    arguments: Arc<Mutex<Vec<Value>>>,
}

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Arguments of every `tools/call` that was answered.
    pub fn arguments(&self) -> Vec<Value> {
        self.arguments.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| e.as_str() == entry).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    pub script: Script,
    pub journal: Journal,
}

impl ScriptedConnector {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            journal: Journal::default(),
        }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Transport = ScriptedTransport;

    async fn connect(&self, _endpoint: &Endpoint) -> Result<ScriptedTransport, TransportFailure> {
        self.journal.push("connect");
        if let Some(text) = &self.script.connect_failure {
            return Err(TransportFailure::Network(text.clone()));
        }
        Ok(ScriptedTransport {
            script: self.script.clone(),
            journal: self.journal.clone(),
        })
    }
}

pub struct ScriptedTransport {
    script: Script,
    journal: Journal,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&mut self, request: JsonRpcRequest) -> Result<Value, TransportFailure> {
        self.journal.push(request.method.clone());

        match request.method.as_str() {
            "initialize" => match &self.script.initialize_error {
                Some(error) => Err(TransportFailure::Rpc(error.clone())),
                None if self.script.initialize_result.is_some() => {
                    Ok(self.script.initialize_result.clone().unwrap_or_default())
                }
                None => Ok(json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {"tools": {}},
                    "serverInfo": {"name": "maestro-mcp", "version": "0.3.0"}
                })),
            },
            "tools/call" => {
                if let Some(delay) = self.script.call_delay {
                    tokio::time::sleep(delay).await;
                }
                if let Some(text) = &self.script.call_failure {
                    return Err(TransportFailure::Network(text.clone()));
                }
                self.journal
                    .push(format!("tool:{}", request.params["name"].as_str().unwrap_or("")));
                self.journal.arguments.lock().unwrap().push(request.params["arguments"].clone());
                Ok(self.script.tool_result.clone())
            }
            other => Err(TransportFailure::Rpc(JsonRpcError {
                code: -32601,
                message: format!("method not found: {other}"),
                data: None,
            })),
        }
    }

    async fn notify(&mut self, notification: JsonRpcNotification) -> Result<(), TransportFailure> {
        self.journal.push(notification.method);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportFailure> {
        self.journal.push("close");
        Ok(())
    }
}

pub fn endpoint() -> Endpoint {
    Endpoint::normalize("localhost:8040")
}
