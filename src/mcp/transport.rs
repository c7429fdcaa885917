//! Transport seam between a [`Session`](crate::mcp::Session) and the wire.
//!
//! A [`Connector`] establishes a [`Transport`] to an endpoint; the transport
//! carries JSON-RPC requests and notifications. The HTTP implementation lives
//! in [`crate::mcp::http`]; tests drive sessions with in-memory transports.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::mcp::endpoint::Endpoint;
use crate::mcp::protocol::{JsonRpcError, JsonRpcNotification, JsonRpcRequest};

/// Failure raised below the session.
///
/// The display text feeds the reachability heuristic, so network failures
/// keep their full cause chain.
#[derive(Debug, Error)]
pub enum TransportFailure {
    /// The endpoint is not a usable URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// Network-level failure (connect, DNS, read/write).
    #[error("{0}")]
    Network(String),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The server replied with a JSON-RPC error object.
    #[error(transparent)]
    Rpc(#[from] JsonRpcError),

    /// The reply could not be understood.
    #[error("unexpected reply: {0}")]
    Protocol(String),

    /// The session deadline passed before the operation finished.
    #[error("context deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// The session was cancelled while the operation was in flight.
    #[error("operation cancelled")]
    Cancelled,
}

impl TransportFailure {
    /// Build a network failure from any error, keeping its source chain.
    pub fn network(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut text = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            if !text.contains(&cause_text) {
                text.push_str(": ");
                text.push_str(&cause_text);
            }
            source = cause.source();
        }
        Self::Network(text)
    }
}

/// One established connection to an MCP server.
#[async_trait]
pub trait Transport: Send {
    /// Send a request and wait for its reply's `result`.
    async fn request(&mut self, request: JsonRpcRequest) -> Result<Value, TransportFailure>;

    /// Send a notification; no reply is expected.
    async fn notify(&mut self, notification: JsonRpcNotification)
        -> Result<(), TransportFailure>;

    /// Release the connection. Called at most once per transport.
    async fn close(&mut self) -> Result<(), TransportFailure>;
}

/// Factory for transports.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Transport, TransportFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_network_failure_keeps_cause_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused");
        let failure = TransportFailure::network(&Outer(inner));

        assert_eq!(
            failure.to_string(),
            "error sending request: Connection refused"
        );
    }

    #[test]
    fn test_deadline_text_matches_heuristic() {
        let failure = TransportFailure::DeadlineExceeded(Duration::from_secs(5));

        assert!(crate::mcp::classify::is_unreachable(&failure.to_string()));
    }
}
