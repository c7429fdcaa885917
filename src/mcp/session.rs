//! MCP Session
//!
//! One client-owned connection to the Maestro MCP server plus its handshake
//! and deadline state.
//!
//! ## Lifecycle
//!
//! ```text
//! Session::open(endpoint, timeout)     deadline fixed, transport established
//!     │
//!     ├── call(request)                first call: initialize + notifications/initialized
//!     │                                then tools/call
//!     ├── call(request)                tools/call only
//!     │
//!     └── close()                      deadline cancelled, transport closed (idempotent)
//! ```
//!
//! Every operation is bounded by the single deadline fixed at open time. An
//! expired deadline surfaces as `MaestroError::Unreachable`; the session is
//! then spent and the caller opens a new one to retry.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{MaestroError, Result};
use crate::mcp::classify::{classify_reply, is_unreachable};
use crate::mcp::endpoint::Endpoint;
use crate::mcp::http::{HttpConnector, HttpTransport};
use crate::mcp::protocol::{
    JsonRpcNotification, JsonRpcRequest, METHOD_INITIALIZE, METHOD_INITIALIZED,
    METHOD_TOOLS_CALL,
};
use crate::mcp::transport::{Connector, Transport, TransportFailure};
use crate::mcp::types::{
    CallRequest, CallResult, Implementation, InitializeParams, InitializeResult, ToolReply,
};

/// Upper bound for releasing the transport in [`Session::close`].
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Where a transport failure happened; picks the error variant.
#[derive(Debug, Clone, Copy)]
enum Stage<'a> {
    Open,
    Handshake,
    Invocation(&'a str),
}

/// A session with one MCP server.
///
/// Not shared: `call` takes `&mut self`, so at most one call is in flight.
pub struct Session<T: Transport = HttpTransport> {
    endpoint: Endpoint,
    transport: Option<T>,
    timeout: Duration,
    deadline: Instant,
    cancel: CancellationToken,
    initialized: bool,
    server_info: Option<Implementation>,
    next_id: u64,
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("connected", &self.transport.is_some())
            .field("initialized", &self.initialized)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Session<HttpTransport> {
    /// Open a streamable HTTP session.
    ///
    /// # Errors
    ///
    /// Returns `MaestroError::Unreachable` or `MaestroError::TransportError`
    /// if the transport cannot be established.
    pub async fn open(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        Self::open_with(&HttpConnector::new(), endpoint, timeout).await
    }
}

impl<T: Transport> Session<T> {
    /// Create a session that is not connected yet.
    ///
    /// The deadline starts now.
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Self {
        Self {
            endpoint,
            transport: None,
            timeout,
            deadline: Instant::now() + timeout,
            cancel: CancellationToken::new(),
            initialized: false,
            server_info: None,
            next_id: 1,
        }
    }

    /// Create a session and establish its transport through `connector`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::connect`].
    pub async fn open_with<C>(connector: &C, endpoint: Endpoint, timeout: Duration) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        let mut session = Self::new(endpoint, timeout);
        session.connect(connector).await?;
        Ok(session)
    }

    /// Establish the transport. The handshake is deferred to the first call.
    ///
    /// On failure the deadline is released immediately.
    ///
    /// # Errors
    ///
    /// Returns `MaestroError::Unreachable` when the failure looks like a
    /// reachability problem, `MaestroError::TransportError` otherwise, and
    /// `MaestroError::SessionClosed` after [`Session::close`].
    pub async fn connect<C>(&mut self, connector: &C) -> Result<()>
    where
        C: Connector<Transport = T>,
    {
        if self.cancel.is_cancelled() {
            return Err(self.closed());
        }
        if self.transport.is_some() {
            return Ok(());
        }

        tracing::debug!(endpoint = %self.endpoint, timeout = ?self.timeout, "opening MCP session");

        let connecting = connector.connect(&self.endpoint);
        match within_deadline(self.deadline, self.timeout, &self.cancel, connecting).await {
            Ok(transport) => {
                self.transport = Some(transport);
                Ok(())
            }
            Err(failure) => {
                self.cancel.cancel();
                Err(self.failure_to_error(failure, Stage::Open))
            }
        }
    }

    /// Invoke one named operation and classify its reply.
    ///
    /// Performs the capability handshake first if this session has not done so.
    ///
    /// # Errors
    ///
    /// - `MaestroError::Unreachable` if the server cannot be reached or the deadline passed
    /// - `MaestroError::HandshakeError` if the handshake fails otherwise
    /// - `MaestroError::InvocationError` if the tool call fails otherwise
    /// - `MaestroError::Interrupted` if the session was cancelled mid-call
    /// - `MaestroError::SessionClosed` if the session is not connected
    ///
    /// A reply reporting a tool failure is not an error here: it comes back as
    /// [`CallResult::Failure`].
    pub async fn call(&mut self, request: &CallRequest) -> Result<CallResult> {
        if self.transport.is_none() || self.cancel.is_cancelled() {
            return Err(self.closed());
        }

        self.ensure_initialized().await?;

        let id = self.next_request_id();
        let rpc = JsonRpcRequest::new(id, METHOD_TOOLS_CALL, request.to_params());

        tracing::debug!(endpoint = %self.endpoint, tool = request.name(), "calling MCP tool");

        let result = self
            .round_trip(rpc)
            .await
            .map_err(|failure| self.failure_to_error(failure, Stage::Invocation(request.name())))?;

        let reply = if result.is_null() {
            ToolReply::default()
        } else {
            serde_json::from_value::<ToolReply>(result).map_err(|e| {
                MaestroError::InvocationError {
                    tool: request.name().to_string(),
                    reason: format!("invalid tool result: {e}"),
                }
            })?
        };

        let outcome = classify_reply(&reply);
        tracing::debug!(
            tool = request.name(),
            success = outcome.is_success(),
            "MCP tool call finished"
        );
        Ok(outcome)
    }

    /// Cancel the deadline and close the transport.
    ///
    /// Idempotent and infallible; transport close failures are only logged.
    pub async fn close(&mut self) {
        self.cancel.cancel();
        self.initialized = false;

        let Some(mut transport) = self.transport.take() else {
            return;
        };

        match tokio::time::timeout(CLOSE_TIMEOUT, transport.close()).await {
            Ok(Ok(())) => tracing::debug!(endpoint = %self.endpoint, "MCP session closed"),
            Ok(Err(failure)) => {
                tracing::debug!(endpoint = %self.endpoint, %failure, "MCP session close failed")
            }
            Err(_) => tracing::debug!(endpoint = %self.endpoint, "MCP session close timed out"),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Whether the handshake has completed on this session.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Server name/version reported by the handshake.
    pub fn server_info(&self) -> Option<&Implementation> {
        self.server_info.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time left before the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Token that aborts the in-flight operation when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ═══════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════

    async fn ensure_initialized(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let id = self.next_request_id();
        let params = serde_json::to_value(InitializeParams::default())?;
        let result = self
            .round_trip(JsonRpcRequest::new(id, METHOD_INITIALIZE, params))
            .await
            .map_err(|failure| self.failure_to_error(failure, Stage::Handshake))?;

        let info = if result.is_null() {
            InitializeResult::default()
        } else {
            serde_json::from_value::<InitializeResult>(result).map_err(|e| {
                MaestroError::HandshakeError {
                    endpoint: self.endpoint.to_string(),
                    reason: format!("invalid initialize result: {e}"),
                }
            })?
        };

        self.send_notification(JsonRpcNotification::new(METHOD_INITIALIZED))
            .await
            .map_err(|failure| self.failure_to_error(failure, Stage::Handshake))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            protocol_version = info.protocol_version.as_deref().unwrap_or("unknown"),
            server = info.server_info.as_ref().map(|s| s.name.as_str()).unwrap_or("unknown"),
            "MCP handshake complete"
        );

        self.server_info = info.server_info;
        self.initialized = true;
        Ok(())
    }

    async fn round_trip(&mut self, request: JsonRpcRequest) -> std::result::Result<Value, TransportFailure> {
        let transport = self.transport.as_mut().ok_or(TransportFailure::Cancelled)?;
        within_deadline(self.deadline, self.timeout, &self.cancel, transport.request(request)).await
    }

    async fn send_notification(
        &mut self,
        notification: JsonRpcNotification,
    ) -> std::result::Result<(), TransportFailure> {
        let transport = self.transport.as_mut().ok_or(TransportFailure::Cancelled)?;
        within_deadline(self.deadline, self.timeout, &self.cancel, transport.notify(notification))
            .await
    }

    fn next_request_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn closed(&self) -> MaestroError {
        MaestroError::SessionClosed {
            endpoint: self.endpoint.to_string(),
        }
    }

    fn failure_to_error(&self, failure: TransportFailure, stage: Stage<'_>) -> MaestroError {
        let endpoint = self.endpoint.to_string();

        if matches!(failure, TransportFailure::Cancelled) {
            let tool = match stage {
                Stage::Invocation(tool) => tool,
                Stage::Open | Stage::Handshake => METHOD_INITIALIZE,
            };
            return MaestroError::Interrupted {
                tool: tool.to_string(),
            };
        }

        let reason = failure.to_string();
        if is_unreachable(&reason) {
            tracing::debug!(%endpoint, %reason, "MCP server unreachable");
            return MaestroError::Unreachable { endpoint, reason };
        }

        match stage {
            Stage::Open => MaestroError::TransportError { endpoint, reason },
            Stage::Handshake => MaestroError::HandshakeError { endpoint, reason },
            Stage::Invocation(tool) => MaestroError::InvocationError {
                tool: tool.to_string(),
                reason,
            },
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        // The transport is dropped with the session; only the deadline needs releasing.
        self.cancel.cancel();
    }
}

/// Run `operation` unless the deadline passes or the token is cancelled first.
async fn within_deadline<O>(
    deadline: Instant,
    timeout: Duration,
    cancel: &CancellationToken,
    operation: impl Future<Output = std::result::Result<O, TransportFailure>>,
) -> std::result::Result<O, TransportFailure> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransportFailure::Cancelled),
        outcome = tokio::time::timeout_at(deadline, operation) => {
            outcome.unwrap_or(Err(TransportFailure::DeadlineExceeded(timeout)))
        }
    }
}
