//! MCP Client Module
//!
//! Remote tool-invocation client for the Maestro MCP server.
//!
//! ## Module Structure
//!
//! - [`endpoint`]: address resolution and normalization to `.../mcp`
//! - [`session`]: one connection, its deadline, and the lazy handshake
//! - [`classify`]: reply text and failure classification heuristics
//! - [`types`]: call request/result and handshake types
//! - [`protocol`]: JSON-RPC 2.0 envelopes
//! - [`transport`]: `Transport` / `Connector` seam
//! - [`http`]: streamable HTTP transport (reqwest + SSE)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use maestro::mcp::{CallRequest, Endpoint, Operation, Session};
//! use std::time::Duration;
//!
//! let endpoint = Endpoint::resolve(None, Some("localhost:8040"))?;
//! let mut session = Session::open(endpoint, Duration::from_secs(30)).await?;
//!
//! let request = CallRequest::for_operation(Operation::RunWorkflow)
//!     .with_argument("agents", serde_json::json!([]))
//!     .with_argument("workflow", workflow_json);
//! let result = session.call(&request).await;
//! session.close().await;
//! ```

pub mod classify;
pub mod endpoint;
pub mod http;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod types;

pub use classify::{classify, classify_reply, is_unreachable};
pub use endpoint::{Endpoint, DEFAULT_PORT, DEFAULT_SERVER_ADDRESS, MCP_PATH};
pub use http::{HttpConnector, HttpTransport};
pub use session::Session;
pub use transport::{Connector, Transport, TransportFailure};
pub use types::{
    CallRequest, CallResult, ContentBlock, Implementation, Operation, Payload, ToolFailure,
    ToolReply, PROTOCOL_VERSION, TOOL_ERROR_CODE,
};
