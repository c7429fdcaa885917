// The #[error] attribute from thiserror uses struct fields via string interpolation,
// but Rust's unused_assignments lint doesn't recognize this.
#![allow(unused_assignments)]

//! Maestro Error Types with Error Codes
//!
//! Error code ranges:
//! - MAESTRO-000-009: Configuration errors
//! - MAESTRO-100-109: MCP client errors (reachability, transport, handshake, invocation)
//! - MAESTRO-200-209: Document errors (YAML inputs of the CLI commands)
//! - MAESTRO-300-309: IO/serialization errors

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaestroError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// All error variants are part of the public API.
///
/// Client errors are surfaced unchanged to the calling command; the command
/// layer decides presentation and exit code.
#[derive(Error, Debug, Diagnostic)]
pub enum MaestroError {
    // ═══════════════════════════════════════════
    // CONFIG ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[MAESTRO-001] Configuration error: {reason}")]
    #[diagnostic(
        code(maestro::config_error),
        help("Set --mcp-server-uri or MAESTRO_MAESTRO_MCP_SERVER_URI")
    )]
    ConfigError { reason: String },

    // ═══════════════════════════════════════════
    // MCP CLIENT ERRORS (100-109)
    // ═══════════════════════════════════════════
    /// The failure text matched a "server not reachable" pattern.
    ///
    /// `reason` keeps the underlying text for logs; the message only names the endpoint.
    #[error("[MAESTRO-100] MCP server could not be reached at {endpoint}. Please ensure the server is running and accessible")]
    #[diagnostic(
        code(maestro::unreachable),
        help("Start the Maestro MCP server or point --mcp-server-uri at a running one")
    )]
    Unreachable { endpoint: String, reason: String },

    #[error("[MAESTRO-101] Failed to create MCP client for {endpoint}: {reason}")]
    #[diagnostic(code(maestro::transport_error))]
    TransportError { endpoint: String, reason: String },

    #[error("[MAESTRO-102] Failed to initialize MCP client for {endpoint}: {reason}")]
    #[diagnostic(
        code(maestro::handshake_error),
        help("Check that the server speaks MCP at this endpoint")
    )]
    HandshakeError { endpoint: String, reason: String },

    #[error("[MAESTRO-103] Failed to call MCP tool {tool}: {reason}")]
    #[diagnostic(code(maestro::invocation_error))]
    InvocationError { tool: String, reason: String },

    /// The server replied, but the reply text reports a failure.
    #[error("[MAESTRO-104] MCP tool {tool} returned an error: {message}")]
    #[diagnostic(code(maestro::tool_error), help("Check the MCP server logs"))]
    ToolError {
        tool: String,
        code: i64,
        message: String,
    },

    #[error("[MAESTRO-105] MCP session for {endpoint} is closed")]
    #[diagnostic(code(maestro::session_closed))]
    SessionClosed { endpoint: String },

    #[error("[MAESTRO-106] Interrupted while waiting for MCP tool {tool}")]
    #[diagnostic(code(maestro::interrupted))]
    Interrupted { tool: String },

    // ═══════════════════════════════════════════
    // DOCUMENT ERRORS (200-209)
    // ═══════════════════════════════════════════
    #[error("[MAESTRO-200] Unable to parse {path}: {reason}")]
    #[diagnostic(
        code(maestro::document_error),
        help("Check YAML syntax: indentation and quoting")
    )]
    DocumentError { path: String, reason: String },

    #[error("[MAESTRO-201] No valid YAML documents found in {path}")]
    #[diagnostic(code(maestro::empty_document))]
    EmptyDocument { path: String },

    #[error("[MAESTRO-202] Unsupported kind: {kind}")]
    #[diagnostic(code(maestro::unsupported_kind), help("Use kind: Agent or kind: MCPTool"))]
    UnsupportedKind { kind: String },

    #[error("[MAESTRO-203] Field '{field}' not found or not a string in {path}")]
    #[diagnostic(code(maestro::missing_field))]
    MissingField { field: String, path: String },

    #[error("[MAESTRO-204] Agent '{name}' not found in {path}")]
    #[diagnostic(code(maestro::agent_not_found))]
    AgentNotFound { name: String, path: String },

    // ═══════════════════════════════════════════
    // IO/SERIALIZATION ERRORS (300-309)
    // ═══════════════════════════════════════════
    #[error("[MAESTRO-300] IO error: {0}")]
    #[diagnostic(code(maestro::io_error))]
    Io(#[from] std::io::Error),

    #[error("[MAESTRO-301] JSON error: {0}")]
    #[diagnostic(code(maestro::json_error))]
    Json(#[from] serde_json::Error),
}

impl MaestroError {
    /// Get the error code (e.g., "MAESTRO-100")
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError { .. } => "MAESTRO-001",
            Self::Unreachable { .. } => "MAESTRO-100",
            Self::TransportError { .. } => "MAESTRO-101",
            Self::HandshakeError { .. } => "MAESTRO-102",
            Self::InvocationError { .. } => "MAESTRO-103",
            Self::ToolError { .. } => "MAESTRO-104",
            Self::SessionClosed { .. } => "MAESTRO-105",
            Self::Interrupted { .. } => "MAESTRO-106",
            Self::DocumentError { .. } => "MAESTRO-200",
            Self::EmptyDocument { .. } => "MAESTRO-201",
            Self::UnsupportedKind { .. } => "MAESTRO-202",
            Self::MissingField { .. } => "MAESTRO-203",
            Self::AgentNotFound { .. } => "MAESTRO-204",
            Self::Io(_) => "MAESTRO-300",
            Self::Json(_) => "MAESTRO-301",
        }
    }

    /// Check if this error means the server could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// Check if this error came from the remote tool itself.
    pub fn is_tool_error(&self) -> bool {
        matches!(self, Self::ToolError { .. })
    }
}

impl FixSuggestion for MaestroError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            MaestroError::ConfigError { .. } => {
                Some("Set --mcp-server-uri or MAESTRO_MAESTRO_MCP_SERVER_URI, or fix your .env file")
            }
            MaestroError::Unreachable { .. } => {
                Some("Start the Maestro MCP server or point --mcp-server-uri at a running one")
            }
            MaestroError::TransportError { .. } => Some("Check the MCP server URI is a valid URL"),
            MaestroError::HandshakeError { .. } => {
                Some("Check that the server speaks MCP at this endpoint")
            }
            MaestroError::InvocationError { .. } => Some("Check tool parameters and MCP server logs"),
            MaestroError::ToolError { .. } => Some("Check the MCP server logs"),
            MaestroError::SessionClosed { .. } => Some("Open a new session to retry the call"),
            MaestroError::Interrupted { .. } => None,
            MaestroError::DocumentError { .. } => Some("Check YAML syntax: indentation and quoting"),
            MaestroError::EmptyDocument { .. } => Some("Add at least one YAML document to the file"),
            MaestroError::UnsupportedKind { .. } => Some("Use kind: Agent or kind: MCPTool"),
            MaestroError::MissingField { .. } => Some("Add the missing field to the document"),
            MaestroError::AgentNotFound { .. } => {
                Some("Check --agent-name matches metadata.name of an agent")
            }
            MaestroError::Io(_) => Some("Check file path and permissions"),
            MaestroError::Json(_) => None,
        }
    }
}
