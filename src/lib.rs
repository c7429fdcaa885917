//! Maestro - command-line client for the Maestro MCP server
//!
//! ## Module Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        COMMAND LAYER                         │
//! │  commands/  create, run, deploy, serve → one CallRequest     │
//! │  documents  multi-document YAML → JSON objects               │
//! │  runlog     ~/.maestro/logs/<workflow_id>.log                │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         MCP CLIENT                           │
//! │  mcp/       endpoint → session → lazy handshake → tools/call │
//! │             → classified CallResult                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`mcp`] | Endpoint resolution, sessions, JSON-RPC over streamable HTTP, reply classification |
//! | [`commands`] | CLI commands and their request builders |
//! | [`documents`] | YAML document loading |
//! | [`runlog`] | Workflow run records |
//! | [`config`] | Environment and `.env` configuration |
//! | [`error`] | Error types with fix suggestions |

// ═══════════════════════════════════════════════════════════════
// MCP CLIENT
// ═══════════════════════════════════════════════════════════════
pub mod mcp;

// ═══════════════════════════════════════════════════════════════
// COMMAND LAYER
// ═══════════════════════════════════════════════════════════════
pub mod commands;
pub mod documents;
pub mod runlog;

// ═══════════════════════════════════════════════════════════════
// CROSS-CUTTING - Error handling, configuration
// ═══════════════════════════════════════════════════════════════
pub mod config;
pub mod error;

// ═══════════════════════════════════════════════════════════════
// PUBLIC API RE-EXPORTS
// ═══════════════════════════════════════════════════════════════

pub use error::{FixSuggestion, MaestroError, Result};

pub use config::ClientConfig;

pub use mcp::{CallRequest, CallResult, Endpoint, Operation, Payload, Session};
