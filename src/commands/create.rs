//! `maestro create AGENTS_FILE`
//!
//! The `kind` of the first document decides what gets created; every
//! document in the file is sent along.

use std::path::Path;

use crate::commands::CommandContext;
use crate::documents::{load_documents, to_json_strings, Document};
use crate::error::{MaestroError, Result};
use crate::mcp::{CallRequest, Connector, Operation};

/// Kinds `create` knows how to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateKind {
    Agent,
    McpTool,
}

impl CreateKind {
    /// Kind of the first document.
    pub fn detect(documents: &[Document], path: &Path) -> Result<Self> {
        let first = documents.first().ok_or_else(|| MaestroError::EmptyDocument {
            path: path.display().to_string(),
        })?;

        match first.kind() {
            Some("Agent") => Ok(Self::Agent),
            Some("MCPTool") => Ok(Self::McpTool),
            Some(other) => Err(MaestroError::UnsupportedKind {
                kind: other.to_string(),
            }),
            None => Err(MaestroError::MissingField {
                field: "kind".to_string(),
                path: path.display().to_string(),
            }),
        }
    }

    pub fn operation(self) -> Operation {
        match self {
            Self::Agent => Operation::CreateAgents,
            Self::McpTool => Operation::CreateMcpTools,
        }
    }

    /// Argument key holding the documents.
    pub fn argument_key(self) -> &'static str {
        match self {
            Self::Agent => "agents",
            Self::McpTool => "mcptools",
        }
    }
}

/// `create_agents {agents: [...]}` or `create_mcptools {mcptools: [...]}`.
pub fn create_request(kind: CreateKind, documents: &[Document]) -> Result<CallRequest> {
    let json = to_json_strings(documents)?;
    Ok(CallRequest::for_operation(kind.operation()).with_argument(kind.argument_key(), json))
}

pub async fn execute<C: Connector>(ctx: &CommandContext<C>, agents_file: &Path) -> Result<()> {
    let documents = load_documents(agents_file)?;
    let kind = CreateKind::detect(&documents, agents_file)?;

    match kind {
        CreateKind::Agent => ctx.console().ok("Creating agents from YAML configuration"),
        CreateKind::McpTool => ctx.console().ok("Creating MCP tools from YAML configuration"),
    }

    let request = create_request(kind, &documents)?;
    let payload = ctx.invoke(request).await?;
    ctx.report(payload.as_ref());
    Ok(())
}
