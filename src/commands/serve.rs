//! `maestro serve agent` and `maestro serve workflow`
//!
//! Agents with `spec.framework: container` are served from their image;
//! every other agent, and every workflow, is served from its raw YAML.

use std::path::{Path, PathBuf};

use crate::commands::CommandContext;
use crate::documents::{load_documents, Document};
use crate::error::{MaestroError, Result};
use crate::mcp::{CallRequest, Connector, Operation};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Framework value of agents served from a container image.
pub const CONTAINER_FRAMEWORK: &str = "container";

#[derive(Debug, Clone)]
pub struct ServeAgentArgs {
    pub agents_file: PathBuf,
    pub agent_name: Option<String>,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ServeWorkflowArgs {
    pub agents_file: PathBuf,
    pub workflow_file: PathBuf,
    pub host: String,
    pub port: u16,
}

/// The agent named `name`, or the first one.
pub fn select_agent<'a>(
    agents: &'a [Document],
    name: Option<&str>,
    path: &Path,
) -> Result<&'a Document> {
    let found = match name.filter(|name| !name.is_empty()) {
        Some(name) => agents.iter().find(|agent| agent.name() == Some(name)),
        None => agents.first(),
    };

    found.ok_or_else(|| MaestroError::AgentNotFound {
        name: name.unwrap_or_default().to_string(),
        path: path.display().to_string(),
    })
}

/// `serve_container_agent {image_url, app_name}` from `spec.image` and `metadata.name`.
pub fn container_agent_request(agent: &Document) -> CallRequest {
    CallRequest::for_operation(Operation::ServeContainerAgent)
        .with_argument("image_url", agent.spec_str("image").unwrap_or_default())
        .with_argument("app_name", agent.name().unwrap_or_default())
}

/// `serve_agent {agent, agent_name, host, port}`
pub fn agent_request(agents_yaml: &str, agent_name: Option<&str>, host: &str, port: u16) -> CallRequest {
    CallRequest::for_operation(Operation::ServeAgent)
        .with_argument("agent", agents_yaml)
        .with_argument("agent_name", agent_name.unwrap_or_default())
        .with_argument("host", host)
        .with_argument("port", port)
}

/// `serve_workflow {agents, workflow, host, port}`
pub fn workflow_request(agents_yaml: &str, workflow_yaml: &str, host: &str, port: u16) -> CallRequest {
    CallRequest::for_operation(Operation::ServeWorkflow)
        .with_argument("agents", agents_yaml)
        .with_argument("workflow", workflow_yaml)
        .with_argument("host", host)
        .with_argument("port", port)
}

pub async fn execute_agent<C: Connector>(ctx: &CommandContext<C>, args: &ServeAgentArgs) -> Result<()> {
    let agents = load_documents(&args.agents_file)?;
    let agent = select_agent(&agents, args.agent_name.as_deref(), &args.agents_file)?;

    let request = if agent.spec_str("framework") == Some(CONTAINER_FRAMEWORK) {
        container_agent_request(agent)
    } else {
        let agents_yaml = tokio::fs::read_to_string(&args.agents_file).await?;
        agent_request(&agents_yaml, args.agent_name.as_deref(), &args.host, args.port)
    };

    let payload = ctx.invoke(request).await?;
    ctx.report(payload.as_ref());
    ctx.console().ok("Agent server started successfully");
    Ok(())
}

pub async fn execute_workflow<C: Connector>(
    ctx: &CommandContext<C>,
    args: &ServeWorkflowArgs,
) -> Result<()> {
    ctx.console()
        .info(&format!("Serving workflow at {}:{}", args.host, args.port));

    let agents_yaml = tokio::fs::read_to_string(&args.agents_file).await?;
    let workflow_yaml = tokio::fs::read_to_string(&args.workflow_file).await?;

    let payload = ctx
        .invoke(workflow_request(&agents_yaml, &workflow_yaml, &args.host, args.port))
        .await?;
    ctx.report(payload.as_ref());
    ctx.console().ok("Workflow server started successfully");
    Ok(())
}
