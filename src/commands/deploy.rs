//! `maestro deploy AGENTS_FILE WORKFLOW_FILE [ENV...]`
//!
//! Both files are parsed to catch YAML errors early, then sent as raw text.

use std::fmt;
use std::path::PathBuf;

use crate::commands::CommandContext;
use crate::documents::load_documents;
use crate::error::Result;
use crate::mcp::{CallRequest, Connector, Operation};

/// Default of `--url`.
pub const DEFAULT_DEPLOY_URL: &str = "127.0.0.1:5000";

/// Where the workflow gets deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeployTarget {
    Docker,
    Kubernetes,
    #[default]
    Streamlit,
}

impl DeployTarget {
    /// `--docker` wins over `--k8s`/`--kubernetes`; Streamlit otherwise.
    pub fn from_flags(docker: bool, kubernetes: bool) -> Self {
        if docker {
            Self::Docker
        } else if kubernetes {
            Self::Kubernetes
        } else {
            Self::Streamlit
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Kubernetes => "kubernetes",
            Self::Streamlit => "streamlit",
        }
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DeployArgs {
    pub agents_file: PathBuf,
    pub workflow_file: PathBuf,
    /// `KEY=VALUE` pairs passed to the deployment
    pub env: Vec<String>,
    pub target: DeployTarget,
    pub auto_prompt: bool,
    pub url: String,
}

/// Space-joined env pairs, plus ` AUTO_RUN=true` with `--auto-prompt`.
pub fn deploy_env(env: &[String], auto_prompt: bool) -> String {
    let mut joined = env.join(" ");
    if auto_prompt {
        joined.push_str(" AUTO_RUN=true");
    }
    joined
}

/// `deploy_workflow {agents, workflow, target, env}`
pub fn deploy_request(agents: &str, workflow: &str, target: DeployTarget, env: &str) -> CallRequest {
    CallRequest::for_operation(Operation::DeployWorkflow)
        .with_argument("agents", agents)
        .with_argument("workflow", workflow)
        .with_argument("target", target.as_str())
        .with_argument("env", env)
}

pub async fn execute<C: Connector>(ctx: &CommandContext<C>, args: &DeployArgs) -> Result<()> {
    load_documents(&args.agents_file)?;
    load_documents(&args.workflow_file)?;

    let env = deploy_env(&args.env, args.auto_prompt);

    ctx.console()
        .ok(&format!("Deploying workflow to {}", args.target));
    ctx.console().verbose(&format!("Deployment URL: {}", args.url));

    let agents = tokio::fs::read_to_string(&args.agents_file).await?;
    let workflow = tokio::fs::read_to_string(&args.workflow_file).await?;

    let payload = ctx
        .invoke(deploy_request(&agents, &workflow, args.target, &env))
        .await?;
    ctx.report(payload.as_ref());
    Ok(())
}
