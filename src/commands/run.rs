//! `maestro run [AGENTS_FILE] WORKFLOW_FILE [--prompt]`

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::commands::CommandContext;
use crate::documents::{load_documents, to_json_strings, Document};
use crate::error::Result;
use crate::mcp::{CallRequest, Connector, Operation, Payload};
use crate::runlog::{generate_workflow_id, models_used, RunLogger, RunStatus, WorkflowRun};

/// Agents file looked up next to the workflow when none is given.
pub const DEFAULT_AGENTS_FILE: &str = "agents.yaml";

#[derive(Debug, Clone)]
pub struct RunArgs {
    pub agents_file: Option<PathBuf>,
    pub workflow_file: PathBuf,
    /// Read `spec.template.prompt` from stdin
    pub prompt: bool,
}

impl RunArgs {
    /// One positional is the workflow; two are agents then workflow.
    pub fn from_positionals(first: PathBuf, second: Option<PathBuf>) -> Self {
        match second {
            Some(workflow_file) => Self {
                agents_file: Some(first),
                workflow_file,
                prompt: false,
            },
            None => Self {
                agents_file: None,
                workflow_file: first,
                prompt: false,
            },
        }
    }
}

/// Agents file to load, if any.
///
/// An explicit path wins (the literal `None` counts as absent); otherwise
/// `agents.yaml` next to the workflow is used when it exists.
pub fn agents_file_for(explicit: Option<&Path>, workflow_file: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit.filter(|path| path.as_os_str() != "None") {
        return Some(path.to_path_buf());
    }

    let inferred = workflow_file
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_AGENTS_FILE);
    inferred.is_file().then_some(inferred)
}

/// `run_workflow {agents: [...], workflow: "..."}`
pub fn run_request(agents: &[Document], workflow: &Document) -> Result<CallRequest> {
    Ok(CallRequest::for_operation(Operation::RunWorkflow)
        .with_argument("agents", to_json_strings(agents)?)
        .with_argument("workflow", workflow.to_json_string()?))
}

/// `final_prompt` of a JSON result, else empty.
pub fn workflow_output(payload: Option<&Payload>) -> String {
    payload
        .and_then(|payload| payload.get("final_prompt"))
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}

pub async fn execute<C: Connector>(
    ctx: &CommandContext<C>,
    args: &RunArgs,
    logger: &RunLogger,
) -> Result<()> {
    let workflow_id = generate_workflow_id();

    let mut workflow = load_documents(&args.workflow_file)?.remove(0);

    let agents_file = agents_file_for(args.agents_file.as_deref(), &args.workflow_file);
    let agents = match &agents_file {
        Some(path) => {
            let agents = load_documents(path)?;
            if args.agents_file.is_none() {
                ctx.console()
                    .info(&format!("[INFO] Auto-loaded agents.yaml from: {}", path.display()));
            }
            agents
        }
        None => {
            ctx.console()
                .warn("No agents.yaml path provided or found, skipping custom_agent label handling");
            Vec::new()
        }
    };

    if args.prompt {
        let prompt = ctx.console().read_input("Enter your prompt: ").await?;
        workflow.set_prompt(prompt);
    }

    ctx.console().ok("Running workflow");

    let request = run_request(&agents, &workflow)?;
    let start_time = Utc::now();
    let outcome = ctx.invoke(request).await;
    let end_time = Utc::now();

    let mut run = WorkflowRun::new(&workflow_id, start_time);
    let result = match outcome {
        Ok(payload) => {
            ctx.report(payload.as_ref());
            run.workflow_name = workflow.name().unwrap_or_default().to_string();
            run.prompt = workflow.prompt().unwrap_or_default().to_string();
            run.output = workflow_output(payload.as_ref());
            run.models_used = models_used(&agents);
            run = run.finish(RunStatus::Success, end_time);
            Ok(())
        }
        Err(e) => {
            run.workflow_name = "UNKNOWN".to_string();
            run = run.finish(RunStatus::Error, end_time);
            Err(e)
        }
    };

    match logger.record(&run) {
        Ok(path) => tracing::debug!(path = %path.display(), "recorded workflow run"),
        Err(e) => ctx
            .console()
            .warn(&format!("Could not write run log for {workflow_id}: {e}")),
    }
    let status = match run.status {
        RunStatus::Success => "success",
        RunStatus::Error => "error",
    };
    ctx.console()
        .ok(&format!("Workflow {workflow_id} completed with status: {status}"));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use crate::documents::parse_documents;

    #[test]
    fn test_single_positional_is_workflow() {
        let args = RunArgs::from_positionals(PathBuf::from("workflow.yaml"), None);

        assert_eq!(args.agents_file, None);
        assert_eq!(args.workflow_file, PathBuf::from("workflow.yaml"));
    }

    #[test]
    fn test_two_positionals_are_agents_then_workflow() {
        let args = RunArgs::from_positionals(
            PathBuf::from("agents.yaml"),
            Some(PathBuf::from("workflow.yaml")),
        );

        assert_eq!(args.agents_file, Some(PathBuf::from("agents.yaml")));
        assert_eq!(args.workflow_file, PathBuf::from("workflow.yaml"));
    }

    #[test]
    fn test_agents_file_inferred_next_to_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = dir.path().join("workflow.yaml");
        std::fs::write(&workflow, "kind: Workflow\n").unwrap();

        assert_eq!(agents_file_for(None, &workflow), None);

        std::fs::write(dir.path().join("agents.yaml"), "kind: Agent\n").unwrap();
        assert_eq!(
            agents_file_for(None, &workflow),
            Some(dir.path().join("agents.yaml"))
        );
    }

    #[test]
    fn test_literal_none_counts_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = dir.path().join("workflow.yaml");

        assert_eq!(agents_file_for(Some(Path::new("None")), &workflow), None);
    }

    #[test]
    fn test_run_request_shape() {
        let agents = parse_documents("kind: Agent\nmetadata:\n  name: a\n", Path::new("/w/agents.yaml")).unwrap();
        let workflow = parse_documents("kind: Workflow\nmetadata:\n  name: wf\n", Path::new("/w/workflow.yaml"))
            .unwrap()
            .remove(0);

        let request = run_request(&agents, &workflow).unwrap();

        assert_eq!(request.name(), "run_workflow");
        assert_eq!(request.arguments()["agents"].as_array().unwrap().len(), 1);
        let sent: Value = serde_json::from_str(request.arguments()["workflow"].as_str().unwrap()).unwrap();
        assert_eq!(sent["metadata"]["name"], "wf");
        assert_eq!(sent["source_file"], "/w/workflow.yaml");
    }

    #[test]
    fn test_workflow_output_reads_final_prompt() {
        let json = Payload::Json(json!({"final_prompt": "done"}));
        let text = Payload::Text("done".to_string());

        assert_eq!(workflow_output(Some(&json)), "done");
        assert_eq!(workflow_output(Some(&text)), "");
        assert_eq!(workflow_output(None), "");
    }
}
