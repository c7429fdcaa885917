//! Workflow Run Log
//!
//! Every `maestro run` leaves one pretty-printed JSON file behind:
//! `~/.maestro/logs/<workflow_id>.log` (or `./logs` without a home directory).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::documents::Document;
use crate::error::Result;

/// Fallback directory when the home directory is unknown.
const FALLBACK_LOG_DIR: &str = "logs";

/// Outcome recorded for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

/// One workflow run, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowRun {
    pub workflow_id: String,
    pub workflow_name: String,
    pub prompt: String,
    pub output: String,
    pub models_used: Vec<String>,
    pub status: RunStatus,
    #[serde(serialize_with = "rfc3339")]
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339")]
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
}

impl WorkflowRun {
    /// Start a record; name and prompt are filled by the caller.
    pub fn new(workflow_id: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            workflow_name: String::new(),
            prompt: String::new(),
            output: String::new(),
            models_used: Vec::new(),
            status: RunStatus::Error,
            start_time,
            end_time: start_time,
            duration_ms: 0,
        }
    }

    /// Stamp the end time, duration, and status.
    pub fn finish(mut self, status: RunStatus, end_time: DateTime<Utc>) -> Self {
        self.status = status;
        self.end_time = end_time;
        self.duration_ms = (end_time - self.start_time).num_milliseconds();
        self
    }
}

fn rfc3339<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Writes run records into a log directory.
#[derive(Debug, Clone)]
pub struct RunLogger {
    log_dir: PathBuf,
}

impl RunLogger {
    /// Logger for `~/.maestro/logs`, falling back to `./logs`.
    pub fn new() -> Self {
        let log_dir = dirs::home_dir()
            .map(|home| home.join(".maestro").join("logs"))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_LOG_DIR));
        Self { log_dir }
    }

    pub fn with_dir(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Write `run` to `<log_dir>/<workflow_id>.log`, creating the directory.
    pub fn record(&self, run: &WorkflowRun) -> Result<PathBuf> {
        fs::create_dir_all(&self.log_dir)?;

        let path = self.log_dir.join(format!("{}.log", run.workflow_id));
        let mut json = serde_json::to_string_pretty(run)?;
        json.push('\n');
        fs::write(&path, json)?;

        tracing::debug!(path = %path.display(), status = ?run.status, "wrote workflow run log");
        Ok(path)
    }
}

impl Default for RunLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique workflow id: `workflow-<unix nanos>`.
pub fn generate_workflow_id() -> String {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1_000);
    format!("workflow-{nanos}")
}

/// Model of each agent: `spec.model`, or `code:<name>` for agents without one.
pub fn models_used(agents: &[Document]) -> Vec<String> {
    agents
        .iter()
        .filter(|agent| agent.lookup(&["spec"]).is_some())
        .filter_map(|agent| match agent.spec_str("model") {
            Some(model) if !model.is_empty() => Some(model.to_string()),
            _ => agent.name().map(|name| format!("code:{name}")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::path::Path;

    use crate::documents::parse_documents;

    #[test]
    fn test_workflow_id_format() {
        let id = generate_workflow_id();

        let nanos = id.strip_prefix("workflow-").unwrap();
        assert!(nanos.parse::<i64>().is_ok());
    }

    #[test]
    fn test_models_used_falls_back_to_code_name() {
        let agents = parse_documents(
            "kind: Agent\nmetadata:\n  name: a\nspec:\n  model: gpt-4o\n---\nkind: Agent\nmetadata:\n  name: b\nspec:\n  framework: code\n",
            Path::new("/work/agents.yaml"),
        )
        .unwrap();

        assert_eq!(models_used(&agents), vec!["gpt-4o", "code:b"]);
    }

    #[test]
    fn test_record_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RunLogger::with_dir(dir.path().join("logs"));
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 2).unwrap();

        let mut run = WorkflowRun::new("workflow-42", start);
        run.workflow_name = "news".to_string();
        run.output = "done".to_string();
        let run = run.finish(RunStatus::Success, end);

        let path = logger.record(&run).unwrap();

        assert_eq!(path, dir.path().join("logs").join("workflow-42.log"));
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["status"], "success");
        assert_eq!(written["duration_ms"], 2000);
        assert_eq!(written["start_time"], "2025-03-01T12:00:00Z");
        assert_eq!(written["workflow_name"], "news");
    }
}
