//! YAML Documents
//!
//! Agent, workflow, and tool definitions are multi-document YAML files:
//!
//! ```yaml
//! apiVersion: maestro/v1alpha1
//! kind: Agent
//! metadata:
//!   name: summarizer
//! spec:
//!   framework: openai
//!   model: gpt-4o
//! ---
//! kind: Agent
//! metadata:
//!   name: reviewer
//! spec:
//!   framework: container
//!   image: registry.local/reviewer:1.0
//! ```
//!
//! Each document is kept as a JSON object so it can be handed to the MCP
//! server verbatim, annotated with the absolute `source_file` it came from.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{MaestroError, Result};

/// Key added to every document with the absolute path of its file.
pub const SOURCE_FILE_KEY: &str = "source_file";

/// One YAML document as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// `kind` field (e.g. "Agent", "MCPTool", "Workflow").
    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    /// `metadata.name`
    pub fn name(&self) -> Option<&str> {
        self.lookup(&["metadata", "name"]).and_then(Value::as_str)
    }

    /// String field under `spec`, e.g. `spec_str("model")`.
    pub fn spec_str(&self, field: &str) -> Option<&str> {
        self.lookup(&["spec", field]).and_then(Value::as_str)
    }

    /// `spec.template.prompt`
    pub fn prompt(&self) -> Option<&str> {
        self.lookup(&["spec", "template", "prompt"])
            .and_then(Value::as_str)
    }

    /// Set `spec.template.prompt`, creating `spec` and `template` when missing.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        let mut spec = take_object(&mut self.0, "spec");
        let mut template = take_object(&mut spec, "template");
        template.insert("prompt".to_string(), Value::String(prompt.into()));
        spec.insert("template".to_string(), Value::Object(template));
        self.0.insert("spec".to_string(), Value::Object(spec));
    }

    /// Nested lookup by key path.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.0.get(*first)?, |value, key| value.get(*key))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Compact JSON text of the document.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

/// Compact JSON text of every document, in file order.
pub fn to_json_strings(documents: &[Document]) -> Result<Vec<String>> {
    documents.iter().map(Document::to_json_string).collect()
}

/// Read and parse every document in `path`.
///
/// Empty documents (e.g. after a trailing `---`) are skipped.
///
/// # Errors
///
/// - `MaestroError::Io` if the file cannot be read
/// - `MaestroError::DocumentError` if a document is not valid YAML or not a mapping
/// - `MaestroError::EmptyDocument` if the file holds no documents
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)?;
    let source = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));
    parse_documents(&content, &source)
}

/// Parse documents from YAML text; `source` is recorded as [`SOURCE_FILE_KEY`].
pub fn parse_documents(content: &str, source: &Path) -> Result<Vec<Document>> {
    let source_str = source.display().to_string();
    let mut documents = Vec::new();

    for (index, deserializer) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(deserializer).map_err(|e| MaestroError::DocumentError {
            path: source_str.clone(),
            reason: e.to_string(),
        })?;

        let mut map = match value {
            Value::Null => continue,
            Value::Object(map) => map,
            other => {
                return Err(MaestroError::DocumentError {
                    path: source_str,
                    reason: format!(
                        "document {} is a {} instead of a mapping",
                        index + 1,
                        json_type_name(&other)
                    ),
                })
            }
        };

        map.insert(
            SOURCE_FILE_KEY.to_string(),
            Value::String(source_str.clone()),
        );
        documents.push(Document(map));
    }

    if documents.is_empty() {
        return Err(MaestroError::EmptyDocument { path: source_str });
    }

    tracing::debug!(path = %source_str, count = documents.len(), "parsed YAML documents");
    Ok(documents)
}

/// Remove `key` as an object; anything else under it is dropped.
fn take_object(map: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match map.remove(key) {
        Some(Value::Object(inner)) => inner,
        _ => Map::new(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
