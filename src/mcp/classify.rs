//! Reply and failure classification.
//!
//! - [`classify`] turns reply text into a [`CallResult`]
//! - [`is_unreachable`] decides whether a transport failure means "server not reachable"
//!
//! Both are substring heuristics. A JSON payload that happens to contain
//! `Error:` is reported as a tool failure.

use serde_json::Value;

use crate::mcp::types::{CallResult, Payload, ToolReply, TOOL_ERROR_CODE};

/// Reply text containing any of these is a server-reported failure.
pub const ERROR_SENTINELS: [&str; 4] = [
    "ValueError:",
    "Error:",
    "Exception:",
    "Error calling tool",
];

/// Failure message for `isError` replies without content.
pub const EMPTY_ERROR_MESSAGE: &str = "tool reported an error without content";

/// Failure message for `isError` replies whose first block is not text.
pub const NON_TEXT_ERROR_MESSAGE: &str = "<non-text error content>";

/// Lowercase fragments of failures that mean the server is not reachable.
///
/// Covers refused connections, host resolution, timeouts, and unreachable networks.
pub const UNREACHABLE_PATTERNS: [&str; 8] = [
    "connection refused",
    "no such host",
    "dns error",
    "failed to lookup address",
    "timeout",
    "timed out",
    "deadline exceeded",
    "network is unreachable",
];

/// Classify raw reply text. Never fails.
pub fn classify(raw: &str) -> CallResult {
    if ERROR_SENTINELS.iter().any(|sentinel| raw.contains(sentinel)) {
        return CallResult::failure(TOOL_ERROR_CODE, raw);
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => CallResult::success(Payload::Json(value)),
        Err(_) => CallResult::success(Payload::Text(raw.to_string())),
    }
}

/// Classify a whole `tools/call` reply.
///
/// Only the first block is inspected. Without `isError`, no content or a
/// non-text first block is an empty success. `isError: true` always yields a
/// failure, carrying the text when there is one.
pub fn classify_reply(reply: &ToolReply) -> CallResult {
    match (reply.first_text(), reply.is_error) {
        (Some(text), true) => CallResult::failure(TOOL_ERROR_CODE, text),
        (Some(text), false) => classify(text),
        (None, true) if reply.content.is_empty() => {
            CallResult::failure(TOOL_ERROR_CODE, EMPTY_ERROR_MESSAGE)
        }
        (None, true) => CallResult::failure(TOOL_ERROR_CODE, NON_TEXT_ERROR_MESSAGE),
        (None, false) => {
            if let Some(block) = reply.content.first() {
                tracing::debug!(
                    content_type = %block.content_type,
                    "first content block is not text, returning empty result"
                );
            }
            CallResult::empty()
        }
    }
}

/// Whether `failure_text` matches a known "server not reachable" pattern.
pub fn is_unreachable(failure_text: &str) -> bool {
    let lowered = failure_text.to_lowercase();
    UNREACHABLE_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}
