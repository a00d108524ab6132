use serde::de::DeserializeOwned;
use tracing::warn;

use crate::errors::{AgentError, AgentResult};

/// Parse a JSON document out of model output
///
/// Models asked for JSON only still sometimes wrap it in a Markdown code fence, which is
/// stripped before parsing.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> AgentResult<T> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        warn!("Model output is not valid JSON: {}", e);
        AgentError::MalformedJson {
            message: e.to_string(),
            raw: text.to_string(),
        }
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
