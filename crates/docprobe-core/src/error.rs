//! Errors from the remote data service and object store.

use crate::http::TransportError;
use serde_json::Value;

/// Longest non-JSON error body kept verbatim, in characters.
const MAX_TEXT_BODY: usize = 512;

/// Failure of one call to a remote service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u32, body: ErrorBody },
    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error payload returned by the service, normalized across PostgREST
/// (`code`/`message`/`details`/`hint`) and the storage API
/// (`statusCode`/`error`/`message`).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Storage API `statusCode`, which can differ from the HTTP status
    /// (an absent object is HTTP 400 with `statusCode` "404").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
}

impl ErrorBody {
    /// Parse an error response body. Non-JSON bodies are kept as the message.
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => {
                let field = |name: &str| map.get(name).and_then(value_text);
                Self {
                    code: field("code").or_else(|| field("error")),
                    message: field("message").or_else(|| field("msg")),
                    details: field("details"),
                    hint: field("hint"),
                    status_code: field("statusCode"),
                }
            }
            _ => {
                let text = String::from_utf8_lossy(body);
                let text = text.trim();
                Self {
                    message: (!text.is_empty()).then(|| text.chars().take(MAX_TEXT_BODY).collect()),
                    ..Self::default()
                }
            }
        }
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("[{code}]"));
        }
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        if let Some(details) = &self.details {
            parts.push(format!("details: {details}"));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("hint: {hint}"));
        }
        if let Some(status_code) = &self.status_code {
            parts.push(format!("(statusCode {status_code})"));
        }
        if parts.is_empty() {
            write!(f, "(empty body)")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
