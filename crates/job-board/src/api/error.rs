use serde::Deserialize;
use serde_json::{Map, Value};

/// Shown when nothing more specific can be said about a failure.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Error payload the backend attaches to 4xx/5xx responses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Map<String, Value>>,
}

impl ErrorBody {
    /// `message` if present, otherwise the field errors joined with `", "`.
    pub fn describe(&self) -> Option<String> {
        if let Some(message) = self.message.as_deref().map(str::trim) {
            if !message.is_empty() {
                return Some(message.to_string());
            }
        }

        let joined = self
            .errors
            .as_ref()?
            .values()
            .flat_map(flatten_field_error)
            .collect::<Vec<_>>()
            .join(", ");
        (!joined.is_empty()).then_some(joined)
    }
}

fn flatten_field_error(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => vec![text.clone()],
        Value::Array(items) => items.iter().flat_map(flatten_field_error).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend refused the token; the client has already cleared it.
    #[error("Request failed with status code 401")]
    Unauthorized,
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Builds the error for a non-success response from its raw body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.describe())
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        ApiError::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|status| status.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// User-facing text for any gateway failure.
pub fn describe_error(err: &ApiError) -> String {
    let text = match err {
        ApiError::Unauthorized | ApiError::Status { .. } | ApiError::Transport(_) => err.to_string(),
        ApiError::Decode(_) => String::new(),
    };

    if text.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        text
    }
}
