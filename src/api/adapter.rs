use std::fmt;

use super::{GenerateRequest, GenerateResponse};

/// Boundary to a remote generative model.
///
/// The controller treats implementations as opaque: latency and error
/// taxonomy are up to the adapter.
#[async_trait::async_trait]
pub trait GenerativeAdapter: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, AdapterError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// No API key was configured when the request was made.
    MissingApiKey,
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Transport(String),
    /// The API answered with a non-success status.
    Api { status: u16, message: String },
    MalformedResponse(String),
    /// The model answered but produced no text.
    EmptyResponse(String),
    InvalidImage(String),
}

impl AdapterError {
    /// Short label for diagnostics output.
    pub fn classify(&self) -> String {
        match self {
            AdapterError::MissingApiKey => "Missing API Key".to_string(),
            AdapterError::Transport(_) => "Fetch Failed".to_string(),
            AdapterError::Api { status: 404, .. } => "404 Not Found".to_string(),
            AdapterError::Api { status: 429, .. } => "Quota Exceeded".to_string(),
            AdapterError::Api { status: 401 | 403, .. } => "Auth Failed".to_string(),
            AdapterError::Api { message, .. } if message.to_lowercase().contains("quota") => {
                "Quota Exceeded".to_string()
            }
            other => other.to_string().chars().take(40).collect(),
        }
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::MissingApiKey => write!(
                f,
                "No API key configured (set GEMINI_API_KEY or GOOGLE_API_KEY)"
            ),
            AdapterError::Transport(msg) => write!(f, "Request failed: {msg}"),
            AdapterError::Api { status, message } => {
                write!(f, "API request failed with status {status}: {message}")
            }
            AdapterError::MalformedResponse(msg) => write!(f, "Malformed response: {msg}"),
            AdapterError::EmptyResponse(reason) => write!(f, "Empty response: {reason}"),
            AdapterError::InvalidImage(msg) => write!(f, "Invalid image: {msg}"),
        }
    }
}

impl std::error::Error for AdapterError {}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdapterError::MalformedResponse(err.to_string())
        } else {
            AdapterError::Transport(err.to_string())
        }
    }
}
