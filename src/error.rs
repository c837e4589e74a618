use thiserror::Error;

/// Longest diagnostic body carried by an error.
pub const SNIPPET_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    ApiError,
    InvalidResponse,
    NoImageFound,
    EmptyCompletion,
    ExtractionFailed,
    Transport,
    Config,
    Serialization,
    Host,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },
    #[error("Invalid JSON from API: {}{}", .snippet, ellipsis(.truncated))]
    InvalidResponse { snippet: String, truncated: bool },
    #[error("No image found in API response")]
    NoImageFound,
    #[error("Completion response had no message content")]
    EmptyCompletion,
    #[error("Could not derive an image prompt from the message")]
    ExtractionFailed,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Host error: {0}")]
    Host(String),
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Timeout { .. } => ErrorKind::Timeout,
            GenerationError::ApiError { .. } => ErrorKind::ApiError,
            GenerationError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            GenerationError::NoImageFound => ErrorKind::NoImageFound,
            GenerationError::EmptyCompletion => ErrorKind::EmptyCompletion,
            GenerationError::ExtractionFailed => ErrorKind::ExtractionFailed,
            GenerationError::Transport(_) => ErrorKind::Transport,
            GenerationError::Config(_) => ErrorKind::Config,
            GenerationError::Serialization(_) => ErrorKind::Serialization,
            GenerationError::Host(_) => ErrorKind::Host,
        }
    }

    pub(crate) fn api(status: u16, body: &str) -> Self {
        GenerationError::ApiError {
            status,
            body: snippet(body).0,
        }
    }

    pub(crate) fn invalid_response(body: &str) -> Self {
        let (snippet, truncated) = snippet(body);
        GenerationError::InvalidResponse { snippet, truncated }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(e: serde_json::Error) -> Self {
        GenerationError::Serialization(e.to_string())
    }
}

/// First [`SNIPPET_LEN`] characters of a response body, and whether anything
/// was cut off.
pub fn snippet(body: &str) -> (String, bool) {
    let mut chars = body.chars();
    let cut: String = chars.by_ref().take(SNIPPET_LEN).collect();
    (cut, chars.next().is_some())
}

fn ellipsis(truncated: &bool) -> &'static str {
    if *truncated {
        "..."
    } else {
        ""
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
