use thiserror::Error;

/// Everything that can go wrong talking to the fitness backend
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {endpoint} timed out after {seconds}s")]
    Timeout { endpoint: String, seconds: u64 },

    #[error("request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not authorized to access {0}")]
    Unauthorized(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Coarse failure classes callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request exceeded its time budget
    Timeout,
    /// Network or HTTP level failure
    Transport,
    /// Anything else
    Unknown,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout { .. } => ErrorKind::Timeout,
            ApiError::Transport { .. }
            | ApiError::NotFound(_)
            | ApiError::Unauthorized(_)
            | ApiError::Network(_) => ErrorKind::Transport,
            ApiError::Parse(_) | ApiError::InvalidConfig(_) | ApiError::Unknown(_) => {
                ErrorKind::Unknown
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// Worth another attempt: server errors, rate limiting, dropped connections
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map(crate::retry::is_retryable_status)
                .unwrap_or(false),
            ApiError::Network(e) => e.is_connect(),
            _ => false,
        }
    }
}
