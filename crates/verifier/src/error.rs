use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Verification cancelled")]
    Cancelled,

    #[error("{0}")]
    Timeout(String),

    #[error("Verifier returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Session {session_id} ended with status {status}")]
    Session { session_id: String, status: String },

    #[error("Invalid verifier response: {0}")]
    InvalidResponse(String),

    #[error("Invalid verifier URL: {0}")]
    Url(#[from] url::ParseError),
}

impl VerifyError {
    /// HTTP status reported by the verifier, if the failure carried one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            VerifyError::Http { status, .. } => Some(*status),
            VerifyError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, VerifyError::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            VerifyError::Timeout(_) => true,
            VerifyError::Network(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Errors worth another poll before giving up on the session.
    pub fn is_transient(&self) -> bool {
        match self {
            VerifyError::Network(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            VerifyError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type VerifyResult<T> = Result<T, VerifyError>;
