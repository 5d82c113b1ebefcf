//! Exam service error types.

use thiserror::Error;

/// Errors that can occur when talking to the exam service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service rejected the API key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// No matrix exists for the requested exam code.
    #[error("exam not found: {0}")]
    ExamNotFound(String),

    /// The service returned an error response.
    #[error("service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// No endpoint is configured.
    #[error("no exam service endpoint configured (set `endpoint` in quizforge.toml or QUIZFORGE_ENDPOINT)")]
    NotConfigured,
}

impl RemoteError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            RemoteError::Unauthorized(_) | RemoteError::ExamNotFound(_) | RemoteError::NotConfigured
        )
    }
}
