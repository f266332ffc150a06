//! Error types for the loan decision backend

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {

    // =============================
    // Pipeline Errors
    // =============================

    /// Connection error or timeout reaching an upstream model endpoint.
    #[error("Upstream transport error ({endpoint}): {detail}")]
    UpstreamTransport { endpoint: String, detail: String },

    /// Upstream returned a non-success HTTP status; the body is kept verbatim.
    #[error("Upstream returned {status} ({endpoint}): {body}")]
    UpstreamStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Upstream returned 2xx but the body is missing expected fields.
    /// The raw body is embedded for diagnosis.
    #[error("Malformed upstream response ({endpoint}): {body}")]
    MalformedResponse { endpoint: String, body: String },

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True for failures caused by an upstream model endpoint rather than
    /// this process. The API layer maps these to 502.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            PipelineError::UpstreamTransport { .. }
                | PipelineError::UpstreamStatus { .. }
                | PipelineError::MalformedResponse { .. }
                | PipelineError::Http(_)
        )
    }
}
