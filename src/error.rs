use thiserror::Error;

/// Errors produced by stages, workflows, tools and backends.
///
/// A gate rejection is not an error; it is reported as
/// [`Outcome::Rejected`](crate::types::Outcome::Rejected).
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error with status code and response body.
    ///
    /// Returned by [`Backend`](crate::backend::Backend) implementations and the
    /// weather tool when the remote side answers with a non-success status.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 400, 429, 500).
        status: u16,
        /// Response body text.
        body: String,
    },

    /// A stage reply did not conform to the stage's declared schema.
    ///
    /// This aborts the whole workflow run.
    #[error("Stage '{stage}' expected {expected}: {message}")]
    SchemaMismatch {
        stage: String,
        expected: String,
        message: String,
    },

    /// The model requested a function that is not registered.
    #[error("Model requested unknown tool '{0}'")]
    UnknownTool(String),

    /// A registered tool failed while executing.
    #[error("Tool '{tool}' failed: {message}")]
    Tool { tool: String, message: String },

    /// Invalid configuration detected at build time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Local file access failed (knowledge base loading).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl WorkflowError {
    pub(crate) fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        WorkflowError::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for WorkflowError {
    fn from(err: anyhow::Error) -> Self {
        WorkflowError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
