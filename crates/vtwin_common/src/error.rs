//! Error types for vtwin.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VtError {
    #[error("Missing field: {path}")]
    MissingField { path: String },

    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VtError {
    pub fn missing(path: impl Into<String>) -> Self {
        VtError::MissingField { path: path.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        VtError::MalformedSchema(message.into())
    }

    pub fn code(&self) -> i32 {
        match self {
            VtError::MissingField { .. } => -32010,
            VtError::MalformedSchema(_) => -32011,
            VtError::Json(_) => -32700,
        }
    }
}

pub type Result<T> = std::result::Result<T, VtError>;
