pub mod types;
pub mod prompt;
pub mod parser;
pub mod client;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use client::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Model endpoint unreachable at {0}")]
    Connection(String),

    #[error("Model endpoint returned error (status {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed completion envelope: {0}")]
    MalformedResponse(String),

    #[error("Model output is not valid JSON: {0}")]
    JsonParsing(String),

    #[error("Model output does not match the observation schema: {0}")]
    SchemaViolation(String),
}

impl StructuringError {
    /// True when the completion came back but its content was unusable.
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::JsonParsing(_) | Self::SchemaViolation(_))
    }
}
