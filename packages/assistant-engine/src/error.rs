/// Error types for the assistant engine boundary
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Assistant call failed: {0}")]
    CallFailed(String),

    #[error("Assistant returned an empty response")]
    EmptyResponse,

    #[error("Response parsing failed: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl AssistantError {
    /// Create a call failure error
    pub fn call_failed(reason: impl Into<String>) -> Self {
        Self::CallFailed(reason.into())
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::ParseError(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;
