//! Error types and result aliases for mcp-chat.
//!
//! Every fallible operation in the library returns [`Result<T>`]. The binary
//! splits these into fatal startup errors and recoverable per-turn errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum McpChatError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Tool session error: {0}")]
    ToolSessionError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("{0} environment variable not set")]
    MissingCredential(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Agent error: {0}")]
    AgentError(String),
}

pub type Result<T> = std::result::Result<T, McpChatError>;
