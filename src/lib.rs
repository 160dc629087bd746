pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;

pub use error::{McpChatError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::{ChatAgent, McpAgent};
    pub use crate::chat::{Repl, SessionSummary, Transcript};
    pub use crate::config::{McpConfig, Settings};
    pub use crate::error::{McpChatError, Result};
    pub use crate::llm::gateways::{GroqConfig, GroqGateway};
    pub use crate::llm::{CompletionConfig, LlmBroker, LlmGateway, LlmMessage, MessageRole};
    pub use crate::mcp::McpClient;
}
