use crate::error::Result;
use crate::llm::models::{LlmGatewayResponse, LlmMessage};
use crate::llm::tools::LlmTool;
use async_trait::async_trait;

/// Sampling settings sent with every completion request.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub temperature: f32,
    /// Left to the provider's default when `None`
    pub max_tokens: Option<usize>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// A hosted chat-completions API.
///
/// One call is one model step: the reply either carries text, tool calls,
/// or both. Running the tools is the caller's job.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        tools: Option<&[Box<dyn LlmTool>]>,
        config: &CompletionConfig,
    ) -> Result<LlmGatewayResponse>;
}
