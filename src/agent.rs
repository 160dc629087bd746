//! The chat agent: the capability the interactive loop delegates replies to.

use crate::error::Result;
use crate::llm::broker::LlmBroker;
use crate::llm::gateway::CompletionConfig;
use crate::llm::models::LlmMessage;
use crate::llm::tools::LlmTool;
use async_trait::async_trait;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. \
     You engage in friendly conversation and can help with various tasks. \
     Be concise and helpful.";

/// Produces the assistant's reply for a conversation.
#[async_trait]
pub trait ChatAgent: Send + Sync {
    /// Generate a reply given the transcript so far, oldest message first.
    async fn respond(&self, transcript: &[LlmMessage]) -> Result<String>;
}

/// Agent backed by an [`LlmBroker`] and a set of MCP tools.
pub struct McpAgent {
    broker: LlmBroker,
    tools: Vec<Box<dyn LlmTool>>,
    system_prompt: String,
    config: CompletionConfig,
}

impl McpAgent {
    pub fn builder(broker: LlmBroker) -> McpAgentBuilder {
        McpAgentBuilder::new(broker)
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn build_messages(&self, transcript: &[LlmMessage]) -> Vec<LlmMessage> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(LlmMessage::system(&self.system_prompt));
        messages.extend_from_slice(transcript);
        messages
    }
}

#[async_trait]
impl ChatAgent for McpAgent {
    async fn respond(&self, transcript: &[LlmMessage]) -> Result<String> {
        let messages = self.build_messages(transcript);
        let tools = (!self.tools.is_empty()).then_some(self.tools.as_slice());

        self.broker.generate(&messages, tools, Some(self.config.clone())).await
    }
}

/// Builder for [`McpAgent`].
pub struct McpAgentBuilder {
    broker: LlmBroker,
    tools: Vec<Box<dyn LlmTool>>,
    system_prompt: String,
    config: CompletionConfig,
}

impl McpAgentBuilder {
    fn new(broker: LlmBroker) -> Self {
        Self {
            broker,
            tools: Vec::new(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            config: CompletionConfig::default(),
        }
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn tools(mut self, tools: Vec<Box<dyn LlmTool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Cap reply length; `None` leaves it to the provider.
    pub fn max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> McpAgent {
        McpAgent {
            broker: self.broker,
            tools: self.tools,
            system_prompt: self.system_prompt,
            config: self.config,
        }
    }
}
