use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function call the model asked for.
///
/// `id` is echoed back in the matching tool result message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub arguments: HashMap<String, serde_json::Value>,
}

/// One entry of a conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    #[serde(default = "default_role")]
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<LlmToolCall>>,
}

fn default_role() -> MessageRole {
    MessageRole::User
}

/// What the model returned for one completion request.
#[derive(Debug, Clone, Default)]
pub struct LlmGatewayResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<LlmToolCall>,
}

impl LlmMessage {
    fn text_from(role: MessageRole, content: impl Into<String>) -> Self {
        LlmMessage {
            role,
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text_from(MessageRole::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text_from(MessageRole::System, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text_from(MessageRole::Assistant, content)
    }

    /// The assistant turn that requested `tool_calls`.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<LlmToolCall>) -> Self {
        LlmMessage {
            role: MessageRole::Assistant,
            content,
            tool_calls: Some(tool_calls),
        }
    }

    /// The output of `tool_call`, fed back to the model.
    pub fn tool_result(tool_call: LlmToolCall, content: impl Into<String>) -> Self {
        LlmMessage {
            tool_calls: Some(vec![tool_call]),
            ..Self::text_from(MessageRole::Tool, content)
        }
    }

    /// Message text, empty when the model sent only tool calls
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}
