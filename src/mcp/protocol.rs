//! Tool metadata and call results as the chat side sees them.
//!
//! Mapped from the `rmcp` model so nothing outside `mcp::session` depends on
//! the SDK types.

use rmcp::model::{RawContent, ResourceContents};
use serde_json::{json, Value};

/// A tool advertised by a server.
#[derive(Debug, Clone, PartialEq)]
pub struct McpToolInfo {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

impl From<rmcp::model::Tool> for McpToolInfo {
    fn from(tool: rmcp::model::Tool) -> Self {
        // Chat-completions APIs reject a bare `{}` as a parameter schema
        let input_schema = if tool.input_schema.is_empty() {
            json!({"type": "object", "properties": {}})
        } else {
            Value::Object((*tool.input_schema).clone())
        };

        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|d| d.to_string()),
            input_schema,
        }
    }
}

/// One block of tool output.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolContent {
    Text(String),
    Image { mime_type: String },
    Resource { uri: String, text: Option<String> },
    /// Content the model can only be told about, such as audio
    Other(String),
}

impl From<RawContent> for ToolContent {
    fn from(raw: RawContent) -> Self {
        match raw {
            RawContent::Text(text) => ToolContent::Text(text.text),
            RawContent::Image(image) => ToolContent::Image {
                mime_type: image.mime_type,
            },
            RawContent::Resource(embedded) => match embedded.resource {
                ResourceContents::TextResourceContents { uri, text, .. } => ToolContent::Resource {
                    uri,
                    text: Some(text),
                },
                ResourceContents::BlobResourceContents { uri, .. } => {
                    ToolContent::Resource { uri, text: None }
                }
            },
            RawContent::Audio(audio) => ToolContent::Other(format!("[audio: {}]", audio.mime_type)),
            RawContent::ResourceLink(link) => {
                ToolContent::Other(format!("[resource link: {}]", link.uri))
            }
        }
    }
}

impl ToolContent {
    fn render(&self) -> String {
        match self {
            ToolContent::Text(text) => text.clone(),
            ToolContent::Image { mime_type } => format!("[image: {}]", mime_type),
            ToolContent::Resource { text: Some(text), .. } => text.clone(),
            ToolContent::Resource { uri, text: None } => format!("[resource: {}]", uri),
            ToolContent::Other(note) => note.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallToolResult {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

impl From<rmcp::model::CallToolResult> for CallToolResult {
    fn from(result: rmcp::model::CallToolResult) -> Self {
        let mut content: Vec<ToolContent> =
            result.content.into_iter().map(|block| block.raw.into()).collect();

        if content.is_empty() {
            if let Some(structured) = result.structured_content {
                content.push(ToolContent::Text(structured.to_string()));
            }
        }

        Self {
            content,
            is_error: result.is_error.unwrap_or(false),
        }
    }
}

impl CallToolResult {
    /// Flatten the content blocks into plain text for the model.
    pub fn text(&self) -> String {
        self.content.iter().map(ToolContent::render).collect::<Vec<_>>().join("\n")
    }
}
