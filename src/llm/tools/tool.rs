use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// How a tool is advertised to the model, in the OpenAI `tools` format.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object
    pub parameters: Value,
}

impl ToolDescriptor {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Something the model can call during a chat turn.
#[async_trait]
pub trait LlmTool: Send + Sync {
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value>;

    fn descriptor(&self) -> ToolDescriptor;

    fn matches(&self, name: &str) -> bool {
        self.descriptor().function.name == name
    }
}
