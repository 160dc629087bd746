use crate::error::{McpChatError, Result};
use crate::llm::tools::{LlmTool, ToolDescriptor};
use crate::mcp::protocol::McpToolInfo;
use crate::mcp::session::ToolSession;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A tool exposed by an MCP server, presented to the LLM as an [`LlmTool`].
pub struct McpTool {
    session: Arc<dyn ToolSession>,
    info: McpToolInfo,
}

impl McpTool {
    pub fn new(session: Arc<dyn ToolSession>, info: McpToolInfo) -> Self {
        Self { session, info }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn server_name(&self) -> &str {
        self.session.server_name()
    }
}

#[async_trait]
impl LlmTool for McpTool {
    async fn run(&self, args: &HashMap<String, Value>) -> Result<Value> {
        debug!(server = self.server_name(), tool = self.name(), "Calling MCP tool");

        let result = self.session.call_tool(&self.info.name, args).await?;
        let text = result.text();

        if result.is_error {
            return Err(McpChatError::ToolError(format!("{}: {}", self.info.name, text)));
        }

        Ok(Value::String(text))
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function(
            &self.info.name,
            self.info.description.clone().unwrap_or_default(),
            self.info.input_schema.clone(),
        )
    }

    fn matches(&self, name: &str) -> bool {
        self.info.name == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{CallToolResult, ToolContent};
    use serde_json::json;
    use std::sync::Mutex;

    struct StubSession {
        result: CallToolResult,
        calls: Mutex<Vec<(String, HashMap<String, Value>)>>,
    }

    #[async_trait]
    impl ToolSession for StubSession {
        fn server_name(&self) -> &str {
            "playwright"
        }

        async fn list_tools(&self) -> Result<Vec<McpToolInfo>> {
            Ok(vec![])
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: &HashMap<String, Value>,
        ) -> Result<CallToolResult> {
            self.calls.lock().unwrap().push((name.to_string(), arguments.clone()));
            Ok(self.result.clone())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn stub(text: &str, is_error: bool) -> Arc<StubSession> {
        Arc::new(StubSession {
            result: CallToolResult {
                content: vec![ToolContent::Text(text.to_string())],
                is_error,
            },
            calls: Mutex::new(Vec::new()),
        })
    }

    fn navigate_info() -> McpToolInfo {
        McpToolInfo {
            name: "browser_navigate".to_string(),
            description: Some("Navigate to a URL".to_string()),
            input_schema: json!({"type": "object", "properties": {"url": {"type": "string"}}}),
        }
    }

    #[test]
    fn test_descriptor_uses_server_schema() {
        let tool = McpTool::new(stub("", false), navigate_info());

        let descriptor = tool.descriptor();

        assert_eq!(descriptor.r#type, "function");
        assert_eq!(descriptor.function.name, "browser_navigate");
        assert_eq!(descriptor.function.description, "Navigate to a URL");
        assert_eq!(descriptor.function.parameters["properties"]["url"]["type"], "string");
        assert!(tool.matches("browser_navigate"));
        assert_eq!(tool.server_name(), "playwright");
    }

    #[test]
    fn test_descriptor_without_description() {
        let info = McpToolInfo {
            description: None,
            ..navigate_info()
        };
        let tool = McpTool::new(stub("", false), info);

        assert_eq!(tool.descriptor().function.description, "");
    }

    #[tokio::test]
    async fn test_run_forwards_call_and_returns_text() {
        let session = stub("Navigated to https://docs.rs", false);
        let tool = McpTool::new(session.clone(), navigate_info());
        let args = HashMap::from([("url".to_string(), json!("https://docs.rs"))]);

        let output = tool.run(&args).await.unwrap();

        assert_eq!(output, json!("Navigated to https://docs.rs"));
        let calls = session.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "browser_navigate");
        assert_eq!(calls[0].1["url"], "https://docs.rs");
    }

    #[tokio::test]
    async fn test_run_maps_error_result() {
        let tool = McpTool::new(stub("net::ERR_NAME_NOT_RESOLVED", true), navigate_info());

        let err = tool.run(&HashMap::new()).await.unwrap_err();

        match err {
            McpChatError::ToolError(msg) => assert!(msg.contains("ERR_NAME_NOT_RESOLVED")),
            other => panic!("Expected ToolError, got {:?}", other),
        }
    }
}
