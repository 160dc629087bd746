use crate::error::{McpChatError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::LlmTool;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_MAX_STEPS: usize = 10;

/// Runs one chat request against a model.
///
/// The broker owns the model/tool-call loop: it keeps calling the gateway,
/// running whichever tools the model asks for, until the model answers with
/// plain text or the step budget runs out.
pub struct LlmBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
    max_steps: usize,
}

impl LlmBroker {
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Limit the number of model calls made for a single request
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Ask the model for a final text answer, running tool calls on the way.
    pub async fn generate(
        &self,
        messages: &[LlmMessage],
        tools: Option<&[Box<dyn LlmTool>]>,
        config: Option<CompletionConfig>,
    ) -> Result<String> {
        let config = config.unwrap_or_default();
        let mut current_messages = messages.to_vec();

        for step in 1..=self.max_steps {
            let response = self
                .gateway
                .complete(&self.model, &current_messages, tools, &config)
                .await?;

            if response.tool_calls.is_empty() {
                return Ok(response.content.unwrap_or_default());
            }

            let Some(tools) = tools else {
                warn!("LLM requested tool calls but no tools provided");
                return Ok(response.content.unwrap_or_default());
            };

            info!(step, "Tool calls requested: {}", response.tool_calls.len());

            current_messages.push(LlmMessage::assistant_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));

            for tool_call in response.tool_calls {
                let output = self.run_tool(tools, &tool_call).await;
                current_messages.push(LlmMessage::tool_result(tool_call, output));
            }
        }

        Err(McpChatError::AgentError(format!(
            "No final answer after {} agent steps",
            self.max_steps
        )))
    }

    /// Run one tool call, reporting failures back to the model as text
    async fn run_tool(&self, tools: &[Box<dyn LlmTool>], tool_call: &LlmToolCall) -> String {
        let Some(tool) = tools.iter().find(|t| t.matches(&tool_call.name)) else {
            warn!("Tool not found: {}", tool_call.name);
            return format!("Error: tool '{}' is not available", tool_call.name);
        };

        info!("Executing tool: {}", tool_call.name);

        match tool.run(&tool_call.arguments).await {
            Ok(serde_json::Value::String(text)) => text,
            Ok(output) => output.to_string(),
            Err(e) => {
                warn!(tool = %tool_call.name, error = %e, "Tool execution failed");
                format!("Error: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::models::{LlmGatewayResponse, MessageRole};
    use crate::llm::tools::ToolDescriptor;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock gateway for testing
    struct MockGateway {
        responses: Vec<LlmGatewayResponse>,
        seen: Mutex<Vec<Vec<LlmMessage>>>,
    }

    impl MockGateway {
        fn new(responses: Vec<LlmGatewayResponse>) -> Self {
            Self {
                responses,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn last_messages(&self) -> Vec<LlmMessage> {
            self.seen.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        async fn complete(
            &self,
            _model: &str,
            messages: &[LlmMessage],
            _tools: Option<&[Box<dyn LlmTool>]>,
            _config: &CompletionConfig,
        ) -> Result<LlmGatewayResponse> {
            let mut seen = self.seen.lock().unwrap();
            let idx = seen.len();
            seen.push(messages.to_vec());

            Ok(self.responses.get(idx).cloned().unwrap_or_else(|| text("default response")))
        }
    }

    struct MockTool {
        name: String,
        result: Result<Value>,
    }

    impl MockTool {
        fn ok(name: &str, result: Value) -> Self {
            Self {
                name: name.to_string(),
                result: Ok(result),
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                name: name.to_string(),
                result: Err(McpChatError::ToolError("page not found".to_string())),
            }
        }
    }

    #[async_trait]
    impl LlmTool for MockTool {
        async fn run(&self, _args: &HashMap<String, Value>) -> Result<Value> {
            match &self.result {
                Ok(value) => Ok(value.clone()),
                Err(e) => Err(McpChatError::ToolError(e.to_string())),
            }
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::function(&self.name, "mock", json!({"type": "object"}))
        }
    }

    fn text(content: &str) -> LlmGatewayResponse {
        LlmGatewayResponse {
            content: Some(content.to_string()),
            tool_calls: vec![],
        }
    }

    fn call(id: &str, name: &str) -> LlmToolCall {
        LlmToolCall {
            id: Some(id.to_string()),
            name: name.to_string(),
            arguments: HashMap::new(),
        }
    }

    fn tool_calls(calls: Vec<LlmToolCall>) -> LlmGatewayResponse {
        LlmGatewayResponse {
            content: None,
            tool_calls: calls,
        }
    }

    #[tokio::test]
    async fn test_generate_plain_text() {
        let gateway = Arc::new(MockGateway::new(vec![text("Hello")]));
        let broker = LlmBroker::new("test-model", gateway.clone());

        let result = broker.generate(&[LlmMessage::user("Hi")], None, None).await.unwrap();

        assert_eq!(result, "Hello");
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_runs_tools_then_answers() {
        let gateway = Arc::new(MockGateway::new(vec![
            tool_calls(vec![call("c1", "navigate"), call("c2", "snapshot")]),
            text("The page says hello"),
        ]));
        let broker = LlmBroker::new("test-model", gateway.clone());
        let tools: Vec<Box<dyn LlmTool>> = vec![
            Box::new(MockTool::ok("navigate", json!("navigated"))),
            Box::new(MockTool::ok("snapshot", json!({"title": "Hello"}))),
        ];

        let result = broker
            .generate(&[LlmMessage::user("Open it")], Some(&tools), None)
            .await
            .unwrap();

        assert_eq!(result, "The page says hello");
        assert_eq!(gateway.calls(), 2);

        let messages = gateway.last_messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].tool_calls.as_ref().unwrap().len(), 2);
        assert_eq!(messages[2].role, MessageRole::Tool);
        assert_eq!(messages[2].text(), "navigated");
        assert_eq!(messages[3].text(), r#"{"title":"Hello"}"#);
    }

    #[tokio::test]
    async fn test_generate_reports_tool_failure_to_model() {
        let gateway = Arc::new(MockGateway::new(vec![
            tool_calls(vec![call("c1", "navigate")]),
            text("Sorry, that failed"),
        ]));
        let broker = LlmBroker::new("test-model", gateway.clone());
        let tools: Vec<Box<dyn LlmTool>> = vec![Box::new(MockTool::failing("navigate"))];

        let result = broker
            .generate(&[LlmMessage::user("Open it")], Some(&tools), None)
            .await
            .unwrap();

        assert_eq!(result, "Sorry, that failed");
        let messages = gateway.last_messages();
        assert!(messages[2].text().contains("page not found"));
    }

    #[tokio::test]
    async fn test_generate_reports_unknown_tool_to_model() {
        let gateway = Arc::new(MockGateway::new(vec![
            tool_calls(vec![call("c1", "missing")]),
            text("done"),
        ]));
        let broker = LlmBroker::new("test-model", gateway.clone());
        let tools: Vec<Box<dyn LlmTool>> = vec![Box::new(MockTool::ok("navigate", json!("")))];

        let result = broker
            .generate(&[LlmMessage::user("Hi")], Some(&tools), None)
            .await
            .unwrap();

        assert_eq!(result, "done");
        let messages = gateway.last_messages();
        assert!(messages[2].text().contains("'missing' is not available"));
    }

    #[tokio::test]
    async fn test_generate_without_tools_ignores_tool_calls() {
        let gateway = Arc::new(MockGateway::new(vec![LlmGatewayResponse {
            content: Some("partial".to_string()),
            tool_calls: vec![call("c1", "navigate")],
        }]));
        let broker = LlmBroker::new("test-model", gateway.clone());

        let result = broker.generate(&[LlmMessage::user("Hi")], None, None).await.unwrap();

        assert_eq!(result, "partial");
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_enforces_max_steps() {
        let responses = (0..5).map(|i| tool_calls(vec![call(&format!("c{i}"), "navigate")]));
        let gateway = Arc::new(MockGateway::new(responses.collect()));
        let broker = LlmBroker::new("test-model", gateway.clone()).with_max_steps(3);
        let tools: Vec<Box<dyn LlmTool>> = vec![Box::new(MockTool::ok("navigate", json!("ok")))];

        let result = broker.generate(&[LlmMessage::user("Loop")], Some(&tools), None).await;

        assert!(matches!(result, Err(McpChatError::AgentError(_))));
        assert_eq!(gateway.calls(), 3);
    }

    #[test]
    fn test_max_steps_is_at_least_one() {
        let gateway = Arc::new(MockGateway::new(vec![]));
        let broker = LlmBroker::new("m", gateway).with_max_steps(0);
        assert_eq!(broker.max_steps(), 1);
        assert_eq!(broker.model(), "m");
    }
}
