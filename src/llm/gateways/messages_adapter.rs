//! Conversion between [`LlmMessage`] and the chat-completions wire format.

use crate::llm::models::{LlmMessage, LlmToolCall, MessageRole};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::warn;

pub fn adapt_messages(messages: &[LlmMessage]) -> Vec<Value> {
    messages.iter().map(to_wire).collect()
}

fn to_wire(msg: &LlmMessage) -> Value {
    let mut wire = Map::new();
    wire.insert("role".into(), json!(msg.role.as_str()));

    match msg.role {
        MessageRole::System | MessageRole::User => {
            wire.insert("content".into(), json!(msg.text()));
        }
        MessageRole::Assistant => {
            // Tool-call requests may carry no text at all
            if let Some(content) = &msg.content {
                wire.insert("content".into(), json!(content));
            }
            if let Some(calls) = &msg.tool_calls {
                let calls: Vec<Value> = calls.iter().map(call_to_wire).collect();
                wire.insert("tool_calls".into(), Value::Array(calls));
            }
        }
        MessageRole::Tool => {
            let answered = msg
                .tool_calls
                .iter()
                .flatten()
                .find_map(|call| call.id.as_deref())
                .unwrap_or_default();
            wire.insert("content".into(), json!(msg.text()));
            wire.insert("tool_call_id".into(), json!(answered));
        }
    }

    Value::Object(wire)
}

/// Arguments travel as a JSON-encoded string, not as an object.
fn call_to_wire(call: &LlmToolCall) -> Value {
    let arguments = serde_json::to_string(&call.arguments).unwrap_or_else(|_| "{}".into());
    json!({
        "id": call.id.as_deref().unwrap_or_default(),
        "type": "function",
        "function": { "name": &call.name, "arguments": arguments },
    })
}

/// Read the `tool_calls` array of a completion choice.
///
/// Calls without a function name are dropped. Arguments that are not a JSON
/// object are treated as empty.
pub fn convert_tool_calls(tool_calls: &[Value]) -> Vec<LlmToolCall> {
    tool_calls.iter().filter_map(call_from_wire).collect()
}

fn call_from_wire(wire: &Value) -> Option<LlmToolCall> {
    let function = wire.get("function")?;
    let name = function.get("name")?.as_str()?.to_string();
    let raw = function
        .get("arguments")
        .and_then(Value::as_str)
        .unwrap_or("{}");

    let arguments = serde_json::from_str::<HashMap<String, Value>>(raw).unwrap_or_else(|e| {
        warn!(tool = %name, error = %e, "Tool call arguments are not a JSON object");
        HashMap::new()
    });

    Some(LlmToolCall {
        id: wire.get("id").and_then(Value::as_str).map(str::to_string),
        name,
        arguments,
    })
}
