use std::collections::HashSet;

use serde_json::{json, Value};
use tracing::debug;

use super::base::{Completion, CompletionOptions, StopReason, Usage};
use crate::errors::ProviderError;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

/// Convert internal Message format to the Anthropic messages format
///
/// A message holding a single text block is sent with plain string content, anything
/// else as a list of typed content blocks.
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let content = match message.content.as_slice() {
                [MessageContent::Text(text)] => json!(text.text),
                blocks => Value::Array(blocks.iter().map(content_to_anthropic_block).collect()),
            };
            json!({
                "role": message.role.as_str(),
                "content": content,
            })
        })
        .collect()
}

fn content_to_anthropic_block(content: &MessageContent) -> Value {
    match content {
        MessageContent::Text(text) => json!({
            "type": "text",
            "text": text.text,
        }),
        MessageContent::ToolRequest(request) => json!({
            "type": "tool_use",
            "id": request.id,
            "name": request.tool_call.name,
            "input": request.tool_call.arguments,
        }),
        MessageContent::ToolResponse(response) => json!({
            "type": "tool_result",
            "tool_use_id": response.id,
            "content": response.output,
        }),
    }
}

/// Convert internal Tool format to the Anthropic tool format
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Result<Vec<Value>, ProviderError> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(ProviderError::InvalidRequest(format!(
                "Duplicate tool name: {}",
                tool.name
            )));
        }

        result.push(json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.input_schema,
        }));
    }

    Ok(result)
}

/// Build the request body for `/v1/messages`
pub fn create_request(
    options: &CompletionOptions,
    messages: &[Message],
    stream: bool,
) -> Result<Value, ProviderError> {
    options.validate()?;

    let mut payload = json!({
        "model": options.model,
        "max_tokens": options.max_tokens,
        "messages": messages_to_anthropic_spec(messages),
    });
    let body = payload
        .as_object_mut()
        .ok_or_else(|| ProviderError::InvalidRequest("payload is not an object".to_string()))?;

    if let Some(system) = &options.system {
        body.insert("system".to_string(), json!(system));
    }
    if let Some(temperature) = options.temperature {
        body.insert("temperature".to_string(), json!(temperature));
    }
    if !options.tools.is_empty() {
        body.insert(
            "tools".to_string(),
            json!(tools_to_anthropic_spec(&options.tools)?),
        );
    }
    if stream {
        body.insert("stream".to_string(), json!(true));
    }

    Ok(payload)
}

/// Convert an Anthropic messages response into a Completion
pub fn anthropic_response_to_completion(response: Value) -> Result<Completion, ProviderError> {
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| {
            ProviderError::Decode("Invalid response format from Anthropic API".to_string())
        })?;

    let mut content = Vec::new();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                let text = block.get("text").and_then(|t| t.as_str()).unwrap_or_default();
                content.push(MessageContent::text(text));
            }
            Some("tool_use") => {
                let id = block
                    .get("id")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| ProviderError::Decode("tool_use block without id".to_string()))?;
                let name = block.get("name").and_then(|v| v.as_str()).ok_or_else(|| {
                    ProviderError::Decode(format!("tool_use block {} without name", id))
                })?;
                let arguments = block.get("input").cloned().unwrap_or_else(|| json!({}));
                content.push(MessageContent::tool_request(
                    id,
                    ToolCall::new(name, arguments),
                ));
            }
            other => debug!("Skipping unsupported content block: {:?}", other),
        }
    }

    let stop_reason = match response.get("stop_reason") {
        Some(reason) if !reason.is_null() => serde_json::from_value(reason.clone())?,
        _ => StopReason::Other,
    };

    Ok(Completion {
        message: Message {
            role: Role::Assistant,
            content,
        },
        stop_reason,
        usage: get_usage(&response),
    })
}

fn get_usage(data: &Value) -> Usage {
    let usage = data.get("usage");
    let count = |key: &str| {
        usage
            .and_then(|u| u.get(key))
            .and_then(|v| v.as_u64())
            .map(|v| v as u32)
    };
    Usage::new(count("input_tokens"), count("output_tokens"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOOL_USE_RESPONSE: &str = r#"{
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-20250514",
        "content": [
            {"type": "text", "text": "I'll add those."},
            {"type": "tool_use", "id": "toolu_01", "name": "add", "input": {"a": 15, "b": 7}}
        ],
        "stop_reason": "tool_use",
        "usage": {"input_tokens": 120, "output_tokens": 40}
    }"#;

    fn weather_tool() -> Tool {
        Tool::new(
            "get_weather",
            "Get the weather for a location",
            json!({
                "type": "object",
                "properties": {"location": {"type": "string"}},
                "required": ["location"]
            }),
        )
    }

    #[test]
    fn test_plain_text_message_uses_string_content() {
        let spec = messages_to_anthropic_spec(&[Message::user().with_text("Hello")]);
        assert_eq!(spec, vec![json!({"role": "user", "content": "Hello"})]);
    }

    #[test]
    fn test_tool_round_trip_messages() {
        let messages = vec![
            Message::user().with_text("What's 15 + 7?"),
            Message::assistant()
                .with_text("Adding.")
                .with_tool_request("toolu_01", ToolCall::new("add", json!({"a": 15, "b": 7}))),
            Message::user().with_tool_response("toolu_01", "22"),
        ];

        let spec = messages_to_anthropic_spec(&messages);

        assert_eq!(spec.len(), 3);
        assert_eq!(spec[1]["role"], "assistant");
        assert_eq!(spec[1]["content"][0], json!({"type": "text", "text": "Adding."}));
        assert_eq!(spec[1]["content"][1]["type"], "tool_use");
        assert_eq!(spec[1]["content"][1]["input"], json!({"a": 15, "b": 7}));
        assert_eq!(
            spec[2]["content"],
            json!([{"type": "tool_result", "tool_use_id": "toolu_01", "content": "22"}])
        );
    }

    #[test]
    fn test_tools_to_anthropic_spec() -> Result<(), ProviderError> {
        let spec = tools_to_anthropic_spec(&[weather_tool()])?;
        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["name"], "get_weather");
        assert_eq!(spec[0]["input_schema"]["required"], json!(["location"]));
        Ok(())
    }

    #[test]
    fn test_tools_to_anthropic_spec_duplicate() {
        let result = tools_to_anthropic_spec(&[weather_tool(), weather_tool()]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duplicate tool name"));
    }

    #[test]
    fn test_create_request_optional_fields() -> Result<(), ProviderError> {
        let options = CompletionOptions::new("claude-sonnet-4-20250514").with_max_tokens(1024);
        let payload = create_request(&options, &[Message::user().with_text("Hi")], false)?;
        assert_eq!(payload["max_tokens"], 1024);
        assert!(payload.get("system").is_none());
        assert!(payload.get("temperature").is_none());
        assert!(payload.get("tools").is_none());
        assert!(payload.get("stream").is_none());

        let options = options
            .with_system("You are a pirate.")
            .with_temperature(0.5)
            .with_tools(vec![weather_tool()]);
        let payload = create_request(&options, &[Message::user().with_text("Hi")], true)?;
        assert_eq!(payload["system"], "You are a pirate.");
        assert_eq!(payload["temperature"], 0.5);
        assert_eq!(payload["tools"][0]["name"], "get_weather");
        assert_eq!(payload["stream"], true);
        Ok(())
    }

    #[test]
    fn test_create_request_rejects_bad_temperature() {
        let options = CompletionOptions::default().with_temperature(2.0);
        let result = create_request(&options, &[], false);
        assert!(matches!(result, Err(ProviderError::InvalidRequest(_))));
    }

    #[test]
    fn test_response_to_completion_tool_use() -> Result<(), Box<dyn std::error::Error>> {
        let completion = anthropic_response_to_completion(serde_json::from_str(TOOL_USE_RESPONSE)?)?;

        assert_eq!(completion.stop_reason, StopReason::ToolUse);
        assert_eq!(completion.usage, Usage::new(Some(120), Some(40)));
        assert_eq!(completion.message.role, Role::Assistant);

        let requests: Vec<_> = completion.message.tool_requests().collect();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "toolu_01");
        assert_eq!(requests[0].tool_call.name, "add");
        assert_eq!(requests[0].tool_call.arguments, json!({"a": 15, "b": 7}));
        Ok(())
    }

    #[test]
    fn test_response_to_completion_skips_unknown_blocks() -> Result<(), ProviderError> {
        let response = json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Paris."}
            ],
            "stop_reason": "end_turn"
        });
        let completion = anthropic_response_to_completion(response)?;
        assert_eq!(completion.message.content, vec![MessageContent::text("Paris.")]);
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage, Usage::default());
        Ok(())
    }

    #[test]
    fn test_response_without_content_is_decode_error() {
        let result = anthropic_response_to_completion(json!({"stop_reason": "end_turn"}));
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }
}
