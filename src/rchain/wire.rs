//! Decoding of chat-completions payloads into typed messages.
//!
//! Accepts either a full response (`{"choices": [...]}`) or a bare message
//! object. Tool calls in the provider's `{id, type, function: {name,
//! arguments}}` shape are kept as raw descriptors; entries already shaped as
//! `{id, name, args}` become structured calls.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::rchain::ai::AIMessage;
use crate::rchain::messages::BaseMessage;
use crate::rchain::outputs::Generation;
use crate::rchain::tools::{FunctionCall, RawToolCall, ToolCall};

/// Reasons a payload cannot be turned into a generation.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload has no choices")]
    NoChoices,
    #[error("payload is neither a chat-completions response nor a message object")]
    UnrecognizedPayload,
    #[error("unknown message role '{0}'")]
    UnknownRole(String),
    #[error("tool call #{index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("tool call #{index} has `args` that is not a JSON object")]
    InvalidArgs { index: usize },
    #[error("additional_kwargs tool call #{index} is not a `function` descriptor")]
    NotRawDescriptor { index: usize },
    #[error("tool message is missing `tool_call_id`")]
    MissingToolCallId,
}

/// Parses payload text into the first generation it describes.
pub fn generation_from_str(raw: &str) -> Result<Generation, WireError> {
    let value: Value = serde_json::from_str(raw)?;
    generation_from_json(&value)
}

/// Reads the first generation of a response, or wraps a bare message object.
pub fn generation_from_json(value: &Value) -> Result<Generation, WireError> {
    if let Some(choices) = value.get("choices") {
        let choice = choices
            .as_array()
            .and_then(|choices| choices.first())
            .ok_or(WireError::NoChoices)?;
        if let Some(message) = choice.get("message") {
            return Ok(Generation::chat(message_from_json(message)?));
        }
        if let Some(text) = choice.get("text").and_then(Value::as_str) {
            return Ok(Generation::text(text));
        }
        return Err(WireError::UnrecognizedPayload);
    }

    if value.get("role").is_some() || value.get("content").is_some() {
        return Ok(Generation::chat(message_from_json(value)?));
    }

    Err(WireError::UnrecognizedPayload)
}

/// Converts one message object into a [`BaseMessage`]. A missing role reads as assistant.
pub fn message_from_json(message: &Value) -> Result<BaseMessage, WireError> {
    let content = content_text(&message["content"]);
    match message["role"].as_str().unwrap_or("assistant") {
        "assistant" | "ai" => {
            let (tool_calls, mut raw_tool_calls) = parse_tool_calls(&message["tool_calls"])?;
            raw_tool_calls.extend(parse_raw_tool_calls(
                &message["additional_kwargs"]["tool_calls"],
            )?);
            Ok(BaseMessage::Ai(
                AIMessage::new(content)
                    .with_tool_calls(tool_calls)
                    .with_raw_tool_calls(raw_tool_calls),
            ))
        }
        "user" | "human" => Ok(BaseMessage::human(content)),
        "system" => Ok(BaseMessage::system(content)),
        "tool" => {
            let tool_call_id = message["tool_call_id"]
                .as_str()
                .ok_or(WireError::MissingToolCallId)?;
            Ok(BaseMessage::tool(tool_call_id, content))
        }
        other => Err(WireError::UnknownRole(other.to_string())),
    }
}

fn content_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}

fn parse_tool_calls(calls: &Value) -> Result<(Vec<ToolCall>, Vec<RawToolCall>), WireError> {
    let mut tool_calls = Vec::new();
    let mut raw_tool_calls = Vec::new();
    let Some(calls) = calls.as_array() else {
        return Ok((tool_calls, raw_tool_calls));
    };

    for (index, call) in calls.iter().enumerate() {
        if call.get("function").is_some() {
            raw_tool_calls.push(raw_tool_call(index, call)?);
        } else {
            let id = call_id(index, call)?;
            let name = call["name"]
                .as_str()
                .ok_or(WireError::MissingField { index, field: "name" })?;
            let args = match &call["args"] {
                Value::Null => Map::new(),
                Value::Object(args) => args.clone(),
                _ => return Err(WireError::InvalidArgs { index }),
            };
            tool_calls.push(ToolCall::new(id, name, args));
        }
    }

    Ok((tool_calls, raw_tool_calls))
}

/// Reads a list that may only hold `function` descriptors.
fn parse_raw_tool_calls(calls: &Value) -> Result<Vec<RawToolCall>, WireError> {
    let Some(calls) = calls.as_array() else {
        return Ok(Vec::new());
    };

    calls
        .iter()
        .enumerate()
        .map(|(index, call)| {
            if call.get("function").is_none() {
                return Err(WireError::NotRawDescriptor { index });
            }
            raw_tool_call(index, call)
        })
        .collect()
}

fn raw_tool_call(index: usize, call: &Value) -> Result<RawToolCall, WireError> {
    let id = call_id(index, call)?;
    let function = &call["function"];
    let name = function["name"].as_str().ok_or(WireError::MissingField {
        index,
        field: "function.name",
    })?;
    let arguments = match &function["arguments"] {
        Value::Null => None,
        Value::String(raw) => Some(raw.clone()),
        other => Some(other.to_string()),
    };
    Ok(RawToolCall::new(
        id,
        FunctionCall {
            name: name.to_string(),
            arguments,
        },
    ))
}

fn call_id(index: usize, call: &Value) -> Result<&str, WireError> {
    call["id"]
        .as_str()
        .ok_or(WireError::MissingField { index, field: "id" })
}
