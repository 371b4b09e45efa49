use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool call emitted by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-generated call id.
    pub id: String,
    /// Tool/function name.
    pub name: String,
    /// Arguments payload.
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    /// Creates a structured tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    /// Re-encodes this call as a legacy descriptor with JSON-string arguments.
    pub fn to_raw(&self) -> RawToolCall {
        RawToolCall {
            id: self.id.clone(),
            kind: default_call_kind(),
            function: FunctionCall {
                name: self.name.clone(),
                arguments: Some(Value::Object(self.args.clone()).to_string()),
            },
        }
    }
}

/// Function half of a legacy tool-call descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the provider sent it.
    #[serde(default)]
    pub arguments: Option<String>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Some(arguments.into()),
        }
    }

    /// Raw argument text, with missing or empty arguments read as `{}`.
    pub fn arguments_or_empty(&self) -> &str {
        match self.arguments.as_deref() {
            Some(raw) if !raw.is_empty() => raw,
            _ => "{}",
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

/// Tool call in the older chat-completions shape: `{id, type, function: {name, arguments}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_call_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

impl RawToolCall {
    pub fn new(id: impl Into<String>, function: FunctionCall) -> Self {
        Self {
            id: id.into(),
            kind: default_call_kind(),
            function,
        }
    }
}

fn default_call_kind() -> String {
    "function".to_string()
}
