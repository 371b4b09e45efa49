use serde::{Deserialize, Serialize};

use crate::rchain::tools::{RawToolCall, ToolCall};

/// Assistant message returned by chat models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AIMessage {
    /// Natural language content.
    #[serde(default)]
    pub content: String,
    /// Structured tool call requests emitted by the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool calls still in the provider's raw descriptor shape.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub raw_tool_calls: Vec<RawToolCall>,
}

impl AIMessage {
    /// Creates a plain-text assistant message.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Attaches structured tool calls.
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    /// Attaches raw provider tool-call descriptors.
    pub fn with_raw_tool_calls(mut self, raw_tool_calls: Vec<RawToolCall>) -> Self {
        self.raw_tool_calls = raw_tool_calls;
        self
    }
}
