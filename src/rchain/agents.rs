//! Results an agent output parser hands back to the agent loop.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::rchain::messages::BaseMessage;

/// Input passed to a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolInput {
    /// A single unnamed value, for tools that take one positional argument.
    Single(Value),
    /// Named arguments.
    Args(Map<String, Value>),
}

impl fmt::Display for ToolInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(Value::String(text)) => f.write_str(text),
            Self::Single(value) => write!(f, "{value}"),
            Self::Args(args) => {
                let rendered = serde_json::to_string(args).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

/// Request to run one tool, produced from one tool call of a model message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolAgentAction {
    /// Name of the tool to run.
    pub tool: String,
    pub tool_input: ToolInput,
    /// Human-readable trace of the decision, suitable for concatenating into a scratchpad.
    pub log: String,
    /// Message the call came from. Every action parsed from one message shares this allocation.
    pub message_log: Arc<BaseMessage>,
    /// Id of the tool call this action answers.
    pub tool_call_id: String,
}

impl ToolAgentAction {
    pub fn source_message(&self) -> &BaseMessage {
        &self.message_log
    }
}

/// Final answer; the agent loop should stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentFinish {
    pub output: String,
    pub log: String,
}

impl AgentFinish {
    /// Values returned to the caller, keyed the way agent executors expect.
    pub fn return_values(&self) -> Map<String, Value> {
        let mut values = Map::new();
        values.insert("output".to_string(), Value::String(self.output.clone()));
        values
    }
}

/// Either the next tool calls to make or the final answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AgentOutput {
    Actions(Vec<ToolAgentAction>),
    Finish(AgentFinish),
}

impl AgentOutput {
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish(_))
    }

    pub fn actions(&self) -> Option<&[ToolAgentAction]> {
        match self {
            Self::Actions(actions) => Some(actions),
            Self::Finish(_) => None,
        }
    }

    pub fn finish(&self) -> Option<&AgentFinish> {
        match self {
            Self::Finish(finish) => Some(finish),
            Self::Actions(_) => None,
        }
    }
}
