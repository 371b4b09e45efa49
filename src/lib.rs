//! Turns tool-calling model replies into agent actions.
//!
//! The parsing lives in [`rchain`]; [`commands`] and [`config`] back the
//! `rcagent` CLI.

pub mod commands;
pub mod config;
pub mod rchain;

pub use rchain::agents::{AgentFinish, AgentOutput, ToolAgentAction, ToolInput};
pub use rchain::output_parsers::tools::{ToolsAgentOutputParser, parse_ai_message_to_tool_action};
pub use rchain::output_parsers::{ErrorKind, MultiActionAgentOutputParser, OutputParserError};
