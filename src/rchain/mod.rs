//! Lightweight agent parsing helpers.
//!
//! The module contains typed chat messages, tool calls, generations, and the
//! output parsers that turn a model's reply into the next agent step.

/// Agent actions and finishes.
pub mod agents;
/// Assistant message type.
pub mod ai;
/// Chat message roles and the message union.
pub mod messages;
/// Generation-to-agent-step parsers.
pub mod output_parsers;
/// Model generation wrappers.
pub mod outputs;
/// Tool call payload helpers.
pub mod tools;
/// Chat-completions payload decoding.
pub mod wire;
