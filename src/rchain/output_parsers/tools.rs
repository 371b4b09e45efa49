use std::borrow::Cow;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::rchain::agents::{AgentFinish, AgentOutput, ToolAgentAction, ToolInput};
use crate::rchain::ai::AIMessage;
use crate::rchain::messages::BaseMessage;
use crate::rchain::output_parsers::{MultiActionAgentOutputParser, OutputParserError};
use crate::rchain::outputs::Generation;
use crate::rchain::tools::{RawToolCall, ToolCall};

/// Argument name used when a tool's whole input is one unnamed value.
///
/// Function-calling back ends only accept an object as arguments, so a bare
/// string input gets wrapped as `{"__arg1": <input>}` on the way out. Parsing
/// unwraps it again in [`unwrap_legacy_single_arg`].
pub const LEGACY_SINGLE_ARG_KEY: &str = "__arg1";

const PARSER_TYPE: &str = "tools-agent-output-parser";

/// Where the tool calls of a message come from.
enum ToolCallSource<'a> {
    Structured(&'a [ToolCall]),
    Legacy(&'a [RawToolCall]),
    Finish,
}

impl<'a> ToolCallSource<'a> {
    fn detect(message: &'a AIMessage) -> Self {
        if !message.tool_calls.is_empty() {
            if !message.raw_tool_calls.is_empty() {
                warn!(
                    structured = message.tool_calls.len(),
                    ignored = message.raw_tool_calls.len(),
                    "message carries both structured and raw tool calls; ignoring raw descriptors"
                );
            }
            Self::Structured(&message.tool_calls)
        } else if message.raw_tool_calls.is_empty() {
            Self::Finish
        } else {
            Self::Legacy(&message.raw_tool_calls)
        }
    }
}

/// Turns an assistant message into tool actions, or a finish when it requests no tools.
///
/// Every returned action holds a clone of `message`'s `Arc`, so they all point
/// at the same allocation.
pub fn parse_ai_message_to_tool_action(
    message: &Arc<BaseMessage>,
) -> Result<AgentOutput, OutputParserError> {
    let ai = message
        .as_ai()
        .ok_or_else(|| OutputParserError::UnexpectedMessage {
            kind: message.kind(),
        })?;

    let tool_calls: Cow<'_, [ToolCall]> = match ToolCallSource::detect(ai) {
        ToolCallSource::Structured(calls) => Cow::Borrowed(calls),
        ToolCallSource::Legacy(raw) => {
            debug!(count = raw.len(), "decoding raw tool call descriptors");
            Cow::Owned(
                raw.iter()
                    .map(decode_raw_tool_call)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
        ToolCallSource::Finish => {
            debug!("no tool calls requested; finishing");
            return Ok(AgentOutput::Finish(AgentFinish {
                output: ai.content.clone(),
                log: ai.content.clone(),
            }));
        }
    };

    let actions = tool_calls
        .iter()
        .map(|call| {
            let tool_input = unwrap_legacy_single_arg(&call.args);
            debug!(tool = %call.name, id = %call.id, "parsed tool action");
            ToolAgentAction {
                log: invocation_log(&call.name, &tool_input, &ai.content),
                tool: call.name.clone(),
                tool_input,
                message_log: Arc::clone(message),
                tool_call_id: call.id.clone(),
            }
        })
        .collect();

    Ok(AgentOutput::Actions(actions))
}

fn decode_raw_tool_call(raw: &RawToolCall) -> Result<ToolCall, OutputParserError> {
    let args = match serde_json::from_str::<Value>(raw.function.arguments_or_empty()) {
        Ok(Value::Object(args)) => args,
        Ok(_) => {
            return Err(OutputParserError::NonObjectToolInput {
                function: raw.function.clone(),
            });
        }
        Err(source) => {
            return Err(OutputParserError::InvalidToolInput {
                function: raw.function.clone(),
                source,
            });
        }
    };
    Ok(ToolCall::new(raw.id.clone(), raw.function.name.clone(), args))
}

fn unwrap_legacy_single_arg(args: &Map<String, Value>) -> ToolInput {
    match args.get(LEGACY_SINGLE_ARG_KEY) {
        Some(value) => ToolInput::Single(value.clone()),
        None => ToolInput::Args(args.clone()),
    }
}

fn invocation_log(tool: &str, tool_input: &ToolInput, content: &str) -> String {
    let responded = if content.is_empty() {
        "\n".to_string()
    } else {
        format!("responded: {content}\n")
    };
    format!("\nInvoking: `{tool}` with `{tool_input}`\n{responded}\n")
}

/// Parses chat generations whose message may request tool calls.
///
/// Only the first generation is read. Raw text is rejected: tool calls only
/// exist on chat messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolsAgentOutputParser;

impl ToolsAgentOutputParser {
    pub fn new() -> Self {
        Self
    }
}

impl MultiActionAgentOutputParser for ToolsAgentOutputParser {
    fn parser_type(&self) -> &'static str {
        PARSER_TYPE
    }

    fn parse_result(
        &self,
        result: &[Generation],
        _partial: bool,
    ) -> Result<AgentOutput, OutputParserError> {
        match result.first() {
            Some(Generation::Chat(generation)) => {
                parse_ai_message_to_tool_action(&generation.message)
            }
            Some(other) => Err(OutputParserError::NotChatGeneration { kind: other.kind() }),
            None => Err(OutputParserError::EmptyGenerations),
        }
    }

    fn parse(&self, _text: &str) -> Result<AgentOutput, OutputParserError> {
        Err(OutputParserError::TextUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Map, Value, json};

    use super::{LEGACY_SINGLE_ARG_KEY, ToolsAgentOutputParser, parse_ai_message_to_tool_action};
    use crate::rchain::agents::{AgentOutput, ToolInput};
    use crate::rchain::ai::AIMessage;
    use crate::rchain::messages::{BaseMessage, MessageKind};
    use crate::rchain::output_parsers::{
        ErrorKind, MultiActionAgentOutputParser, OutputParserError,
    };
    use crate::rchain::outputs::Generation;
    use crate::rchain::tools::{FunctionCall, RawToolCall, ToolCall};

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn shared(message: AIMessage) -> Arc<BaseMessage> {
        Arc::new(BaseMessage::Ai(message))
    }

    fn expect_actions(output: AgentOutput) -> Vec<crate::rchain::agents::ToolAgentAction> {
        match output {
            AgentOutput::Actions(actions) => actions,
            AgentOutput::Finish(finish) => panic!("expected actions, got finish {finish:?}"),
        }
    }

    #[test]
    fn message_without_tool_calls_finishes_with_content() {
        let message = shared(AIMessage::new("The answer is 4."));
        let output = parse_ai_message_to_tool_action(&message).expect("parse should succeed");

        let finish = output.finish().expect("expected finish");
        assert_eq!(finish.output, "The answer is 4.");
        assert_eq!(finish.log, "The answer is 4.");
    }

    #[test]
    fn empty_content_without_tool_calls_still_finishes() {
        let message = shared(AIMessage::new(""));
        let output = parse_ai_message_to_tool_action(&message).expect("parse should succeed");
        assert_eq!(output.finish().map(|finish| finish.output.as_str()), Some(""));
    }

    #[test]
    fn structured_calls_map_one_to_one_in_order() {
        let message = shared(AIMessage::new("").with_tool_calls(vec![
            ToolCall::new("call_a", "search", args(json!({"q": "rust"}))),
            ToolCall::new("call_b", "calculator", args(json!({"expr": "2+2"}))),
            ToolCall::new("call_c", "search", args(json!({"q": "serde"}))),
        ]));

        let actions = expect_actions(parse_ai_message_to_tool_action(&message).expect("parse"));

        let ids = actions
            .iter()
            .map(|action| action.tool_call_id.as_str())
            .collect::<Vec<_>>();
        let tools = actions
            .iter()
            .map(|action| action.tool.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["call_a", "call_b", "call_c"]);
        assert_eq!(tools, ["search", "calculator", "search"]);
    }

    #[test]
    fn sentinel_argument_is_unwrapped() {
        let message = shared(AIMessage::new("").with_tool_calls(vec![ToolCall::new(
            "call_1",
            "echo",
            args(json!({LEGACY_SINGLE_ARG_KEY: "hello"})),
        )]));

        let actions = expect_actions(parse_ai_message_to_tool_action(&message).expect("parse"));
        assert_eq!(actions[0].tool_input, ToolInput::Single(json!("hello")));
    }

    #[test]
    fn named_arguments_pass_through_unchanged() {
        let message = shared(AIMessage::new("").with_tool_calls(vec![ToolCall::new(
            "call_1",
            "add",
            args(json!({"a": 1, "b": 2})),
        )]));

        let actions = expect_actions(parse_ai_message_to_tool_action(&message).expect("parse"));
        assert_eq!(actions[0].tool_input, ToolInput::Args(args(json!({"a": 1, "b": 2}))));
    }

    #[test]
    fn log_includes_content_when_present() {
        let message = shared(AIMessage::new("Let me look that up.").with_tool_calls(vec![
            ToolCall::new("call_1", "search", args(json!({LEGACY_SINGLE_ARG_KEY: "rust"}))),
        ]));

        let actions = expect_actions(parse_ai_message_to_tool_action(&message).expect("parse"));
        assert_eq!(
            actions[0].log,
            "\nInvoking: `search` with `rust`\nresponded: Let me look that up.\n\n"
        );
    }

    #[test]
    fn log_without_content_ends_in_blank_lines() {
        let message = shared(AIMessage::new("").with_tool_calls(vec![ToolCall::new(
            "call_1",
            "add",
            args(json!({"a": 1})),
        )]));

        let actions = expect_actions(parse_ai_message_to_tool_action(&message).expect("parse"));
        assert_eq!(actions[0].log, "\nInvoking: `add` with `{\"a\":1}`\n\n\n");
    }

    #[test]
    fn actions_share_the_source_message() {
        let message = shared(AIMessage::new("").with_tool_calls(vec![
            ToolCall::new("call_1", "a", Map::new()),
            ToolCall::new("call_2", "b", Map::new()),
        ]));

        let actions = expect_actions(parse_ai_message_to_tool_action(&message).expect("parse"));
        assert!(Arc::ptr_eq(&actions[0].message_log, &message));
        assert!(Arc::ptr_eq(&actions[1].message_log, &message));
    }

    #[test]
    fn raw_descriptors_are_decoded_when_no_structured_calls() {
        let message = shared(AIMessage::new("").with_raw_tool_calls(vec![
            RawToolCall::new("call_1", FunctionCall::new("search", r#"{"q": "rust"}"#)),
            RawToolCall::new("call_2", FunctionCall::new("echo", r#"{"__arg1": "hi"}"#)),
        ]));

        let actions = expect_actions(parse_ai_message_to_tool_action(&message).expect("parse"));
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].tool_call_id, "call_1");
        assert_eq!(actions[0].tool_input, ToolInput::Args(args(json!({"q": "rust"}))));
        assert_eq!(actions[1].tool_input, ToolInput::Single(json!("hi")));
    }

    #[test]
    fn empty_raw_arguments_decode_to_empty_object() {
        let message = shared(AIMessage::new("").with_raw_tool_calls(vec![RawToolCall::new(
            "call_1",
            FunctionCall::new("list_files", ""),
        )]));

        let actions = expect_actions(parse_ai_message_to_tool_action(&message).expect("parse"));
        assert_eq!(actions[0].tool_input, ToolInput::Args(Map::new()));
    }

    #[test]
    fn invalid_raw_arguments_fail_naming_the_function() {
        let message = shared(AIMessage::new("").with_raw_tool_calls(vec![
            RawToolCall::new("call_1", FunctionCall::new("ok", "{}")),
            RawToolCall::new("call_2", FunctionCall::new("broken_tool", "{invalid")),
        ]));

        let err = parse_ai_message_to_tool_action(&message).expect_err("parse should fail");
        assert!(matches!(err, OutputParserError::InvalidToolInput { .. }));
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
        assert!(err.is_retryable_by_reprompt());
        let text = err.to_string();
        assert!(text.contains("broken_tool"), "{text}");
        assert!(text.contains("not valid JSON"), "{text}");
    }

    #[test]
    fn non_object_raw_arguments_are_rejected() {
        let message = shared(AIMessage::new("").with_raw_tool_calls(vec![RawToolCall::new(
            "call_1",
            FunctionCall::new("sum", "[1, 2]"),
        )]));

        let err = parse_ai_message_to_tool_action(&message).expect_err("parse should fail");
        assert!(matches!(err, OutputParserError::NonObjectToolInput { .. }));
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
    }

    #[test]
    fn structured_calls_take_precedence_over_raw_descriptors() {
        let message = shared(
            AIMessage::new("")
                .with_tool_calls(vec![ToolCall::new("call_s", "structured", Map::new())])
                .with_raw_tool_calls(vec![RawToolCall::new(
                    "call_r",
                    FunctionCall::new("raw", "{invalid"),
                )]),
        );

        let actions = expect_actions(parse_ai_message_to_tool_action(&message).expect("parse"));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].tool, "structured");
    }

    #[test]
    fn non_ai_message_is_a_usage_error() {
        let message = Arc::new(BaseMessage::human("hello"));
        let err = parse_ai_message_to_tool_action(&message).expect_err("parse should fail");

        assert!(matches!(
            err,
            OutputParserError::UnexpectedMessage {
                kind: MessageKind::Human
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn parsing_twice_gives_equal_results() {
        let message = shared(AIMessage::new("thinking").with_tool_calls(vec![ToolCall::new(
            "call_1",
            "search",
            args(json!({"q": "rust"})),
        )]));

        let first = parse_ai_message_to_tool_action(&message).expect("parse");
        let second = parse_ai_message_to_tool_action(&message).expect("parse");
        assert_eq!(first, second);
    }

    #[test]
    fn parser_reads_only_the_first_chat_generation() {
        let parser = ToolsAgentOutputParser::new();
        let generations = vec![
            Generation::chat(AIMessage::new("first")),
            Generation::chat(AIMessage::new("second")),
        ];

        let output = parser.parse_result(&generations, false).expect("parse");
        assert_eq!(output.finish().map(|finish| finish.output.as_str()), Some("first"));
    }

    #[test]
    fn partial_flag_does_not_change_result() {
        let parser = ToolsAgentOutputParser::new();
        let generations = vec![Generation::chat(AIMessage::new("").with_tool_calls(vec![
            ToolCall::new("call_1", "search", Map::new()),
        ]))];

        assert_eq!(
            parser.parse_result(&generations, true).expect("parse"),
            parser.parse_result(&generations, false).expect("parse")
        );
    }

    #[test]
    fn parser_rejects_text_generation() {
        let parser = ToolsAgentOutputParser::new();
        let err = parser
            .parse_result(&[Generation::text("hi")], false)
            .expect_err("text generation should be rejected");

        assert!(matches!(
            err,
            OutputParserError::NotChatGeneration { kind: "Generation" }
        ));
        assert!(err.to_string().contains("ChatGeneration"));
    }

    #[test]
    fn parser_rejects_empty_generations() {
        let err = ToolsAgentOutputParser::new()
            .parse_result(&[], false)
            .expect_err("empty input should be rejected");
        assert!(matches!(err, OutputParserError::EmptyGenerations));
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn parse_text_is_unsupported() {
        let parser = ToolsAgentOutputParser::new();
        for text in ["", "Final answer: 4", r#"{"tool": "search"}"#] {
            let err = parser.parse(text).expect_err("text parsing is unsupported");
            assert!(matches!(err, OutputParserError::TextUnsupported));
            assert_eq!(err.kind(), ErrorKind::Unsupported);
        }
    }

    #[test]
    fn parser_type_is_stable() {
        assert_eq!(
            ToolsAgentOutputParser::new().parser_type(),
            "tools-agent-output-parser"
        );
    }
}
