//! Parsers that turn model generations into agent decisions.

use thiserror::Error;

use crate::rchain::agents::AgentOutput;
use crate::rchain::messages::MessageKind;
use crate::rchain::outputs::Generation;
use crate::rchain::tools::FunctionCall;

/// Tool-calling agent parser.
pub mod tools;

/// Broad class of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller passed something this parser never accepts.
    Usage,
    /// The model produced output that could not be understood.
    MalformedOutput,
    /// The requested entry point is not available for this parser.
    Unsupported,
}

/// Failure to turn a generation into an agent step.
#[derive(Debug, Error)]
pub enum OutputParserError {
    #[error("expected an AI message, got a {kind} message")]
    UnexpectedMessage { kind: MessageKind },
    #[error("this output parser only works on ChatGeneration output, got {kind}")]
    NotChatGeneration { kind: &'static str },
    #[error("no generations to parse")]
    EmptyGenerations,
    #[error("could not parse tool input: {function} because the `arguments` is not valid JSON")]
    InvalidToolInput {
        function: FunctionCall,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not parse tool input: {function} because the `arguments` is not a JSON object")]
    NonObjectToolInput { function: FunctionCall },
    #[error("can only parse messages")]
    TextUnsupported,
}

impl OutputParserError {
    /// Classifies the failure as caller misuse, bad model output, or an unsupported entry point.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedMessage { .. }
            | Self::NotChatGeneration { .. }
            | Self::EmptyGenerations => ErrorKind::Usage,
            Self::InvalidToolInput { .. } | Self::NonObjectToolInput { .. } => {
                ErrorKind::MalformedOutput
            }
            Self::TextUnsupported => ErrorKind::Unsupported,
        }
    }

    /// True when asking the model again could produce parseable output.
    pub fn is_retryable_by_reprompt(&self) -> bool {
        self.kind() == ErrorKind::MalformedOutput
    }
}

/// Parser that may turn one generation into several tool actions.
pub trait MultiActionAgentOutputParser {
    /// Short identifier for the parser type.
    fn parser_type(&self) -> &'static str;

    /// Parses the generations of one model call. `partial` marks streamed, incomplete output.
    fn parse_result(
        &self,
        result: &[Generation],
        partial: bool,
    ) -> Result<AgentOutput, OutputParserError>;

    /// Parses raw model text.
    fn parse(&self, text: &str) -> Result<AgentOutput, OutputParserError>;
}
