use std::sync::Arc;

use crate::rchain::messages::BaseMessage;

/// Completion produced by a plain text model.
#[derive(Debug, Clone, PartialEq)]
pub struct TextGeneration {
    pub text: String,
}

/// Completion produced by a chat model.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatGeneration {
    /// Shared so parsed results can point back at it without copying.
    pub message: Arc<BaseMessage>,
}

impl ChatGeneration {
    pub fn new(message: impl Into<BaseMessage>) -> Self {
        Self {
            message: Arc::new(message.into()),
        }
    }
}

/// One candidate output of a model call.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    Text(TextGeneration),
    Chat(ChatGeneration),
}

impl Generation {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextGeneration { text: text.into() })
    }

    pub fn chat(message: impl Into<BaseMessage>) -> Self {
        Self::Chat(ChatGeneration::new(message))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "Generation",
            Self::Chat(_) => "ChatGeneration",
        }
    }
}
