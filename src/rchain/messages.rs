use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rchain::ai::AIMessage;

/// Role of a message in a chat transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Human/user role.
    Human,
    /// System prompt role.
    System,
    /// Assistant role.
    Ai,
    /// Tool result role.
    Tool,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::System => "system",
            Self::Ai => "ai",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-authored text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanMessage {
    pub content: String,
}

/// System prompt text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub content: String,
}

/// Result of a tool invocation, tied back to the call that requested it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMessage {
    pub tool_call_id: String,
    pub content: String,
}

/// Any message that can appear in a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum BaseMessage {
    Human(HumanMessage),
    System(SystemMessage),
    Ai(AIMessage),
    Tool(ToolMessage),
}

impl BaseMessage {
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human(HumanMessage {
            content: content.into(),
        })
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::System(SystemMessage {
            content: content.into(),
        })
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool(ToolMessage {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        })
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Human(_) => MessageKind::Human,
            Self::System(_) => MessageKind::System,
            Self::Ai(_) => MessageKind::Ai,
            Self::Tool(_) => MessageKind::Tool,
        }
    }

    /// Returns the assistant message, if this is one.
    pub fn as_ai(&self) -> Option<&AIMessage> {
        match self {
            Self::Ai(message) => Some(message),
            _ => None,
        }
    }

    /// Text content regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Self::Human(message) => &message.content,
            Self::System(message) => &message.content,
            Self::Ai(message) => &message.content,
            Self::Tool(message) => &message.content,
        }
    }
}

impl From<AIMessage> for BaseMessage {
    fn from(message: AIMessage) -> Self {
        Self::Ai(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{BaseMessage, MessageKind};
    use crate::rchain::ai::AIMessage;
    use serde_json::json;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(BaseMessage::human("hi").kind(), MessageKind::Human);
        assert_eq!(BaseMessage::system("be brief").kind(), MessageKind::System);
        assert_eq!(BaseMessage::tool("call_1", "42").kind(), MessageKind::Tool);
        assert_eq!(BaseMessage::from(AIMessage::new("ok")).kind(), MessageKind::Ai);
    }

    #[test]
    fn as_ai_only_matches_assistant_messages() {
        assert!(BaseMessage::human("hi").as_ai().is_none());
        let message = BaseMessage::from(AIMessage::new("done"));
        assert_eq!(message.as_ai().map(|ai| ai.content.as_str()), Some("done"));
    }

    #[test]
    fn serializes_with_role_tag() {
        let value = serde_json::to_value(BaseMessage::tool("call_1", "42"))
            .expect("message should serialize");
        assert_eq!(
            value,
            json!({"role": "tool", "tool_call_id": "call_1", "content": "42"})
        );
    }
}
