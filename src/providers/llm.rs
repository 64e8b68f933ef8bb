use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Author, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: Role,
    pub content: String,
}

impl CompletionMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for CompletionMessage {
    // Only assistant replies keep their role; everything else the visitor saw
    // is replayed as user context.
    fn from(message: &Message) -> Self {
        match message.author {
            Author::Assistant => Self::assistant(message.text.clone()),
            Author::User | Author::HumanAgent | Author::SystemNotice => {
                Self::user(message.text.clone())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion endpoint unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("completion provider error: {0}")]
    Upstream(String),

    #[error("malformed completion payload: {0}")]
    Malformed(String),
}

impl CompletionError {
    /// Failures where nothing usable came back from the endpoint at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CompletionError::Network(_))
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: Vec<CompletionMessage>) -> Result<String, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageId;

    #[test]
    fn test_message_constructors() {
        let sys = CompletionMessage::system("persona");
        assert_eq!(sys.role, Role::System);
        assert_eq!(sys.content, "persona");

        let user = CompletionMessage::user("hello");
        assert_eq!(user.role, Role::User);

        let assistant = CompletionMessage::assistant("hi");
        assert_eq!(assistant.role, Role::Assistant);
    }

    #[test]
    fn test_transcript_roles() {
        let reply = Message::new(MessageId(1), Author::Assistant, "Hi there");
        let agent = Message::new(MessageId(2), Author::HumanAgent, "Agent here");
        let notice = Message::new(MessageId(3), Author::SystemNotice, "Switched");

        assert_eq!(CompletionMessage::from(&reply).role, Role::Assistant);
        assert_eq!(CompletionMessage::from(&agent).role, Role::User);
        assert_eq!(CompletionMessage::from(&notice).role, Role::User);
    }

    #[test]
    fn test_role_wire_names() {
        let json = serde_json::to_value(CompletionMessage::system("x")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "x");
    }
}
