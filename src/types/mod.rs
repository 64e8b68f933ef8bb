pub mod message;
pub mod view;

pub use message::{Message, MessageId};
pub use view::ConversationView;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SessionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    Assistant,    // Completion channel
    User,         // Local visitor
    HumanAgent,   // Live-agent desk
    SystemNotice, // Generated by the controller
}

impl Author {
    pub fn as_str(&self) -> &str {
        match self {
            Author::Assistant => "assistant",
            Author::User => "user",
            Author::HumanAgent => "human_agent",
            Author::SystemNotice => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    #[default]
    Assistant,
    Agent,
}

impl ChannelMode {
    pub fn toggled(self) -> Self {
        match self {
            ChannelMode::Assistant => ChannelMode::Agent,
            ChannelMode::Agent => ChannelMode::Assistant,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChannelMode::Assistant => "assistant",
            ChannelMode::Agent => "agent",
        }
    }
}
