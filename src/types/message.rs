use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Author, Direction};

/// Position of an entry in its transcript. Assigned by the controller under
/// the same write that appends the entry, so ids are strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub author: Author,
    pub direction: Direction,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: MessageId, author: Author, text: impl Into<String>) -> Self {
        let direction = match author {
            Author::User => Direction::Outgoing,
            Author::Assistant | Author::HumanAgent | Author::SystemNotice => Direction::Incoming,
        };

        Self {
            id,
            text: text.into(),
            author,
            direction,
            timestamp: Utc::now(),
        }
    }

    pub fn is_notice(&self) -> bool {
        self.author == Author::SystemNotice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_follows_author() {
        let user = Message::new(MessageId(1), Author::User, "hi");
        assert_eq!(user.direction, Direction::Outgoing);

        for author in [Author::Assistant, Author::HumanAgent, Author::SystemNotice] {
            let msg = Message::new(MessageId(2), author, "x");
            assert_eq!(msg.direction, Direction::Incoming);
        }
    }

    #[test]
    fn test_ids_order_by_sequence() {
        assert!(MessageId(3) < MessageId(10));
        assert_eq!(MessageId(7).to_string(), "#7");
    }
}
