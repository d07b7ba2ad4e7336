//! Inbound activities handled by the bot.

use crate::channels::IncomingMessage;

/// What happened in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityKind {
    /// The user sent text.
    Message { text: String },
    /// Members joined the conversation.
    ConversationUpdate { members_added: Vec<String> },
    /// Any other channel event (typing, reactions, ...), by name.
    Other(String),
}

/// One inbound activity addressed to the bot.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub conversation_id: String,
    pub user_id: String,
    pub kind: ActivityKind,
}

impl Activity {
    pub fn message(conversation_id: &str, user_id: &str, text: &str) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            user_id: user_id.to_string(),
            kind: ActivityKind::Message {
                text: text.to_string(),
            },
        }
    }
}

impl From<&IncomingMessage> for Activity {
    fn from(msg: &IncomingMessage) -> Self {
        Self::message(&msg.conversation_id, &msg.user_id, &msg.content)
    }
}
