//! Outgoing chat messages.

use std::fmt;

/// Embed accent colors.
pub mod color {
    pub const GREEN: u32 = 0x31FF00;
    pub const BRIGHT_GREEN: u32 = 0x00FF00;
    pub const RED: u32 = 0xFF0000;
}

/// Identifier of a message the bot posted. Reactions refer back to it.
pub type MessageId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text {
        message_id: MessageId,
        text: String,
    },
    Embed {
        message_id: MessageId,
        title: String,
        description: String,
        color: u32,
    },
    /// Replaces the content of an embed posted earlier.
    Edit {
        message_id: MessageId,
        title: String,
        description: String,
    },
}

impl Reply {
    #[must_use]
    pub fn message_id(&self) -> MessageId {
        match self {
            Self::Text { message_id, .. }
            | Self::Embed { message_id, .. }
            | Self::Edit { message_id, .. } => *message_id,
        }
    }

    /// Plain text of the message, title first for embeds.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text { text, .. } => text.clone(),
            Self::Embed {
                title, description, ..
            }
            | Self::Edit {
                title, description, ..
            } => format!("{title}\n{description}"),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { message_id, text } => write!(f, "[#{message_id}] {text}"),
            Self::Embed {
                message_id,
                title,
                description,
                ..
            } => write!(f, "[#{message_id}] == {title} ==\n{description}"),
            Self::Edit {
                message_id,
                title,
                description,
            } => write!(f, "[#{message_id} edited] == {title} ==\n{description}"),
        }
    }
}
