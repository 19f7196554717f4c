//! # Chat Events
//!
//! Change notifications emitted by a lifecycle manager so the presentation
//! layer knows when to re-render.

use serde::Serialize;

use super::{Message, MessageId, MessageStatus, ReplySnapshot};

/// Events emitted for an open conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was appended
    MessageAdded {
        /// Conversation the message belongs to
        conversation_id: String,
        /// The new message
        message: Message,
    },

    /// An outgoing message moved to a later status
    StatusChanged {
        /// Conversation the message belongs to
        conversation_id: String,
        /// The updated message
        message_id: MessageId,
        /// Its new status
        status: MessageStatus,
    },

    /// A reaction was added or removed
    ReactionsChanged {
        /// Conversation the message belongs to
        conversation_id: String,
        /// The updated message
        message_id: MessageId,
        /// Reactions after the toggle
        reactions: Vec<String>,
    },

    /// A delete was requested and awaits confirmation
    DeletePending {
        /// Conversation the message belongs to
        conversation_id: String,
        /// The message that would be removed
        message_id: MessageId,
    },

    /// A message was removed after confirmation
    MessageDeleted {
        /// Conversation the message belonged to
        conversation_id: String,
        /// The removed message
        message_id: MessageId,
    },

    /// The reply context was set or cleared
    ReplyContextChanged {
        /// Conversation whose composer changed
        conversation_id: String,
        /// The quoted message, or `None` when cleared
        reply_to: Option<ReplySnapshot>,
    },
}

impl ChatEvent {
    /// Conversation this event belongs to
    pub fn conversation_id(&self) -> &str {
        match self {
            Self::MessageAdded { conversation_id, .. }
            | Self::StatusChanged { conversation_id, .. }
            | Self::ReactionsChanged { conversation_id, .. }
            | Self::DeletePending { conversation_id, .. }
            | Self::MessageDeleted { conversation_id, .. }
            | Self::ReplyContextChanged { conversation_id, .. } => conversation_id,
        }
    }

    /// Message this event refers to, if any
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            Self::MessageAdded { message, .. } => Some(message.id),
            Self::StatusChanged { message_id, .. }
            | Self::ReactionsChanged { message_id, .. }
            | Self::DeletePending { message_id, .. }
            | Self::MessageDeleted { message_id, .. } => Some(*message_id),
            Self::ReplyContextChanged { .. } => None,
        }
    }

    /// Check if the message list itself changed (as opposed to composer state)
    pub fn changes_messages(&self) -> bool {
        matches!(
            self,
            Self::MessageAdded { .. }
                | Self::StatusChanged { .. }
                | Self::ReactionsChanged { .. }
                | Self::MessageDeleted { .. }
        )
    }
}
