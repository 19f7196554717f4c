//! # Messaging Module
//!
//! Message model and optimistic delivery lifecycle for an open chat.
//!
//! ## Status Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      OUTGOING MESSAGE LIFECYCLE                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  send("See you at the courts!")                                        │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  ┌────────┐   t0 + 1000ms    ┌───────────┐   t0 + 2000ms   ┌──────┐    │
//! │  │  Sent  │ ───────────────► │ Delivered │ ──────────────► │ Read │    │
//! │  └────────┘  delivery timer  └───────────┘   read timer    └──────┘    │
//! │                                                                         │
//! │  Both timers are measured from send time (t0) and run independently.  │
//! │  The store refuses any transition that would move a status backwards, │
//! │  and deleting the message (or closing the chat) cancels both timers.  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   MessageLifecycleManager ──► SharedStore (Arc<RwLock<Store>>)          │
//! │            │                        ▲                                   │
//! │            │ track(key, sink)       │ advance(key, status)              │
//! │            ▼                        │                                   │
//! │   DeliveryTracker ─────────────► StatusSink ──► broadcast<ChatEvent>   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod collaborators;
pub mod delivery;
pub mod events;
pub mod lifecycle;
pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use collaborators::{Clipboard, DeleteConfirmation, MemoryClipboard};
pub use delivery::{
    DeliveryTracker, ManualDeliveryTracker, MessageKey, SimulatedDeliveryTracker, StatusSink,
};
pub use events::ChatEvent;
pub use lifecycle::{ActionOutcome, MessageLifecycleManager};
pub use store::{ConversationStore, SharedStore, StatusUpdate};

/// Emoji offered in the long-press reaction bar
pub const QUICK_REACTIONS: [&str; 6] = ["👍", "❤️", "😂", "😮", "😢", "🙏"];

/// Message identifier, unique within its conversation.
///
/// Freshly sent messages use their creation time in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery status of a message we authored.
///
/// Variants are declared in lifecycle order, so `Ord` reflects how far a
/// message has progressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Not tracked (received messages)
    #[default]
    None,
    /// Appended locally
    Sent,
    /// Recipient's device acknowledged it
    Delivered,
    /// Recipient opened it
    Read,
}

impl MessageStatus {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }

    /// Receipt ticks shown next to the bubble timestamp
    pub fn ticks(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Sent => "✓",
            Self::Delivered | Self::Read => "✓✓",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copy of the message being replied to.
///
/// Captured at send time, so later edits or deletion of the original don't
/// change the quoted preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplySnapshot {
    /// Id of the quoted message
    pub id: MessageId,
    /// Its text at the time of quoting
    pub text: String,
    /// Its sender display name
    pub sender: String,
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,
    /// Message body, never blank
    pub text: String,
    /// Display timestamp (`"11:28 AM"`, `"Yesterday"`, ...)
    pub timestamp: String,
    /// Whether the local user wrote it
    pub is_sender: bool,
    /// Sender display name
    pub sender: String,
    /// Delivery status (only meaningful for our own messages)
    #[serde(default)]
    pub status: MessageStatus,
    /// Reactions, in the order they were first added
    #[serde(default)]
    pub reactions: Vec<String>,
    /// Quoted message, if this is a reply
    #[serde(default)]
    pub reply_to: Option<ReplySnapshot>,
}

impl Message {
    /// Create a new outgoing message in the `Sent` state
    pub fn outgoing(
        id: MessageId,
        text: impl Into<String>,
        sender: impl Into<String>,
        reply_to: Option<ReplySnapshot>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            timestamp: crate::time::display_time_now(),
            is_sender: true,
            sender: sender.into(),
            status: MessageStatus::Sent,
            reactions: Vec::new(),
            reply_to,
        }
    }

    /// Snapshot used when quoting this message in a reply
    pub fn snapshot(&self) -> ReplySnapshot {
        ReplySnapshot {
            id: self.id,
            text: self.text.clone(),
            sender: self.sender.clone(),
        }
    }

    /// Move the status forward.
    ///
    /// Returns `false` and leaves the message alone when `next` is not
    /// later than the current status.
    pub fn advance_status(&mut self, next: MessageStatus) -> bool {
        if next <= self.status {
            return false;
        }
        self.status = next;
        true
    }

    /// Add `emoji` if absent, remove it if present.
    ///
    /// Returns `true` when the emoji was added.
    pub fn toggle_reaction(&mut self, emoji: &str) -> bool {
        if let Some(pos) = self.reactions.iter().position(|r| r == emoji) {
            self.reactions.remove(pos);
            false
        } else {
            self.reactions.push(emoji.to_string());
            true
        }
    }

    /// Check whether `emoji` is currently on this message
    pub fn has_reaction(&self, emoji: &str) -> bool {
        self.reactions.iter().any(|r| r == emoji)
    }
}

/// Long-press actions offered on a message bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageAction {
    /// Quote it in the next send
    Reply,
    /// Copy its text to the clipboard
    Copy,
    /// Forward it
    Forward,
    /// Edit (not supported; ignored)
    Edit,
    /// Message info (not supported; ignored)
    Info,
    /// Star (not supported; ignored)
    Star,
    /// Delete after confirmation
    Delete,
}

impl MessageAction {
    /// Every action, in menu order
    pub const ALL: [MessageAction; 7] = [
        Self::Reply,
        Self::Copy,
        Self::Forward,
        Self::Edit,
        Self::Info,
        Self::Star,
        Self::Delete,
    ];

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reply => "Reply",
            Self::Copy => "Copy",
            Self::Forward => "Forward",
            Self::Edit => "Edit",
            Self::Info => "Info",
            Self::Star => "Star",
            Self::Delete => "Delete",
        }
    }

    /// Whether the menu renders this action as destructive
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

impl std::str::FromStr for MessageAction {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| crate::Error::UnknownAction(s.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Message {
        Message::outgoing(MessageId(42), "Ready for doubles?", "You", None)
    }

    #[test]
    fn test_outgoing_message_starts_sent() {
        let message = sample();
        assert_eq!(message.status, MessageStatus::Sent);
        assert!(message.is_sender);
        assert!(message.reactions.is_empty());
        assert!(message.reply_to.is_none());
    }

    #[test]
    fn test_status_ordering() {
        assert!(MessageStatus::None < MessageStatus::Sent);
        assert!(MessageStatus::Sent < MessageStatus::Delivered);
        assert!(MessageStatus::Delivered < MessageStatus::Read);
    }

    #[test]
    fn test_status_never_regresses() {
        let mut message = sample();
        assert!(message.advance_status(MessageStatus::Read));
        assert!(!message.advance_status(MessageStatus::Delivered));
        assert!(!message.advance_status(MessageStatus::Read));
        assert_eq!(message.status, MessageStatus::Read);
    }

    #[test]
    fn test_reaction_toggle() {
        let mut message = sample();
        assert!(message.toggle_reaction("👍"));
        assert!(message.toggle_reaction("🔥"));
        assert!(message.has_reaction("👍"));

        assert!(!message.toggle_reaction("👍"));
        assert!(!message.has_reaction("👍"));
        assert_eq!(message.reactions, vec!["🔥".to_string()]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut message = sample();
        let snapshot = message.snapshot();
        message.text = "edited".to_string();

        assert_eq!(snapshot.id, MessageId(42));
        assert_eq!(snapshot.text, "Ready for doubles?");
        assert_eq!(snapshot.sender, "You");
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&MessageStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
        assert_eq!(MessageStatus::Read.ticks(), "✓✓");
        assert_eq!(MessageStatus::None.ticks(), "");
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("reply".parse::<MessageAction>().unwrap(), MessageAction::Reply);
        assert_eq!("DELETE".parse::<MessageAction>().unwrap(), MessageAction::Delete);
        assert!("pin".parse::<MessageAction>().is_err());
        assert!(MessageAction::Delete.is_destructive());
        assert!(!MessageAction::Copy.is_destructive());
    }
}
