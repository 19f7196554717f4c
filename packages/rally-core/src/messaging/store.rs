//! # Conversation Store
//!
//! In-memory, conversation-keyed message collections. The store is owned
//! explicitly by whoever manages the session and handed to lifecycle
//! managers as a [`SharedStore`]; nothing here is global.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Message, MessageId, MessageStatus};

/// Store handle shared between a lifecycle manager and its timer tasks
pub type SharedStore = Arc<RwLock<ConversationStore>>;

/// Outcome of a status transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The status moved forward
    Advanced {
        /// Status before the update
        from: MessageStatus,
        /// Status after the update
        to: MessageStatus,
    },
    /// The message exists but was already at or past the requested status
    Unchanged,
    /// No such message (typically deleted before its timer fired)
    Missing,
}

/// Ordered message lists keyed by conversation id
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Vec<Message>>,
    last_issued_id: i64,
}

impl ConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the store for sharing with lifecycle managers
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Insert a conversation's messages, replacing any existing list
    pub fn insert_conversation(&mut self, conversation_id: impl Into<String>, messages: Vec<Message>) {
        if let Some(max) = messages.iter().map(|m| m.id.0).max() {
            self.last_issued_id = self.last_issued_id.max(max);
        }
        self.conversations.insert(conversation_id.into(), messages);
    }

    /// Make sure a conversation entry exists, creating an empty one if needed
    pub fn ensure_conversation(&mut self, conversation_id: &str) {
        if !self.conversations.contains_key(conversation_id) {
            self.conversations.insert(conversation_id.to_string(), Vec::new());
        }
    }

    /// Check whether a conversation exists
    pub fn contains(&self, conversation_id: &str) -> bool {
        self.conversations.contains_key(conversation_id)
    }

    /// Ids of every known conversation (unordered)
    pub fn conversation_ids(&self) -> Vec<String> {
        self.conversations.keys().cloned().collect()
    }

    /// Messages of a conversation, in send order
    pub fn messages(&self, conversation_id: &str) -> Option<&[Message]> {
        self.conversations.get(conversation_id).map(Vec::as_slice)
    }

    /// Number of messages in a conversation (zero if unknown)
    pub fn len(&self, conversation_id: &str) -> usize {
        self.conversations.get(conversation_id).map_or(0, Vec::len)
    }

    /// Look up a single message
    pub fn message(&self, conversation_id: &str, message_id: MessageId) -> Option<&Message> {
        self.conversations
            .get(conversation_id)?
            .iter()
            .find(|m| m.id == message_id)
    }

    /// Most recent message of a conversation
    pub fn last_message(&self, conversation_id: &str) -> Option<&Message> {
        self.conversations.get(conversation_id)?.last()
    }

    /// Issue the id for a message created now.
    ///
    /// Ids come from the wall clock in milliseconds, bumped past the last
    /// issued id so two sends within the same millisecond stay distinct.
    pub fn next_message_id(&mut self) -> MessageId {
        let now = crate::time::now_timestamp_millis();
        self.last_issued_id = now.max(self.last_issued_id + 1);
        MessageId(self.last_issued_id)
    }

    /// Append a message to the end of a conversation
    pub fn append(&mut self, conversation_id: &str, message: Message) {
        self.last_issued_id = self.last_issued_id.max(message.id.0);
        self.conversations
            .entry(conversation_id.to_string())
            .or_default()
            .push(message);
    }

    /// Move a message's status forward, touching nothing else
    pub fn advance_status(
        &mut self,
        conversation_id: &str,
        message_id: MessageId,
        next: MessageStatus,
    ) -> StatusUpdate {
        let Some(message) = self.message_mut(conversation_id, message_id) else {
            return StatusUpdate::Missing;
        };
        let from = message.status;
        if message.advance_status(next) {
            StatusUpdate::Advanced { from, to: next }
        } else {
            StatusUpdate::Unchanged
        }
    }

    /// Toggle a reaction, returning the message's reactions afterwards.
    ///
    /// `None` if the message isn't in the conversation.
    pub fn toggle_reaction(
        &mut self,
        conversation_id: &str,
        message_id: MessageId,
        emoji: &str,
    ) -> Option<Vec<String>> {
        let message = self.message_mut(conversation_id, message_id)?;
        message.toggle_reaction(emoji);
        Some(message.reactions.clone())
    }

    /// Remove a message permanently
    pub fn remove(&mut self, conversation_id: &str, message_id: MessageId) -> Option<Message> {
        let messages = self.conversations.get_mut(conversation_id)?;
        let pos = messages.iter().position(|m| m.id == message_id)?;
        Some(messages.remove(pos))
    }

    fn message_mut(&mut self, conversation_id: &str, message_id: MessageId) -> Option<&mut Message> {
        self.conversations
            .get_mut(conversation_id)?
            .iter_mut()
            .find(|m| m.id == message_id)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(ids: &[i64]) -> ConversationStore {
        let mut store = ConversationStore::new();
        let messages = ids
            .iter()
            .map(|id| Message::outgoing(MessageId(*id), format!("msg {}", id), "You", None))
            .collect();
        store.insert_conversation("chat1", messages);
        store
    }

    #[test]
    fn test_next_id_is_strictly_increasing() {
        let mut store = ConversationStore::new();
        let a = store.next_message_id();
        let b = store.next_message_id();
        let c = store.next_message_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_next_id_skips_past_seeded_ids() {
        let far_future = crate::time::now_timestamp_millis() + 60_000;
        let mut store = store_with(&[far_future]);
        assert_eq!(store.next_message_id(), MessageId(far_future + 1));
    }

    #[test]
    fn test_append_keeps_order() {
        let mut store = ConversationStore::new();
        for id in [3, 1, 2] {
            store.append("chat1", Message::outgoing(MessageId(id), "x", "You", None));
        }
        let ids: Vec<_> = store.messages("chat1").unwrap().iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_advance_status_outcomes() {
        let mut store = store_with(&[1]);
        let id = MessageId(1);

        assert_eq!(
            store.advance_status("chat1", id, MessageStatus::Delivered),
            StatusUpdate::Advanced {
                from: MessageStatus::Sent,
                to: MessageStatus::Delivered
            }
        );
        assert_eq!(
            store.advance_status("chat1", id, MessageStatus::Sent),
            StatusUpdate::Unchanged
        );
        assert_eq!(
            store.advance_status("chat1", MessageId(99), MessageStatus::Read),
            StatusUpdate::Missing
        );
        assert_eq!(
            store.advance_status("other", id, MessageStatus::Read),
            StatusUpdate::Missing
        );
    }

    #[test]
    fn test_advance_status_only_touches_status() {
        let mut store = store_with(&[1]);
        store.toggle_reaction("chat1", MessageId(1), "🔥").unwrap();
        let before = store.message("chat1", MessageId(1)).unwrap().clone();

        store.advance_status("chat1", MessageId(1), MessageStatus::Read);

        let after = store.message("chat1", MessageId(1)).unwrap();
        assert_eq!(after.status, MessageStatus::Read);
        assert_eq!(after.text, before.text);
        assert_eq!(after.reactions, before.reactions);
        assert_eq!(after.timestamp, before.timestamp);
    }

    #[test]
    fn test_toggle_reaction_missing_message() {
        let mut store = store_with(&[1]);
        assert!(store.toggle_reaction("chat1", MessageId(2), "👍").is_none());
        assert!(store.toggle_reaction("other", MessageId(1), "👍").is_none());
        assert!(store.message("chat1", MessageId(1)).unwrap().reactions.is_empty());
    }

    #[test]
    fn test_remove_only_target() {
        let mut store = store_with(&[1, 2, 3]);
        let removed = store.remove("chat1", MessageId(2)).unwrap();
        assert_eq!(removed.id, MessageId(2));

        let ids: Vec<_> = store.messages("chat1").unwrap().iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(store.remove("chat1", MessageId(2)).is_none());
    }

    #[test]
    fn test_conversations_are_isolated() {
        let mut store = store_with(&[1]);
        store.ensure_conversation("chat2");
        store.append("chat2", Message::outgoing(MessageId(5), "hi", "You", None));

        assert_eq!(store.len("chat1"), 1);
        assert_eq!(store.len("chat2"), 1);
        assert!(store.message("chat1", MessageId(5)).is_none());
        assert_eq!(store.len("missing"), 0);
    }
}
