//! # Chat Session
//!
//! Owns the message store and inbox for the running app and opens
//! conversations on demand. Everything the lifecycle managers mutate is
//! reachable from here; there is no module-level state.

use std::sync::Arc;

use crate::config::ChatConfig;
use crate::error::{Error, Result};
use crate::inbox::{ConversationProfile, ConversationSummary, Inbox};
use crate::messaging::{DeliveryTracker, MessageLifecycleManager, SharedStore};
use crate::seed;

/// The local user's chat state
#[derive(Debug)]
pub struct ChatSession {
    config: ChatConfig,
    store: SharedStore,
    inbox: Inbox,
}

impl ChatSession {
    /// Start from the built-in demo conversations
    pub fn seeded(config: ChatConfig) -> Result<Self> {
        config.validate()?;
        let (store, inbox) = seed::populate(seed::builtin()?);
        Ok(Self {
            config,
            store: store.into_shared(),
            inbox,
        })
    }

    /// Start from explicit seed data
    pub fn from_seeds(config: ChatConfig, seeds: Vec<seed::SeedConversation>) -> Result<Self> {
        config.validate()?;
        let (store, inbox) = seed::populate(seeds);
        Ok(Self {
            config,
            store: store.into_shared(),
            inbox,
        })
    }

    /// Shared message store
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    /// Session configuration
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Profile of a known conversation
    pub fn profile(&self, conversation_id: &str) -> Option<&ConversationProfile> {
        self.inbox.profile(conversation_id)
    }

    /// Conversation list rows
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.inbox.summaries(&self.store.read())
    }

    /// Conversation list rows matching `query`
    pub fn search(&self, query: &str) -> Vec<ConversationSummary> {
        self.inbox.search(&self.store.read(), query)
    }

    /// Open a known conversation with simulated acknowledgements.
    ///
    /// Opening clears the conversation's unread counter.
    pub fn open(&mut self, conversation_id: &str) -> Result<MessageLifecycleManager> {
        self.mark_opened(conversation_id)?;
        MessageLifecycleManager::open(conversation_id, self.store.clone(), self.config.clone())
    }

    /// Open a known conversation with a custom acknowledgement source
    pub fn open_with_tracker(
        &mut self,
        conversation_id: &str,
        tracker: Arc<dyn DeliveryTracker>,
    ) -> Result<MessageLifecycleManager> {
        self.mark_opened(conversation_id)?;
        MessageLifecycleManager::with_tracker(
            conversation_id,
            self.store.clone(),
            self.config.clone(),
            tracker,
        )
    }

    fn mark_opened(&mut self, conversation_id: &str) -> Result<()> {
        if self.inbox.profile(conversation_id).is_none() {
            return Err(Error::ConversationNotFound(conversation_id.to_string()));
        }
        self.inbox.mark_read(conversation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{ManualDeliveryTracker, MessageStatus};

    #[test]
    fn test_open_known_conversation_clears_unread() {
        let mut session = ChatSession::seeded(ChatConfig::default()).unwrap();
        assert_eq!(session.summaries()[0].unread_count, 3);

        let manager = session
            .open_with_tracker("community1", Arc::new(ManualDeliveryTracker::new()))
            .unwrap();
        assert_eq!(manager.messages().len(), 3);

        let row = session
            .summaries()
            .into_iter()
            .find(|row| row.id == "community1")
            .unwrap();
        assert_eq!(row.unread_count, 0);
    }

    #[test]
    fn test_open_unknown_conversation() {
        let mut session = ChatSession::seeded(ChatConfig::default()).unwrap();
        let err = session.open("chat99").unwrap_err();
        assert!(matches!(err, Error::ConversationNotFound(_)));
    }

    #[test]
    fn test_sends_show_up_in_inbox() {
        let mut session = ChatSession::seeded(ChatConfig::default()).unwrap();
        let manager = session
            .open_with_tracker("chat2", Arc::new(ManualDeliveryTracker::new()))
            .unwrap();
        manager.send("Rematch on Saturday?").unwrap();

        let hits = session.search("rematch");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "chat2");
        assert_eq!(hits[0].last_message_status, Some(MessageStatus::Sent));
    }

    #[test]
    fn test_conversations_do_not_share_messages() {
        let mut session = ChatSession::seeded(ChatConfig::default()).unwrap();
        let chat2 = session
            .open_with_tracker("chat2", Arc::new(ManualDeliveryTracker::new()))
            .unwrap();
        let chat3 = session
            .open_with_tracker("chat3", Arc::new(ManualDeliveryTracker::new()))
            .unwrap();

        chat2.send("only for Mike").unwrap();
        assert_eq!(chat2.messages().len(), 2);
        assert_eq!(chat3.messages().len(), 1);
    }

    #[test]
    fn test_seeded_rejects_bad_config() {
        let config = ChatConfig {
            delivery_delay_ms: 0,
            ..Default::default()
        };
        assert!(ChatSession::seeded(config).is_err());
    }
}
