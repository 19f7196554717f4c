//! Built-in demo conversations.
//!
//! The fixture lives in `fixtures/seed.json` and is compiled into the
//! crate, so a fresh session always starts from the same chats.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::inbox::{ConversationProfile, Inbox};
use crate::messaging::{ConversationStore, Message, MessageStatus};

const SEED_JSON: &str = include_str!("../fixtures/seed.json");

/// One seeded conversation
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConversation {
    /// Who the chat is with
    pub profile: ConversationProfile,
    /// Initial unread counter
    #[serde(default)]
    pub unread_count: u32,
    /// Message history, oldest first
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    conversations: Vec<SeedConversation>,
}

/// Parse seed data from JSON.
///
/// Messages must have text, only our own messages may carry a status, and
/// ids may not repeat within a conversation.
pub fn parse(json: &str) -> Result<Vec<SeedConversation>> {
    let file: SeedFile = serde_json::from_str(json)?;
    for seed in &file.conversations {
        check(seed)?;
    }
    Ok(file.conversations)
}

fn check(seed: &SeedConversation) -> Result<()> {
    let conversation = seed.profile.id.as_str();
    let mut seen = HashSet::new();

    for message in &seed.messages {
        if !seen.insert(message.id) {
            return Err(Error::SeedData(format!(
                "{}: duplicate message id {}",
                conversation, message.id
            )));
        }
        if message.text.trim().is_empty() {
            return Err(Error::SeedData(format!(
                "{}: message {} has no text",
                conversation, message.id
            )));
        }
        if !message.is_sender && message.status != MessageStatus::None {
            return Err(Error::SeedData(format!(
                "{}: incoming message {} has status {}",
                conversation, message.id, message.status
            )));
        }
    }
    Ok(())
}

/// The built-in conversations
pub fn builtin() -> Result<Vec<SeedConversation>> {
    parse(SEED_JSON)
}

/// Split seed conversations into a message store and an inbox
pub fn populate(conversations: Vec<SeedConversation>) -> (ConversationStore, Inbox) {
    let mut store = ConversationStore::new();
    let mut inbox = Inbox::new();

    for seed in conversations {
        store.insert_conversation(seed.profile.id.clone(), seed.messages);
        inbox.add(seed.profile, seed.unread_count);
    }

    tracing::debug!(conversations = inbox.profiles().len(), "Loaded seed conversations");
    (store, inbox)
}
