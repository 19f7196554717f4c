//! # Inbox
//!
//! Conversation list: who each chat is with, what was said last and how
//! many messages are unread.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::messaging::{ConversationStore, MessageStatus};

/// Maximum characters of the last message shown in a list row
pub const PREVIEW_MAX_CHARS: usize = 50;

/// One-to-one chat or community group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// Chat with a single buddy
    Individual,
    /// Club or group thread
    Community,
}

/// Who a conversation is with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationProfile {
    /// Conversation id
    pub id: String,
    /// Display name of the buddy or group
    pub name: String,
    /// Chat type
    pub kind: ConversationKind,
    /// Buddy is online (individual chats)
    #[serde(default)]
    pub is_online: bool,
    /// Buddy is typing (individual chats)
    #[serde(default)]
    pub is_typing: bool,
    /// Group size (community chats)
    #[serde(default)]
    pub member_count: u32,
}

impl ConversationProfile {
    /// Subtitle shown under the name in the chat header
    pub fn presence_label(&self) -> String {
        match self.kind {
            ConversationKind::Community => format!("{} members", self.member_count),
            ConversationKind::Individual if self.is_typing => "typing...".to_string(),
            ConversationKind::Individual if self.is_online => "Online".to_string(),
            ConversationKind::Individual => "Offline".to_string(),
        }
    }
}

/// A row in the conversation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    /// Conversation id
    pub id: String,
    /// Display name
    pub name: String,
    /// Chat type
    pub kind: ConversationKind,
    /// Truncated text of the last message
    pub last_message_preview: Option<String>,
    /// Sender of the last message
    pub last_message_sender: Option<String>,
    /// Display timestamp of the last message
    pub last_message_timestamp: Option<String>,
    /// Status of the last message, when we sent it
    pub last_message_status: Option<MessageStatus>,
    /// Unread messages
    pub unread_count: u32,
}

/// Known conversations in display order, with unread counters
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    profiles: Vec<ConversationProfile>,
    unread: HashMap<String, u32>,
}

impl Inbox {
    /// Create an empty inbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a conversation at the bottom of the list (or replace it in place)
    pub fn add(&mut self, profile: ConversationProfile, unread_count: u32) {
        self.unread.insert(profile.id.clone(), unread_count);
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    /// Look up a profile
    pub fn profile(&self, conversation_id: &str) -> Option<&ConversationProfile> {
        self.profiles.iter().find(|p| p.id == conversation_id)
    }

    /// All profiles in list order
    pub fn profiles(&self) -> &[ConversationProfile] {
        &self.profiles
    }

    /// Unread counter of a conversation
    pub fn unread_count(&self, conversation_id: &str) -> u32 {
        self.unread.get(conversation_id).copied().unwrap_or(0)
    }

    /// Zero a conversation's unread counter
    pub fn mark_read(&mut self, conversation_id: &str) -> Result<()> {
        let count = self
            .unread
            .get_mut(conversation_id)
            .ok_or_else(|| Error::ConversationNotFound(conversation_id.to_string()))?;
        *count = 0;
        Ok(())
    }

    /// List rows built from the latest store contents
    pub fn summaries(&self, store: &ConversationStore) -> Vec<ConversationSummary> {
        self.profiles
            .iter()
            .map(|profile| {
                let last = store.last_message(&profile.id);
                ConversationSummary {
                    id: profile.id.clone(),
                    name: profile.name.clone(),
                    kind: profile.kind,
                    last_message_preview: last.map(|m| preview(&m.text)),
                    last_message_sender: last.map(|m| m.sender.clone()),
                    last_message_timestamp: last.map(|m| m.timestamp.clone()),
                    last_message_status: last.filter(|m| m.is_sender).map(|m| m.status),
                    unread_count: self.unread_count(&profile.id),
                }
            })
            .collect()
    }

    /// Rows whose name or last message contains `query` (case-insensitive).
    /// Surrounding whitespace is ignored; an empty query matches everything.
    pub fn search(&self, store: &ConversationStore, query: &str) -> Vec<ConversationSummary> {
        let query = query.trim().to_lowercase();
        let rows = self.summaries(store);
        if query.is_empty() {
            return rows;
        }
        rows.into_iter()
            .filter(|row| {
                row.name.to_lowercase().contains(&query)
                    || row
                        .last_message_preview
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&query))
            })
            .collect()
    }
}

/// Shorten text for a list row
fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_MAX_CHARS {
        let cut: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
