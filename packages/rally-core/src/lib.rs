//! # Rally Core
//!
//! Chat core for the Rally sports social app: the message model, the
//! per-conversation message store and the lifecycle manager that drives
//! optimistic delivery/read status for messages the local user sends.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          RALLY CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐        ┌──────────────────────────────────────────┐   │
//! │  │ ChatSession │───────►│               Messaging                  │   │
//! │  │             │ open() │                                          │   │
//! │  │ - Store     │        │  MessageLifecycleManager                 │   │
//! │  │ - Inbox     │        │   - send / react / delete / reply        │   │
//! │  │ - Config    │        │   - copy / forward                       │   │
//! │  └──────┬──────┘        │  DeliveryTracker (simulated | manual)    │   │
//! │         │               │  ConversationStore (conversation → msgs) │   │
//! │         ▼               │  ChatEvent broadcast                     │   │
//! │  ┌─────────────┐        └──────────────────────────────────────────┘   │
//! │  │   Inbox     │                                                        │
//! │  │ - Profiles  │        ┌─────────────┐  ┌─────────────┐               │
//! │  │ - Unread    │        │    Seed     │  │   Config    │               │
//! │  │ - Search    │        │ (fixtures)  │  │ (delays)    │               │
//! │  └─────────────┘        └─────────────┘  └─────────────┘               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`config`] - Lifecycle timing and sender configuration
//! - [`messaging`] - Messages, store, delivery tracking, lifecycle manager
//! - [`inbox`] - Conversation list and search
//! - [`seed`] - Built-in demo conversations
//! - [`session`] - Owner of the store and inbox
//!
//! All state is in memory; nothing is persisted and nothing touches the
//! network. Delivered/read acknowledgements are simulated on timers unless
//! a different [`messaging::DeliveryTracker`] is plugged in.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod error;
pub mod inbox;
pub mod messaging;
pub mod seed;
pub mod session;
/// Wall-clock helpers for ids and display timestamps.
pub mod time;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use inbox::{ConversationKind, ConversationProfile, ConversationSummary, Inbox};
pub use messaging::{
    ChatEvent, Message, MessageAction, MessageId, MessageLifecycleManager, MessageStatus,
    ReplySnapshot,
};
pub use session::ChatSession;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Rally Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================
