//! # Error Handling
//!
//! Error types for Rally Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Lifecycle Errors                                                  │
//! │  │   ├── ConversationClosed    - Manager was already closed            │
//! │  │   └── NoRuntime             - Timers need a tokio runtime           │
//! │  │                                                                      │
//! │  ├── Config / Data Errors                                              │
//! │  │   ├── InvalidConfig         - Rejected configuration value          │
//! │  │   └── SeedData              - Seed fixture could not be parsed      │
//! │  │                                                                      │
//! │  └── Message Errors                                                    │
//! │      ├── ConversationNotFound  - Conversation doesn't exist            │
//! │      ├── MessageNotFound       - Message doesn't exist                 │
//! │      ├── NoPendingDeletion     - Confirm without a delete request      │
//! │      └── UnknownAction         - Unrecognised long-press action        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blank sends, late status callbacks for deleted messages and declined
//! deletions are not errors; those paths return normally without touching
//! state.

use thiserror::Error;

use crate::messaging::MessageId;

/// Result type alias for Rally Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Rally Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Lifecycle Errors (100-199)
    // ========================================================================

    /// The lifecycle manager was closed and no longer accepts operations
    #[error("Conversation {0} has been closed.")]
    ConversationClosed(String),

    /// Status timers were requested outside of a tokio runtime
    #[error("No async runtime available to schedule status updates.")]
    NoRuntime,

    // ========================================================================
    // Config / Data Errors (400-499)
    // ========================================================================

    /// Configuration value rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Seed data could not be decoded
    #[error("Invalid seed data: {0}")]
    SeedData(String),

    // ========================================================================
    // Message Errors (700-799)
    // ========================================================================

    /// Conversation not found
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    /// Message not found
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    /// `confirm_delete` was called with no outstanding delete request
    #[error("No message is awaiting delete confirmation.")]
    NoPendingDeletion,

    /// Unrecognised long-press action name
    #[error("Unknown message action: {0}")]
    UnknownAction(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Numeric error code, grouped by category:
    /// - 100-199: Lifecycle
    /// - 400-499: Config and seed data
    /// - 700-799: Messages
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            Error::ConversationClosed(_) => 100,
            Error::NoRuntime => 101,

            Error::InvalidConfig(_) => 400,
            Error::SeedData(_) => 401,

            Error::ConversationNotFound(_) => 700,
            Error::MessageNotFound(_) => 701,
            Error::NoPendingDeletion => 702,
            Error::UnknownAction(_) => 703,

            Error::Internal(_) => 900,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the conversation intact; the caller can
    /// carry on after surfacing them.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MessageNotFound(_)
                | Error::NoPendingDeletion
                | Error::ConversationNotFound(_)
                | Error::UnknownAction(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SeedData(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
