//! # Delivery Tracking
//!
//! Where delivered/read acknowledgements come from.
//!
//! The lifecycle manager hands every sent message to a [`DeliveryTracker`]
//! together with a [`StatusSink`]. The tracker decides *when* the message
//! is delivered and read and reports it through the sink, which applies
//! the transition to the store and signals a re-render.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        DELIVERY TRACKERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  SimulatedDeliveryTracker                                              │
//! │  ─────────────────────────                                              │
//! │  One tokio task per message:                                           │
//! │    sleep_until(t0 + delivery_delay) → sink.advance(Delivered)          │
//! │    sleep_until(t0 + read_delay)     → sink.advance(Read)               │
//! │  The task's AbortHandle is kept until it finishes, so deleting the     │
//! │  message or closing the conversation can cancel it.                    │
//! │                                                                         │
//! │  ManualDeliveryTracker                                                 │
//! │  ─────────────────────                                                  │
//! │  Remembers tracked messages; acknowledgements are pushed in by the     │
//! │  caller (e.g. from receipts arriving over a transport).                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;

use super::events::ChatEvent;
use super::store::{SharedStore, StatusUpdate};
use super::{MessageId, MessageStatus};
use crate::config::ChatConfig;
use crate::error::{Error, Result};

/// Identifies a message across conversations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    /// Conversation the message lives in
    pub conversation_id: String,
    /// The message
    pub message_id: MessageId,
}

impl MessageKey {
    /// Build a key
    pub fn new(conversation_id: impl Into<String>, message_id: MessageId) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message_id,
        }
    }
}

/// Applies status transitions reported by a tracker.
///
/// Cloned into timer tasks; holds the shared store and the event sender of
/// the conversation that sent the message.
#[derive(Clone)]
pub struct StatusSink {
    store: SharedStore,
    events: broadcast::Sender<ChatEvent>,
}

impl StatusSink {
    /// Create a sink over a store and an event channel
    pub fn new(store: SharedStore, events: broadcast::Sender<ChatEvent>) -> Self {
        Self { store, events }
    }

    /// Move a message to `next` and emit a re-render event.
    ///
    /// Returns `true` if the status changed. A message deleted in the
    /// meantime, or one already at or past `next`, is left alone.
    pub fn advance(&self, key: &MessageKey, next: MessageStatus) -> bool {
        let update = self
            .store
            .write()
            .advance_status(&key.conversation_id, key.message_id, next);

        match update {
            StatusUpdate::Advanced { from, to } => {
                tracing::debug!(
                    conversation_id = key.conversation_id.as_str(),
                    message_id = key.message_id.0,
                    "Message status {} -> {}",
                    from,
                    to
                );
                // No subscribers is fine; the store already holds the change.
                let _ = self.events.send(ChatEvent::StatusChanged {
                    conversation_id: key.conversation_id.clone(),
                    message_id: key.message_id,
                    status: to,
                });
                true
            }
            StatusUpdate::Unchanged => false,
            StatusUpdate::Missing => {
                tracing::debug!(
                    conversation_id = key.conversation_id.as_str(),
                    message_id = key.message_id.0,
                    "Status update for missing message ignored"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for StatusSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusSink")
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

/// Source of delivered/read acknowledgements for sent messages
pub trait DeliveryTracker: Send + Sync {
    /// Start tracking a freshly sent message
    fn track(&self, key: MessageKey, sink: StatusSink) -> Result<()>;

    /// Stop tracking one message. Returns `true` if it was pending.
    fn cancel(&self, key: &MessageKey) -> bool;

    /// Stop tracking every message of a conversation. Returns how many
    /// were pending.
    fn cancel_conversation(&self, conversation_id: &str) -> usize;

    /// Number of messages still awaiting acknowledgements
    fn pending(&self) -> usize;
}

// ============================================================================
// SIMULATED TRACKER
// ============================================================================

/// Fakes acknowledgements on fixed delays measured from send time
#[derive(Debug)]
pub struct SimulatedDeliveryTracker {
    delivery_delay: Duration,
    read_delay: Duration,
    tasks: Arc<Mutex<HashMap<MessageKey, AbortHandle>>>,
}

impl SimulatedDeliveryTracker {
    /// Create a tracker with explicit delays
    pub fn new(delivery_delay: Duration, read_delay: Duration) -> Self {
        Self {
            delivery_delay,
            read_delay,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a tracker using the delays from `config`
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.delivery_delay(), config.read_delay())
    }
}

impl DeliveryTracker for SimulatedDeliveryTracker {
    fn track(&self, key: MessageKey, sink: StatusSink) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let sent_at = tokio::time::Instant::now();
        let mut schedule = [
            (self.delivery_delay, MessageStatus::Delivered),
            (self.read_delay, MessageStatus::Read),
        ];
        schedule.sort_by_key(|(delay, _)| *delay);

        // Held across spawn so the task can't remove its entry before it exists.
        let mut tasks = self.tasks.lock();

        let task_key = key.clone();
        let registry = Arc::clone(&self.tasks);
        let handle = runtime.spawn(async move {
            for (delay, status) in schedule {
                tokio::time::sleep_until(sent_at + delay).await;
                sink.advance(&task_key, status);
            }
            registry.lock().remove(&task_key);
        });

        tasks.insert(key, handle.abort_handle());
        Ok(())
    }

    fn cancel(&self, key: &MessageKey) -> bool {
        match self.tasks.lock().remove(key) {
            Some(handle) => {
                handle.abort();
                tracing::debug!(
                    conversation_id = key.conversation_id.as_str(),
                    message_id = key.message_id.0,
                    "Cancelled status timers"
                );
                true
            }
            None => false,
        }
    }

    fn cancel_conversation(&self, conversation_id: &str) -> usize {
        let mut cancelled = 0;
        self.tasks.lock().retain(|key, handle| {
            if key.conversation_id == conversation_id {
                handle.abort();
                cancelled += 1;
                false
            } else {
                true
            }
        });
        if cancelled > 0 {
            tracing::debug!(conversation_id, cancelled, "Cancelled conversation status timers");
        }
        cancelled
    }

    fn pending(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Drop for SimulatedDeliveryTracker {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.lock().drain() {
            handle.abort();
        }
    }
}

// ============================================================================
// MANUAL TRACKER
// ============================================================================

/// Tracker whose acknowledgements are supplied by the caller
#[derive(Debug, Default)]
pub struct ManualDeliveryTracker {
    tracked: Mutex<HashMap<MessageKey, StatusSink>>,
}

impl ManualDeliveryTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an acknowledgement for a tracked message.
    ///
    /// Returns `true` if the message status changed. Once a message is
    /// read it stops being tracked.
    pub fn acknowledge(&self, key: &MessageKey, status: MessageStatus) -> bool {
        let sink = match self.tracked.lock().get(key) {
            Some(sink) => sink.clone(),
            None => return false,
        };
        let changed = sink.advance(key, status);
        if status == MessageStatus::Read {
            self.tracked.lock().remove(key);
        }
        changed
    }

    /// Keys of every message still being tracked
    pub fn tracked(&self) -> Vec<MessageKey> {
        self.tracked.lock().keys().cloned().collect()
    }
}

impl DeliveryTracker for ManualDeliveryTracker {
    fn track(&self, key: MessageKey, sink: StatusSink) -> Result<()> {
        self.tracked.lock().insert(key, sink);
        Ok(())
    }

    fn cancel(&self, key: &MessageKey) -> bool {
        self.tracked.lock().remove(key).is_some()
    }

    fn cancel_conversation(&self, conversation_id: &str) -> usize {
        let mut tracked = self.tracked.lock();
        let before = tracked.len();
        tracked.retain(|key, _| key.conversation_id != conversation_id);
        before - tracked.len()
    }

    fn pending(&self) -> usize {
        self.tracked.lock().len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
