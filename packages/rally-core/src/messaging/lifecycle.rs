//! # Message Lifecycle Manager
//!
//! Owns the open conversation's composer state (reply context, pending
//! delete) and drives every outgoing message through its status states.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        INPUT → OPERATION                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  send button          → send(text)             → MessageAdded          │
//! │  long-press "Reply"   → reply_to(id)           → ReplyContextChanged   │
//! │  reply bar "x"        → cancel_reply()         → ReplyContextChanged   │
//! │  reaction bar         → react(id, emoji)       → ReactionsChanged      │
//! │  long-press "Delete"  → request_delete(id)     → DeletePending         │
//! │  prompt "Delete"      → confirm_delete()       → MessageDeleted        │
//! │  prompt "Cancel"      → cancel_delete()        → (nothing)             │
//! │  long-press "Copy"    → copy(id)               → Clipboard::set_text   │
//! │  tracker callback     → advance_status(id, s)  → StatusChanged         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;

use super::collaborators::{Clipboard, DeleteConfirmation, MemoryClipboard};
use super::delivery::{DeliveryTracker, MessageKey, SimulatedDeliveryTracker, StatusSink};
use super::events::ChatEvent;
use super::store::SharedStore;
use super::{Message, MessageAction, MessageId, MessageStatus, ReplySnapshot};
use crate::config::ChatConfig;
use crate::error::{Error, Result};

/// Result of dispatching a long-press action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The message is now the reply context
    ReplyContextSet(ReplySnapshot),
    /// The message text went to the clipboard
    Copied,
    /// The message was handed off for forwarding
    Forwarded(Message),
    /// A delete now awaits confirmation
    DeletePending(MessageId),
    /// The action is shown in the menu but does nothing yet
    Ignored(MessageAction),
}

/// Drives one open conversation
pub struct MessageLifecycleManager {
    conversation_id: String,
    config: ChatConfig,
    store: SharedStore,
    tracker: Arc<dyn DeliveryTracker>,
    clipboard: Arc<dyn Clipboard>,
    events: broadcast::Sender<ChatEvent>,
    reply_context: Mutex<Option<ReplySnapshot>>,
    pending_delete: Mutex<Option<MessageId>>,
    closed: RwLock<bool>,
}

impl MessageLifecycleManager {
    /// Open a conversation with simulated delivery/read acknowledgements
    pub fn open(
        conversation_id: impl Into<String>,
        store: SharedStore,
        config: ChatConfig,
    ) -> Result<Self> {
        config.validate()?;
        let tracker = Arc::new(SimulatedDeliveryTracker::from_config(&config));
        Self::with_tracker(conversation_id, store, config, tracker)
    }

    /// Open a conversation with a custom acknowledgement source
    pub fn with_tracker(
        conversation_id: impl Into<String>,
        store: SharedStore,
        config: ChatConfig,
        tracker: Arc<dyn DeliveryTracker>,
    ) -> Result<Self> {
        config.validate()?;
        let conversation_id = conversation_id.into();
        store.write().ensure_conversation(&conversation_id);

        let (events, _) = broadcast::channel(config.event_capacity);

        tracing::info!(
            conversation_id = conversation_id.as_str(),
            messages = store.read().len(&conversation_id),
            "Opened conversation"
        );

        Ok(Self {
            conversation_id,
            config,
            store,
            tracker,
            clipboard: Arc::new(MemoryClipboard::new()),
            events,
            reply_context: Mutex::new(None),
            pending_delete: Mutex::new(None),
            closed: RwLock::new(false),
        })
    }

    /// Route "Copy" to a different clipboard
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Subscribe to re-render events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Id of the open conversation
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Active configuration
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    // ── Reading ─────────────────────────────────────────────────────────

    /// Ordered snapshot of the conversation
    pub fn messages(&self) -> Vec<Message> {
        self.store
            .read()
            .messages(&self.conversation_id)
            .map(<[Message]>::to_vec)
            .unwrap_or_default()
    }

    /// Look up one message
    pub fn message(&self, message_id: MessageId) -> Option<Message> {
        self.store
            .read()
            .message(&self.conversation_id, message_id)
            .cloned()
    }

    /// Message the next send will quote, if any
    pub fn reply_context(&self) -> Option<ReplySnapshot> {
        self.reply_context.lock().clone()
    }

    /// Message awaiting delete confirmation, if any
    pub fn pending_delete(&self) -> Option<MessageId> {
        *self.pending_delete.lock()
    }

    /// Messages whose acknowledgements haven't all arrived yet
    pub fn pending_acknowledgements(&self) -> usize {
        self.tracker.pending()
    }

    /// Whether `close` has run
    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    // ── Sending ─────────────────────────────────────────────────────────

    /// Send a message from the local user.
    ///
    /// Blank or whitespace-only text is ignored and returns `Ok(None)`.
    /// Otherwise the trimmed text is appended as `Sent`, quoting the active
    /// reply context (which is then cleared), and handed to the delivery
    /// tracker. Returns immediately; status updates arrive as events.
    pub fn send(&self, text: &str) -> Result<Option<Message>> {
        self.ensure_open()?;

        let text = text.trim();
        if text.is_empty() {
            tracing::debug!(conversation_id = self.conversation_id.as_str(), "Ignoring blank message");
            return Ok(None);
        }

        let reply_to = self.reply_context.lock().clone();

        let message = {
            let mut store = self.store.write();
            let id = store.next_message_id();
            let message = Message::outgoing(id, text, self.config.local_sender.as_str(), reply_to);
            store.append(&self.conversation_id, message.clone());
            message
        };

        if let Err(err) = self.tracker.track(self.key(message.id), self.sink()) {
            self.store.write().remove(&self.conversation_id, message.id);
            return Err(err);
        }

        tracing::debug!(
            conversation_id = self.conversation_id.as_str(),
            message_id = message.id.0,
            reply = message.reply_to.is_some(),
            "Message sent"
        );

        self.emit(ChatEvent::MessageAdded {
            conversation_id: self.conversation_id.clone(),
            message: message.clone(),
        });
        self.clear_reply_context();

        Ok(Some(message))
    }

    /// Quote `original` and send `text` in one step
    pub fn send_reply(&self, text: &str, original: &Message) -> Result<Option<Message>> {
        self.set_reply_context(Some(original))?;
        self.send(text)
    }

    /// Apply a status transition reported by the delivery tracker.
    ///
    /// Deleted messages and non-forward transitions are ignored.
    pub fn advance_status(&self, message_id: MessageId, next: MessageStatus) -> bool {
        self.sink().advance(&self.key(message_id), next)
    }

    // ── Reply context ───────────────────────────────────────────────────

    /// Set (or clear, with `None`) the message the next send quotes.
    ///
    /// The message must belong to this conversation; one from another
    /// conversation is rejected with `MessageNotFound`, even when it
    /// happens to share an id with a message here.
    pub fn set_reply_context(&self, message: Option<&Message>) -> Result<()> {
        match message {
            Some(message) => {
                let snapshot = self.snapshot_of(message.id)?;
                if snapshot != message.snapshot() {
                    return Err(Error::MessageNotFound(message.id));
                }
                self.apply_reply_context(Some(snapshot))
            }
            None => self.apply_reply_context(None),
        }
    }

    /// Quote a message of this conversation by id
    pub fn reply_to(&self, message_id: MessageId) -> Result<ReplySnapshot> {
        let snapshot = self.snapshot_of(message_id)?;
        self.apply_reply_context(Some(snapshot.clone()))?;
        Ok(snapshot)
    }

    /// Drop the reply context. Returns `true` if one was set.
    pub fn cancel_reply(&self) -> bool {
        self.clear_reply_context()
    }

    // ── Reactions ───────────────────────────────────────────────────────

    /// Toggle `emoji` on a message, returning its reactions afterwards.
    ///
    /// A message that is no longer in the conversation (deleted while the
    /// reaction bar was open) is ignored: `Ok(None)` and no event.
    pub fn react(&self, message_id: MessageId, emoji: &str) -> Result<Option<Vec<String>>> {
        self.ensure_open()?;
        let toggled = self
            .store
            .write()
            .toggle_reaction(&self.conversation_id, message_id, emoji);
        let Some(reactions) = toggled else {
            tracing::debug!(
                conversation_id = self.conversation_id.as_str(),
                message_id = message_id.0,
                "Reaction for missing message ignored"
            );
            return Ok(None);
        };

        self.emit(ChatEvent::ReactionsChanged {
            conversation_id: self.conversation_id.clone(),
            message_id,
            reactions: reactions.clone(),
        });
        Ok(Some(reactions))
    }

    // ── Deletion ────────────────────────────────────────────────────────

    /// First step of deleting: mark the message as awaiting confirmation
    pub fn request_delete(&self, message_id: MessageId) -> Result<()> {
        self.ensure_open()?;
        if self.message(message_id).is_none() {
            return Err(Error::MessageNotFound(message_id));
        }
        *self.pending_delete.lock() = Some(message_id);
        self.emit(ChatEvent::DeletePending {
            conversation_id: self.conversation_id.clone(),
            message_id,
        });
        Ok(())
    }

    /// Second step: remove the pending message permanently
    pub fn confirm_delete(&self) -> Result<Message> {
        self.ensure_open()?;
        let message_id = self
            .pending_delete
            .lock()
            .take()
            .ok_or(Error::NoPendingDeletion)?;

        let removed = self
            .store
            .write()
            .remove(&self.conversation_id, message_id)
            .ok_or(Error::MessageNotFound(message_id))?;

        self.tracker.cancel(&self.key(message_id));

        tracing::info!(
            conversation_id = self.conversation_id.as_str(),
            message_id = message_id.0,
            "Deleted message"
        );
        self.emit(ChatEvent::MessageDeleted {
            conversation_id: self.conversation_id.clone(),
            message_id,
        });
        Ok(removed)
    }

    /// Decline the pending delete, leaving everything untouched.
    ///
    /// `close` drops any pending delete, so after it this returns `None`.
    pub fn cancel_delete(&self) -> Option<MessageId> {
        self.pending_delete.lock().take()
    }

    /// Delete after asking `prompt`. Returns the removed message, or
    /// `None` if the prompt declined.
    pub fn delete_with<P>(&self, message_id: MessageId, prompt: &P) -> Result<Option<Message>>
    where
        P: DeleteConfirmation + ?Sized,
    {
        self.request_delete(message_id)?;
        let message = self
            .message(message_id)
            .ok_or(Error::MessageNotFound(message_id))?;

        if prompt.confirm(&message) {
            self.confirm_delete().map(Some)
        } else {
            self.cancel_delete();
            Ok(None)
        }
    }

    // ── Other bubble actions ────────────────────────────────────────────

    /// Copy a message's text to the clipboard
    pub fn copy(&self, message_id: MessageId) -> Result<()> {
        self.ensure_open()?;
        let message = self
            .message(message_id)
            .ok_or(Error::MessageNotFound(message_id))?;
        self.clipboard.set_text(&message.text);
        Ok(())
    }

    /// Hand a message off for forwarding
    pub fn forward(&self, message_id: MessageId) -> Result<Message> {
        self.ensure_open()?;
        let message = self
            .message(message_id)
            .ok_or(Error::MessageNotFound(message_id))?;
        tracing::info!(
            conversation_id = self.conversation_id.as_str(),
            message_id = message_id.0,
            "Forwarding message"
        );
        Ok(message)
    }

    /// Dispatch a long-press menu action
    pub fn handle_action(&self, message_id: MessageId, action: MessageAction) -> Result<ActionOutcome> {
        match action {
            MessageAction::Reply => self.reply_to(message_id).map(ActionOutcome::ReplyContextSet),
            MessageAction::Copy => self.copy(message_id).map(|_| ActionOutcome::Copied),
            MessageAction::Forward => self.forward(message_id).map(ActionOutcome::Forwarded),
            MessageAction::Delete => self
                .request_delete(message_id)
                .map(|_| ActionOutcome::DeletePending(message_id)),
            MessageAction::Edit | MessageAction::Info | MessageAction::Star => {
                Ok(ActionOutcome::Ignored(action))
            }
        }
    }

    // ── Teardown ────────────────────────────────────────────────────────

    /// Close the conversation, cancelling its pending status timers
    pub fn close(&self) {
        {
            let mut closed = self.closed.write();
            if *closed {
                return;
            }
            *closed = true;
        }

        let cancelled = self.tracker.cancel_conversation(&self.conversation_id);
        self.reply_context.lock().take();
        self.pending_delete.lock().take();

        tracing::info!(
            conversation_id = self.conversation_id.as_str(),
            cancelled,
            "Closed conversation"
        );
    }

    // Private helper methods

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ConversationClosed(self.conversation_id.clone()));
        }
        Ok(())
    }

    fn key(&self, message_id: MessageId) -> MessageKey {
        MessageKey::new(self.conversation_id.clone(), message_id)
    }

    fn sink(&self) -> StatusSink {
        StatusSink::new(self.store.clone(), self.events.clone())
    }

    fn snapshot_of(&self, message_id: MessageId) -> Result<ReplySnapshot> {
        self.message(message_id)
            .map(|m| m.snapshot())
            .ok_or(Error::MessageNotFound(message_id))
    }

    fn apply_reply_context(&self, snapshot: Option<ReplySnapshot>) -> Result<()> {
        self.ensure_open()?;
        *self.reply_context.lock() = snapshot.clone();
        self.emit(ChatEvent::ReplyContextChanged {
            conversation_id: self.conversation_id.clone(),
            reply_to: snapshot,
        });
        Ok(())
    }

    fn clear_reply_context(&self) -> bool {
        let had_context = self.reply_context.lock().take().is_some();
        if had_context {
            self.emit(ChatEvent::ReplyContextChanged {
                conversation_id: self.conversation_id.clone(),
                reply_to: None,
            });
        }
        had_context
    }

    fn emit(&self, event: ChatEvent) {
        // Nobody rendering is fine
        let _ = self.events.send(event);
    }
}

impl Drop for MessageLifecycleManager {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for MessageLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageLifecycleManager")
            .field("conversation_id", &self.conversation_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
