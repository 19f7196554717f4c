//! Collaborators the lifecycle manager calls out to: the system clipboard
//! and the delete confirmation prompt.

use parking_lot::Mutex;

use super::Message;

/// Destination for "Copy" on a message bubble
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with `text`
    fn set_text(&self, text: &str);
}

/// Process-local clipboard
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents, if anything was copied
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) {
        *self.contents.lock() = Some(text.to_string());
    }
}

/// Blocking "Delete Message?" prompt
pub trait DeleteConfirmation {
    /// Return `true` to delete, `false` to keep the message
    fn confirm(&self, message: &Message) -> bool;
}

impl<F> DeleteConfirmation for F
where
    F: Fn(&Message) -> bool,
{
    fn confirm(&self, message: &Message) -> bool {
        self(message)
    }
}
