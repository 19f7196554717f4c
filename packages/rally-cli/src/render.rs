//! Plain-text rendering of messages, events and the conversation list.

use rally_core::{ChatEvent, ConversationSummary, Message, MessageStatus};

/// One chat bubble as a terminal line
pub fn message_line(message: &Message) -> String {
    let mut line = format!(
        "[{}] {} {}: {}",
        message.id, message.timestamp, message.sender, message.text
    );
    if let Some(quoted) = &message.reply_to {
        line = format!("{}  (replying to {}: \"{}\")", line, quoted.sender, quoted.text);
    }
    if message.is_sender && message.status != MessageStatus::None {
        line.push(' ');
        line.push_str(message.status.ticks());
    }
    if !message.reactions.is_empty() {
        line.push_str("  ");
        line.push_str(&message.reactions.join(" "));
    }
    line
}

/// Human description of an event
pub fn event_line(event: &ChatEvent) -> String {
    match event {
        ChatEvent::MessageAdded { message, .. } => message_line(message),
        ChatEvent::StatusChanged {
            message_id, status, ..
        } => format!("  #{} {} {}", message_id, status, status.ticks()),
        ChatEvent::ReactionsChanged {
            message_id,
            reactions,
            ..
        } => {
            if reactions.is_empty() {
                format!("  #{} reactions cleared", message_id)
            } else {
                format!("  #{} reactions: {}", message_id, reactions.join(" "))
            }
        }
        ChatEvent::DeletePending { message_id, .. } => {
            format!("  Delete message #{}? (/yes or /no)", message_id)
        }
        ChatEvent::MessageDeleted { message_id, .. } => format!("  #{} deleted", message_id),
        ChatEvent::ReplyContextChanged { reply_to, .. } => match reply_to {
            Some(quoted) => format!("  Replying to {}: \"{}\"", quoted.sender, quoted.text),
            None => "  Reply cancelled".to_string(),
        },
    }
}

/// One conversation list row
pub fn summary_line(row: &ConversationSummary) -> String {
    let unread = if row.unread_count > 0 {
        format!(" ({})", row.unread_count)
    } else {
        String::new()
    };
    let preview = row.last_message_preview.as_deref().unwrap_or("");
    let when = row.last_message_timestamp.as_deref().unwrap_or("");
    format!("{:<12} {}{}  {}  {}", row.id, row.name, unread, preview, when)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rally_core::{MessageId, ReplySnapshot};

    fn message() -> Message {
        Message {
            id: MessageId(7),
            text: "See you at 6".into(),
            timestamp: "10:00 AM".into(),
            is_sender: true,
            sender: "You".into(),
            status: MessageStatus::Delivered,
            reactions: vec!["👍".into()],
            reply_to: Some(ReplySnapshot {
                id: MessageId(3),
                text: "Court 4?".into(),
                sender: "Sarah".into(),
            }),
        }
    }

    #[test]
    fn test_message_line() {
        assert_eq!(
            message_line(&message()),
            "[7] 10:00 AM You: See you at 6  (replying to Sarah: \"Court 4?\") ✓✓  👍"
        );
    }

    #[test]
    fn test_incoming_has_no_ticks() {
        let mut incoming = message();
        incoming.is_sender = false;
        incoming.reply_to = None;
        incoming.reactions.clear();
        assert_eq!(message_line(&incoming), "[7] 10:00 AM You: See you at 6");
    }

    #[test]
    fn test_event_lines() {
        let status = ChatEvent::StatusChanged {
            conversation_id: "chat1".into(),
            message_id: MessageId(7),
            status: MessageStatus::Read,
        };
        assert_eq!(event_line(&status), "  #7 read ✓✓");

        let cancelled = ChatEvent::ReplyContextChanged {
            conversation_id: "chat1".into(),
            reply_to: None,
        };
        assert_eq!(event_line(&cancelled), "  Reply cancelled");
    }
}
