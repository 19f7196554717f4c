//! Parsing of composer input lines.
//!
//! Anything not starting with `/` is message text. Slash commands map onto
//! lifecycle manager operations.

use rally_core::{MessageAction, MessageId};

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send the text as a message
    Send(String),
    /// Run a long-press action on a message
    Action(MessageId, MessageAction),
    /// Drop the reply context
    CancelReply,
    /// Toggle a reaction
    React(MessageId, String),
    /// Confirm the pending delete
    ConfirmDelete,
    /// Decline the pending delete
    DeclineDelete,
    /// Print the conversation
    List,
    /// Print the conversation list, optionally filtered
    Inbox(Option<String>),
    /// Print usage
    Help,
    /// Leave
    Quit,
}

/// Parse one input line. Errors carry a message for the user.
pub fn parse(line: &str) -> Result<Command, String> {
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Ok(Command::Send(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();

    match name.as_str() {
        "reply" | "copy" | "forward" | "delete" | "edit" | "info" | "star" => {
            let id = message_id(parts.next())?;
            let action = name.parse::<MessageAction>().map_err(|e| e.to_string())?;
            Ok(Command::Action(id, action))
        }
        "cancel-reply" => Ok(Command::CancelReply),
        "react" => {
            let id = message_id(parts.next())?;
            let emoji = parts.next().ok_or("usage: /react <id> <emoji>")?;
            Ok(Command::React(id, emoji.to_string()))
        }
        "yes" => Ok(Command::ConfirmDelete),
        "no" => Ok(Command::DeclineDelete),
        "list" => Ok(Command::List),
        "inbox" => {
            let query: Vec<&str> = parts.collect();
            Ok(Command::Inbox((!query.is_empty()).then(|| query.join(" "))))
        }
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: /{}", other)),
    }
}

fn message_id(arg: Option<&str>) -> Result<MessageId, String> {
    let arg = arg.ok_or("missing message id")?;
    arg.parse::<i64>()
        .map(MessageId)
        .map_err(|_| format!("not a message id: {}", arg))
}

/// Usage text
pub const HELP: &str = "\
Type text and press enter to send it.
  /reply <id>          quote a message in your next send
  /cancel-reply        stop quoting
  /react <id> <emoji>  toggle a reaction
  /copy <id>           copy message text
  /forward <id>        forward a message
  /delete <id>         delete a message (then /yes or /no)
  /list                show the conversation
  /inbox [query]       show (and search) the conversation list
  /quit                leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_send() {
        assert_eq!(parse("hello /there").unwrap(), Command::Send("hello /there".into()));
        assert_eq!(parse("   ").unwrap(), Command::Send("   ".into()));
    }

    #[test]
    fn test_actions() {
        assert_eq!(
            parse("/reply 3").unwrap(),
            Command::Action(MessageId(3), MessageAction::Reply)
        );
        assert_eq!(
            parse("/DELETE 12").unwrap(),
            Command::Action(MessageId(12), MessageAction::Delete)
        );
        assert!(parse("/copy").is_err());
        assert!(parse("/copy abc").is_err());
    }

    #[test]
    fn test_react() {
        assert_eq!(
            parse("/react 1 👍").unwrap(),
            Command::React(MessageId(1), "👍".into())
        );
        assert!(parse("/react 1").is_err());
    }

    #[test]
    fn test_inbox_query() {
        assert_eq!(parse("/inbox").unwrap(), Command::Inbox(None));
        assert_eq!(
            parse("/inbox badminton club").unwrap(),
            Command::Inbox(Some("badminton club".into()))
        );
    }

    #[test]
    fn test_misc() {
        assert_eq!(parse("/yes").unwrap(), Command::ConfirmDelete);
        assert_eq!(parse("/no").unwrap(), Command::DeclineDelete);
        assert_eq!(parse("/cancel-reply").unwrap(), Command::CancelReply);
        assert_eq!(parse("/exit").unwrap(), Command::Quit);
        assert!(parse("/dance").is_err());
    }
}
