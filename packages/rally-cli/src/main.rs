//! Rally Chat
//!
//! Terminal driver for a single Rally conversation. Lines typed on stdin are
//! sent as messages; slash commands reach the long-press actions (reply,
//! react, copy, forward, delete). Status changes arrive asynchronously and
//! are printed as they happen.

mod commands;
mod render;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use rally_core::messaging::{ActionOutcome, MemoryClipboard};
use rally_core::{ChatEvent, ChatSession, MessageLifecycleManager};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use commands::Command;
use settings::Overrides;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rally-chat", version, about = "Rally chat in the terminal")]
struct Args {
    /// Conversation to open
    #[arg(short, long, default_value = "chat1", env = "RALLY_CONVERSATION")]
    conversation: String,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Milliseconds until a sent message shows as delivered
    #[arg(long, env = "RALLY_DELIVERY_DELAY_MS")]
    delivery_delay_ms: Option<u64>,

    /// Milliseconds until a sent message shows as read
    #[arg(long, env = "RALLY_READ_DELAY_MS")]
    read_delay_ms: Option<u64>,

    /// Display name for your own messages
    #[arg(long, env = "RALLY_SENDER")]
    sender: Option<String>,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rally_cli=info,rally_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = settings::resolve(
        args.config.as_deref(),
        Overrides {
            delivery_delay_ms: args.delivery_delay_ms,
            read_delay_ms: args.read_delay_ms,
            sender: args.sender,
        },
    )?;

    tracing::info!(
        delivery_ms = config.delivery_delay_ms,
        read_ms = config.read_delay_ms,
        "Starting rally-chat v{}",
        rally_core::version()
    );

    let mut session = ChatSession::seeded(config)?;
    let clipboard = Arc::new(MemoryClipboard::new());
    let manager = session
        .open(&args.conversation)?
        .with_clipboard(clipboard.clone());

    if let Some(profile) = session.profile(&args.conversation) {
        println!("── {} ({}) ──", profile.name, profile.presence_label());
    }
    for message in manager.messages() {
        println!("{}", render::message_line(&message));
    }
    println!("Type /help for commands.");

    let printer = tokio::spawn(print_events(manager.subscribe(), args.json));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match commands::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => run(&manager, &session, &clipboard, command),
            Err(usage) => println!("{}", usage),
        }
    }

    manager.close();
    drop(manager);
    // The event channel closes once the manager is gone
    printer.await?;
    Ok(())
}

// ── Event Printing ────────────────────────────────────────────────────────────

async fn print_events(mut events: broadcast::Receiver<ChatEvent>, json: bool) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if json {
                    match serde_json::to_string(&event) {
                        Ok(line) => println!("{}", line),
                        Err(e) => tracing::warn!("Failed to encode event: {}", e),
                    }
                } else {
                    println!("{}", render::event_line(&event));
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event printer fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

// ── Command Dispatch ──────────────────────────────────────────────────────────

fn run(
    manager: &MessageLifecycleManager,
    session: &ChatSession,
    clipboard: &MemoryClipboard,
    command: Command,
) {
    let result = match command {
        Command::Send(text) => manager.send(&text).map(|_| ()),
        Command::Action(id, action) => manager.handle_action(id, action).map(|outcome| {
            match outcome {
                ActionOutcome::Copied => {
                    println!("  Copied: {}", clipboard.contents().unwrap_or_default())
                }
                ActionOutcome::Forwarded(message) => {
                    println!("  Forwarding \"{}\" (no recipients yet)", message.text)
                }
                ActionOutcome::Ignored(action) => {
                    println!("  {} is not available yet", action.label())
                }
                ActionOutcome::ReplyContextSet(_) | ActionOutcome::DeletePending(_) => {}
            }
        }),
        Command::CancelReply => {
            manager.cancel_reply();
            Ok(())
        }
        Command::React(id, emoji) => manager.react(id, &emoji).map(|_| ()),
        Command::ConfirmDelete => manager.confirm_delete().map(|_| ()),
        Command::DeclineDelete => {
            if manager.cancel_delete().is_some() {
                println!("  Kept it");
            }
            Ok(())
        }
        Command::List => {
            for message in manager.messages() {
                println!("{}", render::message_line(&message));
            }
            Ok(())
        }
        Command::Inbox(query) => {
            let rows = match query {
                Some(query) => session.search(&query),
                None => session.summaries(),
            };
            for row in &rows {
                println!("{}", render::summary_line(row));
            }
            Ok(())
        }
        Command::Help => {
            println!("{}", commands::HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    if let Err(e) = result {
        if e.is_recoverable() {
            println!("  {}", e);
        } else {
            tracing::error!(code = e.code(), "{}", e);
        }
    }
}
