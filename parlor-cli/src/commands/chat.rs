// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat Command
//!
//! Interactive chat session over the relay. Lines read from stdin are sent
//! to the selected conversation; lines starting with `/` are commands.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use parlor_core::network::{Transport, WebSocketTransport};
use parlor_core::{ChatEvent, ChatSession, CorrelationToken, SendStatus, SessionIdentity};

use crate::config::CliConfig;
use crate::display;

/// Pause between polls while no connection is up.
const IDLE_POLL: Duration = Duration::from_millis(200);

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Runs an interactive chat session.
///
/// With a `target` (chat id, store name), that conversation is opened once
/// the roster arrives and any inquiry queued for it is sent.
pub fn run(
    config: &CliConfig,
    identity: SessionIdentity,
    target: Option<(String, String)>,
) -> Result<()> {
    let mut builder = ChatSession::builder()
        .config(config.chat_config()?)
        .identity(identity)
        .transport(WebSocketTransport::new)
        .inquiry_store(config.open_inquiries()?);
    if let Some((chat_id, store_name)) = target {
        builder = builder.correlation_token(CorrelationToken::new(chat_id, store_name));
    }
    let mut session = builder.build()?;

    let (event_tx, event_rx) = mpsc::channel();
    session.on_event(move |event| {
        let _ = event_tx.send(event);
    });

    display::info(&format!("Connecting to {}", config.relay_url));
    session.connect()?;
    display::success("Connected. Type /help for commands.");

    let lines = spawn_stdin_reader();
    loop {
        if let Err(e) = session.poll() {
            display::error(&format!("{e}"));
            if session.connection_state().is_failed() {
                return Err(e.into());
            }
        }
        for event in event_rx.try_iter() {
            show_event(&session, event);
        }

        match lines.try_recv() {
            Ok(line) => {
                if handle_line(&mut session, line.trim()) == Flow::Quit {
                    break;
                }
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if !session.is_connected() {
            thread::sleep(IDLE_POLL);
        }
    }

    session.disconnect()?;
    for event in event_rx.try_iter() {
        show_event(&session, event);
    }
    Ok(())
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn handle_line<T: Transport>(session: &mut ChatSession<T>, line: &str) -> Flow {
    let (command, arg) = match line.split_once(' ') {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "/quit" | "/exit" => return Flow::Quit,
        "/help" => print_help(),
        "/peers" => display::display_peers(
            session.conversations().peers(),
            session.conversations().selected_key(),
        ),
        "/select" if !arg.is_empty() => match session.select(arg) {
            Ok(()) => show_history(session, arg),
            Err(e) => display::error(&format!("{e}")),
        },
        "/close" => session.clear_selection(),
        _ if command.starts_with('/') => {
            display::warning(&format!("Unknown command {command}. Type /help."))
        }
        _ => {
            if let Err(e) = session.send_chat(line) {
                display::error(&format!("{e}"));
            }
        }
    }
    Flow::Continue
}

fn print_help() {
    println!("  /peers          list conversations");
    println!("  /select <peer>  open a conversation");
    println!("  /close          close the open conversation");
    println!("  /quit           leave");
    println!("  anything else is sent to the open conversation");
}

fn show_history<T: Transport>(session: &ChatSession<T>, peer_key: &str) {
    let own = &session.identity().user_chat_id;
    for message in session.conversations().messages_for(peer_key) {
        display::display_message(message, &message.from_id == own);
    }
}

fn peer_name<T: Transport>(session: &ChatSession<T>, peer_key: &str) -> String {
    session
        .conversations()
        .peer(peer_key)
        .map(|p| p.display_name().to_string())
        .unwrap_or_else(|| peer_key.to_string())
}

fn show_event<T: Transport>(session: &ChatSession<T>, event: ChatEvent) {
    match event {
        ChatEvent::ConnectionStateChanged { state } => {
            display::info(&format!("Connection: {state:?}"))
        }
        ChatEvent::MessageAppended {
            peer_key,
            index,
            outgoing,
            ..
        } => {
            if !session.conversations().is_selected(&peer_key) {
                return;
            }
            let message = session.conversations().messages_for(&peer_key).get(index);
            if let Some(message) = message {
                display::display_message(message, outgoing);
            }
        }
        ChatEvent::UnreadCountChanged { peer_key, unread } if unread > 0 => display::info(
            &format!("{}: {unread} unread", peer_name(session, &peer_key)),
        ),
        ChatEvent::RosterUpdated {
            added,
            removed,
            rejected,
        } => {
            if !added.is_empty() || !removed.is_empty() {
                display::info(&format!(
                    "{} conversations ({} new, {} gone)",
                    session.conversations().len(),
                    added.len(),
                    removed.len()
                ));
            }
            if rejected > 0 {
                display::warning(&format!("{rejected} roster entries were malformed"));
            }
        }
        ChatEvent::SelectionChanged {
            peer_key: Some(peer_key),
        } => display::success(&format!("Chatting with {}", peer_name(session, &peer_key))),
        ChatEvent::SelectionChanged { peer_key: None } => {
            display::info("No conversation open")
        }
        ChatEvent::SendResolved { status, .. } => match status {
            SendStatus::TimedOut => display::warning("A message was not acknowledged in time"),
            SendStatus::Abandoned => {
                display::warning("A message was dropped by a reconnect; send it again")
            }
            _ => {}
        },
        ChatEvent::InquiryDelivered { peer_key, .. } => display::success(&format!(
            "Queued inquiry sent to {}",
            peer_name(session, &peer_key)
        )),
        _ => {}
    }
}
