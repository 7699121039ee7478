// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Test Fixtures
//!
//! Identities, messages, rosters and session setup shared by the
//! integration tests.

use std::sync::{Arc, Mutex};

use parlor_core::api::{ChatConfig, ChatEvent, ChatSession};
use parlor_core::conversation::{Message, MessageKind, RosterEntry};
use parlor_core::network::{
    ConnectionHandle, ConnectionManager, MockTransport, RelayEvent, RosterSnapshot,
    TransportConfig,
};
use parlor_core::SessionIdentity;

pub const LOCAL_CHAT_ID: &str = "chat-me";

/// The local user.
pub fn identity() -> SessionIdentity {
    SessionIdentity::new("u-me", "Me", "me@example.com", LOCAL_CHAT_ID)
}

/// Transport config with a small retry budget and no retry delay.
pub fn transport_config() -> TransportConfig {
    TransportConfig {
        server_url: "test://relay".into(),
        max_reconnect_attempts: 2,
        reconnect_delay_ms: 0,
        ..Default::default()
    }
}

/// Session config with a small retry budget.
pub fn chat_config() -> ChatConfig {
    ChatConfig {
        relay: transport_config(),
        ..Default::default()
    }
}

/// Connection manager that never waits between attempts.
pub fn connection(transport: &MockTransport) -> ConnectionManager<MockTransport> {
    ConnectionManager::new(transport.clone(), transport_config()).with_sleeper(|_| {})
}

/// Connects a fresh connection manager and clears the authenticate frame.
pub fn connected(transport: &MockTransport) -> (ConnectionManager<MockTransport>, ConnectionHandle) {
    let mut conn = connection(transport);
    let handle = conn.connect(identity()).unwrap();
    conn.take_state_changes();
    transport.clear_sent();
    (conn, handle)
}

/// A session over `transport` with the given config.
pub fn session_with_config(transport: &MockTransport, config: ChatConfig) -> ChatSession {
    let transport = transport.clone();
    ChatSession::builder()
        .config(config)
        .identity(identity())
        .transport(move || transport)
        .sleeper(|_| {})
        .build()
        .unwrap()
}

/// A session over `transport`.
pub fn session(transport: &MockTransport) -> ChatSession {
    session_with_config(transport, chat_config())
}

/// A connected session with the sent authenticate frame cleared.
pub fn connected_session(transport: &MockTransport) -> ChatSession {
    let mut session = session(transport);
    session.connect().unwrap();
    transport.clear_sent();
    session
}

/// A chat message from a peer to the local user.
pub fn inbound(from: &str, to_chat_id: &str, content: &str, utc_time_sent: u64) -> Message {
    Message {
        content: content.into(),
        from_id: from.into(),
        from_name: from.into(),
        to_id: LOCAL_CHAT_ID.into(),
        to_name: "Me".into(),
        to_chat_id: to_chat_id.into(),
        utc_time_sent,
        display_time_sent: String::new(),
        kind: MessageKind::Chat,
    }
}

/// Roster of peers A (chat c1) and B (chat c2).
pub fn roster_ab() -> Vec<RosterEntry> {
    vec![
        RosterEntry::new("A", "c1").with_username("Alice"),
        RosterEntry::new("B", "c2").with_username("Bob"),
    ]
}

/// Roster snapshot event.
pub fn roster_event(entries: &[RosterEntry]) -> RelayEvent {
    RelayEvent::RosterUpdate(RosterSnapshot::from_entries(entries))
}

/// Messages sent as `private_message`.
pub fn sent_messages(transport: &MockTransport) -> Vec<Message> {
    transport
        .sent_events()
        .into_iter()
        .filter_map(|e| match e {
            RelayEvent::PrivateMessage(m) => Some(m),
            _ => None,
        })
        .collect()
}

/// Chat ids of sent read receipts.
pub fn sent_receipts(transport: &MockTransport) -> Vec<String> {
    transport
        .sent_events()
        .into_iter()
        .filter_map(|e| match e {
            RelayEvent::ReadReceipt(r) => Some(r.to_chat_id),
            _ => None,
        })
        .collect()
}

/// Records every event a session dispatches.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<ChatEvent>>>);

impl EventLog {
    /// Attaches a new log to `session`.
    pub fn attach(session: &mut ChatSession) -> Self {
        let log = EventLog::default();
        let sink = log.clone();
        session.on_event(move |event| sink.0.lock().unwrap().push(event));
        log
    }

    pub fn events(&self) -> Vec<ChatEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn count(&self, pred: impl Fn(&ChatEvent) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}
