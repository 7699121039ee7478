// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for network::connection

mod common;

use common::fixtures::{connected, connection, identity};
use parlor_core::network::*;

#[test]
fn test_connect_authenticates_first() {
    let transport = MockTransport::new();
    let mut conn = connection(&transport);

    let handle = conn.connect(identity()).unwrap();

    assert!(conn.is_connected());
    assert_eq!(conn.handle(), Some(handle));
    assert_eq!(
        conn.take_state_changes(),
        vec![ConnectionState::Connecting, ConnectionState::Connected]
    );
    let sent = transport.sent_events();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        RelayEvent::Authenticate(auth) => {
            assert_eq!(auth.session_id, "chat-me");
            assert_eq!(auth.user_email, "me@example.com");
        }
        other => panic!("expected authenticate, got {other:?}"),
    }
}

#[test]
fn test_connect_retries_then_succeeds() {
    let transport = MockTransport::new();
    transport.fail_next_connects(2);
    let mut conn = connection(&transport);

    conn.connect(identity()).unwrap();

    assert_eq!(transport.connect_calls(), 3);
    assert_eq!(conn.state(), ConnectionState::Connected);
}

#[test]
fn test_connect_gives_up_after_budget() {
    let transport = MockTransport::new();
    transport.refuse_connections(true);
    let mut conn = connection(&transport);

    let result = conn.connect(identity());

    // One initial attempt plus two retries.
    assert_eq!(result, Err(NetworkError::MaxRetriesExceeded { attempts: 3 }));
    assert_eq!(transport.connect_calls(), 3);
    assert_eq!(conn.state(), ConnectionState::Failed);
    assert!(conn.handle().is_none());
    assert_eq!(
        conn.take_state_changes(),
        vec![ConnectionState::Connecting, ConnectionState::Failed]
    );
}

#[test]
fn test_failed_is_terminal_until_connect() {
    let transport = MockTransport::new();
    transport.refuse_connections(true);
    let mut conn = connection(&transport);
    let _ = conn.connect(identity());
    let calls = transport.connect_calls();

    assert_eq!(conn.receive(), Err(NetworkError::NotConnected));
    assert_eq!(
        conn.send(&create_frame(RelayEvent::Disconnect)),
        Err(NetworkError::NotConnected)
    );
    assert_eq!(transport.connect_calls(), calls);
    assert_eq!(conn.state(), ConnectionState::Failed);

    transport.refuse_connections(false);
    conn.take_state_changes();
    conn.connect(identity()).unwrap();
    assert_eq!(
        conn.take_state_changes(),
        vec![ConnectionState::Connecting, ConnectionState::Connected]
    );
}

#[test]
fn test_drop_reconnects_with_new_handle() {
    let transport = MockTransport::new();
    let (mut conn, first) = connected(&transport);

    transport.drop_connection();
    assert_eq!(conn.receive(), Ok(None));

    let second = conn.handle().unwrap();
    assert_ne!(first, second);
    assert!(second.id() > first.id());
    assert_eq!(
        conn.take_state_changes(),
        vec![
            ConnectionState::Reconnecting { attempt: 1 },
            ConnectionState::Connected
        ]
    );
    assert!(matches!(
        transport.sent_events().last(),
        Some(RelayEvent::Authenticate(_))
    ));
}

#[test]
fn test_drop_during_send_reconnects_and_reports_closed() {
    let transport = MockTransport::new();
    let (mut conn, first) = connected(&transport);

    transport.drop_connection();
    let result = conn.send(&create_frame(RelayEvent::Disconnect));

    assert_eq!(result, Err(NetworkError::ConnectionClosed));
    assert!(conn.is_connected());
    assert_ne!(conn.handle(), Some(first));
}

#[test]
fn test_drop_with_relay_gone_fails() {
    let transport = MockTransport::new();
    let (mut conn, _) = connected(&transport);

    transport.refuse_connections(true);
    transport.drop_connection();

    assert_eq!(conn.receive(), Ok(None));
    assert!(conn.is_reconnecting());
    assert_eq!(
        conn.receive(),
        Err(NetworkError::MaxRetriesExceeded { attempts: 2 })
    );
    assert_eq!(conn.state(), ConnectionState::Failed);
    assert!(!conn.is_reconnecting());
    assert_eq!(
        conn.take_state_changes(),
        vec![
            ConnectionState::Reconnecting { attempt: 1 },
            ConnectionState::Reconnecting { attempt: 2 },
            ConnectionState::Failed
        ]
    );
}

#[test]
fn test_send_while_reconnecting_not_connected() {
    let transport = MockTransport::new();
    let (mut conn, _) = connected(&transport);

    transport.fail_next_connects(1);
    transport.drop_connection();
    assert_eq!(conn.receive(), Ok(None));
    assert!(conn.is_reconnecting());

    let frame = create_frame(RelayEvent::Disconnect);
    assert_eq!(conn.send(&frame), Err(NetworkError::NotConnected));

    assert_eq!(conn.receive(), Ok(None));
    assert!(conn.is_connected());
    assert_eq!(transport.connect_calls(), 3);
}

#[test]
fn test_disconnect_notifies_relay() {
    let transport = MockTransport::new();
    let (mut conn, _) = connected(&transport);

    conn.disconnect().unwrap();

    assert_eq!(transport.sent_events(), vec![RelayEvent::Disconnect]);
    assert!(!transport.is_open());
    assert!(conn.handle().is_none());
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[test]
fn test_disconnect_is_idempotent() {
    let transport = MockTransport::new();
    let (mut conn, _) = connected(&transport);

    conn.disconnect().unwrap();
    conn.disconnect().unwrap();

    assert_eq!(transport.sent_events(), vec![RelayEvent::Disconnect]);
    assert_eq!(
        conn.take_state_changes(),
        vec![ConnectionState::Disconnected]
    );
}

#[test]
fn test_reentrant_connect_tears_down_first() {
    let transport = MockTransport::new();
    let (mut conn, first) = connected(&transport);

    let second = conn.connect(identity()).unwrap();

    assert_ne!(first, second);
    let sent = transport.sent_events();
    assert_eq!(sent[0], RelayEvent::Disconnect);
    assert!(matches!(sent[1], RelayEvent::Authenticate(_)));
    assert_eq!(transport.disconnect_calls(), 1);
}

#[test]
fn test_default_reconnect_policy() {
    let config = TransportConfig::default();
    assert_eq!(config.max_reconnect_attempts, 10);
    assert_eq!(config.reconnect_delay_ms, 5_000);
    assert_eq!(config.connect_timeout_ms, 10_000);
    assert_eq!(config.total_attempts(), 11);
}
