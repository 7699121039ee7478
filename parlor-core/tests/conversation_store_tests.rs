// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for conversation::store

mod common;

use common::fixtures::{inbound, roster_ab};
use parlor_core::conversation::*;
use serde_json::json;

fn store_ab() -> ConversationStore {
    let mut store = ConversationStore::new();
    store.set_roster(roster_ab());
    store
}

fn keys(store: &ConversationStore) -> Vec<&str> {
    store.peers().iter().map(Peer::peer_id).collect()
}

// === Roster ===

#[test]
fn test_set_roster_populates_in_snapshot_order() {
    let mut store = ConversationStore::new();
    assert!(!store.has_roster());

    let merge = store.set_roster(roster_ab());

    assert!(store.has_roster());
    assert_eq!(keys(&store), vec!["A", "B"]);
    assert_eq!(merge.added, vec!["A", "B"]);
    assert!(merge.retained.is_empty());
    assert_eq!(store.peer("A").unwrap().display_name(), "Alice");
    assert_eq!(store.peer("A").unwrap().chat_id(), "c1");
}

#[test]
fn test_snapshot_keeps_logs_and_local_unread_counts() {
    let mut store = store_ab();
    store
        .append_message("A", inbound("A", "c1", "hello", 1_000))
        .unwrap();
    store.increment_unread("B").unwrap();
    store.increment_unread("B").unwrap();

    let merge = store.set_roster(vec![
        RosterEntry::new("B", "c2").with_unread(0),
        RosterEntry::new("A", "c1").with_unread(7),
        RosterEntry::new("C", "c3").with_unread(4),
    ]);

    assert_eq!(keys(&store), vec!["B", "A", "C"]);
    assert_eq!(merge.added, vec!["C"]);
    assert_eq!(merge.retained, vec!["B", "A"]);
    assert!(merge.removed.is_empty());
    assert_eq!(store.messages_for("A").len(), 1);
    assert_eq!(store.unread_count("A"), Some(0));
    assert_eq!(store.unread_count("B"), Some(2));
    assert_eq!(store.unread_count("C"), Some(4));
}

#[test]
fn test_redelivered_snapshot_changes_nothing() {
    let mut store = store_ab();
    store.increment_unread("A").unwrap();
    store.select("B").unwrap();

    let merge = store.set_roster(roster_ab());

    assert_eq!(keys(&store), vec!["A", "B"]);
    assert!(merge.added.is_empty());
    assert!(merge.removed.is_empty());
    assert_eq!(store.unread_count("A"), Some(1));
    assert_eq!(store.selected_key(), Some("B"));
    assert!(!merge.selection_cleared);
}

#[test]
fn test_selected_peer_leaving_clears_selection() {
    let mut store = store_ab();
    store.select("A").unwrap();

    let merge = store.set_roster(vec![RosterEntry::new("B", "c2")]);

    assert_eq!(merge.removed, vec!["A"]);
    assert!(merge.selection_cleared);
    assert!(store.selected_peer().is_none());
    assert!(store.peer("A").is_none());
}

#[test]
fn test_renamed_peer_matched_by_chat_id() {
    let mut store = store_ab();
    store
        .append_message("A", inbound("A", "c1", "hello", 1_000))
        .unwrap();
    store.select("A").unwrap();

    let merge = store.set_roster(vec![
        RosterEntry::new("A2", "c1"),
        RosterEntry::new("B", "c2"),
    ]);

    assert_eq!(merge.retained, vec!["A2", "B"]);
    assert!(merge.removed.is_empty());
    assert_eq!(store.selected_key(), Some("A2"));
    assert_eq!(store.messages_for("A2").len(), 1);
}

#[test]
fn test_duplicate_entries_keep_first() {
    let mut store = ConversationStore::new();

    let merge = store.set_roster(vec![
        RosterEntry::new("A", "c1"),
        RosterEntry::new("A", "c9"),
    ]);

    assert_eq!(store.len(), 1);
    assert_eq!(store.peer("A").unwrap().chat_id(), "c1");
    assert_eq!(
        merge.rejected,
        vec![RosterError::DuplicatePeer {
            index: 1,
            peer_id: "A".into()
        }]
    );
}

#[test]
fn test_malformed_entries_dropped_rest_applied() {
    let mut store = ConversationStore::new();

    let merge = store.set_roster(vec![
        RosterEntry::default(),
        RosterEntry {
            user_id: Some("X".into()),
            ..Default::default()
        },
        RosterEntry::new("  ", "c5"),
        RosterEntry::new("A", "c1"),
    ]);

    assert_eq!(keys(&store), vec!["A"]);
    assert_eq!(
        merge.rejected,
        vec![
            RosterError::MissingField {
                index: 0,
                field: "userID"
            },
            RosterError::MissingField {
                index: 1,
                field: "chatId"
            },
            RosterError::MissingField {
                index: 2,
                field: "userID"
            },
        ]
    );
}

#[test]
fn test_roster_entry_from_wrongly_typed_value_is_rejected() {
    let entry = RosterEntry::from_value(json!({"userID": 42, "chatId": "c1"}));
    assert_eq!(entry, RosterEntry::default());
    assert!(entry.validate(0).is_err());
}

#[test]
fn test_roster_entry_wire_names() {
    let entry = RosterEntry::from_value(json!({
        "userID": "A",
        "username": "Alice",
        "storeName": "Alice's Antiques",
        "profilePicture": "https://img.example.com/a.png",
        "chatId": "c1",
        "unread": 3
    }));

    let peer = entry.validate(0).unwrap();
    assert_eq!(peer.peer_id(), "A");
    assert_eq!(peer.display_name(), "Alice");
    assert_eq!(peer.store_name(), Some("Alice's Antiques"));
    assert_eq!(peer.profile_picture(), Some("https://img.example.com/a.png"));
    assert_eq!(peer.unread_count(), 3);
}

#[test]
fn test_display_name_fallbacks() {
    let store_only = RosterEntry::new("S", "c1")
        .with_store_name("Shop")
        .validate(0)
        .unwrap();
    assert_eq!(store_only.display_name(), "Shop");

    let blank_name = RosterEntry::new("P", "c2")
        .with_username("   ")
        .validate(0)
        .unwrap();
    assert_eq!(blank_name.display_name(), "P");
}

// === Messages ===

#[test]
fn test_append_and_read_back_in_order() {
    let mut store = store_ab();
    store
        .append_message("A", inbound("A", "c1", "one", 1_000))
        .unwrap();
    store
        .append_message("A", inbound("A", "c1", "two", 900))
        .unwrap();

    let contents: Vec<_> = store
        .messages_for("A")
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(contents, vec!["one", "two"]);
    assert!(store.messages_for("B").is_empty());
    assert!(store.messages_for("nobody").is_empty());
}

#[test]
fn test_redelivered_message_not_appended() {
    let mut store = store_ab();
    let msg = inbound("A", "c1", "hello", 1_000);

    assert_eq!(store.append_message("A", msg.clone()).unwrap(), Some(0));
    assert_eq!(store.append_message("A", msg).unwrap(), None);
    assert_eq!(store.messages_for("A").len(), 1);
}

#[test]
fn test_distinct_messages_sharing_identity_both_kept() {
    let mut store = store_ab();
    let first = inbound("A", "c1", "first", 1_000);
    let second = inbound("A", "c1", "second", 1_000);

    assert_eq!(store.append_message("A", first.clone()).unwrap(), Some(0));
    assert_eq!(store.append_message("A", second.clone()).unwrap(), Some(1));
    assert_eq!(store.append_message("A", second).unwrap(), None);
    assert_eq!(store.append_message("A", first).unwrap(), None);

    let contents: Vec<_> = store
        .messages_for("A")
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(contents, vec!["first", "second"]);
}

#[test]
fn test_messages_without_timestamp_not_collapsed() {
    let mut store = store_ab();

    for content in ["a", "b", "c"] {
        assert!(store
            .append_message("A", inbound("A", "c1", content, 0))
            .unwrap()
            .is_some());
    }
    assert_eq!(store.messages_for("A").len(), 3);
}

#[test]
fn test_append_to_unknown_peer_fails() {
    let mut store = store_ab();
    let result = store.append_message("Z", inbound("Z", "c9", "hi", 1));
    assert_eq!(result, Err(ConversationError::PeerNotFound("Z".into())));
}

#[test]
fn test_resolve_inbound_and_outbound() {
    let store = store_ab();

    assert_eq!(
        store.resolve_inbound(&inbound("B", "c2", "hi", 1)).as_deref(),
        Some("B")
    );
    assert!(store.resolve_inbound(&inbound("Z", "c2", "hi", 1)).is_none());

    let mut outbound = inbound("chat-me", "c2", "hi", 2);
    outbound.to_id = "ignored".into();
    assert_eq!(store.resolve_outbound(&outbound).as_deref(), Some("B"));

    outbound.to_chat_id = "unknown".into();
    outbound.to_id = "A".into();
    assert_eq!(store.resolve_outbound(&outbound).as_deref(), Some("A"));
}

// === Selection and unread ===

#[test]
fn test_select_does_not_touch_unread() {
    let mut store = store_ab();
    store.increment_unread("A").unwrap();

    store.select("A").unwrap();

    assert!(store.is_selected("A"));
    assert_eq!(store.selected_peer().unwrap().peer_id(), "A");
    assert_eq!(store.unread_count("A"), Some(1));
}

#[test]
fn test_select_unknown_peer_fails() {
    let mut store = store_ab();
    assert!(store.select("Z").is_err());
    assert!(store.selected_key().is_none());
}

#[test]
fn test_mark_read_is_idempotent() {
    let mut store = store_ab();
    store.increment_unread("A").unwrap();
    store.increment_unread("A").unwrap();

    assert!(store.mark_read("A").unwrap());
    assert_eq!(store.unread_count("A"), Some(0));
    assert!(!store.mark_read("A").unwrap());
    assert_eq!(store.unread_count("A"), Some(0));
}

#[test]
fn test_mark_read_only_touches_addressed_peer() {
    let mut store = store_ab();
    store.increment_unread("A").unwrap();
    store.increment_unread("B").unwrap();

    store.mark_read("A").unwrap();

    assert_eq!(store.unread_count("B"), Some(1));
    assert_eq!(store.total_unread(), 1);
}

#[test]
fn test_clear_selection_returns_previous() {
    let mut store = store_ab();
    store.select("B").unwrap();

    assert_eq!(store.clear_selection().as_deref(), Some("B"));
    assert_eq!(store.clear_selection(), None);
}

// === Opening conversations ===

#[test]
fn test_open_conversation_selects_existing_peer() {
    let mut store = store_ab();

    let key = store.open_conversation("c2", "Bob's Shop");

    assert_eq!(key, "B");
    assert_eq!(store.len(), 2);
    assert_eq!(store.selected_key(), Some("B"));
}

#[test]
fn test_open_conversation_creates_placeholder() {
    let mut store = store_ab();

    let key = store.open_conversation("c9", "Shop");

    assert_eq!(key, "Shop");
    let peer = store.peer("Shop").unwrap();
    assert_eq!(peer.chat_id(), "c9");
    assert_eq!(peer.display_name(), "Shop");
    assert_eq!(peer.store_name(), Some("Shop"));
    assert!(peer.is_placeholder());
    assert_eq!(store.selected_key(), Some("Shop"));
}

#[test]
fn test_placeholder_survives_snapshot_without_its_chat_id() {
    let mut store = store_ab();
    store.open_conversation("c9", "Shop");
    store
        .append_message("Shop", inbound("me", "c9", "Is this in stock?", 1_000))
        .unwrap();

    let merge = store.set_roster(roster_ab());
    store.set_roster(roster_ab());

    assert_eq!(keys(&store), vec!["A", "B", "Shop"]);
    assert!(merge.retained.contains(&"Shop".to_string()));
    assert!(merge.removed.is_empty());
    assert!(!merge.selection_cleared);
    assert_eq!(store.selected_key(), Some("Shop"));
    assert_eq!(store.messages_for("Shop").len(), 1);
}

#[test]
fn test_roster_entry_replaces_placeholder_by_chat_id() {
    let mut store = store_ab();
    store.open_conversation("c9", "Shop");
    store
        .append_message("Shop", inbound("me", "c9", "hello", 1_000))
        .unwrap();

    let mut roster = roster_ab();
    roster.push(RosterEntry::new("V", "c9").with_store_name("Shop"));
    let merge = store.set_roster(roster);

    assert_eq!(keys(&store), vec!["A", "B", "V"]);
    assert_eq!(merge.retained, vec!["A", "B", "V"]);
    assert!(merge.added.is_empty());
    assert!(!store.peer("V").unwrap().is_placeholder());
    assert_eq!(store.messages_for("V").len(), 1);
    assert_eq!(store.selected_key(), Some("V"));
}

#[test]
fn test_placeholder_dropped_when_roster_reuses_its_key() {
    let mut store = store_ab();
    store.open_conversation("c9", "Shop");

    let mut roster = roster_ab();
    roster.push(RosterEntry::new("Shop", "c5"));
    let merge = store.set_roster(roster);

    assert_eq!(keys(&store), vec!["A", "B", "Shop"]);
    assert_eq!(store.peer("Shop").unwrap().chat_id(), "c5");
    assert_eq!(merge.removed, vec!["Shop"]);
    assert!(merge.selection_cleared);
}

#[test]
fn test_open_conversation_avoids_key_collision() {
    let mut store = ConversationStore::new();
    store.set_roster(vec![RosterEntry::new("Shop", "c1")]);

    let key = store.open_conversation("c9", "Shop");

    assert_eq!(key, "c9");
    assert_eq!(store.len(), 2);
}
