// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Proptest Strategies
//!
//! Reusable proptest strategies for property-based testing.

use parlor_core::conversation::RosterEntry;
use proptest::prelude::*;

// ============================================================
// Roster Strategies
// ============================================================

/// Strategy for peer ids drawn from a small pool, so snapshots overlap.
pub fn peer_id_strategy() -> impl Strategy<Value = String> {
    "[A-F]"
}

/// Strategy for a valid roster entry. Chat ids derive from peer ids.
pub fn roster_entry_strategy() -> impl Strategy<Value = RosterEntry> {
    (peer_id_strategy(), proptest::option::of(0u32..5)).prop_map(|(id, unread)| {
        let entry = RosterEntry::new(id.clone(), format!("chat-{id}"));
        match unread {
            Some(n) => entry.with_unread(n),
            None => entry,
        }
    })
}

/// Strategy for a roster entry that may be malformed.
pub fn maybe_malformed_entry_strategy() -> impl Strategy<Value = RosterEntry> {
    prop_oneof![
        4 => roster_entry_strategy(),
        1 => Just(RosterEntry::default()),
        1 => peer_id_strategy().prop_map(|id| RosterEntry {
            user_id: Some(id),
            ..Default::default()
        }),
    ]
}

/// Strategy for a roster snapshot, possibly with duplicate and malformed entries.
pub fn snapshot_strategy() -> impl Strategy<Value = Vec<RosterEntry>> {
    proptest::collection::vec(maybe_malformed_entry_strategy(), 0..10)
}

// ============================================================
// Event Strategies
// ============================================================

/// Operations applied to a store in unread-count properties.
#[derive(Debug, Clone)]
pub enum StoreOp {
    Inbound { peer: String },
    Select { peer: String },
    ClearSelection,
    MarkRead { peer: String },
}

pub fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        4 => peer_id_strategy().prop_map(|peer| StoreOp::Inbound { peer }),
        1 => peer_id_strategy().prop_map(|peer| StoreOp::Select { peer }),
        1 => Just(StoreOp::ClearSelection),
        1 => peer_id_strategy().prop_map(|peer| StoreOp::MarkRead { peer }),
    ]
}
