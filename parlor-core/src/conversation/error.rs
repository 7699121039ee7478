// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversation error types.

use thiserror::Error;

/// Conversation store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("peer not found: {0}")]
    PeerNotFound(String),
}

/// Reason a roster snapshot entry was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("roster entry {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("roster entry {index} duplicates peer {peer_id}")]
    DuplicatePeer { index: usize, peer_id: String },
}
