// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Identity
//!
//! The local user's identity as supplied by the surrounding application.

use serde::{Deserialize, Serialize};

/// Identity of the local user for the lifetime of a chat session.
///
/// Owned by the caller and never modified by the core. `user_chat_id` is
/// presented to the relay as the session id and is the `fromId` of every
/// message composed locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    /// Account id from the identity provider.
    pub user_id: String,
    /// Display name shown to peers.
    pub user_name: String,
    /// Account email.
    pub user_email: String,
    /// Relay-level chat id.
    pub user_chat_id: String,
}

impl SessionIdentity {
    /// Creates a new session identity.
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
        user_chat_id: impl Into<String>,
    ) -> Self {
        SessionIdentity {
            user_id: user_id.into(),
            user_name: user_name.into(),
            user_email: user_email.into(),
            user_chat_id: user_chat_id.into(),
        }
    }
}
