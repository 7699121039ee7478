// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deferred inquiry error types.

use thiserror::Error;

/// Deferred inquiry errors.
#[derive(Error, Debug)]
pub enum InquiryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A payload exists but is addressed to another conversation.
    #[error("stale inquiry payload: addressed to {payload_chat_id}, session is for {token_chat_id}")]
    StalePayload {
        token_chat_id: String,
        payload_chat_id: String,
    },
}

impl From<serde_json::Error> for InquiryError {
    fn from(e: serde_json::Error) -> Self {
        InquiryError::Serialization(e.to_string())
    }
}
