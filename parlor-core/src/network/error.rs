// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network error types.

use thiserror::Error;

/// Errors raised by the transport and connection layers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("not connected")]
    NotConnected,

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection attempt timed out")]
    ConnectionTimeout,

    #[error("connection closed by relay")]
    ConnectionClosed,

    /// Reconnection budget exhausted; the connection is now `Failed`.
    #[error("gave up after {attempts} connection attempts")]
    MaxRetriesExceeded { attempts: u32 },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    #[error("invalid frame: {0}")]
    InvalidMessage(String),

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::Serialization(err.to_string())
    }
}
