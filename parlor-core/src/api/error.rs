// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the Parlor API layer.

use thiserror::Error;

use crate::composer::ComposeError;
use crate::conversation::ConversationError;
use crate::inquiry::InquiryError;
use crate::network::NetworkError;

/// Unified error type for chat session operations.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Network operation failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Conversation lookup failed.
    #[error("conversation error: {0}")]
    Conversation(#[from] ConversationError),

    /// Deferred inquiry storage failed.
    #[error("inquiry error: {0}")]
    Inquiry(#[from] InquiryError),

    /// A message could not be composed or sent.
    #[error("send error: {0}")]
    Compose(#[from] ComposeError),

    /// Invalid operation in current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for chat session operations.
pub type ChatResult<T> = Result<T, ChatError>;
