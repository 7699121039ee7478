// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deferred Inquiries
//!
//! Product inquiries captured before a chat session exists, persisted under
//! the target conversation's chat id and sent once when that conversation
//! is ready.

mod bridge;
mod error;
mod payload;
mod store;

pub use bridge::{BridgeOutcome, DeferredInquiryBridge, DiscardReason};
pub use error::InquiryError;
pub use payload::{CorrelationToken, DeferredInquiry};
pub use store::{InquiryStore, MemoryInquiryStore, SqliteInquiryStore};
