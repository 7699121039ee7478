// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversation State
//!
//! Roster, per-peer message logs, unread counters and selection for the
//! live session. Nothing here outlives the session.

mod error;
mod message;
mod peer;
mod store;

pub use error::{ConversationError, RosterError};
pub use message::{InquiryDetails, Message, MessageIdentity, MessageKind};
pub use peer::{Peer, PeerKey, RosterEntry};
pub use store::{ConversationStore, RosterMerge};
