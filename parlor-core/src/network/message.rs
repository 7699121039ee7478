// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Relay Frame Types
//!
//! Wire protocol frames exchanged with the chat relay. Frames are JSON
//! objects; the payload names its event in the `event` field and carries
//! the event body in `data`.

use serde::{Deserialize, Serialize};

use crate::conversation::{Message, RosterEntry};
use crate::identity::SessionIdentity;

/// Unique frame identifier, used to correlate acknowledgments.
pub type FrameId = String;

/// Wire protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Envelope wrapping every frame on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayFrame {
    /// Protocol version for compatibility checking.
    pub version: u8,
    /// Unique frame ID (UUID v4).
    pub frame_id: FrameId,
    /// Unix timestamp (milliseconds) when the frame was created.
    pub timestamp: u64,
    /// The event carried by this frame.
    pub payload: RelayEvent,
}

/// Events understood by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RelayEvent {
    /// Client credentials, sent first on every connection.
    Authenticate(AuthenticatePayload),
    /// Outbound message that expects an acknowledgment.
    PrivateMessage(Message),
    /// Relay accepted a frame for delivery.
    Ack(Acknowledgment),
    /// Fire-and-forget notice for presence and housekeeping listeners.
    NewMessageNotify(Message),
    /// Read receipt for a conversation, addressed by chat id.
    ReadReceipt(ReadReceipt),
    /// Inbound message pushed by the relay.
    NewMessages(Message),
    /// Full roster snapshot.
    RosterUpdate(RosterSnapshot),
    /// Voluntary disconnect notice.
    Disconnect,
    /// Unrecognized event (forward compatibility).
    #[serde(other)]
    Unknown,
}

impl RelayEvent {
    /// Short event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::Authenticate(_) => "authenticate",
            RelayEvent::PrivateMessage(_) => "private_message",
            RelayEvent::Ack(_) => "ack",
            RelayEvent::NewMessageNotify(_) => "new_message_notify",
            RelayEvent::ReadReceipt(_) => "read_receipt",
            RelayEvent::NewMessages(_) => "new_messages",
            RelayEvent::RosterUpdate(_) => "roster_update",
            RelayEvent::Disconnect => "disconnect",
            RelayEvent::Unknown => "unknown",
        }
    }
}

/// Authentication credentials presented on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatePayload {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_chat_id: String,
}

impl From<&SessionIdentity> for AuthenticatePayload {
    fn from(identity: &SessionIdentity) -> Self {
        AuthenticatePayload {
            session_id: identity.user_chat_id.clone(),
            user_name: identity.user_name.clone(),
            user_email: identity.user_email.clone(),
            user_chat_id: identity.user_chat_id.clone(),
        }
    }
}

/// Acknowledgment of a previously sent frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgment {
    /// ID of the frame being acknowledged.
    pub ack_for: FrameId,
}

/// Read receipt addressed by conversation chat id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    #[serde(rename = "toCId")]
    pub to_chat_id: String,
}

/// Roster snapshot as delivered by the relay.
///
/// Entries are kept loosely typed so that one malformed entry does not
/// reject the whole snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(default)]
    pub users: Vec<serde_json::Value>,
}

impl RosterSnapshot {
    /// Builds a snapshot from typed entries.
    pub fn from_entries(entries: &[RosterEntry]) -> Self {
        RosterSnapshot {
            users: entries
                .iter()
                .filter_map(|e| serde_json::to_value(e).ok())
                .collect(),
        }
    }
}
