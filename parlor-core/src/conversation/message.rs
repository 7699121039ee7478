// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat message model.
//!
//! Messages are immutable once built. On the wire they use the relay's
//! field names; inquiry details ride along as optional fields and are
//! flagged with `"type": "inq"`.

use serde::{Deserialize, Serialize};

/// Wire value of `type` for product inquiries.
const INQUIRY_TYPE: &str = "inq";

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireMessage", into = "WireMessage")]
pub struct Message {
    /// Message text.
    pub content: String,
    /// Sender's chat id.
    pub from_id: String,
    /// Sender's display name.
    pub from_name: String,
    /// Recipient's peer id.
    pub to_id: String,
    /// Recipient's display name.
    pub to_name: String,
    /// Recipient's conversation chat id.
    pub to_chat_id: String,
    /// Milliseconds since the Unix epoch. Authoritative ordering key.
    pub utc_time_sent: u64,
    /// Human-readable send time. Display only.
    pub display_time_sent: String,
    /// Plain chat or product inquiry.
    pub kind: MessageKind,
}

/// Kind of message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Chat,
    Inquiry(InquiryDetails),
}

/// Product details carried by an inquiry message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryDetails {
    pub product_id: String,
    pub product_name: String,
    pub thumbnail: String,
    pub quantity: u32,
    pub store_name: Option<String>,
}

/// Identity of a message within a session.
///
/// `(from_id, utc_time_sent)` names a message for lookup. It is not unique:
/// two different messages can share it, so redelivery is detected by full
/// equality among messages with the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageIdentity {
    pub from_id: String,
    pub utc_time_sent: u64,
}

impl Message {
    /// Returns this message's identity.
    pub fn identity(&self) -> MessageIdentity {
        MessageIdentity {
            from_id: self.from_id.clone(),
            utc_time_sent: self.utc_time_sent,
        }
    }

    /// Returns true for product inquiries.
    pub fn is_inquiry(&self) -> bool {
        matches!(self.kind, MessageKind::Inquiry(_))
    }

    /// Returns the inquiry details, if any.
    pub fn inquiry(&self) -> Option<&InquiryDetails> {
        match &self.kind {
            MessageKind::Inquiry(details) => Some(details),
            MessageKind::Chat => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    from_id: String,
    #[serde(rename = "fromUserName", default)]
    from_name: String,
    #[serde(rename = "to", default)]
    to_id: String,
    #[serde(rename = "toUserName", default)]
    to_name: String,
    #[serde(rename = "toCId", default)]
    to_chat_id: String,
    #[serde(default)]
    utc_time_sent: u64,
    #[serde(rename = "timeSent", default)]
    display_time_sent: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(rename = "pid", default, skip_serializing_if = "Option::is_none")]
    product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
    #[serde(rename = "qty", default, skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    store_name: Option<String>,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        let kind = if wire.kind.as_deref() == Some(INQUIRY_TYPE) {
            MessageKind::Inquiry(InquiryDetails {
                product_id: wire.product_id.unwrap_or_default(),
                product_name: wire.product_name.unwrap_or_default(),
                thumbnail: wire.thumbnail.unwrap_or_default(),
                quantity: wire.quantity.unwrap_or(1),
                store_name: wire.store_name,
            })
        } else {
            MessageKind::Chat
        };

        Message {
            content: wire.content,
            from_id: wire.from_id,
            from_name: wire.from_name,
            to_id: wire.to_id,
            to_name: wire.to_name,
            to_chat_id: wire.to_chat_id,
            utc_time_sent: wire.utc_time_sent,
            display_time_sent: wire.display_time_sent,
            kind,
        }
    }
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        let mut wire = WireMessage {
            content: message.content,
            from_id: message.from_id,
            from_name: message.from_name,
            to_id: message.to_id,
            to_name: message.to_name,
            to_chat_id: message.to_chat_id,
            utc_time_sent: message.utc_time_sent,
            display_time_sent: message.display_time_sent,
            kind: None,
            product_id: None,
            product_name: None,
            thumbnail: None,
            quantity: None,
            store_name: None,
        };

        if let MessageKind::Inquiry(details) = message.kind {
            wire.kind = Some(INQUIRY_TYPE.to_string());
            wire.product_id = Some(details.product_id);
            wire.product_name = Some(details.product_name);
            wire.thumbnail = Some(details.thumbnail);
            wire.quantity = Some(details.quantity);
            wire.store_name = details.store_name;
        }

        wire
    }
}
