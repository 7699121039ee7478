// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Peers and roster entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::RosterError;
use super::message::{Message, MessageIdentity};

/// Stable roster key of a peer (its peer id).
pub type PeerKey = String;

/// A conversation participant and its live message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    peer_id: PeerKey,
    display_name: String,
    store_name: Option<String>,
    profile_picture: Option<String>,
    chat_id: String,
    placeholder: bool,
    pub(crate) unread_count: u32,
    messages: Vec<Message>,
    positions: HashMap<MessageIdentity, Vec<usize>>,
}

impl Peer {
    /// Creates a peer with an empty log.
    pub fn new(
        peer_id: impl Into<String>,
        display_name: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Peer {
            peer_id: peer_id.into(),
            display_name: display_name.into(),
            store_name: None,
            profile_picture: None,
            chat_id: chat_id.into(),
            placeholder: false,
            unread_count: 0,
            messages: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Sets the store name.
    pub fn with_store_name(mut self, store_name: impl Into<String>) -> Self {
        self.store_name = Some(store_name.into());
        self
    }

    /// Marks the peer as opened outside the roster.
    pub(crate) fn as_placeholder(mut self) -> Self {
        self.placeholder = true;
        self
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn store_name(&self) -> Option<&str> {
        self.store_name.as_deref()
    }

    pub fn profile_picture(&self) -> Option<&str> {
        self.profile_picture.as_deref()
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Returns true if no roster entry backs this peer yet.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn unread_count(&self) -> u32 {
        self.unread_count
    }

    /// Messages in delivery order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recently appended message.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Appends `message` unless an equal message is already logged.
    ///
    /// Returns the new message's position in the log.
    pub(crate) fn push_message(&mut self, message: Message) -> Option<usize> {
        let identity = message.identity();
        let same_identity = self.positions.entry(identity).or_default();
        if same_identity
            .iter()
            .any(|&i| self.messages.get(i) == Some(&message))
        {
            return None;
        }
        let position = self.messages.len();
        same_identity.push(position);
        self.messages.push(message);
        Some(position)
    }

    /// Copies the live state (log and unread count) of `previous` into self.
    pub(crate) fn inherit_state(&mut self, previous: Peer) {
        self.unread_count = previous.unread_count;
        self.messages = previous.messages;
        self.positions = previous.positions;
    }
}

/// One roster entry as delivered by the relay.
///
/// Every field is optional on the wire; [`validate`](Self::validate) turns
/// an entry into a [`Peer`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(rename = "userID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "storeName", default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(rename = "profilePicture", default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(rename = "chatId", default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread: Option<u32>,
}

impl RosterEntry {
    /// Creates an entry with the two required fields.
    pub fn new(user_id: impl Into<String>, chat_id: impl Into<String>) -> Self {
        RosterEntry {
            user_id: Some(user_id.into()),
            chat_id: Some(chat_id.into()),
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_store_name(mut self, store_name: impl Into<String>) -> Self {
        self.store_name = Some(store_name.into());
        self
    }

    pub fn with_unread(mut self, unread: u32) -> Self {
        self.unread = Some(unread);
        self
    }

    /// Parses a raw JSON entry.
    ///
    /// Entries that do not parse become empty entries, which validation
    /// then rejects, so one bad entry never aborts a snapshot.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "unparseable roster entry");
            RosterEntry::default()
        })
    }

    /// Validates this entry into a peer.
    ///
    /// `userID` and `chatId` are required and must be non-empty. The display
    /// name falls back to the store name, then the user id.
    pub fn validate(self, index: usize) -> Result<Peer, RosterError> {
        let peer_id = non_empty(self.user_id).ok_or(RosterError::MissingField {
            index,
            field: "userID",
        })?;
        let chat_id = non_empty(self.chat_id).ok_or(RosterError::MissingField {
            index,
            field: "chatId",
        })?;
        let store_name = non_empty(self.store_name);
        let display_name = non_empty(self.username)
            .or_else(|| store_name.clone())
            .unwrap_or_else(|| peer_id.clone());

        Ok(Peer {
            peer_id,
            display_name,
            store_name,
            profile_picture: non_empty(self.profile_picture),
            chat_id,
            placeholder: false,
            unread_count: self.unread.unwrap_or(0),
            messages: Vec::new(),
            positions: HashMap::new(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
