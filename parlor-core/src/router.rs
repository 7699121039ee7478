// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Inbound Router
//!
//! Classifies frames arriving from the relay and applies them to the
//! conversation store. The router listens to exactly one connection handle
//! at a time; frames are only routed while that subscription is live.

use tracing::{debug, warn};

use crate::conversation::{
    ConversationStore, Message, MessageIdentity, PeerKey, RosterEntry, RosterMerge,
};
use crate::network::{ConnectionHandle, FrameId, RelayEvent, RelayFrame};

/// A message that was routed to a peer log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedMessage {
    /// Peer whose log received the message.
    pub peer_key: PeerKey,
    /// Identity of the routed message.
    pub identity: MessageIdentity,
    /// Position in the peer's log; `None` if the message was a redelivery
    /// and the log did not change.
    pub index: Option<usize>,
    /// True if the message was sent by the local user from another client.
    pub own: bool,
    /// New unread count, if it was incremented.
    pub unread: Option<u32>,
}

impl RoutedMessage {
    /// Returns true if the peer's log grew.
    pub fn appended(&self) -> bool {
        self.index.is_some()
    }
}

/// Result of routing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// A chat or inquiry message reached a peer log.
    Message(RoutedMessage),
    /// A roster snapshot was applied.
    Roster(RosterMerge),
    /// The relay acknowledged a frame we sent.
    Ack(FrameId),
    /// A peer read our messages in the conversation with this chat id.
    PeerRead { chat_id: String },
    /// Nothing to do.
    Ignored,
}

/// Routes relay frames into the conversation store.
#[derive(Debug)]
pub struct InboundRouter {
    local_chat_id: String,
    subscription: Option<ConnectionHandle>,
    subscribe_count: u64,
}

impl InboundRouter {
    /// Creates a router for the local user's chat id.
    pub fn new(local_chat_id: impl Into<String>) -> Self {
        InboundRouter {
            local_chat_id: local_chat_id.into(),
            subscription: None,
            subscribe_count: 0,
        }
    }

    /// Subscribes to a connection.
    ///
    /// Returns false, and changes nothing, if already subscribed to this
    /// handle. Subscribing to a new handle replaces the old subscription.
    pub fn subscribe(&mut self, handle: ConnectionHandle) -> bool {
        if self.subscription == Some(handle) {
            return false;
        }
        debug!(connection = handle.id(), "router subscribed");
        self.subscription = Some(handle);
        self.subscribe_count += 1;
        true
    }

    /// Drops the current subscription.
    pub fn unsubscribe(&mut self) -> Option<ConnectionHandle> {
        let previous = self.subscription.take();
        if let Some(handle) = previous {
            debug!(connection = handle.id(), "router unsubscribed");
        }
        previous
    }

    /// Returns the handle currently subscribed to.
    pub fn subscription(&self) -> Option<ConnectionHandle> {
        self.subscription
    }

    /// Returns true if subscribed to `handle`.
    pub fn is_subscribed_to(&self, handle: ConnectionHandle) -> bool {
        self.subscription == Some(handle)
    }

    /// Number of subscriptions made over the router's lifetime.
    pub fn subscribe_count(&self) -> u64 {
        self.subscribe_count
    }

    /// Routes one frame received on `handle`.
    pub fn route(
        &mut self,
        handle: ConnectionHandle,
        frame: RelayFrame,
        store: &mut ConversationStore,
    ) -> Routed {
        if !self.is_subscribed_to(handle) {
            debug!(connection = handle.id(), "dropping frame from unsubscribed connection");
            return Routed::Ignored;
        }

        match frame.payload {
            RelayEvent::NewMessages(message) => self.route_message(message, store),
            RelayEvent::RosterUpdate(snapshot) => {
                let entries = snapshot
                    .users
                    .into_iter()
                    .map(RosterEntry::from_value)
                    .collect();
                Routed::Roster(store.set_roster(entries))
            }
            RelayEvent::Ack(ack) => Routed::Ack(ack.ack_for),
            RelayEvent::ReadReceipt(receipt) => Routed::PeerRead {
                chat_id: receipt.to_chat_id,
            },
            other => {
                debug!(event = other.name(), "ignoring relay event");
                Routed::Ignored
            }
        }
    }

    fn route_message(&mut self, message: Message, store: &mut ConversationStore) -> Routed {
        if message.from_id.is_empty() {
            warn!("dropping message without sender");
            return Routed::Ignored;
        }

        let own = message.from_id == self.local_chat_id;
        let peer_key = if own {
            store.resolve_outbound(&message)
        } else {
            store.resolve_inbound(&message)
        };
        let Some(peer_key) = peer_key else {
            warn!(from = %message.from_id, to = %message.to_chat_id, "dropping message for unknown peer");
            return Routed::Ignored;
        };

        let identity = message.identity();
        let index = match store.append_message(&peer_key, message) {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "failed to append message");
                return Routed::Ignored;
            }
        };

        let mut unread = None;
        if index.is_some() && !own && !store.is_selected(&peer_key) {
            unread = store.increment_unread(&peer_key).ok();
        }

        Routed::Message(RoutedMessage {
            peer_key,
            identity,
            index,
            own,
            unread,
        })
    }
}
