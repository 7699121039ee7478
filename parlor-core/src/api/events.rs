// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Observable session events for UIs and other collaborators.

use std::sync::Arc;

use crate::composer::{SendStatus, SendTicket};
use crate::conversation::{MessageIdentity, PeerKey};
use crate::network::ConnectionState;

/// Events emitted by a chat session.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Network connection state changed.
    ConnectionStateChanged {
        /// The new connection state.
        state: ConnectionState,
    },

    /// A peer's unread count changed.
    UnreadCountChanged {
        /// The peer.
        peer_key: PeerKey,
        /// The new count.
        unread: u32,
    },

    /// A message was appended to a peer's log.
    MessageAppended {
        /// The peer whose log grew.
        peer_key: PeerKey,
        /// Identity of the appended message.
        identity: MessageIdentity,
        /// Position of the message in the peer's log.
        index: usize,
        /// True for locally sent messages echoed after acknowledgment.
        outgoing: bool,
    },

    /// A roster snapshot was applied.
    RosterUpdated {
        /// Peers new in the snapshot.
        added: Vec<PeerKey>,
        /// Peers dropped by the snapshot.
        removed: Vec<PeerKey>,
        /// Number of entries rejected as malformed or duplicate.
        rejected: usize,
    },

    /// The selected conversation changed.
    SelectionChanged {
        /// The selected peer, or `None` if the selection was cleared.
        peer_key: Option<PeerKey>,
    },

    /// A message was handed to the relay and awaits acknowledgment.
    MessageSent {
        /// The send.
        ticket: SendTicket,
        /// The addressed peer.
        peer_key: PeerKey,
    },

    /// A send resolved without acknowledgment.
    SendResolved {
        /// The send.
        ticket: SendTicket,
        /// `TimedOut` or `Abandoned`.
        status: SendStatus,
    },

    /// A read receipt was sent for a conversation.
    ReadReceiptSent {
        /// The peer.
        peer_key: PeerKey,
        /// The conversation's chat id.
        chat_id: String,
    },

    /// A peer read our messages.
    PeerReadReceipt {
        /// The conversation's chat id.
        chat_id: String,
    },

    /// A deferred inquiry was sent.
    InquiryDelivered {
        /// The send.
        ticket: SendTicket,
        /// The addressed peer.
        peer_key: PeerKey,
    },
}

/// Event handler trait.
///
/// Implement this trait to receive chat events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: ChatEvent);
}

/// Simple callback-based event handler.
pub struct CallbackHandler<F>
where
    F: Fn(ChatEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(ChatEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(ChatEvent) + Send + Sync,
{
    fn on_event(&self, event: ChatEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher for managing multiple handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event handler.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: ChatEvent) {
        for handler in &self.handlers {
            handler.on_event(event.clone());
        }
    }
}
