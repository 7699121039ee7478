// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parlor Core Library
//!
//! Client-side session controller for real-time relay chat: connection
//! lifecycle, inbound routing, conversation state, acknowledged sends and
//! deferred product inquiries.

pub mod api;
pub mod composer;
pub mod conversation;
pub mod identity;
pub mod inquiry;
pub mod network;
pub mod router;

pub use api::{
    ChatConfig, ChatError, ChatEvent, ChatResult, ChatSession, ChatSessionBuilder, EventHandler,
};
pub use composer::{ComposeError, ComposerConfig, OutboundComposer, SendStatus, SendTicket};
pub use conversation::{
    ConversationError, ConversationStore, InquiryDetails, Message, MessageIdentity, MessageKind,
    Peer, PeerKey, RosterEntry, RosterError, RosterMerge,
};
pub use identity::SessionIdentity;
pub use inquiry::{
    BridgeOutcome, CorrelationToken, DeferredInquiry, DeferredInquiryBridge, DiscardReason,
    InquiryError, InquiryStore, MemoryInquiryStore, SqliteInquiryStore,
};
pub use network::{
    ConnectionHandle, ConnectionManager, ConnectionState, MockTransport, NetworkError, Transport,
    TransportConfig,
};
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use network::WebSocketTransport;
pub use router::{InboundRouter, Routed, RoutedMessage};
