// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat Session
//!
//! Main entry point for the Parlor API. Owns the relay connection, the
//! conversation state and every component acting on them, and drives the
//! event loop through [`ChatSession::poll`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::composer::{ComposeError, OutboundComposer, SendStatus, SendTicket};
use crate::conversation::{ConversationStore, InquiryDetails, Peer};
use crate::identity::SessionIdentity;
use crate::inquiry::{
    BridgeOutcome, CorrelationToken, DeferredInquiryBridge, InquiryStore, MemoryInquiryStore,
};
use crate::network::{
    ConnectionHandle, ConnectionManager, ConnectionState, MockTransport, NetworkError, RelayFrame,
    Transport,
};
use crate::router::{InboundRouter, Routed};

use super::config::ChatConfig;
use super::error::{ChatError, ChatResult};
use super::events::{CallbackHandler, ChatEvent, EventDispatcher, EventHandler};

type Sleeper = Box<dyn Fn(Duration) + Send>;

/// A live chat session.
///
/// Single-threaded and event-driven: nothing happens between calls. The
/// caller invokes [`poll`](Self::poll) regularly; every other method
/// completes its work before returning. Observable changes are reported to
/// registered event handlers.
///
/// # Example
///
/// ```ignore
/// use parlor_core::{ChatSession, SessionIdentity};
///
/// let mut session = ChatSession::builder()
///     .identity(SessionIdentity::new("u1", "Alice", "alice@example.com", "chat-alice"))
///     .relay_url("wss://relay.example.com")
///     .transport(WebSocketTransport::new)
///     .build()?;
///
/// session.on_event(|event| println!("{event:?}"));
/// session.connect()?;
/// loop {
///     session.poll()?;
/// }
/// ```
pub struct ChatSession<T: Transport = MockTransport> {
    config: ChatConfig,
    identity: SessionIdentity,
    connection: ConnectionManager<T>,
    conversations: ConversationStore,
    router: InboundRouter,
    composer: OutboundComposer,
    bridge: DeferredInquiryBridge,
    events: EventDispatcher,
    target_opened: bool,
}

impl ChatSession<MockTransport> {
    /// Creates a builder using the mock transport unless one is supplied.
    pub fn builder() -> ChatSessionBuilder<MockTransport> {
        ChatSessionBuilder::new()
    }
}

impl<T: Transport> ChatSession<T> {
    fn from_parts(
        config: ChatConfig,
        identity: SessionIdentity,
        transport: T,
        inquiries: Box<dyn InquiryStore>,
        sleeper: Option<Sleeper>,
    ) -> Self {
        let mut connection = ConnectionManager::new(transport, config.relay.clone());
        if let Some(sleeper) = sleeper {
            connection = connection.with_sleeper(sleeper);
        }

        ChatSession {
            router: InboundRouter::new(identity.user_chat_id.clone()),
            composer: OutboundComposer::new(identity.clone(), config.composer.clone()),
            bridge: DeferredInquiryBridge::new(inquiries),
            conversations: ConversationStore::new(),
            events: EventDispatcher::new(),
            target_opened: false,
            connection,
            identity,
            config,
        }
    }

    // === Connection ===

    /// Connects to the relay and authenticates as the session identity.
    ///
    /// An existing connection is torn down first and its unacknowledged
    /// sends are abandoned.
    pub fn connect(&mut self) -> ChatResult<ConnectionHandle> {
        self.router.unsubscribe();
        self.abandon_pending(None);

        let result = self.connection.connect(self.identity.clone());
        if let Ok(handle) = &result {
            self.router.subscribe(*handle);
        }
        self.dispatch_state_changes();
        Ok(result?)
    }

    /// Disconnects from the relay.
    ///
    /// Unacknowledged sends are abandoned and the router stops listening.
    pub fn disconnect(&mut self) -> ChatResult<()> {
        let result = self.connection.disconnect();
        self.router.unsubscribe();
        self.abandon_pending(None);
        self.dispatch_state_changes();
        Ok(result?)
    }

    /// Returns the current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Returns true if connected and authenticated.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    // === Event loop ===

    /// Processes frames available from the relay.
    ///
    /// Handles at most `max_frames_per_poll` frames, then resolves overdue
    /// sends. Returns the number of frames processed. A dropped link gets
    /// at most one reconnect attempt per poll, once its retry delay has
    /// passed. A connection that exhausted its reconnect budget is reported
    /// as an error once; later polls return `Ok(0)` until
    /// [`connect`](Self::connect) is called.
    pub fn poll(&mut self) -> ChatResult<usize> {
        let mut failure = None;
        if self.connection.is_reconnecting() {
            if let Err(e) = self.connection.poll_reconnect() {
                failure = Some(e);
            }
        }
        self.sync_subscription();

        let mut processed = 0;
        while failure.is_none() && processed < self.config.max_frames_per_poll {
            let Some(handle) = self.connection.handle() else {
                break;
            };
            match self.connection.receive() {
                Ok(Some(frame)) => {
                    processed += 1;
                    self.handle_frame(handle, frame);
                }
                Ok(None) => {
                    if self.connection.handle() != Some(handle) {
                        self.sync_subscription();
                        continue;
                    }
                    if !self.connection.has_pending() {
                        break;
                    }
                }
                Err(
                    e @ (NetworkError::InvalidMessage(_)
                    | NetworkError::Serialization(_)
                    | NetworkError::FrameTooLarge { .. }),
                ) => {
                    warn!(error = %e, "skipping undecodable frame");
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        for ticket in self.composer.check_timeouts() {
            self.events.dispatch(ChatEvent::SendResolved {
                ticket,
                status: SendStatus::TimedOut,
            });
        }
        self.sync_subscription();
        self.dispatch_state_changes();

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(processed),
        }
    }

    fn handle_frame(&mut self, handle: ConnectionHandle, frame: RelayFrame) {
        match self.router.route(handle, frame, &mut self.conversations) {
            Routed::Message(routed) => {
                if let Some(index) = routed.index {
                    self.events.dispatch(ChatEvent::MessageAppended {
                        peer_key: routed.peer_key.clone(),
                        identity: routed.identity.clone(),
                        index,
                        outgoing: routed.own,
                    });
                }
                if let Some(unread) = routed.unread {
                    self.events.dispatch(ChatEvent::UnreadCountChanged {
                        peer_key: routed.peer_key.clone(),
                        unread,
                    });
                }
                if routed.appended() && !routed.own {
                    self.check_read_receipt();
                }
            }
            Routed::Roster(merge) => {
                self.events.dispatch(ChatEvent::RosterUpdated {
                    added: merge.added,
                    removed: merge.removed,
                    rejected: merge.rejected.len(),
                });
                if merge.selection_cleared {
                    self.events
                        .dispatch(ChatEvent::SelectionChanged { peer_key: None });
                }
                if let Err(e) = self.notify_ready() {
                    warn!(error = %e, "session readiness handling failed");
                }
                self.check_read_receipt();
            }
            Routed::Ack(frame_id) => {
                if let Some(ack) = self.composer.handle_ack(&frame_id, &mut self.conversations) {
                    if let Some(index) = ack.index {
                        self.events.dispatch(ChatEvent::MessageAppended {
                            peer_key: ack.peer_key,
                            identity: ack.identity,
                            index,
                            outgoing: true,
                        });
                    }
                }
            }
            Routed::PeerRead { chat_id } => {
                self.events.dispatch(ChatEvent::PeerReadReceipt { chat_id });
            }
            Routed::Ignored => {}
        }
    }

    /// Binds the router to the live connection, abandoning sends made on
    /// connections that no longer exist.
    fn sync_subscription(&mut self) {
        match self.connection.handle() {
            Some(handle) => {
                if self.router.subscribe(handle) {
                    self.abandon_pending(Some(handle));
                }
            }
            None => {
                self.router.unsubscribe();
                self.abandon_pending(None);
            }
        }
    }

    fn abandon_pending(&mut self, current: Option<ConnectionHandle>) {
        for ticket in self.composer.abandon_stale(current.map(|h| h.id())) {
            self.events.dispatch(ChatEvent::SendResolved {
                ticket,
                status: SendStatus::Abandoned,
            });
        }
    }

    fn check_read_receipt(&mut self) {
        match self
            .composer
            .maybe_send_read_receipt(&mut self.connection, &mut self.conversations)
        {
            Ok(Some(receipt)) => {
                if receipt.unread_cleared {
                    self.events.dispatch(ChatEvent::UnreadCountChanged {
                        peer_key: receipt.peer_key.clone(),
                        unread: 0,
                    });
                }
                self.events.dispatch(ChatEvent::ReadReceiptSent {
                    peer_key: receipt.peer_key,
                    chat_id: receipt.chat_id,
                });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "read receipt not sent"),
        }
    }

    fn dispatch_state_changes(&mut self) {
        for state in self.connection.take_state_changes() {
            self.events
                .dispatch(ChatEvent::ConnectionStateChanged { state });
        }
    }

    // === Selection ===

    /// Selects a conversation.
    ///
    /// If the peer's latest message came from them and was not yet receipted,
    /// a read receipt is sent.
    pub fn select(&mut self, peer_key: &str) -> ChatResult<()> {
        self.conversations.select(peer_key)?;
        self.events.dispatch(ChatEvent::SelectionChanged {
            peer_key: Some(peer_key.to_string()),
        });
        self.check_read_receipt();
        self.dispatch_state_changes();
        Ok(())
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        if self.conversations.clear_selection().is_some() {
            self.events
                .dispatch(ChatEvent::SelectionChanged { peer_key: None });
        }
    }

    /// The selected peer.
    pub fn selected_peer(&self) -> Option<&Peer> {
        self.conversations.selected_peer()
    }

    /// Read access to the conversation state.
    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    // === Sending ===

    /// The pending-input buffer.
    pub fn input(&self) -> &str {
        self.composer.input()
    }

    /// Replaces the pending-input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.composer.set_input(text);
    }

    /// Sends a chat message to the selected peer.
    ///
    /// The message is echoed into the log once the relay acknowledges it.
    pub fn send_chat(&mut self, text: &str) -> ChatResult<SendTicket> {
        let result = self
            .composer
            .send_chat(text, &mut self.connection, &self.conversations);
        self.after_send(result)
    }

    /// Sends the pending-input buffer to the selected peer.
    pub fn send_input(&mut self) -> ChatResult<SendTicket> {
        let text = self.composer.input().to_string();
        self.send_chat(&text)
    }

    /// Sends a product inquiry to the selected peer.
    pub fn send_inquiry(&mut self, text: &str, details: InquiryDetails) -> ChatResult<SendTicket> {
        let result =
            self.composer
                .send_inquiry(text, details, &mut self.connection, &self.conversations);
        self.after_send(result)
    }

    fn after_send(
        &mut self,
        result: Result<SendTicket, ComposeError>,
    ) -> ChatResult<SendTicket> {
        self.dispatch_state_changes();
        let ticket = result?;
        if let Some(peer_key) = self.conversations.selected_key() {
            self.events.dispatch(ChatEvent::MessageSent {
                ticket: ticket.clone(),
                peer_key: peer_key.to_string(),
            });
        }
        Ok(ticket)
    }

    /// Returns the status of a send.
    pub fn send_status(&self, ticket: &SendTicket) -> Option<SendStatus> {
        self.composer.status(ticket)
    }

    /// Number of sends awaiting acknowledgment.
    pub fn pending_sends(&self) -> usize {
        self.composer.pending_count()
    }

    // === Deferred inquiries ===

    /// Sets or clears the correlation token naming the conversation a
    /// deferred inquiry is meant for.
    ///
    /// Takes effect on the next roster snapshot or
    /// [`notify_ready`](Self::notify_ready).
    pub fn set_correlation_token(&mut self, token: Option<CorrelationToken>) {
        self.bridge.set_token(token);
        self.target_opened = false;
    }

    /// Signals that the session is ready for the deferred inquiry flow.
    ///
    /// Opens the token's conversation the first time, then sends a stored
    /// inquiry for it if there is one. Fired automatically after every
    /// roster snapshot; repeated calls never send a payload twice.
    pub fn notify_ready(&mut self) -> ChatResult<BridgeOutcome> {
        if !self.connection.is_connected() {
            return Err(ChatError::InvalidState("not connected".into()));
        }
        if !self.conversations.has_roster() {
            return Err(ChatError::InvalidState("roster not loaded".into()));
        }

        if !self.target_opened {
            if let Some(token) = self.bridge.token().cloned() {
                let key = self
                    .conversations
                    .open_conversation(&token.chat_id, &token.store_name);
                self.target_opened = true;
                self.events.dispatch(ChatEvent::SelectionChanged {
                    peer_key: Some(key),
                });
            }
        }

        let result = self.bridge.on_session_ready(
            &mut self.composer,
            &mut self.connection,
            &mut self.conversations,
        );
        self.dispatch_state_changes();
        let outcome = result?;

        match &outcome {
            BridgeOutcome::Sent { ticket, peer_key } => {
                self.events.dispatch(ChatEvent::MessageSent {
                    ticket: ticket.clone(),
                    peer_key: peer_key.clone(),
                });
                self.events.dispatch(ChatEvent::InquiryDelivered {
                    ticket: ticket.clone(),
                    peer_key: peer_key.clone(),
                });
            }
            other => debug!(outcome = ?other, "deferred inquiry check"),
        }
        Ok(outcome)
    }

    // === Events ===

    /// Adds an event handler.
    pub fn add_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.events.add_handler(handler);
    }

    /// Adds a closure as an event handler.
    pub fn on_event<F>(&mut self, callback: F)
    where
        F: Fn(ChatEvent) + Send + Sync + 'static,
    {
        self.events
            .add_handler(Arc::new(CallbackHandler::new(callback)));
    }

    // === Accessors ===

    /// The session identity.
    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// The session configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        self.connection.transport()
    }
}

/// Builder for creating chat sessions.
pub struct ChatSessionBuilder<T: Transport> {
    config: ChatConfig,
    identity: Option<SessionIdentity>,
    transport_factory: Option<Box<dyn FnOnce() -> T>>,
    inquiries: Option<Box<dyn InquiryStore>>,
    token: Option<CorrelationToken>,
    sleeper: Option<Sleeper>,
}

impl<T: Transport> ChatSessionBuilder<T> {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        ChatSessionBuilder {
            config: ChatConfig::default(),
            identity: None,
            transport_factory: None,
            inquiries: None,
            token: None,
            sleeper: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the relay URL.
    pub fn relay_url(mut self, url: impl Into<String>) -> Self {
        self.config.relay.server_url = url.into();
        self
    }

    /// Sets the session identity.
    pub fn identity(mut self, identity: SessionIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the transport factory, switching the transport type.
    pub fn transport<U, F>(self, factory: F) -> ChatSessionBuilder<U>
    where
        U: Transport,
        F: FnOnce() -> U + 'static,
    {
        ChatSessionBuilder {
            config: self.config,
            identity: self.identity,
            transport_factory: Some(Box::new(factory)),
            inquiries: self.inquiries,
            token: self.token,
            sleeper: self.sleeper,
        }
    }

    /// Sets the deferred inquiry store. Defaults to an empty in-memory store.
    pub fn inquiry_store<S: InquiryStore + 'static>(mut self, store: S) -> Self {
        self.inquiries = Some(Box::new(store));
        self
    }

    /// Sets the correlation token for the deferred inquiry flow.
    pub fn correlation_token(mut self, token: CorrelationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Replaces the wait between connection attempts.
    pub fn sleeper<F>(mut self, sleeper: F) -> Self
    where
        F: Fn(Duration) + Send + 'static,
    {
        self.sleeper = Some(Box::new(sleeper));
        self
    }

    /// Builds the session.
    pub fn build(self) -> ChatResult<ChatSession<T>>
    where
        T: Default,
    {
        let identity = self
            .identity
            .ok_or_else(|| ChatError::Configuration("session identity is required".into()))?;
        if identity.user_chat_id.is_empty() {
            return Err(ChatError::Configuration("user chat id is empty".into()));
        }

        let transport = match self.transport_factory {
            Some(factory) => factory(),
            None => T::default(),
        };
        let inquiries = self
            .inquiries
            .unwrap_or_else(|| Box::new(MemoryInquiryStore::new()));

        let mut session =
            ChatSession::from_parts(self.config, identity, transport, inquiries, self.sleeper);
        session.set_correlation_token(self.token);
        Ok(session)
    }
}

impl<T: Transport> Default for ChatSessionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
