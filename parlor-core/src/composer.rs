// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Outbound Composer
//!
//! Builds outgoing messages, sends them through the connection manager and
//! reconciles local state when the relay acknowledges them.
//!
//! A sent message is echoed into the peer's log only once the relay
//! acknowledges it. Until then it lives in the pending-send table, keyed by
//! the frame id the acknowledgment will name. Every pending send resolves
//! exactly once: acknowledged, timed out, or abandoned.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use chrono::{Local, TimeZone};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::conversation::{
    ConversationError, ConversationStore, InquiryDetails, Message, MessageIdentity, MessageKind,
    PeerKey,
};
use crate::identity::SessionIdentity;
use crate::network::{
    create_frame, protocol::now_millis, ConnectionId, ConnectionManager, FrameId, NetworkError,
    ReadReceipt, RelayEvent, Transport,
};

/// Format of `display_time_sent`, e.g. `3/7/2026, 09:05 PM`.
const DISPLAY_TIME_FORMAT: &str = "%-m/%-d/%Y, %I:%M %p";

/// Composer errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    #[error("no conversation selected")]
    NoPeerSelected,

    #[error("message is empty")]
    EmptyMessage,

    #[error("too many unacknowledged sends (max {max})")]
    TooManyPendingSends { max: usize },

    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Composer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Time to wait for an acknowledgment before giving up, in milliseconds.
    pub ack_timeout_ms: u64,
    /// Maximum number of unacknowledged sends.
    pub max_pending_sends: usize,
    /// Number of resolved send statuses remembered; older ones are forgotten.
    pub status_history: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        ComposerConfig {
            ack_timeout_ms: 30_000,
            max_pending_sends: 100,
            status_history: 1_024,
        }
    }
}

/// Handle to one send, valid until the session ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SendTicket {
    frame_id: FrameId,
}

impl SendTicket {
    /// Frame id of the `private_message` carrying this send.
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }
}

/// Status of a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// Waiting for the relay to acknowledge.
    Pending,
    /// Acknowledged and echoed locally.
    Acknowledged,
    /// No acknowledgment arrived in time. Nothing was echoed.
    TimedOut,
    /// The connection went away before an acknowledgment. Nothing was echoed.
    Abandoned,
}

impl SendStatus {
    /// Returns true once the send can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SendStatus::Pending)
    }
}

/// Result of reconciling an acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckOutcome {
    pub ticket: SendTicket,
    pub peer_key: PeerKey,
    pub identity: MessageIdentity,
    /// Position in the peer's log; `None` if the peer disappeared from the
    /// roster before the ack or the message was already logged.
    pub index: Option<usize>,
}

impl AckOutcome {
    /// Returns true if the peer's log grew.
    pub fn appended(&self) -> bool {
        self.index.is_some()
    }
}

/// A read receipt that was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptOutcome {
    pub peer_key: PeerKey,
    pub chat_id: String,
    /// True if the peer's unread count was non-zero before.
    pub unread_cleared: bool,
}

#[derive(Debug)]
struct PendingSend {
    message: Message,
    peer_key: PeerKey,
    connection: ConnectionId,
    sent_at: Instant,
    is_chat: bool,
}

/// Outbound message composer.
#[derive(Debug)]
pub struct OutboundComposer {
    identity: SessionIdentity,
    config: ComposerConfig,
    pending: HashMap<FrameId, PendingSend>,
    resolved: HashMap<FrameId, SendStatus>,
    history: VecDeque<FrameId>,
    receipted: HashMap<PeerKey, (usize, MessageIdentity)>,
    input: String,
    last_stamp: u64,
}

impl OutboundComposer {
    /// Creates a composer sending as `identity`.
    pub fn new(identity: SessionIdentity, config: ComposerConfig) -> Self {
        OutboundComposer {
            identity,
            config,
            pending: HashMap::new(),
            resolved: HashMap::new(),
            history: VecDeque::new(),
            receipted: HashMap::new(),
            input: String::new(),
            last_stamp: 0,
        }
    }

    // === Input buffer ===

    /// The pending-input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the pending-input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    // === Sending ===

    /// Sends a chat message to the selected peer.
    pub fn send_chat<T: Transport>(
        &mut self,
        text: &str,
        conn: &mut ConnectionManager<T>,
        store: &ConversationStore,
    ) -> Result<SendTicket, ComposeError> {
        if text.trim().is_empty() {
            return Err(ComposeError::EmptyMessage);
        }
        let target = store
            .selected_key()
            .ok_or(ComposeError::NoPeerSelected)?
            .to_string();
        self.send_to(&target, text, MessageKind::Chat, conn, store)
    }

    /// Sends a product inquiry to the selected peer.
    pub fn send_inquiry<T: Transport>(
        &mut self,
        text: &str,
        details: InquiryDetails,
        conn: &mut ConnectionManager<T>,
        store: &ConversationStore,
    ) -> Result<SendTicket, ComposeError> {
        let target = store
            .selected_key()
            .ok_or(ComposeError::NoPeerSelected)?
            .to_string();
        self.send_to(&target, text, MessageKind::Inquiry(details), conn, store)
    }

    /// Sends a product inquiry to an explicit peer, regardless of selection.
    pub fn send_inquiry_to<T: Transport>(
        &mut self,
        target: &str,
        text: &str,
        details: InquiryDetails,
        conn: &mut ConnectionManager<T>,
        store: &ConversationStore,
    ) -> Result<SendTicket, ComposeError> {
        self.send_to(target, text, MessageKind::Inquiry(details), conn, store)
    }

    fn send_to<T: Transport>(
        &mut self,
        target: &str,
        text: &str,
        kind: MessageKind,
        conn: &mut ConnectionManager<T>,
        store: &ConversationStore,
    ) -> Result<SendTicket, ComposeError> {
        if self.pending.len() >= self.config.max_pending_sends {
            return Err(ComposeError::TooManyPendingSends {
                max: self.config.max_pending_sends,
            });
        }
        let handle = conn.handle().ok_or(NetworkError::NotConnected)?;
        let peer = store
            .peer(target)
            .ok_or_else(|| ConversationError::PeerNotFound(target.to_string()))?;

        let utc_time_sent = self.next_stamp();
        let is_chat = matches!(kind, MessageKind::Chat);
        let message = Message {
            content: text.to_string(),
            from_id: self.identity.user_chat_id.clone(),
            from_name: self.identity.user_name.clone(),
            to_id: peer.peer_id().to_string(),
            to_name: peer.display_name().to_string(),
            to_chat_id: peer.chat_id().to_string(),
            utc_time_sent,
            display_time_sent: display_time(utc_time_sent),
            kind,
        };

        let frame = create_frame(RelayEvent::PrivateMessage(message.clone()));
        conn.send(&frame)?;

        let notify = create_frame(RelayEvent::NewMessageNotify(message.clone()));
        if let Err(e) = conn.send(&notify) {
            debug!(error = %e, "new message notice not delivered");
        }

        debug!(frame_id = %frame.frame_id, peer = target, "message sent, awaiting ack");
        self.pending.insert(
            frame.frame_id.clone(),
            PendingSend {
                message,
                peer_key: target.to_string(),
                connection: handle.id(),
                sent_at: Instant::now(),
                is_chat,
            },
        );
        self.resolved.insert(frame.frame_id.clone(), SendStatus::Pending);

        Ok(SendTicket {
            frame_id: frame.frame_id,
        })
    }

    // === Resolution ===

    /// Reconciles an acknowledgment from the relay.
    ///
    /// Appends the acknowledged message to the peer's log and clears the
    /// input buffer for chat sends. Returns `None` for unknown or already
    /// resolved frames.
    pub fn handle_ack(
        &mut self,
        frame_id: &str,
        store: &mut ConversationStore,
    ) -> Option<AckOutcome> {
        let Some(pending) = self.pending.remove(frame_id) else {
            debug!(frame_id, "ignoring ack for unknown or resolved send");
            return None;
        };
        self.record_resolution(frame_id.to_string(), SendStatus::Acknowledged);

        let identity = pending.message.identity();
        let peer_key = store
            .resolve_outbound(&pending.message)
            .unwrap_or(pending.peer_key);
        let index = match store.append_message(&peer_key, pending.message.clone()) {
            Ok(index) => index,
            Err(e) => {
                warn!(error = %e, "acknowledged message has no conversation");
                None
            }
        };

        if pending.is_chat && self.input == pending.message.content {
            self.input.clear();
        }

        Some(AckOutcome {
            ticket: SendTicket {
                frame_id: frame_id.to_string(),
            },
            peer_key,
            identity,
            index,
        })
    }

    /// Resolves sends whose acknowledgment is overdue as `TimedOut`.
    pub fn check_timeouts(&mut self) -> Vec<SendTicket> {
        let now = Instant::now();
        let timeout = Duration::from_millis(self.config.ack_timeout_ms);

        let expired: Vec<FrameId> = self
            .pending
            .iter()
            .filter(|(_, p)| now.duration_since(p.sent_at) >= timeout)
            .map(|(id, _)| id.clone())
            .collect();

        self.resolve_all(expired, SendStatus::TimedOut)
    }

    /// Resolves sends made on any connection other than `current` as
    /// `Abandoned`. With no current connection, every pending send is
    /// abandoned.
    pub fn abandon_stale(&mut self, current: Option<ConnectionId>) -> Vec<SendTicket> {
        let stale: Vec<FrameId> = self
            .pending
            .iter()
            .filter(|(_, p)| Some(p.connection) != current)
            .map(|(id, _)| id.clone())
            .collect();

        self.resolve_all(stale, SendStatus::Abandoned)
    }

    fn resolve_all(&mut self, frame_ids: Vec<FrameId>, status: SendStatus) -> Vec<SendTicket> {
        let mut tickets = Vec::with_capacity(frame_ids.len());
        for frame_id in frame_ids {
            if self.pending.remove(&frame_id).is_some() {
                info!(frame_id = %frame_id, ?status, "send resolved without ack");
                self.record_resolution(frame_id.clone(), status);
                tickets.push(SendTicket { frame_id });
            }
        }
        tickets
    }

    fn record_resolution(&mut self, frame_id: FrameId, status: SendStatus) {
        self.resolved.insert(frame_id.clone(), status);
        self.history.push_back(frame_id);
        while self.history.len() > self.config.status_history {
            if let Some(oldest) = self.history.pop_front() {
                self.resolved.remove(&oldest);
            }
        }
    }

    /// Returns the status of a send.
    ///
    /// `None` for unknown tickets and for resolved sends older than the
    /// last `status_history` resolutions.
    pub fn status(&self, ticket: &SendTicket) -> Option<SendStatus> {
        self.resolved.get(&ticket.frame_id).copied()
    }

    /// Number of sends awaiting acknowledgment.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // === Read receipts ===

    /// Sends a read receipt for the selected peer if its latest message came
    /// from that peer and has not been receipted yet.
    ///
    /// Fires at most once per logged message, however often it is called. A
    /// message is tracked by its log position and identity, so a later
    /// message sharing the previous one's identity still gets a receipt.
    pub fn maybe_send_read_receipt<T: Transport>(
        &mut self,
        conn: &mut ConnectionManager<T>,
        store: &mut ConversationStore,
    ) -> Result<Option<ReceiptOutcome>, ComposeError> {
        let Some(peer) = store.selected_peer() else {
            return Ok(None);
        };
        let Some(last) = peer.last_message() else {
            return Ok(None);
        };
        if last.from_id != peer.peer_id() {
            return Ok(None);
        }
        let marker = (peer.messages().len() - 1, last.identity());
        if self.receipted.get(peer.peer_id()) == Some(&marker) {
            return Ok(None);
        }

        let peer_key = peer.peer_id().to_string();
        let chat_id = peer.chat_id().to_string();
        let frame = create_frame(RelayEvent::ReadReceipt(ReadReceipt {
            to_chat_id: chat_id.clone(),
        }));
        conn.send(&frame)?;

        self.receipted.insert(peer_key.clone(), marker);
        let unread_cleared = store.mark_read(&peer_key)?;
        debug!(peer = %peer_key, chat_id = %chat_id, "read receipt sent");

        Ok(Some(ReceiptOutcome {
            peer_key,
            chat_id,
            unread_cleared,
        }))
    }

    /// Strictly increasing send timestamp in milliseconds.
    fn next_stamp(&mut self) -> u64 {
        let stamp = now_millis().max(self.last_stamp + 1);
        self.last_stamp = stamp;
        stamp
    }
}

/// Formats a millisecond timestamp in local time for display.
pub fn display_time(utc_millis: u64) -> String {
    i64::try_from(utc_millis)
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|t| t.format(DISPLAY_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

// INLINE_TEST_REQUIRED: Tests private timestamp state
#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> OutboundComposer {
        OutboundComposer::new(
            SessionIdentity::new("u", "Me", "me@example.com", "chat-me"),
            ComposerConfig::default(),
        )
    }

    #[test]
    fn test_stamps_strictly_increase() {
        let mut c = composer();
        c.last_stamp = u64::MAX / 2;

        let a = c.next_stamp();
        let b = c.next_stamp();
        assert_eq!(a, u64::MAX / 2 + 1);
        assert_eq!(b, a + 1);
    }

    #[test]
    fn test_display_time_shape() {
        let shown = display_time(1_700_000_000_000);
        assert!(shown.contains(", "));
        assert!(shown.ends_with("AM") || shown.ends_with("PM"));
    }
}
