// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deferred Inquiry Bridge
//!
//! Replays an inquiry captured before the session existed, once the
//! session is ready and the target conversation is known. Each
//! correlation key is served at most once per session.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::error::InquiryError;
use super::payload::CorrelationToken;
use super::store::InquiryStore;
use crate::api::ChatResult;
use crate::composer::{OutboundComposer, SendTicket};
use crate::conversation::{ConversationStore, PeerKey};
use crate::network::{ConnectionManager, Transport};

/// Why a stored payload was dropped without sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// Addressed to a different conversation.
    Stale { payload_chat_id: String },
    /// Stored payload could not be parsed.
    Unreadable,
}

/// Result of a readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// No correlation token; the deferred flow is off.
    NoToken,
    /// Nothing stored for the token.
    NothingPending,
    /// The token's payload was already sent this session.
    AlreadyConsumed,
    /// The inquiry was sent.
    Sent { ticket: SendTicket, peer_key: PeerKey },
    /// The stored payload was deleted without sending.
    Discarded(DiscardReason),
}

/// Sends deferred inquiries once their conversation is ready.
pub struct DeferredInquiryBridge {
    store: Box<dyn InquiryStore>,
    token: Option<CorrelationToken>,
    consumed: HashSet<String>,
}

impl DeferredInquiryBridge {
    /// Creates a bridge reading from `store`.
    pub fn new(store: Box<dyn InquiryStore>) -> Self {
        DeferredInquiryBridge {
            store,
            token: None,
            consumed: HashSet::new(),
        }
    }

    /// Sets or clears the correlation token.
    pub fn set_token(&mut self, token: Option<CorrelationToken>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&CorrelationToken> {
        self.token.as_ref()
    }

    /// Returns true if the payload for `key` was sent this session.
    pub fn is_consumed(&self, key: &str) -> bool {
        self.consumed.contains(key)
    }

    /// Checks for a pending inquiry and sends it.
    ///
    /// The payload is deleted once sent. If sending fails the payload stays
    /// stored and the next readiness check tries again.
    pub fn on_session_ready<T: Transport>(
        &mut self,
        composer: &mut OutboundComposer,
        conn: &mut ConnectionManager<T>,
        conversations: &mut ConversationStore,
    ) -> ChatResult<BridgeOutcome> {
        let Some(token) = self.token.clone() else {
            return Ok(BridgeOutcome::NoToken);
        };
        let key = token.key();
        if self.consumed.contains(key) {
            return Ok(BridgeOutcome::AlreadyConsumed);
        }

        let inquiry = match self.store.load(key) {
            Ok(Some(inquiry)) => inquiry,
            Ok(None) => {
                debug!(chat_id = key, "no deferred inquiry");
                return Ok(BridgeOutcome::NothingPending);
            }
            Err(InquiryError::Serialization(e)) => {
                warn!(chat_id = key, error = %e, "discarding unreadable deferred inquiry");
                self.discard(key);
                return Ok(BridgeOutcome::Discarded(DiscardReason::Unreadable));
            }
            Err(e) => return Err(e.into()),
        };

        if inquiry.is_stale_for(&token) {
            let payload_chat_id = inquiry.target_chat_id.clone().unwrap_or_default();
            let e = InquiryError::StalePayload {
                token_chat_id: token.chat_id.clone(),
                payload_chat_id: payload_chat_id.clone(),
            };
            warn!(error = %e, "discarding deferred inquiry");
            self.discard(key);
            return Ok(BridgeOutcome::Discarded(DiscardReason::Stale { payload_chat_id }));
        }

        let peer_key = match conversations.peer_by_chat_id(&token.chat_id) {
            Some(peer) => peer.peer_id().to_string(),
            None => conversations.open_conversation(&token.chat_id, &token.store_name),
        };

        let ticket = composer.send_inquiry_to(
            &peer_key,
            &inquiry.user_message,
            inquiry.details(&token),
            conn,
            conversations,
        )?;

        self.consumed.insert(key.to_string());
        self.discard(key);
        info!(chat_id = key, product = %inquiry.product_id, "deferred inquiry sent");

        Ok(BridgeOutcome::Sent { ticket, peer_key })
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(chat_id = key, error = %e, "failed to delete deferred inquiry");
        }
    }
}
