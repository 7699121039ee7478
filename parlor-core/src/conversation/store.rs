// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversation Store
//!
//! Pure state container for the roster, per-peer message logs, unread
//! counters and the current selection. It performs no I/O; the router and
//! composer decide when to call it.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::error::{ConversationError, RosterError};
use super::message::Message;
use super::peer::{Peer, PeerKey, RosterEntry};

/// Outcome of applying a roster snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterMerge {
    /// Peers new in this snapshot.
    pub added: Vec<PeerKey>,
    /// Peers present before and after; their logs and unread counts are kept.
    pub retained: Vec<PeerKey>,
    /// Peers missing from the snapshot.
    pub removed: Vec<PeerKey>,
    /// Entries dropped by validation.
    pub rejected: Vec<RosterError>,
    /// The selected peer disappeared and the selection was cleared.
    pub selection_cleared: bool,
}

/// Per-session conversation state.
#[derive(Debug, Default)]
pub struct ConversationStore {
    peers: Vec<Peer>,
    selected: Option<PeerKey>,
    roster_loaded: bool,
}

impl ConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // === Roster ===

    /// Replaces the roster with a full snapshot.
    ///
    /// Snapshot order becomes roster order. A peer already known (by peer
    /// id, or by chat id when its old id is absent from the snapshot) keeps
    /// its message log and local unread count, so redelivering a snapshot
    /// changes nothing. Invalid and duplicate entries are dropped and
    /// reported. A selection whose peer is gone is cleared.
    ///
    /// Placeholders from [`open_conversation`](Self::open_conversation)
    /// survive snapshots that lack their chat id and follow the roster
    /// peers. An entry with that chat id replaces the placeholder and
    /// inherits its log and selection.
    pub fn set_roster(&mut self, entries: Vec<RosterEntry>) -> RosterMerge {
        let mut merge = RosterMerge::default();
        let snapshot_ids: HashSet<String> =
            entries.iter().filter_map(|e| e.user_id.clone()).collect();
        let mut previous = std::mem::take(&mut self.peers);
        let mut next: Vec<Peer> = Vec::with_capacity(entries.len());
        let mut moved_selection: Option<PeerKey> = None;

        for (index, entry) in entries.into_iter().enumerate() {
            let mut peer = match entry.validate(index) {
                Ok(peer) => peer,
                Err(e) => {
                    warn!(error = %e, "dropping malformed roster entry");
                    merge.rejected.push(e);
                    continue;
                }
            };

            if next.iter().any(|p| p.peer_id() == peer.peer_id()) {
                let e = RosterError::DuplicatePeer {
                    index,
                    peer_id: peer.peer_id().to_string(),
                };
                warn!(error = %e, "dropping duplicate roster entry");
                merge.rejected.push(e);
                continue;
            }

            let prior = previous
                .iter()
                .position(|p| !p.is_placeholder() && p.peer_id() == peer.peer_id())
                .or_else(|| {
                    previous.iter().position(|p| {
                        p.chat_id() == peer.chat_id()
                            && (p.is_placeholder() || !snapshot_ids.contains(p.peer_id()))
                    })
                });

            let key = peer.peer_id().to_string();
            match prior {
                Some(pos) => {
                    let old = previous.remove(pos);
                    if self.selected.as_deref() == Some(old.peer_id()) {
                        moved_selection = Some(key.clone());
                    }
                    peer.inherit_state(old);
                    merge.retained.push(key);
                }
                None => merge.added.push(key),
            }
            next.push(peer);
        }

        for old in previous {
            let key = old.peer_id().to_string();
            if !old.is_placeholder() {
                merge.removed.push(key);
                continue;
            }
            if next
                .iter()
                .any(|p| p.peer_id() == old.peer_id() || p.chat_id() == old.chat_id())
            {
                warn!(peer = %key, "roster entry shadows conversation opened outside the roster");
                merge.removed.push(key);
                continue;
            }
            if self.selected.as_deref() == Some(old.peer_id()) {
                moved_selection = Some(key.clone());
            }
            merge.retained.push(key);
            next.push(old);
        }
        self.peers = next;
        self.roster_loaded = true;

        if self.selected.is_some() {
            match moved_selection {
                Some(key) => self.selected = Some(key),
                None => {
                    debug!(selected = ?self.selected, "selected peer left the roster");
                    self.selected = None;
                    merge.selection_cleared = true;
                }
            }
        }

        debug!(
            added = merge.added.len(),
            retained = merge.retained.len(),
            removed = merge.removed.len(),
            rejected = merge.rejected.len(),
            "roster snapshot applied"
        );
        merge
    }

    /// Returns true once a roster snapshot has been applied.
    pub fn has_roster(&self) -> bool {
        self.roster_loaded
    }

    /// Selects the conversation with `chat_id`, creating a placeholder peer
    /// named after `store_name` when the roster has none.
    pub fn open_conversation(&mut self, chat_id: &str, store_name: &str) -> PeerKey {
        let key = match self.peer_by_chat_id(chat_id) {
            Some(peer) => peer.peer_id().to_string(),
            None => {
                let peer_id = if self.peer(store_name).is_some() {
                    chat_id
                } else {
                    store_name
                };
                let peer = Peer::new(peer_id, store_name, chat_id)
                    .with_store_name(store_name)
                    .as_placeholder();
                info!(chat_id, store_name, "opening conversation outside the roster");
                self.peers.push(peer);
                peer_id.to_string()
            }
        };
        self.selected = Some(key.clone());
        key
    }

    // === Messages ===

    /// Appends a message to a peer's log.
    ///
    /// Returns the message's position in the log, or `Ok(None)` if an equal
    /// message is already there. Messages that merely share an identity are
    /// both kept.
    pub fn append_message(
        &mut self,
        peer_key: &str,
        message: Message,
    ) -> Result<Option<usize>, ConversationError> {
        let peer = self.peer_mut(peer_key)?;
        let position = peer.push_message(message);
        if position.is_none() {
            debug!(peer = peer_key, "ignoring redelivered message");
        }
        Ok(position)
    }

    /// Messages for a peer in delivery order. Empty for unknown peers.
    pub fn messages_for(&self, peer_key: &str) -> &[Message] {
        self.peer(peer_key).map(Peer::messages).unwrap_or(&[])
    }

    /// Finds the peer an inbound message belongs to (its sender).
    pub fn resolve_inbound(&self, message: &Message) -> Option<PeerKey> {
        self.peer(&message.from_id)
            .map(|p| p.peer_id().to_string())
    }

    /// Finds the peer an outbound message is addressed to, by chat id first.
    pub fn resolve_outbound(&self, message: &Message) -> Option<PeerKey> {
        self.peer_by_chat_id(&message.to_chat_id)
            .or_else(|| self.peer(&message.to_id))
            .map(|p| p.peer_id().to_string())
    }

    // === Selection ===

    /// Selects a peer. Unread counts are not touched.
    pub fn select(&mut self, peer_key: &str) -> Result<(), ConversationError> {
        if self.peer(peer_key).is_none() {
            return Err(ConversationError::PeerNotFound(peer_key.to_string()));
        }
        self.selected = Some(peer_key.to_string());
        Ok(())
    }

    /// Clears the selection, returning the previously selected key.
    pub fn clear_selection(&mut self) -> Option<PeerKey> {
        self.selected.take()
    }

    /// Key of the selected peer.
    pub fn selected_key(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected peer.
    pub fn selected_peer(&self) -> Option<&Peer> {
        self.selected.as_deref().and_then(|key| self.peer(key))
    }

    /// Returns true if `peer_key` is selected.
    pub fn is_selected(&self, peer_key: &str) -> bool {
        self.selected.as_deref() == Some(peer_key)
    }

    // === Unread ===

    /// Increments a peer's unread count and returns the new value.
    pub fn increment_unread(&mut self, peer_key: &str) -> Result<u32, ConversationError> {
        let peer = self.peer_mut(peer_key)?;
        peer.unread_count = peer.unread_count.saturating_add(1);
        Ok(peer.unread_count)
    }

    /// Zeroes one peer's unread count.
    ///
    /// Idempotent. Returns true if the count changed.
    pub fn mark_read(&mut self, peer_key: &str) -> Result<bool, ConversationError> {
        let peer = self.peer_mut(peer_key)?;
        let changed = peer.unread_count != 0;
        peer.unread_count = 0;
        Ok(changed)
    }

    /// Unread count for a peer.
    pub fn unread_count(&self, peer_key: &str) -> Option<u32> {
        self.peer(peer_key).map(Peer::unread_count)
    }

    /// Sum of unread counts across the roster.
    pub fn total_unread(&self) -> u32 {
        self.peers
            .iter()
            .fold(0u32, |acc, p| acc.saturating_add(p.unread_count()))
    }

    // === Lookup ===

    /// Finds a peer by key.
    pub fn peer(&self, peer_key: &str) -> Option<&Peer> {
        self.peers.iter().find(|p| p.peer_id() == peer_key)
    }

    /// Finds a peer by conversation chat id.
    pub fn peer_by_chat_id(&self, chat_id: &str) -> Option<&Peer> {
        self.peers.iter().find(|p| p.chat_id() == chat_id)
    }

    /// All peers in roster order.
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Number of peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Returns true if the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn peer_mut(&mut self, peer_key: &str) -> Result<&mut Peer, ConversationError> {
        self.peers
            .iter_mut()
            .find(|p| p.peer_id() == peer_key)
            .ok_or_else(|| ConversationError::PeerNotFound(peer_key.to_string()))
    }
}
