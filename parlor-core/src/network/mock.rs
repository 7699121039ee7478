// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! In-memory relay stand-in for tests and demos. Clones share state, so a
//! test can keep a handle after moving the transport into a session.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::NetworkError;
use super::message::{RelayEvent, RelayFrame};
use super::protocol::{create_ack, create_frame};
use super::transport::{Transport, TransportConfig, TransportResult};

#[derive(Debug, Default)]
struct MockState {
    open: bool,
    dropped: bool,
    inbound: VecDeque<RelayFrame>,
    sent: Vec<RelayFrame>,
    connect_calls: u32,
    disconnect_calls: u32,
    failing_connects: u32,
    refuse_all: bool,
    auto_ack: bool,
}

/// Mock transport for testing.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a frame to be returned by `receive`.
    pub fn queue_receive(&self, frame: RelayFrame) {
        self.state.lock().inbound.push_back(frame);
    }

    /// Wraps `event` in a frame and queues it.
    pub fn queue_event(&self, event: RelayEvent) -> RelayFrame {
        let frame = create_frame(event);
        self.queue_receive(frame.clone());
        frame
    }

    /// Returns all frames sent so far.
    pub fn sent_frames(&self) -> Vec<RelayFrame> {
        self.state.lock().sent.clone()
    }

    /// Returns the events of all frames sent so far.
    pub fn sent_events(&self) -> Vec<RelayEvent> {
        self.state
            .lock()
            .sent
            .iter()
            .map(|f| f.payload.clone())
            .collect()
    }

    /// Forgets sent frames.
    pub fn clear_sent(&self) {
        self.state.lock().sent.clear();
    }

    /// Queues an acknowledgment for every `private_message` sent so far.
    pub fn ack_all_sent(&self) {
        let mut state = self.state.lock();
        let acks: Vec<_> = state
            .sent
            .iter()
            .filter(|f| matches!(f.payload, RelayEvent::PrivateMessage(_)))
            .map(|f| create_ack(&f.frame_id))
            .collect();
        state.inbound.extend(acks);
    }

    /// When enabled, every `private_message` is acknowledged immediately.
    pub fn set_auto_ack(&self, enabled: bool) {
        self.state.lock().auto_ack = enabled;
    }

    /// Makes the next `count` connection attempts fail.
    pub fn fail_next_connects(&self, count: u32) {
        self.state.lock().failing_connects = count;
    }

    /// Makes every connection attempt fail until reset.
    pub fn refuse_connections(&self, refuse: bool) {
        self.state.lock().refuse_all = refuse;
    }

    /// Simulates the relay dropping the link.
    pub fn drop_connection(&self) {
        let mut state = self.state.lock();
        state.open = false;
        state.dropped = true;
    }

    /// Number of `connect` calls made.
    pub fn connect_calls(&self) -> u32 {
        self.state.lock().connect_calls
    }

    /// Number of `disconnect` calls made.
    pub fn disconnect_calls(&self) -> u32 {
        self.state.lock().disconnect_calls
    }

    /// Number of frames waiting to be received.
    pub fn pending_count(&self) -> usize {
        self.state.lock().inbound.len()
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _config: &TransportConfig) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.connect_calls += 1;

        if state.refuse_all {
            return Err(NetworkError::ConnectionFailed("connection refused".into()));
        }
        if state.failing_connects > 0 {
            state.failing_connects -= 1;
            return Err(NetworkError::ConnectionFailed("connection refused".into()));
        }

        state.open = true;
        state.dropped = false;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        let mut state = self.state.lock();
        state.disconnect_calls += 1;
        state.open = false;
        state.dropped = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.lock().open
    }

    fn send(&mut self, frame: &RelayFrame) -> TransportResult<()> {
        let mut state = self.state.lock();
        if state.dropped {
            return Err(NetworkError::ConnectionClosed);
        }
        if !state.open {
            return Err(NetworkError::NotConnected);
        }

        state.sent.push(frame.clone());
        if state.auto_ack && matches!(frame.payload, RelayEvent::PrivateMessage(_)) {
            state.inbound.push_back(create_ack(&frame.frame_id));
        }
        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<RelayFrame>> {
        let mut state = self.state.lock();
        if state.dropped {
            return Err(NetworkError::ConnectionClosed);
        }
        if !state.open {
            return Err(NetworkError::NotConnected);
        }
        Ok(state.inbound.pop_front())
    }

    fn has_pending(&self) -> bool {
        let state = self.state.lock();
        state.open && !state.inbound.is_empty()
    }
}
