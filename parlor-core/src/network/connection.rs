// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Manager
//!
//! Owns the relay connection lifecycle: establish, authenticate, reconnect
//! and teardown.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::error::NetworkError;
use super::message::{RelayEvent, RelayFrame};
use super::protocol::create_frame;
use super::transport::{ConnectionState, Transport, TransportConfig, TransportResult};
use crate::identity::SessionIdentity;

/// Identifier of one established connection.
pub type ConnectionId = u64;

/// Handle to one established connection.
///
/// Every successful connect or reconnect yields a handle with a new id.
/// Listeners bind to a handle, so a reconnect invalidates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionHandle {
    id: ConnectionId,
}

impl ConnectionHandle {
    /// Returns the connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

type Sleeper = Box<dyn Fn(Duration) + Send>;
type Clock = Box<dyn Fn() -> Instant + Send>;

/// Connection manager with authentication and bounded reconnection.
///
/// Wraps a transport implementation and adds:
/// - Authentication frame on every connect
/// - Fixed-delay reconnection with a bounded attempt budget; after a drop
///   one attempt is made per [`poll_reconnect`](Self::poll_reconnect) call
///   once the retry deadline has passed, so callers never block
/// - Connection state ownership and a queue of observed transitions
///
/// # Example
///
/// ```ignore
/// use parlor_core::network::{ConnectionManager, MockTransport, TransportConfig};
///
/// let mut conn = ConnectionManager::new(MockTransport::new(), TransportConfig::new("wss://relay.example.com"));
/// let handle = conn.connect(identity)?;
/// ```
pub struct ConnectionManager<T: Transport> {
    transport: T,
    config: TransportConfig,
    identity: Option<SessionIdentity>,
    state: ConnectionState,
    handle: Option<ConnectionHandle>,
    next_handle_id: ConnectionId,
    reconnect_attempt: u32,
    state_changes: Vec<ConnectionState>,
    retry_at: Option<Instant>,
    sleeper: Sleeper,
    clock: Clock,
}

impl<T: Transport> ConnectionManager<T> {
    /// Creates a new connection manager.
    pub fn new(transport: T, config: TransportConfig) -> Self {
        ConnectionManager {
            transport,
            config,
            identity: None,
            state: ConnectionState::Disconnected,
            handle: None,
            next_handle_id: 0,
            reconnect_attempt: 0,
            state_changes: Vec::new(),
            retry_at: None,
            sleeper: Box::new(std::thread::sleep),
            clock: Box::new(Instant::now),
        }
    }

    /// Replaces the function used to wait between connection attempts.
    pub fn with_sleeper<F>(mut self, sleeper: F) -> Self
    where
        F: Fn(Duration) + Send + 'static,
    {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Replaces the clock used to schedule reconnect attempts.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> Instant + Send + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Establishes a connection and authenticates as `identity`.
    ///
    /// Any existing connection is torn down first. Retries up to
    /// `max_reconnect_attempts` times with a fixed delay, then transitions
    /// to `Failed`.
    pub fn connect(&mut self, identity: SessionIdentity) -> TransportResult<ConnectionHandle> {
        if self.handle.is_some() || self.transport.is_open() {
            debug!("tearing down previous relay connection");
            self.teardown();
        }

        self.identity = Some(identity);
        self.reconnect_attempt = 0;
        self.retry_at = None;
        self.set_state(ConnectionState::Connecting);

        let total = self.config.total_attempts();
        for attempt in 0..total {
            if attempt > 0 {
                self.reconnect_attempt = attempt;
                self.wait_before_retry();
            }
            match self.open_and_authenticate() {
                Ok(handle) => {
                    info!(url = %self.config.server_url, "connected to relay");
                    return Ok(handle);
                }
                Err(e) => warn!(attempt = attempt + 1, error = %e, "relay connection attempt failed"),
            }
        }

        self.fail(total)
    }

    /// Disconnects from the relay.
    ///
    /// Sends a disconnect notice, closes the transport and drops the
    /// connection handle. Safe to call when not connected.
    pub fn disconnect(&mut self) -> TransportResult<()> {
        self.retry_at = None;
        if self.handle.is_none() && !self.transport.is_open() {
            if self.state != ConnectionState::Failed {
                self.set_state(ConnectionState::Disconnected);
            }
            return Ok(());
        }

        self.teardown();
        self.set_state(ConnectionState::Disconnected);
        info!("disconnected from relay");
        Ok(())
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns true if connected and authenticated.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.handle.is_some()
    }

    /// Returns the handle of the live connection, if any.
    pub fn handle(&self) -> Option<ConnectionHandle> {
        self.handle
    }

    /// Drains the state transitions observed since the last call.
    pub fn take_state_changes(&mut self) -> Vec<ConnectionState> {
        std::mem::take(&mut self.state_changes)
    }

    /// Sends a frame over the live connection.
    ///
    /// If the transport dropped, the manager makes one reconnect attempt
    /// and returns `ConnectionClosed`; the frame itself is not resent.
    pub fn send(&mut self, frame: &RelayFrame) -> TransportResult<()> {
        if self.handle.is_none() {
            return Err(NetworkError::NotConnected);
        }
        match self.transport.send(frame) {
            Err(NetworkError::ConnectionClosed) => {
                self.begin_recovery()?;
                Err(NetworkError::ConnectionClosed)
            }
            other => other,
        }
    }

    /// Receives the next frame from the live connection.
    ///
    /// A dropped transport starts reconnection and returns `Ok(None)`;
    /// while reconnecting, each call drives [`poll_reconnect`](Self::poll_reconnect).
    /// Once reconnected, [`handle`](Self::handle) changes.
    pub fn receive(&mut self) -> TransportResult<Option<RelayFrame>> {
        if self.handle.is_none() {
            if self.is_reconnecting() {
                self.poll_reconnect()?;
                return Ok(None);
            }
            return Err(NetworkError::NotConnected);
        }
        match self.transport.receive() {
            Err(NetworkError::ConnectionClosed) => {
                self.begin_recovery()?;
                Ok(None)
            }
            other => other,
        }
    }

    /// Returns true while a dropped connection awaits its next attempt.
    pub fn is_reconnecting(&self) -> bool {
        self.retry_at.is_some()
    }

    /// Makes the next reconnect attempt if its deadline has passed.
    ///
    /// Returns `Ok(None)` when not reconnecting, before the deadline, or
    /// after a failed attempt with budget left. Exhausting the budget
    /// transitions to `Failed` and returns `MaxRetriesExceeded`.
    pub fn poll_reconnect(&mut self) -> TransportResult<Option<ConnectionHandle>> {
        match self.retry_at {
            Some(at) if (self.clock)() >= at => self.attempt_reconnect(),
            _ => Ok(None),
        }
    }

    /// Checks if frames can be received without waiting.
    pub fn has_pending(&self) -> bool {
        self.handle.is_some() && self.transport.has_pending()
    }

    /// Returns the current reconnect attempt count.
    pub fn reconnect_attempt(&self) -> u32 {
        self.reconnect_attempt
    }

    /// Returns the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn begin_recovery(&mut self) -> TransportResult<Option<ConnectionHandle>> {
        warn!("relay connection dropped");
        self.handle = None;
        let _ = self.transport.disconnect();
        self.reconnect_attempt = 0;
        self.attempt_reconnect()
    }

    fn attempt_reconnect(&mut self) -> TransportResult<Option<ConnectionHandle>> {
        let budget = self.config.max_reconnect_attempts;
        if self.reconnect_attempt >= budget {
            self.retry_at = None;
            return self.fail(budget).map(Some);
        }

        let attempt = self.reconnect_attempt + 1;
        self.reconnect_attempt = attempt;
        self.set_state(ConnectionState::Reconnecting { attempt });
        match self.open_and_authenticate() {
            Ok(handle) => {
                self.retry_at = None;
                info!(attempt, "reconnected to relay");
                Ok(Some(handle))
            }
            Err(e) if attempt < budget => {
                let delay = Duration::from_millis(self.config.reconnect_delay_ms);
                self.retry_at = Some((self.clock)() + delay);
                warn!(attempt, error = %e, "relay reconnect attempt failed");
                Ok(None)
            }
            Err(e) => {
                warn!(attempt, error = %e, "relay reconnect attempt failed");
                self.retry_at = None;
                self.fail(budget).map(Some)
            }
        }
    }

    fn fail(&mut self, attempts: u32) -> TransportResult<ConnectionHandle> {
        let _ = self.transport.disconnect();
        self.handle = None;
        self.set_state(ConnectionState::Failed);
        warn!(attempts, "giving up on relay connection");
        Err(NetworkError::MaxRetriesExceeded { attempts })
    }

    fn open_and_authenticate(&mut self) -> TransportResult<ConnectionHandle> {
        self.transport.connect(&self.config)?;
        if let Err(e) = self.send_authenticate() {
            let _ = self.transport.disconnect();
            return Err(e);
        }

        self.next_handle_id += 1;
        let handle = ConnectionHandle {
            id: self.next_handle_id,
        };
        self.handle = Some(handle);
        self.reconnect_attempt = 0;
        self.set_state(ConnectionState::Connected);
        Ok(handle)
    }

    fn send_authenticate(&mut self) -> TransportResult<()> {
        let identity = self
            .identity
            .as_ref()
            .ok_or_else(|| NetworkError::AuthenticationFailed("no identity set".into()))?;
        let frame = create_frame(RelayEvent::Authenticate(identity.into()));
        self.transport.send(&frame)
    }

    fn teardown(&mut self) {
        if self.transport.is_open() {
            let notice = create_frame(RelayEvent::Disconnect);
            if let Err(e) = self.transport.send(&notice) {
                debug!(error = %e, "disconnect notice not delivered");
            }
        }
        if let Err(e) = self.transport.disconnect() {
            debug!(error = %e, "transport close failed");
        }
        self.handle = None;
    }

    fn wait_before_retry(&self) {
        (self.sleeper)(Duration::from_millis(self.config.reconnect_delay_ms));
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "connection state changed");
            self.state = state;
            self.state_changes.push(state);
        }
    }
}
