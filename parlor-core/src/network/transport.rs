// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Trait
//!
//! Platform-agnostic abstraction for the relay connection.

use super::error::NetworkError;
use super::message::RelayFrame;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Connection state.
///
/// Owned by the [`ConnectionManager`](super::ConnectionManager); everything
/// else only observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to any relay.
    Disconnected,
    /// Initial connection in progress.
    Connecting,
    /// Connected and authenticated.
    Connected,
    /// Transport dropped, retrying.
    Reconnecting { attempt: u32 },
    /// Retry budget exhausted. Terminal until `connect` is called again.
    Failed,
}

impl ConnectionState {
    /// Returns true for `Failed`.
    pub fn is_failed(&self) -> bool {
        matches!(self, ConnectionState::Failed)
    }
}

/// Configuration for the relay connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Relay URL (`ws://` or `wss://`).
    pub server_url: String,
    /// Timeout for a single connection attempt in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read/write timeout in milliseconds. Bounds how long a receive may
    /// wait before reporting that nothing is available.
    pub io_timeout_ms: u64,
    /// Retries after the first failed attempt before giving up.
    pub max_reconnect_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    pub reconnect_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            server_url: String::new(),
            connect_timeout_ms: 10_000,
            io_timeout_ms: 250,
            max_reconnect_attempts: 10,
            reconnect_delay_ms: 5_000,
        }
    }
}

impl TransportConfig {
    /// Creates a config for `server_url` with default timings.
    pub fn new(server_url: &str) -> Self {
        TransportConfig {
            server_url: server_url.to_string(),
            ..Default::default()
        }
    }

    /// Total number of attempts a connection cycle may make.
    pub fn total_attempts(&self) -> u32 {
        self.max_reconnect_attempts.saturating_add(1)
    }
}

/// Transport trait for relay communication.
///
/// Abstracts the underlying mechanism (WebSocket, in-memory mock) so the
/// connection manager and session can be driven the same way in production
/// and in tests.
///
/// # Synchronous Interface
///
/// Methods are blocking but bounded: `receive` waits at most
/// `io_timeout_ms` and returns `Ok(None)` when nothing arrived. The session
/// drives the transport from a single event loop.
pub trait Transport: Send {
    /// Opens the connection to the relay.
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()>;

    /// Closes the connection. Safe to call when not connected.
    fn disconnect(&mut self) -> TransportResult<()>;

    /// Returns true while the underlying link is open.
    fn is_open(&self) -> bool;

    /// Sends a frame to the relay.
    ///
    /// Returns `ConnectionClosed` if the link dropped.
    fn send(&mut self, frame: &RelayFrame) -> TransportResult<()>;

    /// Receives the next frame, or `Ok(None)` if none arrived in time.
    ///
    /// Returns `ConnectionClosed` if the link dropped.
    fn receive(&mut self) -> TransportResult<Option<RelayFrame>>;

    /// Checks if frames are buffered and can be received without waiting.
    fn has_pending(&self) -> bool;
}
