// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network + Transport Layer
//!
//! Transport abstraction, relay wire protocol and the connection manager.
//!
//! # Architecture
//!
//! - **Transport trait**: Platform-agnostic interface for relay I/O
//! - **Frame types**: JSON wire protocol for relay communication
//! - **Protocol helpers**: Frame construction and encoding
//! - **Connection manager**: Authentication, bounded reconnection, state
//!
//! # Example
//!
//! ```ignore
//! use parlor_core::network::{ConnectionManager, MockTransport, TransportConfig};
//!
//! let transport = MockTransport::new();
//! let mut conn = ConnectionManager::new(transport, TransportConfig::default());
//! let handle = conn.connect(identity)?;
//! while let Some(frame) = conn.receive()? {
//!     // route the frame
//! }
//! ```

#[cfg(feature = "testing")]
pub mod connection;
#[cfg(not(feature = "testing"))]
mod connection;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

pub mod message;

#[cfg(feature = "testing")]
pub mod mock;
#[cfg(not(feature = "testing"))]
mod mock;

pub mod protocol;

#[cfg(feature = "testing")]
pub mod transport;
#[cfg(not(feature = "testing"))]
mod transport;

#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
mod websocket;

// Error types
pub use error::NetworkError;

// Frame types
pub use message::{
    Acknowledgment, AuthenticatePayload, FrameId, ReadReceipt, RelayEvent, RelayFrame,
    RosterSnapshot, PROTOCOL_VERSION,
};

// Protocol utilities
pub use protocol::{create_ack, create_frame, decode_frame, encode_frame, MAX_FRAME_SIZE};

// Transport abstraction
pub use transport::{ConnectionState, Transport, TransportConfig, TransportResult};

// Mock transport for testing
pub use mock::MockTransport;

// WebSocket transport for production
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use websocket::WebSocketTransport;

// Connection management
pub use connection::{ConnectionHandle, ConnectionId, ConnectionManager};
