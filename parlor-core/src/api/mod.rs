// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parlor API Layer
//!
//! High-level API for running a relay chat session.
//!
//! # Overview
//!
//! The API layer wraps the connection manager, inbound router, conversation
//! store, outbound composer and deferred inquiry bridge behind a single
//! [`ChatSession`], and reports what happens through [`ChatEvent`]s.
//!
//! # Example
//!
//! ```ignore
//! use parlor_core::api::{ChatConfig, ChatSession};
//!
//! let mut session = ChatSession::builder()
//!     .config(ChatConfig::from_env()?)
//!     .identity(identity)
//!     .build()?;
//!
//! session.connect()?;
//! session.poll()?;
//! for peer in session.conversations().peers() {
//!     println!("{} ({} unread)", peer.display_name(), peer.unread_count());
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`error`] - Error types for the API layer
//! - [`config`] - Configuration types
//! - [`events`] - Event system for callbacks
//! - [`session`] - Chat session orchestrator

#[cfg(feature = "testing")]
pub mod config;
#[cfg(not(feature = "testing"))]
mod config;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod events;
#[cfg(not(feature = "testing"))]
mod events;

#[cfg(feature = "testing")]
pub mod session;
#[cfg(not(feature = "testing"))]
mod session;

// Error types
pub use error::{ChatError, ChatResult};

// Configuration
pub use config::ChatConfig;

// Events
pub use events::{CallbackHandler, ChatEvent, EventDispatcher, EventHandler};

// Session
pub use session::{ChatSession, ChatSessionBuilder};
