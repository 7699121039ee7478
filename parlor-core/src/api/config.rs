// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Configuration

use std::env;
use std::str::FromStr;

use crate::composer::ComposerConfig;
use crate::network::TransportConfig;

use super::error::{ChatError, ChatResult};

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Relay connection settings.
    pub relay: TransportConfig,
    /// Send acknowledgment settings.
    pub composer: ComposerConfig,
    /// Upper bound on frames processed by one `poll`.
    pub max_frames_per_poll: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            relay: TransportConfig::default(),
            composer: ComposerConfig::default(),
            max_frames_per_poll: 256,
        }
    }
}

impl ChatConfig {
    /// Creates a config for `relay_url` with default settings.
    pub fn new(relay_url: &str) -> Self {
        ChatConfig {
            relay: TransportConfig::new(relay_url),
            ..Default::default()
        }
    }

    /// Builds a config from `PARLOR_*` environment variables.
    ///
    /// Unset variables keep their defaults; unparseable values are errors.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `PARLOR_RELAY_URL` | `relay.server_url` |
    /// | `PARLOR_CONNECT_TIMEOUT_MS` | `relay.connect_timeout_ms` |
    /// | `PARLOR_IO_TIMEOUT_MS` | `relay.io_timeout_ms` |
    /// | `PARLOR_MAX_RECONNECT_ATTEMPTS` | `relay.max_reconnect_attempts` |
    /// | `PARLOR_RECONNECT_DELAY_MS` | `relay.reconnect_delay_ms` |
    /// | `PARLOR_ACK_TIMEOUT_MS` | `composer.ack_timeout_ms` |
    /// | `PARLOR_MAX_PENDING_SENDS` | `composer.max_pending_sends` |
    /// | `PARLOR_SEND_HISTORY` | `composer.status_history` |
    pub fn from_env() -> ChatResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ChatResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ChatConfig::default();
        if let Some(url) = lookup("PARLOR_RELAY_URL") {
            config.relay.server_url = url;
        }
        override_with(&lookup, "PARLOR_CONNECT_TIMEOUT_MS", &mut config.relay.connect_timeout_ms)?;
        override_with(&lookup, "PARLOR_IO_TIMEOUT_MS", &mut config.relay.io_timeout_ms)?;
        override_with(
            &lookup,
            "PARLOR_MAX_RECONNECT_ATTEMPTS",
            &mut config.relay.max_reconnect_attempts,
        )?;
        override_with(&lookup, "PARLOR_RECONNECT_DELAY_MS", &mut config.relay.reconnect_delay_ms)?;
        override_with(&lookup, "PARLOR_ACK_TIMEOUT_MS", &mut config.composer.ack_timeout_ms)?;
        override_with(
            &lookup,
            "PARLOR_MAX_PENDING_SENDS",
            &mut config.composer.max_pending_sends,
        )?;
        override_with(&lookup, "PARLOR_SEND_HISTORY", &mut config.composer.status_history)?;
        Ok(config)
    }
}

fn override_with<F, V>(lookup: &F, name: &str, field: &mut V) -> ChatResult<()>
where
    F: Fn(&str) -> Option<String>,
    V: FromStr,
{
    if let Some(raw) = lookup(name) {
        *field = raw
            .trim()
            .parse()
            .map_err(|_| ChatError::Configuration(format!("{name}: invalid value {raw:?}")))?;
    }
    Ok(())
}
