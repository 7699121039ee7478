// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Frame encoding and construction helpers.

use std::time::{SystemTime, UNIX_EPOCH};

use super::error::NetworkError;
use super::message::{Acknowledgment, RelayEvent, RelayFrame, PROTOCOL_VERSION};

/// Maximum encoded frame size accepted in either direction (1 MiB).
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Wraps an event in a new frame with a fresh ID.
pub fn create_frame(payload: RelayEvent) -> RelayFrame {
    RelayFrame {
        version: PROTOCOL_VERSION,
        frame_id: uuid::Uuid::new_v4().to_string(),
        timestamp: now_millis(),
        payload,
    }
}

/// Builds the acknowledgment frame for `frame_id`.
pub fn create_ack(frame_id: &str) -> RelayFrame {
    create_frame(RelayEvent::Ack(Acknowledgment {
        ack_for: frame_id.to_string(),
    }))
}

/// Serializes a frame to its JSON text form.
pub fn encode_frame(frame: &RelayFrame) -> Result<String, NetworkError> {
    let text = serde_json::to_string(frame)?;
    if text.len() > MAX_FRAME_SIZE {
        return Err(NetworkError::FrameTooLarge {
            size: text.len(),
            max: MAX_FRAME_SIZE,
        });
    }
    Ok(text)
}

/// Parses a frame from its JSON text form.
pub fn decode_frame(text: &str) -> Result<RelayFrame, NetworkError> {
    if text.len() > MAX_FRAME_SIZE {
        return Err(NetworkError::FrameTooLarge {
            size: text.len(),
            max: MAX_FRAME_SIZE,
        });
    }
    let frame: RelayFrame =
        serde_json::from_str(text).map_err(|e| NetworkError::InvalidMessage(e.to_string()))?;
    if frame.version != PROTOCOL_VERSION {
        return Err(NetworkError::InvalidMessage(format!(
            "unsupported protocol version {}",
            frame.version
        )));
    }
    Ok(frame)
}
