// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Inquiry Commands
//!
//! Queue product inquiries for the next chat session.

use anyhow::Result;
use parlor_core::{DeferredInquiry, InquiryStore};

use crate::config::CliConfig;
use crate::display;

/// Queues `inquiry` for the conversation `chat_id`, replacing any earlier one.
pub fn queue(config: &CliConfig, chat_id: &str, inquiry: &DeferredInquiry) -> Result<()> {
    let store = config.open_inquiries()?;
    let replaced = store.load(chat_id).ok().flatten().is_some();
    store.save(chat_id, inquiry)?;

    if replaced {
        display::warning(&format!("Replaced the inquiry queued for {chat_id}"));
    }
    display::success(&format!("Inquiry queued for {chat_id}"));
    display::info(&format!(
        "It is sent when you run: parlor chat --to-chat {chat_id} --store-name <name>"
    ));
    Ok(())
}

/// Shows the inquiry queued for `chat_id`.
pub fn show(config: &CliConfig, chat_id: &str) -> Result<()> {
    let store = config.open_inquiries()?;
    match store.load(chat_id)? {
        Some(inquiry) => display::display_inquiry(&inquiry),
        None => display::info(&format!("No inquiry queued for {chat_id}")),
    }
    Ok(())
}

/// Removes the inquiry queued for `chat_id`.
pub fn clear(config: &CliConfig, chat_id: &str) -> Result<()> {
    let store = config.open_inquiries()?;
    if store.remove(chat_id)? {
        display::success(&format!("Removed the inquiry queued for {chat_id}"));
    } else {
        display::info(&format!("No inquiry queued for {chat_id}"));
    }
    Ok(())
}
