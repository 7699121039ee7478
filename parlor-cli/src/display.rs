// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Display Helpers
//!
//! Terminal output formatting and styling.

use console::style;
use parlor_core::composer::display_time;
use parlor_core::{DeferredInquiry, Message, Peer};

/// Prints a success message.
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Prints an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Prints a warning message.
pub fn warning(msg: &str) {
    println!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Prints an info message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Displays the roster, marking the selected peer.
pub fn display_peers(peers: &[Peer], selected: Option<&str>) {
    if peers.is_empty() {
        println!("  {}", style("(no conversations)").dim());
        return;
    }
    for peer in peers {
        let marker = if selected == Some(peer.peer_id()) {
            style(">").cyan().bold()
        } else {
            style(" ")
        };
        let unread = match peer.unread_count() {
            0 => style(String::new()),
            n => style(format!("({n})")).yellow().bold(),
        };
        println!(
            "{} {:16} {:12} {}",
            marker,
            style(peer.display_name()).bold(),
            style(peer.peer_id()).dim(),
            unread
        );
    }
}

/// Displays one message of a conversation.
pub fn display_message(message: &Message, outgoing: bool) {
    let sender = if outgoing {
        style("you".to_string()).green()
    } else {
        style(message.from_name.clone()).cyan()
    };
    let time = style(display_time(message.utc_time_sent)).dim();
    match message.inquiry() {
        Some(details) => println!(
            "{} {}  [{} x{}] {}",
            time, sender, details.product_name, details.quantity, message.content
        ),
        None => println!("{} {}  {}", time, sender, message.content),
    }
}

/// Displays a queued inquiry.
pub fn display_inquiry(inquiry: &DeferredInquiry) {
    println!("  {}", style(&inquiry.product_name).bold());
    println!("  {:10} {}", style("product").dim(), inquiry.product_id);
    println!("  {:10} {}", style("quantity").dim(), inquiry.quantity);
    if let Some(store) = &inquiry.target_store_name {
        println!("  {:10} {}", style("store").dim(), store);
    }
    if !inquiry.user_message.is_empty() {
        println!("  {:10} {}", style("message").dim(), inquiry.user_message);
    }
}
