// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parlor CLI
//!
//! Command-line chat client for a Parlor relay.

mod commands;
mod config;
mod display;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::CliConfig;

#[derive(Parser)]
#[command(name = "parlor")]
#[command(version, about = "Real-time relay chat client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (default: platform data dir/parlor)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Relay server URL
    #[arg(
        long,
        global = true,
        env = "PARLOR_RELAY_URL",
        default_value = "wss://relay.parlor.chat"
    )]
    relay: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive chat session
    Chat {
        /// Account id
        #[arg(long, env = "PARLOR_USER_ID")]
        user_id: String,

        /// Display name
        #[arg(long, env = "PARLOR_USER_NAME")]
        name: String,

        /// Account email
        #[arg(long, env = "PARLOR_USER_EMAIL", default_value = "")]
        email: String,

        /// Relay chat id
        #[arg(long, env = "PARLOR_CHAT_ID")]
        chat_id: String,

        /// Open this conversation and send its queued inquiry
        #[arg(long, requires = "store_name")]
        to_chat: Option<String>,

        /// Store name of the conversation given by --to-chat
        #[arg(long)]
        store_name: Option<String>,
    },

    /// Manage queued product inquiries
    #[command(subcommand)]
    Inquiry(InquiryCommands),
}

#[derive(Subcommand)]
enum InquiryCommands {
    /// Queue an inquiry to send when the conversation next opens
    Queue {
        /// Target conversation chat id
        chat_id: String,
        /// Target store name
        store_name: String,
        /// Product id
        product_id: String,
        /// Product name
        product_name: String,

        /// Message text
        #[arg(long, short, default_value = "")]
        message: String,

        /// Product thumbnail URL
        #[arg(long, default_value = "")]
        thumbnail: String,

        /// Quantity
        #[arg(long, default_value = "1")]
        qty: u32,
    },

    /// Show the inquiry queued for a conversation
    Show {
        /// Conversation chat id
        chat_id: String,
    },

    /// Remove the inquiry queued for a conversation
    Clear {
        /// Conversation chat id
        chat_id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("parlor_core=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parlor")
    });

    let config = CliConfig {
        data_dir,
        relay_url: cli.relay,
    };

    match cli.command {
        Commands::Chat {
            user_id,
            name,
            email,
            chat_id,
            to_chat,
            store_name,
        } => {
            let identity = parlor_core::SessionIdentity::new(user_id, name, email, chat_id);
            let target = to_chat.zip(store_name);
            commands::chat::run(&config, identity, target)?;
        }
        Commands::Inquiry(cmd) => match cmd {
            InquiryCommands::Queue {
                chat_id,
                store_name,
                product_id,
                product_name,
                message,
                thumbnail,
                qty,
            } => {
                let inquiry = parlor_core::DeferredInquiry::new(product_id, product_name)
                    .with_message(message)
                    .with_thumbnail(thumbnail)
                    .with_quantity(qty)
                    .with_target(chat_id.as_str(), store_name);
                commands::inquiry::queue(&config, &chat_id, &inquiry)?;
            }
            InquiryCommands::Show { chat_id } => commands::inquiry::show(&config, &chat_id)?,
            InquiryCommands::Clear { chat_id } => commands::inquiry::clear(&config, &chat_id)?,
        },
    }

    Ok(())
}
