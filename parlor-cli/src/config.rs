// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Configuration

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use parlor_core::{ChatConfig, SqliteInquiryStore};

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Data directory for the inquiry queue.
    pub data_dir: PathBuf,
    /// Relay server URL.
    pub relay_url: String,
}

impl CliConfig {
    /// Returns the path of the inquiry queue database.
    pub fn inquiry_path(&self) -> PathBuf {
        self.data_dir.join("inquiries.db")
    }

    /// Opens the inquiry queue, creating the data directory if needed.
    pub fn open_inquiries(&self) -> Result<SqliteInquiryStore> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("creating {}", self.data_dir.display()))?;
        SqliteInquiryStore::open(self.inquiry_path())
            .with_context(|| format!("opening {}", self.inquiry_path().display()))
    }

    /// Session config from `PARLOR_*` variables, with the relay URL from
    /// the command line.
    pub fn chat_config(&self) -> Result<ChatConfig> {
        let mut config = ChatConfig::from_env()?;
        config.relay.server_url = self.relay_url.clone();
        Ok(config)
    }
}
