// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deferred inquiry payload and correlation token.

use serde::{Deserialize, Serialize};

use crate::conversation::InquiryDetails;

fn default_quantity() -> u32 {
    1
}

/// A product inquiry captured before a chat session existed.
///
/// Written by whoever hands the user over to chat (a product page, a deep
/// link) and consumed once the target conversation is ready. Older writers
/// use `name` and `qty` and omit the target; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferredInquiry {
    pub product_id: String,
    #[serde(alias = "name")]
    pub product_name: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub user_message: String,
    #[serde(alias = "qty", default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_store_name: Option<String>,
}

impl DeferredInquiry {
    /// Creates a payload for one unit of a product.
    pub fn new(product_id: impl Into<String>, product_name: impl Into<String>) -> Self {
        DeferredInquiry {
            product_id: product_id.into(),
            product_name: product_name.into(),
            thumbnail: String::new(),
            user_message: String::new(),
            quantity: default_quantity(),
            target_chat_id: None,
            target_store_name: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = message.into();
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Addresses the payload to a conversation.
    pub fn with_target(
        mut self,
        chat_id: impl Into<String>,
        store_name: impl Into<String>,
    ) -> Self {
        self.target_chat_id = Some(chat_id.into());
        self.target_store_name = Some(store_name.into());
        self
    }

    /// Returns true if the payload names a target other than `token`.
    pub fn is_stale_for(&self, token: &CorrelationToken) -> bool {
        self.target_chat_id
            .as_deref()
            .is_some_and(|target| target != token.chat_id)
    }

    /// Inquiry details for the outgoing message.
    pub fn details(&self, token: &CorrelationToken) -> InquiryDetails {
        InquiryDetails {
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
            thumbnail: self.thumbnail.clone(),
            quantity: self.quantity,
            store_name: self
                .target_store_name
                .clone()
                .or_else(|| Some(token.store_name.clone())),
        }
    }
}

/// Identifies the conversation a deferred inquiry is meant for.
///
/// Supplied by the caller, typically from deep-link parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationToken {
    pub chat_id: String,
    pub store_name: String,
}

impl CorrelationToken {
    pub fn new(chat_id: impl Into<String>, store_name: impl Into<String>) -> Self {
        CorrelationToken {
            chat_id: chat_id.into(),
            store_name: store_name.into(),
        }
    }

    /// Key under which the payload for this token is stored.
    pub fn key(&self) -> &str {
        &self.chat_id
    }
}
