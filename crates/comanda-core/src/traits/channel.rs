// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the chat transport (Telegram).

use async_trait::async_trait;

use crate::error::ComandaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundEvent, MessageId, OutboundMessage};

/// Adapter for the bidirectional chat transport.
///
/// Delivers customer events to the agent and carries replies and staff
/// summaries back out, including their action buttons.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), ComandaError>;

    /// Sends a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ComandaError>;

    /// Receives the next inbound customer event from the channel.
    async fn receive(&self) -> Result<InboundEvent, ComandaError>;

    /// Shows a typing indicator in the given chat.
    async fn send_typing(&self, chat_id: &str) -> Result<(), ComandaError>;
}
