// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Comanda order bot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling, customer message routing, MarkdownV2 output with inline
//! keyboards, and the staff "mark as delivered" button.

pub mod handler;
pub mod markdown;

use async_trait::async_trait;
use comanda_config::model::TelegramConfig;
use comanda_core::{
    AdapterType, ChannelAdapter, ComandaError, HealthStatus, InboundEvent, MessageId,
    OutboundMessage, PluginAdapter,
};
use comanda_order::delivered_user_id;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Shown to staff when they tap the delivered button.
pub const DELIVERED_ACK: &str = "¡Pedido marcado como entregado!";

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: &TelegramConfig) -> Result<Self, ComandaError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            ComandaError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.trim().is_empty() {
            return Err(ComandaError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

fn channel_error(context: &str, e: teloxide::RequestError) -> ComandaError {
    ComandaError::Channel {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn on_message(msg: Message, tx: mpsc::Sender<InboundEvent>) -> ResponseResult<()> {
    if !handler::is_dm(&msg) {
        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
        return respond(());
    }

    if let Some(event) = handler::to_inbound_event(&msg)
        && tx.send(event).await.is_err()
    {
        warn!("inbound channel closed, dropping message");
    }
    respond(())
}

/// Strikes through a staff summary once the order is delivered.
async fn on_callback(bot: Bot, q: CallbackQuery) -> ResponseResult<()> {
    let Some(customer) = q.data.as_deref().and_then(delivered_user_id) else {
        debug!(data = ?q.data, "ignoring unknown callback");
        return respond(());
    };

    if let Err(e) = bot.answer_callback_query(q.id.clone()).text(DELIVERED_ACK).await {
        warn!(error = %e, "failed to answer delivered callback");
    }

    let Some(message) = q.message.as_ref().and_then(|m| m.regular_message()) else {
        warn!(customer = %customer, "delivered callback without an accessible message");
        return respond(());
    };

    let original = message.text().unwrap_or_default();
    let edited = bot
        .edit_message_text(message.chat.id, message.id, markdown::delivered_text(original))
        .parse_mode(ParseMode::MarkdownV2)
        .await;
    match edited {
        Ok(_) => {
            metrics::counter!("comanda_orders_delivered_total").increment(1);
            info!(customer = %customer, "order marked as delivered");
        }
        Err(e) => error!(customer = %customer, error = %e, "failed to mark order as delivered"),
    }
    respond(())
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, ComandaError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), ComandaError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), ComandaError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = dptree::entry()
                .branch(
                    Update::filter_message()
                        .endpoint(move |msg: Message| on_message(msg, tx.clone())),
                )
                .branch(Update::filter_callback_query().endpoint(on_callback));

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ComandaError> {
        let recipient = handler::parse_recipient(&msg.recipient)?;
        let markup = handler::keyboard(&msg.actions);
        let escaped = markdown::escape_markdown_v2(&msg.content);

        let mut request = self
            .bot
            .send_message(recipient.clone(), escaped)
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(markup) = markup.clone() {
            request = request.reply_markup(markup);
        }

        let sent = match request.await {
            Ok(sent) => sent,
            Err(e) => {
                warn!(error = %e, "MarkdownV2 failed, sending as plain text");
                let mut plain = self.bot.send_message(recipient, msg.content.as_str());
                if let Some(markup) = markup {
                    plain = plain.reply_markup(markup);
                }
                plain
                    .await
                    .map_err(|e| channel_error("failed to send message", e))?
            }
        };

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundEvent, ComandaError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| ComandaError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }

    async fn send_typing(&self, chat_id: &str) -> Result<(), ComandaError> {
        let chat_id = chat_id
            .parse::<i64>()
            .map(ChatId)
            .map_err(|e| ComandaError::Channel {
                message: format!("invalid chat_id: {e}"),
                source: None,
            })?;

        self.bot
            .send_chat_action(chat_id, ChatAction::Typing)
            .await
            .map_err(|e| channel_error("failed to send typing indicator", e))?;

        Ok(())
    }
}
