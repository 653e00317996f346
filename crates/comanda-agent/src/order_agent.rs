// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-event orchestrator.
//!
//! [`OrderAgent::handle`] runs one customer turn to completion while holding
//! that customer's session lock:
//!
//! 1. Commands reset the session and answer directly.
//! 2. Locations are priced, the fee is cached, and a note is added to history.
//! 3. The model is asked for a reply over the full history.
//! 4. Plain replies are relayed; finalized orders are summarized and sent to
//!    the staff chat, after which the session is cleared.

use std::sync::Arc;

use comanda_config::ComandaConfig;
use comanda_core::{
    ChannelAdapter, ChatMessage, ComandaError, Command, Coordinate, DeliveryFee, InboundEvent,
    InboundKind, OutboundMessage, ProviderAdapter, ProviderRequest, RateSource,
};
use comanda_geo::DeliveryFeeCalculator;
use comanda_order::{ExtractionError, OrderExtractor, OrderRecord, OrderSummaryFormatter};
use tracing::{debug, error, info, warn};

use crate::replies;
use crate::session::{ConversationSession, SessionStore};

/// Static inputs of the orchestrator.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub bot_name: String,
    pub model: String,
    /// Complete system prompt, rate instruction included.
    pub system_prompt: String,
    /// Restaurant location; delivery distances are measured from here.
    pub origin: Coordinate,
    /// Chat that receives order summaries.
    pub staff_chat: String,
    pub completion_marker: String,
    pub whatsapp_prefix: String,
}

impl AgentSettings {
    /// Builds settings from a validated config plus the assembled prompt.
    pub fn from_config(config: &ComandaConfig, system_prompt: String) -> Result<Self, ComandaError> {
        let origin = config.restaurant.origin().ok_or_else(|| {
            ComandaError::Config("restaurant.latitude and restaurant.longitude are required".into())
        })?;
        let staff_chat = config
            .telegram
            .staff_chat_id
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ComandaError::Config("telegram.staff_chat_id is required".into()))?;

        Ok(Self {
            bot_name: config.agent.name.clone(),
            model: config.openrouter.model.clone(),
            system_prompt,
            origin,
            staff_chat,
            completion_marker: config.order.completion_marker.clone(),
            whatsapp_prefix: config.order.whatsapp_prefix.clone(),
        })
    }
}

/// What a turn ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// `/start` or `/cancel` wiped the session.
    Reset(Command),
    /// An ordinary model reply was relayed.
    Replied,
    /// The order went to the staff chat and the session was cleared.
    Dispatched(OrderRecord),
    /// The model tried to finalize but the payload was unusable.
    ExtractionFailed(ExtractionError),
    /// The staff chat could not be reached; the session was kept.
    DispatchFailed,
    /// The model call failed; the customer was asked to retry.
    ProviderFailed,
}

/// Coordinates one customer turn across the model, pricing, and the channel.
pub struct OrderAgent {
    settings: AgentSettings,
    channel: Arc<dyn ChannelAdapter>,
    provider: Arc<dyn ProviderAdapter>,
    fees: DeliveryFeeCalculator,
    rates: Arc<dyn RateSource>,
    sessions: Arc<SessionStore>,
    extractor: OrderExtractor,
    formatter: OrderSummaryFormatter,
}

impl OrderAgent {
    pub fn new(
        settings: AgentSettings,
        channel: Arc<dyn ChannelAdapter>,
        provider: Arc<dyn ProviderAdapter>,
        fees: DeliveryFeeCalculator,
        rates: Arc<dyn RateSource>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        let extractor = OrderExtractor::new(settings.completion_marker.clone());
        let formatter = OrderSummaryFormatter::new(settings.whatsapp_prefix.clone());
        Self {
            settings,
            channel,
            provider,
            fees,
            rates,
            sessions,
            extractor,
            formatter,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Handles one event, logging instead of returning errors.
    pub async fn process(&self, event: InboundEvent) {
        let user_id = event.user_id;
        match self.handle(event).await {
            Ok(outcome) => debug!(user_id = %user_id, outcome = ?outcome, "turn complete"),
            Err(e) => error!(user_id = %user_id, error = %e, "turn failed"),
        }
    }

    /// Runs one turn for the event's user.
    ///
    /// Errors are returned only when a reply to the customer cannot be sent.
    pub async fn handle(&self, event: InboundEvent) -> Result<TurnOutcome, ComandaError> {
        let handle = self.sessions.get_or_create(event.user_id);
        let mut session = handle.lock().await;
        let chat_id = event.chat_id.as_str();

        match event.kind {
            InboundKind::Command(command) => {
                session.reset();
                let text = match command {
                    Command::Start => replies::greeting(&self.settings.bot_name),
                    Command::Cancel => replies::CANCELLED.to_string(),
                };
                info!(user_id = %event.user_id, command = %command, "session reset by command");
                self.reply(chat_id, text).await?;
                return Ok(TurnOutcome::Reset(command));
            }
            InboundKind::Location(destination) => {
                let fee = self.fees.calculate(self.settings.origin, destination).await;
                session.set_delivery_fee(fee);
                session.push(ChatMessage::user(replies::location_note(fee)));
                info!(user_id = %event.user_id, fee = %fee, "location received");
                // The model still has to hear about the fee if this notice is lost.
                if let Err(e) = self.reply(chat_id, replies::location_received(fee)).await {
                    warn!(user_id = %event.user_id, error = %e, "failed to send fee notice");
                }
            }
            InboundKind::Text(text) => {
                session.push(ChatMessage::user(text));
            }
        }

        self.respond(&mut session, chat_id).await
    }

    async fn respond(
        &self,
        session: &mut ConversationSession,
        chat_id: &str,
    ) -> Result<TurnOutcome, ComandaError> {
        let user_id = session.user_id();

        if let Err(e) = self.channel.send_typing(chat_id).await {
            debug!(error = %e, "failed to send typing indicator");
        }

        let mut messages = Vec::with_capacity(session.history().len() + 1);
        messages.push(ChatMessage::system(self.settings.system_prompt.clone()));
        messages.extend_from_slice(session.history());
        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages,
        };

        let reply = match self.provider.complete(request).await {
            Ok(response) => response.content,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "model call failed");
                self.reply(chat_id, replies::PROVIDER_ERROR).await?;
                return Ok(TurnOutcome::ProviderFailed);
            }
        };

        let order = match self.extractor.extract(&reply) {
            Ok(order) => order,
            Err(ExtractionError::NoMarker) => {
                session.push(ChatMessage::assistant(reply.clone()));
                self.reply(chat_id, reply).await?;
                return Ok(TurnOutcome::Replied);
            }
            Err(e) => {
                error!(
                    user_id = %user_id,
                    error = %e,
                    payload = e.payload().unwrap_or(""),
                    reply = %reply,
                    "order finalization could not be decoded"
                );
                metrics::counter!("comanda_extraction_failures_total").increment(1);
                self.reply(chat_id, replies::EXTRACTION_RETRY).await?;
                return Ok(TurnOutcome::ExtractionFailed(e));
            }
        };

        let order = order.with_delivery_fee(session.delivery_fee().unwrap_or(DeliveryFee::ZERO));
        let rate = self.rates.current_rate().await;
        let summary = self.formatter.format(&order, user_id, rate);

        let dispatch = OutboundMessage {
            recipient: self.settings.staff_chat.clone(),
            content: summary.text,
            actions: summary.actions,
        };
        if let Err(e) = self.channel.send(dispatch).await {
            error!(user_id = %user_id, error = %e, "failed to send order to staff chat");
            self.reply(chat_id, replies::DISPATCH_RETRY).await?;
            return Ok(TurnOutcome::DispatchFailed);
        }

        metrics::counter!("comanda_orders_dispatched_total").increment(1);
        info!(
            user_id = %user_id,
            customer = order.customer_name.as_str(),
            items = order.line_items.len(),
            total = order.total,
            delivery_fee = %order.delivery_fee,
            "order dispatched to staff"
        );

        session.reset();
        if let Err(e) = self.reply(chat_id, replies::ORDER_CONFIRMED).await {
            warn!(user_id = %user_id, error = %e, "order sent but confirmation failed");
        }
        Ok(TurnOutcome::Dispatched(order))
    }

    async fn reply(&self, chat_id: &str, text: impl Into<String>) -> Result<(), ComandaError> {
        self.channel
            .send(OutboundMessage::text(chat_id, text))
            .await
            .map(|_| ())
    }
}
