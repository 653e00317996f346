// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end conversation tests.
//!
//! `TestHarness` assembles a real [`OrderAgent`] over mock adapters and
//! offers helpers that drive one customer turn at a time.

use std::sync::Arc;

use comanda_agent::{AgentSettings, ConversationSession, OrderAgent, SessionStore, TurnOutcome};
use comanda_core::{
    ChannelAdapter, ComandaError, Command, Coordinate, DistanceSource, InboundEvent, InboundKind,
    OutboundMessage, ProviderAdapter, RateSource, UserId,
};
use comanda_geo::{DeliveryFeeCalculator, FeePolicy};

use crate::fixed::{FixedDistance, FixedRate};
use crate::mock_channel::MockChannel;
use crate::mock_provider::MockProvider;

/// Restaurant used by every harness.
pub const TEST_ORIGIN: Coordinate = Coordinate {
    latitude: 10.4806,
    longitude: -66.9036,
};

/// Staff chat that receives summaries.
pub const TEST_STAFF_CHAT: &str = "-1001234567890";

pub const TEST_MARKER: &str = "<ORDEN_FINALIZADA>";

/// Builder for configuring a [`TestHarness`].
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    distance: Arc<dyn DistanceSource>,
    rate: Option<f64>,
    rate_per_km: f64,
    policy: FeePolicy,
    system_prompt: String,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            distance: Arc::new(FixedDistance::routed(5.0)),
            rate: Some(36.5),
            rate_per_km: 0.6,
            policy: FeePolicy::default(),
            system_prompt: "Eres un bot de prueba.".to_string(),
        }
    }

    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_distance(mut self, distance: FixedDistance) -> Self {
        self.distance = Arc::new(distance);
        self
    }

    /// Prices locations with a real estimator instead of a fixed distance.
    pub fn with_distance_source(mut self, distance: Arc<dyn DistanceSource>) -> Self {
        self.distance = distance;
        self
    }

    /// `None` simulates the rate service being unavailable.
    pub fn with_rate(mut self, rate: Option<f64>) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_fee_policy(mut self, policy: FeePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn build(self) -> TestHarness {
        let mock_provider = Arc::new(MockProvider::with_responses(self.responses));
        let mock_channel = Arc::new(MockChannel::new());
        let rate = Arc::new(FixedRate::new(self.rate));
        let sessions = Arc::new(SessionStore::new());

        let fees = DeliveryFeeCalculator::new(self.distance, self.rate_per_km, self.policy);

        let settings = AgentSettings {
            bot_name: "ArrozinBot".to_string(),
            model: "test/model".to_string(),
            system_prompt: self.system_prompt,
            origin: TEST_ORIGIN,
            staff_chat: TEST_STAFF_CHAT.to_string(),
            completion_marker: TEST_MARKER.to_string(),
            whatsapp_prefix: "58".to_string(),
        };

        let agent = Arc::new(OrderAgent::new(
            settings,
            Arc::clone(&mock_channel) as Arc<dyn ChannelAdapter>,
            Arc::clone(&mock_provider) as Arc<dyn ProviderAdapter>,
            fees,
            Arc::clone(&rate) as Arc<dyn RateSource>,
            Arc::clone(&sessions),
        ));

        TestHarness {
            agent,
            mock_provider,
            mock_channel,
            rate,
            sessions,
        }
    }
}

/// An [`OrderAgent`] wired to mocks.
pub struct TestHarness {
    pub agent: Arc<OrderAgent>,
    pub mock_provider: Arc<MockProvider>,
    pub mock_channel: Arc<MockChannel>,
    pub rate: Arc<FixedRate>,
    pub sessions: Arc<SessionStore>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Chat id used for a user's direct messages.
    pub fn chat_of(user: UserId) -> String {
        user.0.to_string()
    }

    pub async fn send_text(&self, user: UserId, text: &str) -> Result<TurnOutcome, ComandaError> {
        self.agent
            .handle(event(user, InboundKind::Text(text.to_string())))
            .await
    }

    pub async fn share_location(
        &self,
        user: UserId,
        latitude: f64,
        longitude: f64,
    ) -> Result<TurnOutcome, ComandaError> {
        let point = Coordinate::new(latitude, longitude)?;
        self.agent
            .handle(event(user, InboundKind::Location(point)))
            .await
    }

    pub async fn command(&self, user: UserId, command: Command) -> Result<TurnOutcome, ComandaError> {
        self.agent
            .handle(event(user, InboundKind::Command(command)))
            .await
    }

    /// Snapshot of a user's session, if one exists.
    pub async fn session(&self, user: UserId) -> Option<ConversationSession> {
        let handle = self.sessions.get(user)?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Texts sent back to the customer, in order.
    pub async fn replies_to(&self, user: UserId) -> Vec<String> {
        self.mock_channel
            .sent_to(&Self::chat_of(user))
            .await
            .into_iter()
            .map(|m| m.content)
            .collect()
    }

    /// Summaries delivered to the staff chat.
    pub async fn staff_messages(&self) -> Vec<OutboundMessage> {
        self.mock_channel.sent_to(TEST_STAFF_CHAT).await
    }
}

fn event(user: UserId, kind: InboundKind) -> InboundEvent {
    InboundEvent {
        user_id: user,
        chat_id: TestHarness::chat_of(user),
        kind,
    }
}
