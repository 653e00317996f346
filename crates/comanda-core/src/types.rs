// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapters, the order pipeline, and the agent.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ComandaError;

/// Callback token prefix for the staff "mark delivered" button.
///
/// The full token is `delivered_{user_id}`.
pub const DELIVERED_CALLBACK_PREFIX: &str = "delivered_";

/// Telegram-style numeric user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
}

// --- Geography ---

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite values and values outside
    /// [-90, 90] latitude / [-180, 180] longitude.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ComandaError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ComandaError::InvalidCoordinate(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ComandaError::InvalidCoordinate(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// How a distance was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DistanceMethod {
    /// Road-network distance from the routing service.
    Routed,
    /// Great-circle (haversine) distance.
    Fallback,
}

/// A distance between two coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceResult {
    pub kilometers: f64,
    pub source: DistanceMethod,
}

/// Delivery cost in the base currency (US dollars).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct DeliveryFee(pub f64);

impl DeliveryFee {
    pub const ZERO: DeliveryFee = DeliveryFee(0.0);

    pub fn amount(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 <= 0.0
    }
}

impl std::fmt::Display for DeliveryFee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

// --- Conversation ---

/// Author of a chat message sent to the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// --- Channel types ---

/// Session commands a customer can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    /// `/start`: reset the session and greet.
    Start,
    /// `/cancel`: wipe the session.
    Cancel,
}

/// What a customer sent.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundKind {
    Text(String),
    Location(Coordinate),
    Command(Command),
}

/// An inbound customer event received from a channel adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// Platform user that sent the event.
    pub user_id: UserId,
    /// Chat to reply into.
    pub chat_id: String,
    pub kind: InboundKind,
}

/// A follow-up control attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Opens a link (contact the customer).
    Url { label: String, url: String },
    /// Sends a callback token back to the bot.
    Callback { label: String, data: String },
}

/// Ordered set of actions, rendered one per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet {
    actions: Vec<Action>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<'a> IntoIterator for &'a ActionSet {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

/// An outbound message to be sent via a channel adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Chat id (numeric) or `@channel` username.
    pub recipient: String,
    pub content: String,
    pub actions: ActionSet,
}

impl OutboundMessage {
    /// A plain text reply without actions.
    pub fn text(recipient: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            content: content.into(),
            actions: ActionSet::new(),
        }
    }
}

// --- Provider types ---

/// A chat-completion request to an LLM provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub model: String,
    /// Full message list, system prompt first.
    pub messages: Vec<ChatMessage>,
}

/// A chat-completion response from an LLM provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub content: String,
    pub model: String,
}
