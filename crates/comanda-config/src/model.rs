// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Comanda order bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use comanda_core::Coordinate;
use serde::{Deserialize, Serialize};

/// Top-level Comanda configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// Every section has defaults, but credentials and the restaurant location have no
/// usable default and are enforced by [`crate::validation::validate_config`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComandaConfig {
    /// Bot identity, prompt, and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot credentials and the staff chat.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// OpenRouter chat-completion settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Restaurant location (delivery origin).
    #[serde(default)]
    pub restaurant: RestaurantConfig,

    /// Delivery pricing.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Road routing service.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Currency rate service.
    #[serde(default)]
    pub rates: RatesConfig,

    /// Order finalization and staff summary.
    #[serde(default)]
    pub order: OrderConfig,
}

/// Bot identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot, used in greetings.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a markdown file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Seconds to wait for in-flight conversations on shutdown.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

fn default_agent_name() -> String {
    "ArrozinBot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_drain_timeout_secs() -> u64 {
    10
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Staff chat receiving order summaries: a numeric chat id or an `@channel` name. Required.
    #[serde(default)]
    pub staff_chat_id: Option<String>,
}

/// OpenRouter API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenRouterConfig {
    /// OpenRouter API key. Required.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL; `/chat/completions` is appended.
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional `HTTP-Referer` header identifying the app to OpenRouter.
    #[serde(default)]
    pub referer: Option<String>,

    /// Optional `X-Title` header identifying the app to OpenRouter.
    #[serde(default)]
    pub app_title: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_openrouter_base_url(),
            timeout_secs: default_llm_timeout_secs(),
            referer: None,
            app_title: None,
        }
    }
}

fn default_model() -> String {
    "anthropic/claude-3-haiku".to_string()
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

/// Restaurant location. Both coordinates are required.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RestaurantConfig {
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}

impl RestaurantConfig {
    /// The restaurant coordinate, if both values are present and in range.
    pub fn origin(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude?, self.longitude?).ok()
    }
}

/// How a raw delivery fee is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Round to the nearest `increment`, then clamp to `minimum_fee`.
    #[default]
    Increment,
    /// Round to two decimals, no floor.
    Cents,
}

/// Delivery pricing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Price per kilometer in dollars.
    #[serde(default = "default_rate_per_km")]
    pub rate_per_km: f64,

    /// Rounding policy.
    #[serde(default)]
    pub rounding: RoundingMode,

    /// Rounding step for the `increment` policy.
    #[serde(default = "default_increment")]
    pub increment: f64,

    /// Lowest fee charged under the `increment` policy.
    #[serde(default = "default_minimum_fee")]
    pub minimum_fee: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            rate_per_km: default_rate_per_km(),
            rounding: RoundingMode::default(),
            increment: default_increment(),
            minimum_fee: default_minimum_fee(),
        }
    }
}

fn default_rate_per_km() -> f64 {
    0.6
}

fn default_increment() -> f64 {
    0.5
}

fn default_minimum_fee() -> f64 {
    1.0
}

/// OSRM-compatible routing service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    #[serde(default = "default_routing_base_url")]
    pub base_url: String,

    /// Routing profile segment of the URL (`driving`, `bike`, ...).
    #[serde(default = "default_routing_profile")]
    pub profile: String,

    #[serde(default = "default_routing_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_routing_base_url(),
            profile: default_routing_profile(),
            timeout_secs: default_routing_timeout_secs(),
        }
    }
}

fn default_routing_base_url() -> String {
    "http://router.project-osrm.org".to_string()
}

fn default_routing_profile() -> String {
    "driving".to_string()
}

fn default_routing_timeout_secs() -> u64 {
    10
}

/// Currency rate service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RatesConfig {
    /// Endpoint returning JSON with the price.
    #[serde(default = "default_rates_url")]
    pub url: String,

    /// JSON pointer to the price inside the response body.
    #[serde(default = "default_price_pointer")]
    pub price_pointer: String,

    #[serde(default = "default_rates_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            url: default_rates_url(),
            price_pointer: default_price_pointer(),
            timeout_secs: default_rates_timeout_secs(),
        }
    }
}

fn default_rates_url() -> String {
    "https://pydolarve.org/api/v1/dollar?page=bcv".to_string()
}

fn default_price_pointer() -> String {
    "/monitors/usd/price".to_string()
}

fn default_rates_timeout_secs() -> u64 {
    10
}

/// Order finalization and staff summary configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrderConfig {
    /// Literal the model emits right before the order payload.
    #[serde(default = "default_completion_marker")]
    pub completion_marker: String,

    /// Phone prefix (after stripping `+` and spaces) that enables the WhatsApp button.
    #[serde(default = "default_whatsapp_prefix")]
    pub whatsapp_prefix: String,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            completion_marker: default_completion_marker(),
            whatsapp_prefix: default_whatsapp_prefix(),
        }
    }
}

fn default_completion_marker() -> String {
    "<ORDEN_FINALIZADA>".to_string()
}

fn default_whatsapp_prefix() -> String {
    "58".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_mode_parses_lowercase() {
        let cfg: DeliveryConfig = toml::from_str("rounding = \"cents\"").unwrap();
        assert_eq!(cfg.rounding, RoundingMode::Cents);
        assert_eq!(cfg.rate_per_km, 0.6);
    }

    #[test]
    fn restaurant_origin_requires_both_values() {
        let mut r = RestaurantConfig::default();
        assert!(r.origin().is_none());
        r.latitude = Some(10.5);
        assert!(r.origin().is_none());
        r.longitude = Some(-66.9);
        let origin = r.origin().unwrap();
        assert_eq!(origin.latitude, 10.5);
        assert_eq!(origin.longitude, -66.9);
    }

    #[test]
    fn restaurant_origin_rejects_out_of_range() {
        let r = RestaurantConfig {
            latitude: Some(123.0),
            longitude: Some(0.0),
        };
        assert!(r.origin().is_none());
    }
}
