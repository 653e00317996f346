// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Enforces the settings the bot cannot start without (credentials, staff
//! chat, restaurant coordinates) and semantic constraints serde cannot
//! express (positive timeouts, sane pricing).

use comanda_core::Coordinate;

use crate::diagnostic::ConfigError;
use crate::model::{ComandaConfig, RoundingMode};

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ComandaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    require_secret(
        &mut errors,
        "telegram.bot_token",
        config.telegram.bot_token.as_deref(),
    );
    require_secret(
        &mut errors,
        "openrouter.api_key",
        config.openrouter.api_key.as_deref(),
    );

    match config.telegram.staff_chat_id.as_deref().map(str::trim) {
        None | Some("") => errors.push(ConfigError::missing("telegram.staff_chat_id")),
        Some(id) if !is_valid_chat_id(id) => errors.push(ConfigError::Validation {
            message: format!(
                "telegram.staff_chat_id `{id}` must be a numeric chat id or an @channel name"
            ),
        }),
        Some(_) => {}
    }

    // Restaurant location
    match (config.restaurant.latitude, config.restaurant.longitude) {
        (Some(lat), Some(lon)) => {
            if let Err(e) = Coordinate::new(lat, lon) {
                errors.push(ConfigError::InvalidLocation {
                    reason: e.to_string(),
                });
            }
        }
        (lat, lon) => {
            if lat.is_none() {
                errors.push(ConfigError::missing("restaurant.latitude"));
            }
            if lon.is_none() {
                errors.push(ConfigError::missing("restaurant.longitude"));
            }
        }
    }

    // Delivery pricing
    let delivery = &config.delivery;
    check_price(&mut errors, "delivery.rate_per_km", delivery.rate_per_km, false);
    if delivery.rounding == RoundingMode::Increment {
        check_price(&mut errors, "delivery.increment", delivery.increment, true);
        check_price(&mut errors, "delivery.minimum_fee", delivery.minimum_fee, false);
    }

    // Timeouts
    for (key, secs) in [
        ("openrouter.timeout_secs", config.openrouter.timeout_secs),
        ("routing.timeout_secs", config.routing.timeout_secs),
        ("rates.timeout_secs", config.rates.timeout_secs),
    ] {
        if secs == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be at least 1"),
            });
        }
    }

    if config.openrouter.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "openrouter.model must not be empty".to_string(),
        });
    }

    if config.order.completion_marker.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "order.completion_marker must not be empty".to_string(),
        });
    }

    if !config.rates.price_pointer.is_empty() && !config.rates.price_pointer.starts_with('/') {
        errors.push(ConfigError::Validation {
            message: format!(
                "rates.price_pointer `{}` must be a JSON pointer starting with `/`",
                config.rates.price_pointer
            ),
        });
    }

    if let Some(path) = config.agent.system_prompt_file.as_deref()
        && !std::path::Path::new(path).is_file()
    {
        errors.push(ConfigError::Validation {
            message: format!("agent.system_prompt_file `{path}` does not exist"),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn require_secret(errors: &mut Vec<ConfigError>, key: &str, value: Option<&str>) {
    if value.is_none_or(|v| v.trim().is_empty()) {
        errors.push(ConfigError::missing(key));
    }
}

fn check_price(errors: &mut Vec<ConfigError>, key: &'static str, value: f64, positive: bool) {
    let (valid, requirement) = if positive {
        (value > 0.0, "positive")
    } else {
        (value >= 0.0, "non-negative")
    };
    if !valid || !value.is_finite() {
        errors.push(ConfigError::InvalidPricing {
            key,
            requirement,
            value,
        });
    }
}

fn is_valid_chat_id(id: &str) -> bool {
    id.parse::<i64>().is_ok() || (id.len() > 1 && id.starts_with('@'))
}
