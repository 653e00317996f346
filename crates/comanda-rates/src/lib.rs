// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Official BCV dollar rate, used to show totals in bolivars.
//!
//! The rate is informational: any failure yields `None` and callers print
//! a "rate unavailable" note instead.

use std::time::Duration;

use async_trait::async_trait;
use comanda_config::model::RatesConfig;
use comanda_core::{ComandaError, RateSource};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
enum RateError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate service returned {0}")]
    Status(reqwest::StatusCode),

    #[error("no value at `{0}`")]
    Missing(String),

    #[error("value at `{pointer}` is not a number: {value}")]
    NotNumeric { pointer: String, value: Value },

    #[error("rate {0} is not positive")]
    NotPositive(f64),
}

/// Fetches the bolivar-per-dollar rate from a JSON endpoint.
#[derive(Debug, Clone)]
pub struct BcvRateClient {
    client: reqwest::Client,
    url: String,
    price_pointer: String,
}

impl BcvRateClient {
    pub fn new(
        url: impl Into<String>,
        price_pointer: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ComandaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComandaError::Internal(format!("failed to build rates client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            price_pointer: price_pointer.into(),
        })
    }

    pub fn from_config(config: &RatesConfig) -> Result<Self, ComandaError> {
        Self::new(
            config.url.clone(),
            config.price_pointer.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn fetch(&self) -> Result<f64, RateError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Status(status));
        }

        let body: Value = response.json().await?;
        parse_rate(&body, &self.price_pointer)
    }
}

/// Reads a positive price at `pointer`; numbers and numeric strings both count.
fn parse_rate(body: &Value, pointer: &str) -> Result<f64, RateError> {
    let value = body
        .pointer(pointer)
        .ok_or_else(|| RateError::Missing(pointer.to_string()))?;

    let rate = match value {
        Value::Number(n) => n.as_f64(),
        // Some mirrors publish "36,50" with a decimal comma.
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|r| r.is_finite())
    .ok_or_else(|| RateError::NotNumeric {
        pointer: pointer.to_string(),
        value: value.clone(),
    })?;

    if rate <= 0.0 {
        return Err(RateError::NotPositive(rate));
    }
    Ok(rate)
}

#[async_trait]
impl RateSource for BcvRateClient {
    async fn current_rate(&self) -> Option<f64> {
        match self.fetch().await {
            Ok(rate) => {
                info!(rate, "BCV rate fetched");
                Some(rate)
            }
            Err(e @ RateError::NotPositive(_)) => {
                warn!(error = %e, "rate service returned an unusable price");
                None
            }
            Err(e) => {
                error!(error = %e, url = %self.url, "failed to fetch BCV rate");
                None
            }
        }
    }
}
