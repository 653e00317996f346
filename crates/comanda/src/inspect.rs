// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `comanda config` and `comanda quote`: offline checks of a deployment.

use std::sync::Arc;

use comanda_config::ComandaConfig;
use comanda_core::{ComandaError, Coordinate};
use comanda_geo::{DeliveryFeeCalculator, GeoDistanceEstimator};

const REDACTED: &str = "********";

/// Copy of `config` safe to print.
pub fn redacted(config: &ComandaConfig) -> ComandaConfig {
    let mut shown = config.clone();
    if shown.telegram.bot_token.is_some() {
        shown.telegram.bot_token = Some(REDACTED.to_string());
    }
    if shown.openrouter.api_key.is_some() {
        shown.openrouter.api_key = Some(REDACTED.to_string());
    }
    shown
}

pub fn print_config(config: &ComandaConfig) -> Result<(), ComandaError> {
    let rendered = toml::to_string_pretty(&redacted(config))
        .map_err(|e| ComandaError::Internal(format!("failed to render config: {e}")))?;
    println!("# configuration is valid\n{rendered}");
    Ok(())
}

/// Prices a delivery from the restaurant to `(latitude, longitude)`.
pub async fn run_quote(
    config: &ComandaConfig,
    latitude: f64,
    longitude: f64,
) -> Result<(), ComandaError> {
    crate::serve::init_tracing("warn");

    let destination = Coordinate::new(latitude, longitude)?;
    let origin = config.restaurant.origin().ok_or_else(|| {
        ComandaError::Config("restaurant.latitude and restaurant.longitude are required".into())
    })?;

    let distance = Arc::new(GeoDistanceEstimator::from_config(&config.routing)?);
    let fees = DeliveryFeeCalculator::from_config(distance, &config.delivery);
    let quote = fees.quote(origin, destination).await;

    println!(
        "distance: {:.2} km ({})",
        quote.distance.kilometers, quote.distance.source
    );
    println!(
        "raw:      ${:.2} ({:.2} km x ${:.2}/km)",
        quote.raw, quote.distance.kilometers, config.delivery.rate_per_km
    );
    println!("fee:      {}", quote.fee);
    Ok(())
}
