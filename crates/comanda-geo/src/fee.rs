// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery fee pricing.

use std::sync::Arc;

use comanda_config::model::{DeliveryConfig, RoundingMode};
use comanda_core::{Coordinate, DeliveryFee, DistanceResult, DistanceSource};
use tracing::info;

/// How a raw `km * rate` amount becomes a charged fee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeePolicy {
    /// Nearest multiple of `increment`, never below `minimum`.
    Increment { increment: f64, minimum: f64 },
    /// Nearest cent, no floor.
    Cents,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::Increment {
            increment: 0.5,
            minimum: 1.0,
        }
    }
}

impl FeePolicy {
    pub fn from_config(config: &DeliveryConfig) -> Self {
        match config.rounding {
            RoundingMode::Increment => Self::Increment {
                increment: config.increment,
                minimum: config.minimum_fee,
            },
            RoundingMode::Cents => Self::Cents,
        }
    }

    /// Rounds a raw amount according to the policy.
    pub fn apply(&self, raw: f64) -> DeliveryFee {
        let raw = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
        match *self {
            Self::Increment { increment, minimum } => {
                // Halfway amounts go to the even step: $3.25 is $3.00, $3.75 is $4.00.
                let stepped = (raw / increment).round_ties_even() * increment;
                // Snap to cents so steps like 0.1 don't leak float noise.
                DeliveryFee(round_cents(stepped).max(minimum))
            }
            Self::Cents => DeliveryFee(round_cents(raw)),
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Everything that went into a fee, for logs and the `quote` command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeQuote {
    pub distance: DistanceResult,
    pub raw: f64,
    pub fee: DeliveryFee,
}

/// Prices deliveries from a distance source, a per-kilometer rate, and a rounding policy.
#[derive(Clone)]
pub struct DeliveryFeeCalculator {
    distance: Arc<dyn DistanceSource>,
    rate_per_km: f64,
    policy: FeePolicy,
}

impl DeliveryFeeCalculator {
    pub fn new(distance: Arc<dyn DistanceSource>, rate_per_km: f64, policy: FeePolicy) -> Self {
        Self {
            distance,
            rate_per_km,
            policy,
        }
    }

    pub fn from_config(distance: Arc<dyn DistanceSource>, config: &DeliveryConfig) -> Self {
        Self::new(distance, config.rate_per_km, FeePolicy::from_config(config))
    }

    pub fn policy(&self) -> FeePolicy {
        self.policy
    }

    /// Pure pricing step: kilometers to a rounded fee.
    pub fn fee_for_distance(&self, kilometers: f64) -> DeliveryFee {
        self.policy.apply(kilometers * self.rate_per_km)
    }

    /// Measures the distance and prices it, keeping the intermediate values.
    pub async fn quote(&self, origin: Coordinate, destination: Coordinate) -> FeeQuote {
        let distance = self.distance.estimate(origin, destination).await;
        let raw = distance.kilometers * self.rate_per_km;
        let fee = self.policy.apply(raw);

        info!(
            kilometers = format!("{:.2}", distance.kilometers),
            method = %distance.source,
            raw = format!("{raw:.2}"),
            fee = %fee,
            "delivery fee calculated"
        );

        FeeQuote { distance, raw, fee }
    }

    /// Delivery fee from `origin` to `destination`. Never fails.
    pub async fn calculate(&self, origin: Coordinate, destination: Coordinate) -> DeliveryFee {
        self.quote(origin, destination).await.fee
    }
}

impl std::fmt::Debug for DeliveryFeeCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryFeeCalculator")
            .field("rate_per_km", &self.rate_per_km)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
