// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned distance and rate sources.

use std::sync::Mutex;

use async_trait::async_trait;
use comanda_core::{Coordinate, DistanceMethod, DistanceResult, DistanceSource, RateSource};

/// Always reports the same distance.
#[derive(Debug, Clone, Copy)]
pub struct FixedDistance {
    pub kilometers: f64,
    pub source: DistanceMethod,
}

impl FixedDistance {
    pub fn routed(kilometers: f64) -> Self {
        Self {
            kilometers,
            source: DistanceMethod::Routed,
        }
    }

    pub fn fallback(kilometers: f64) -> Self {
        Self {
            kilometers,
            source: DistanceMethod::Fallback,
        }
    }
}

#[async_trait]
impl DistanceSource for FixedDistance {
    async fn estimate(&self, _origin: Coordinate, _destination: Coordinate) -> DistanceResult {
        DistanceResult {
            kilometers: self.kilometers,
            source: self.source,
        }
    }
}

/// Reports a settable exchange rate; `None` means the service is down.
#[derive(Debug, Default)]
pub struct FixedRate {
    rate: Mutex<Option<f64>>,
}

impl FixedRate {
    pub fn new(rate: Option<f64>) -> Self {
        Self {
            rate: Mutex::new(rate),
        }
    }

    pub fn set(&self, rate: Option<f64>) {
        if let Ok(mut guard) = self.rate.lock() {
            *guard = rate;
        }
    }
}

#[async_trait]
impl RateSource for FixedRate {
    async fn current_rate(&self) -> Option<f64> {
        self.rate.lock().ok().and_then(|guard| *guard)
    }
}
