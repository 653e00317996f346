// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Currency conversion rate lookup.

use async_trait::async_trait;

/// Supplies the display conversion rate (bolivars per dollar).
///
/// `None` means the rate is currently unavailable; failures are never raised.
#[async_trait]
pub trait RateSource: Send + Sync + 'static {
    async fn current_rate(&self) -> Option<f64>;
}
