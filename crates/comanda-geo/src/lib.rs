// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Distance estimation and delivery fee pricing.
//!
//! [`GeoDistanceEstimator`] turns two coordinates into kilometers, preferring
//! road routing and falling back to the great-circle distance.
//! [`DeliveryFeeCalculator`] turns kilometers into a rounded dollar fee.

pub mod distance;
pub mod fee;

pub use distance::{haversine_km, GeoDistanceEstimator, EARTH_RADIUS_KM};
pub use fee::{DeliveryFeeCalculator, FeePolicy, FeeQuote};
