// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Distance lookup between two coordinates.

use async_trait::async_trait;

use crate::types::{Coordinate, DistanceResult};

/// Produces the distance between two points.
///
/// Implementations never fail: lookup problems are absorbed into a
/// fallback computation so callers always get a usable value.
#[async_trait]
pub trait DistanceSource: Send + Sync + 'static {
    async fn estimate(&self, origin: Coordinate, destination: Coordinate) -> DistanceResult;
}
