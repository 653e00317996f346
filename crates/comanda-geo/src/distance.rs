// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Distance estimation between the restaurant and a customer.
//!
//! [`GeoDistanceEstimator`] asks an OSRM-compatible routing service for the
//! road distance and falls back to the haversine great-circle distance when
//! the service is unreachable, slow, or returns something unusable. The
//! estimator never fails.

use std::time::Duration;

use async_trait::async_trait;
use comanda_config::model::RoutingConfig;
use comanda_core::{ComandaError, Coordinate, DistanceMethod, DistanceResult, DistanceSource};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two coordinates.
pub fn haversine_km(origin: Coordinate, destination: Coordinate) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = destination.latitude.to_radians();
    let d_lat = (destination.latitude - origin.latitude).to_radians();
    let d_lon = (destination.longitude - origin.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Why a routed lookup was not used.
#[derive(Debug, Error)]
enum RouteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("routing service returned {0}")]
    Status(reqwest::StatusCode),

    #[error("response contained no routes")]
    NoRoute,

    #[error("route distance {0} is not a usable value")]
    InvalidDistance(f64),
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    /// Meters along the road network.
    distance: f64,
}

/// Road-distance estimator with a haversine fallback.
#[derive(Debug, Clone)]
pub struct GeoDistanceEstimator {
    client: reqwest::Client,
    base_url: String,
    profile: String,
}

impl GeoDistanceEstimator {
    /// Creates an estimator against `base_url` (e.g. `http://router.project-osrm.org`).
    pub fn new(
        base_url: impl Into<String>,
        profile: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ComandaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComandaError::Internal(format!("failed to build routing client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            profile: profile.into(),
        })
    }

    pub fn from_config(config: &RoutingConfig) -> Result<Self, ComandaError> {
        Self::new(
            config.base_url.clone(),
            config.profile.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// OSRM wants `lon,lat` pairs separated by `;`.
    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=false",
            self.base_url,
            self.profile,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude
        )
    }

    async fn routed_km(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<f64, RouteError> {
        let url = self.route_url(origin, destination);
        debug!(url = %url, "querying routing service");

        let response = self
            .client
            .get(&url)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::Status(status));
        }

        let body: RouteResponse = response.json().await?;
        let meters = body.routes.first().ok_or(RouteError::NoRoute)?.distance;
        if !meters.is_finite() || meters < 0.0 {
            return Err(RouteError::InvalidDistance(meters));
        }

        Ok(meters / 1000.0)
    }
}

#[async_trait]
impl DistanceSource for GeoDistanceEstimator {
    async fn estimate(&self, origin: Coordinate, destination: Coordinate) -> DistanceResult {
        match self.routed_km(origin, destination).await {
            Ok(kilometers) => {
                info!(kilometers = format!("{kilometers:.2}"), "routed distance");
                DistanceResult {
                    kilometers,
                    source: DistanceMethod::Routed,
                }
            }
            Err(e) => {
                let kilometers = haversine_km(origin, destination);
                warn!(
                    error = %e,
                    kilometers = format!("{kilometers:.2}"),
                    "routing service failed, using straight-line distance"
                );
                metrics::counter!("comanda_routing_fallbacks_total").increment(1);
                DistanceResult {
                    kilometers,
                    source: DistanceMethod::Fallback,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn restaurant() -> Coordinate {
        coord(10.5, -66.9)
    }

    fn customer() -> Coordinate {
        coord(10.0, -66.9)
    }

    fn estimator(base_url: &str, timeout: Duration) -> GeoDistanceEstimator {
        GeoDistanceEstimator::new(base_url, "driving", timeout).unwrap()
    }

    #[test]
    fn haversine_half_degree_of_latitude() {
        let km = haversine_km(restaurant(), customer());
        assert!((km - 55.597).abs() < 0.01, "got {km}");
    }

    #[test]
    fn haversine_same_point_is_zero() {
        assert_eq!(haversine_km(restaurant(), restaurant()), 0.0);
    }

    #[test]
    fn haversine_antipodes_is_half_circumference() {
        let km = haversine_km(coord(0.0, 0.0), coord(0.0, 180.0));
        assert!((km - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn route_url_orders_longitude_first() {
        let est = estimator("http://osrm.local/", Duration::from_secs(1));
        assert_eq!(
            est.route_url(restaurant(), customer()),
            "http://osrm.local/route/v1/driving/-66.9,10.5;-66.9,10?overview=false"
        );
    }

    #[tokio::test]
    async fn uses_routed_distance_when_available() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/route/v1/driving/-66.9,10.5;-66.9,10"))
            .and(query_param("overview", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": "Ok",
                "routes": [{"distance": 61234.0, "duration": 3600.0}]
            })))
            .mount(&server)
            .await;

        let result = estimator(&server.uri(), Duration::from_secs(5))
            .estimate(restaurant(), customer())
            .await;

        assert_eq!(result.source, DistanceMethod::Routed);
        assert!((result.kilometers - 61.234).abs() < 1e-9);
    }

    #[tokio::test]
    async fn falls_back_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = estimator(&server.uri(), Duration::from_secs(5))
            .estimate(restaurant(), customer())
            .await;

        assert_eq!(result.source, DistanceMethod::Fallback);
        assert!((result.kilometers - 55.6).abs() < 0.01);
    }

    #[tokio::test]
    async fn falls_back_on_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = estimator(&server.uri(), Duration::from_secs(5))
            .estimate(restaurant(), customer())
            .await;
        assert_eq!(result.source, DistanceMethod::Fallback);
    }

    #[tokio::test]
    async fn falls_back_when_no_route_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"code": "NoRoute", "routes": []})),
            )
            .mount(&server)
            .await;

        let result = estimator(&server.uri(), Duration::from_secs(5))
            .estimate(restaurant(), customer())
            .await;
        assert_eq!(result.source, DistanceMethod::Fallback);
    }

    #[tokio::test]
    async fn falls_back_on_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"routes": [{"distance": 1000.0}]}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let result = estimator(&server.uri(), Duration::from_millis(100))
            .estimate(restaurant(), customer())
            .await;
        assert_eq!(result.source, DistanceMethod::Fallback);
    }

    #[tokio::test]
    async fn falls_back_when_service_unreachable() {
        // Nothing listens on the discard port.
        let result = estimator("http://127.0.0.1:9", Duration::from_secs(2))
            .estimate(restaurant(), customer())
            .await;
        assert_eq!(result.source, DistanceMethod::Fallback);
        assert!(result.kilometers.is_finite());
    }

    proptest! {
        #[test]
        fn haversine_is_finite_non_negative_and_symmetric(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let a = coord(lat1, lon1);
            let b = coord(lat2, lon2);
            let ab = haversine_km(a, b);
            let ba = haversine_km(b, a);
            prop_assert!(ab.is_finite());
            prop_assert!(ab >= 0.0);
            prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
            prop_assert!((ab - ba).abs() < 1e-6);
        }
    }
}
