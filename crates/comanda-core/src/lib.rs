// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Comanda order bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Comanda workspace. The transport, the
//! LLM client, the routing service, and the currency lookup all sit behind
//! traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ComandaError;
pub use types::{
    Action, ActionSet, AdapterType, ChatMessage, Command, Coordinate, DeliveryFee,
    DistanceMethod, DistanceResult, HealthStatus, InboundEvent, InboundKind, MessageId,
    OutboundMessage, ProviderRequest, ProviderResponse, Role, UserId,
    DELIVERED_CALLBACK_PREFIX,
};

// Re-export all adapter traits at crate root.
pub use traits::{ChannelAdapter, DistanceSource, PluginAdapter, ProviderAdapter, RateSource};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn comanda_error_has_all_variants() {
        let _config = ComandaError::Config("test".into());
        let _channel = ComandaError::Channel {
            message: "test".into(),
            source: None,
        };
        let _provider = ComandaError::Provider {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _coord = ComandaError::InvalidCoordinate("test".into());
        let _timeout = ComandaError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = ComandaError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::Provider] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn command_parses_lowercase_names() {
        use std::str::FromStr;

        assert_eq!(Command::from_str("start").unwrap(), Command::Start);
        assert_eq!(Command::from_str("cancel").unwrap(), Command::Cancel);
        assert!(Command::from_str("menu").is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let msg = ChatMessage::assistant("hola");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hola");
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(10.5, -66.9).is_ok());
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn delivery_fee_display_uses_two_decimals() {
        assert_eq!(DeliveryFee(3.5).to_string(), "$3.50");
        assert!(DeliveryFee::ZERO.is_zero());
        assert!(!DeliveryFee(1.0).is_zero());
    }

    #[test]
    fn action_set_preserves_order() {
        let mut set = ActionSet::new();
        set.push(Action::Url {
            label: "a".into(),
            url: "https://example.com".into(),
        });
        set.push(Action::Callback {
            label: "b".into(),
            data: "delivered_1".into(),
        });
        let labels: Vec<_> = set
            .iter()
            .map(|a| match a {
                Action::Url { label, .. } | Action::Callback { label, .. } => label.as_str(),
            })
            .collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    proptest! {
        #[test]
        fn coordinate_accepts_every_in_range_pair(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let c = Coordinate::new(lat, lon).unwrap();
            prop_assert_eq!(c.latitude, lat);
            prop_assert_eq!(c.longitude, lon);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_distance_source<T: DistanceSource>() {}
        fn _assert_rate_source<T: RateSource>() {}
    }
}
