// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Finds and decodes the order the model embeds in its final reply.
//!
//! The model is told to answer with the completion marker followed by a
//! JSON object. In practice the object may be wrapped in code fences,
//! preceded by chatter, followed by a sign-off, or cut short. Extraction
//! takes the span from the first `{` after the marker to the last `}` and
//! decodes it strictly; every way this can fail is an [`ExtractionError`]
//! variant.

use comanda_config::model::OrderConfig;
use comanda_core::DeliveryFee;
use thiserror::Error;
use tracing::debug;

use crate::record::{non_blank, normalize_sauces, OrderPayload, OrderRecord};

/// Default completion marker.
pub const DEFAULT_MARKER: &str = "<ORDEN_FINALIZADA>";

/// Why a reply did not yield an order.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    /// Ordinary conversation; the model has not finalized anything.
    #[error("reply does not contain the completion marker")]
    NoMarker,

    #[error("completion marker is not followed by an order payload")]
    EmptyPayload,

    #[error("no complete JSON object after the completion marker")]
    NoJsonFound,

    #[error("order payload is not valid: {reason}")]
    MalformedJson { payload: String, reason: String },

    #[error("order payload is missing `{field}`")]
    MissingField { field: &'static str },

    #[error("order has no line items")]
    NoLineItems,
}

impl ExtractionError {
    /// True for every variant except [`ExtractionError::NoMarker`].
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::NoMarker)
    }

    /// The offending payload, when one was isolated.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::MalformedJson { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// Extracts [`OrderRecord`]s from model replies.
#[derive(Debug, Clone)]
pub struct OrderExtractor {
    marker: String,
}

impl Default for OrderExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl OrderExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn from_config(config: &OrderConfig) -> Self {
        Self::new(config.completion_marker.clone())
    }

    /// Isolates the `{ ... }` span following the first marker.
    pub fn locate_payload<'a>(&self, reply: &'a str) -> Result<&'a str, ExtractionError> {
        let start = reply.find(&self.marker).ok_or(ExtractionError::NoMarker)?;
        let after = &reply[start + self.marker.len()..];

        let open = after.find('{').ok_or(ExtractionError::EmptyPayload)?;
        let close = after[open..]
            .rfind('}')
            .ok_or(ExtractionError::NoJsonFound)?;

        Ok(&after[open..=open + close])
    }

    /// Decodes the order in `reply`. The delivery fee is left at zero; the
    /// caller merges the fee it computed for the session.
    pub fn extract(&self, reply: &str) -> Result<OrderRecord, ExtractionError> {
        let payload = self.locate_payload(reply)?;
        debug!(bytes = payload.len(), "decoding order payload");

        let raw: OrderPayload =
            serde_json::from_str(payload).map_err(|e| ExtractionError::MalformedJson {
                payload: payload.to_string(),
                reason: e.to_string(),
            })?;

        let customer_name =
            non_blank(raw.nombre).ok_or(ExtractionError::MissingField { field: "nombre" })?;
        let phone = raw
            .telefono
            .map(|p| p.into_text())
            .filter(|p| !p.is_empty())
            .ok_or(ExtractionError::MissingField { field: "telefono" })?;
        let payment_method = non_blank(raw.metodo_pago).ok_or(ExtractionError::MissingField {
            field: "metodo_pago",
        })?;
        let items = raw.pedido_items.ok_or(ExtractionError::MissingField {
            field: "pedido_items",
        })?;
        let total = match raw.total_pedido {
            None => {
                return Err(ExtractionError::MissingField {
                    field: "total_pedido",
                });
            }
            Some(t) => t.as_f64().ok_or_else(|| ExtractionError::MalformedJson {
                payload: payload.to_string(),
                reason: "total_pedido is not a number".to_string(),
            })?,
        };

        if items.is_empty() {
            return Err(ExtractionError::NoLineItems);
        }

        Ok(OrderRecord {
            customer_name,
            phone,
            payment_method,
            line_items: items.into_iter().map(|i| i.normalize()).collect(),
            sauces: normalize_sauces(raw.salsas),
            delivery_fee: DeliveryFee::ZERO,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LineItem, UNKNOWN_ITEM};
    use proptest::prelude::*;

    const ORDER_JSON: &str = r#"{"nombre":"Ana","telefono":"584121234567","metodo_pago":"efectivo","pedido_items":[{"producto":"Arroz Chino","cantidad":2}],"total_pedido":2.0}"#;

    fn extractor() -> OrderExtractor {
        OrderExtractor::default()
    }

    #[test]
    fn fenced_payload_after_chatter() {
        let reply = format!("Great, thanks!\n<ORDEN_FINALIZADA>\n```json\n{ORDER_JSON}\n```");
        let order = extractor().extract(&reply).unwrap();

        assert_eq!(order.customer_name, "Ana");
        assert_eq!(order.phone, "584121234567");
        assert_eq!(order.payment_method, "efectivo");
        assert_eq!(
            order.line_items,
            vec![LineItem {
                product_name: "Arroz Chino".into(),
                quantity: 2
            }]
        );
        assert_eq!(order.item_listing(), "- 2x Arroz Chino");
        assert_eq!(order.total, 2.0);
        assert_eq!(order.delivery_fee, DeliveryFee::ZERO);
        assert_eq!(order.sauces, None);
    }

    #[test]
    fn plain_reply_has_no_marker() {
        let err = extractor().extract("¿Algo más para tu pedido?").unwrap_err();
        assert_eq!(err, ExtractionError::NoMarker);
        assert!(!err.is_failure());
    }

    #[test]
    fn marker_alone_is_empty_payload() {
        assert_eq!(
            extractor().extract("<ORDEN_FINALIZADA>").unwrap_err(),
            ExtractionError::EmptyPayload
        );
        assert_eq!(
            extractor().extract("<ORDEN_FINALIZADA>\n```json\n```").unwrap_err(),
            ExtractionError::EmptyPayload
        );
    }

    #[test]
    fn truncated_object_is_no_json_found() {
        let err = extractor()
            .extract(r#"<ORDEN_FINALIZADA> {"nombre": "Ana", "telefono": "58"#)
            .unwrap_err();
        assert_eq!(err, ExtractionError::NoJsonFound);
        assert!(err.is_failure());
    }

    #[test]
    fn braces_before_marker_are_ignored() {
        let reply = format!("{{ruido}} <ORDEN_FINALIZADA>{ORDER_JSON}");
        assert!(extractor().extract(&reply).is_ok());

        let err = extractor()
            .extract("{\"nombre\":\"Ana\"} <ORDEN_FINALIZADA>")
            .unwrap_err();
        assert_eq!(err, ExtractionError::EmptyPayload);
    }

    #[test]
    fn invalid_json_keeps_payload_for_diagnostics() {
        let err = extractor()
            .extract("<ORDEN_FINALIZADA> {'nombre': 'Ana'}")
            .unwrap_err();
        match &err {
            ExtractionError::MalformedJson { payload, reason } => {
                assert_eq!(payload, "{'nombre': 'Ana'}");
                assert!(!reason.is_empty());
            }
            other => panic!("expected MalformedJson, got {other:?}"),
        }
        assert_eq!(err.payload(), Some("{'nombre': 'Ana'}"));
    }

    #[test]
    fn missing_required_fields_are_named() {
        let cases = [
            ("nombre", r#"{"telefono":"58","metodo_pago":"pm","pedido_items":["x"],"total_pedido":1}"#),
            ("telefono", r#"{"nombre":"Ana","metodo_pago":"pm","pedido_items":["x"],"total_pedido":1}"#),
            ("metodo_pago", r#"{"nombre":"Ana","telefono":"58","pedido_items":["x"],"total_pedido":1}"#),
            ("pedido_items", r#"{"nombre":"Ana","telefono":"58","metodo_pago":"pm","total_pedido":1}"#),
            ("total_pedido", r#"{"nombre":"Ana","telefono":"58","metodo_pago":"pm","pedido_items":["x"]}"#),
        ];
        for (field, json) in cases {
            let err = extractor()
                .extract(&format!("<ORDEN_FINALIZADA>{json}"))
                .unwrap_err();
            assert_eq!(err, ExtractionError::MissingField { field }, "case {field}");
        }
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let json = r#"{"nombre":"Ana","telefono":"58","metodo_pago":"pm","pedido_items":[],"total_pedido":1}"#;
        assert_eq!(
            extractor()
                .extract(&format!("<ORDEN_FINALIZADA>{json}"))
                .unwrap_err(),
            ExtractionError::NoLineItems
        );
    }

    #[test]
    fn non_numeric_total_is_malformed() {
        let json = r#"{"nombre":"Ana","telefono":"58","metodo_pago":"pm","pedido_items":["x"],"total_pedido":"mucho"}"#;
        let err = extractor()
            .extract(&format!("<ORDEN_FINALIZADA>{json}"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedJson { .. }));
    }

    #[test]
    fn english_keys_numeric_phone_and_mixed_items() {
        let json = r#"{
            "customer_name": "Luis",
            "phone": 584241112233,
            "payment_method": "pago móvil",
            "line_items": ["Tajadas", {"quantity": "3"}, {"nombre": "Nestea", "cantidad": 2}],
            "sauces": ["Guasacaca", "Guasacaca"],
            "costo_delivery": 99,
            "total": "12.50"
        }"#;
        let order = extractor()
            .extract(&format!("Listo!\n<ORDEN_FINALIZADA>\n{json}\n¡Gracias!"))
            .unwrap();

        assert_eq!(order.phone, "584241112233");
        assert_eq!(order.total, 12.5);
        assert_eq!(order.sauces, Some(vec!["Guasacaca".to_string()]));
        assert_eq!(
            order.item_listing(),
            format!("- 1x Tajadas\n- 3x {UNKNOWN_ITEM}\n- 2x Nestea")
        );
        // The model's fee claim is never trusted.
        assert_eq!(order.delivery_fee, DeliveryFee::ZERO);
    }

    #[test]
    fn custom_marker() {
        let ex = OrderExtractor::new("<DONE>");
        assert!(ex.extract(&format!("<DONE>{ORDER_JSON}")).is_ok());
        assert_eq!(
            ex.extract(&format!("<ORDEN_FINALIZADA>{ORDER_JSON}"))
                .unwrap_err(),
            ExtractionError::NoMarker
        );
    }

    #[test]
    fn with_delivery_fee_overrides() {
        let order = extractor()
            .extract(&format!("<ORDEN_FINALIZADA>{ORDER_JSON}"))
            .unwrap()
            .with_delivery_fee(DeliveryFee(3.5));
        assert_eq!(order.delivery_fee, DeliveryFee(3.5));
    }

    proptest! {
        #[test]
        fn recovers_object_amid_noise(
            before in "[^{}<]{0,40}",
            between in "[^{}]{0,40}",
            after in "[^{}]{0,40}",
        ) {
            let reply = format!("{before}<ORDEN_FINALIZADA>{between}{ORDER_JSON}{after}");
            let order = extractor().extract(&reply).unwrap();
            prop_assert_eq!(order.customer_name, "Ana");
            prop_assert_eq!(order.line_items.len(), 1);
        }

        #[test]
        fn never_panics_on_arbitrary_replies(reply in ".{0,200}") {
            let _ = extractor().extract(&reply);
        }
    }
}
