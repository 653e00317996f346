// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical order model and the loosely-typed wire shape the model emits.
//!
//! The wire structs accept whatever the model plausibly produces (Spanish or
//! English keys, items as objects or bare strings, numbers as strings). They
//! are normalized once into [`OrderRecord`] and never leave this crate.

use std::fmt;

use comanda_core::DeliveryFee;
use serde::Deserialize;

/// Name used when an item arrives without one.
pub const UNKNOWN_ITEM: &str = "Artículo desconocido";

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_name: String,
    /// Always at least 1.
    pub quantity: u32,
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- {}x {}", self.quantity, self.product_name)
    }
}

/// A finalized order, ready for the staff summary.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub customer_name: String,
    pub phone: String,
    pub payment_method: String,
    /// Never empty.
    pub line_items: Vec<LineItem>,
    /// Deduplicated, in the order first mentioned. `None` when none were chosen.
    pub sauces: Option<Vec<String>>,
    pub delivery_fee: DeliveryFee,
    pub total: f64,
}

impl OrderRecord {
    /// One `- {quantity}x {name}` line per item.
    pub fn item_listing(&self) -> String {
        self.line_items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replaces whatever fee the model claimed with the one computed for the session.
    pub fn with_delivery_fee(mut self, fee: DeliveryFee) -> Self {
        self.delivery_fee = fee;
        self
    }
}

// --- Wire shape ---

/// A string or a number; the model is inconsistent about quoting.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    pub(crate) fn into_text(self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        }
    }

    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Number(n) => n.as_f64(),
        }
        .filter(|v| v.is_finite())
    }
}

/// Either a single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// An ordered item as emitted by the model.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum LineItemInput {
    Bare(String),
    Detailed(DetailedItem),
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DetailedItem {
    #[serde(default, alias = "product_name")]
    producto: Option<String>,
    #[serde(default, alias = "name")]
    nombre: Option<String>,
    #[serde(default, alias = "quantity")]
    cantidad: Option<Scalar>,
}

impl LineItemInput {
    pub(crate) fn normalize(self) -> LineItem {
        match self {
            Self::Bare(name) => LineItem {
                product_name: non_blank(Some(name)).unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
                quantity: 1,
            },
            Self::Detailed(item) => LineItem {
                product_name: non_blank(item.producto)
                    .or_else(|| non_blank(item.nombre))
                    .unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
                quantity: item.cantidad.as_ref().map_or(1, normalize_quantity),
            },
        }
    }
}

/// Integers, integral floats, and numeric strings are honored; anything else is 1.
fn normalize_quantity(raw: &Scalar) -> u32 {
    match raw.as_f64() {
        Some(v) if v.fract() == 0.0 && v >= 1.0 => v.min(f64::from(u32::MAX)) as u32,
        _ => 1,
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The payload that follows the completion marker.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OrderPayload {
    #[serde(default, alias = "customer_name")]
    pub nombre: Option<String>,
    #[serde(default, alias = "phone")]
    pub telefono: Option<Scalar>,
    #[serde(default, alias = "payment_method")]
    pub metodo_pago: Option<String>,
    #[serde(default, alias = "line_items")]
    pub pedido_items: Option<Vec<LineItemInput>>,
    #[serde(default, alias = "sauces")]
    pub salsas: Option<OneOrMany>,
    #[serde(default, alias = "total")]
    pub total_pedido: Option<Scalar>,
}

/// Trims, drops blanks, and removes repeats while keeping first-seen order.
pub(crate) fn normalize_sauces(raw: Option<OneOrMany>) -> Option<Vec<String>> {
    let list = match raw? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    };

    let mut sauces: Vec<String> = Vec::with_capacity(list.len());
    for sauce in list {
        let sauce = sauce.trim();
        if !sauce.is_empty() && !sauces.iter().any(|s| s == sauce) {
            sauces.push(sauce.to_string());
        }
    }

    (!sauces.is_empty()).then_some(sauces)
}
