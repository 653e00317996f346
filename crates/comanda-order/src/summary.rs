// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff-facing order summary.
//!
//! The text is plain apart from the phone number, which is wrapped in an
//! inline code span so staff can copy it with one tap. Transport-specific
//! escaping happens in the channel adapter.

use std::fmt::Write as _;

use comanda_config::model::OrderConfig;
use comanda_core::{Action, ActionSet, UserId, DELIVERED_CALLBACK_PREFIX};

use crate::record::OrderRecord;

/// Rendered summary plus the buttons attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub text: String,
    pub actions: ActionSet,
}

/// Renders [`OrderRecord`]s for the staff chat.
#[derive(Debug, Clone)]
pub struct OrderSummaryFormatter {
    whatsapp_prefix: String,
}

impl Default for OrderSummaryFormatter {
    fn default() -> Self {
        Self::new("58")
    }
}

impl OrderSummaryFormatter {
    pub fn new(whatsapp_prefix: impl Into<String>) -> Self {
        Self {
            whatsapp_prefix: whatsapp_prefix.into(),
        }
    }

    pub fn from_config(config: &OrderConfig) -> Self {
        Self::new(config.whatsapp_prefix.clone())
    }

    /// Builds the summary for `order`, placed by `user_id`.
    ///
    /// `rate` is the bolivar-per-dollar rate; without it the total line says
    /// the rate is unavailable.
    pub fn format(&self, order: &OrderRecord, user_id: UserId, rate: Option<f64>) -> OrderSummary {
        let mut text = String::with_capacity(256);

        text.push_str("🍚 ¡Nuevo Pedido Recibido! 🍚\n\n");
        let _ = writeln!(text, "👤 Cliente: {}", order.customer_name);
        let _ = writeln!(text, "📞 Número: `{}`", order.phone.replace('`', ""));
        let _ = writeln!(text, "💳 Método de Pago: {}\n", order.payment_method);
        text.push_str("📋 Pedido:\n");
        text.push_str(&order.item_listing());
        text.push('\n');

        if let Some(sauces) = order.sauces.as_ref().filter(|s| !s.is_empty()) {
            let _ = writeln!(text, "🌶️ Salsas: {}", sauces.join(", "));
        }
        text.push('\n');

        if !order.delivery_fee.is_zero() {
            let _ = writeln!(text, "🛵 Delivery: {}", order.delivery_fee);
        }

        let _ = write!(text, "💰 Total a Pagar: ${:.2}", order.total);
        match rate.filter(|r| r.is_finite() && *r > 0.0) {
            Some(rate) => {
                let _ = write!(text, " (Aprox. Bs. {})", group_thousands(order.total * rate));
            }
            None => text.push_str(" (Tasa BCV no disponible)"),
        }

        OrderSummary {
            text,
            actions: self.actions(order, user_id),
        }
    }

    fn actions(&self, order: &OrderRecord, user_id: UserId) -> ActionSet {
        let mut actions = ActionSet::new();
        actions.push(Action::Url {
            label: "💬 Contactar por Telegram".to_string(),
            url: format!("tg://user?id={user_id}"),
        });

        let number = whatsapp_number(&order.phone);
        if number.starts_with(&self.whatsapp_prefix) {
            actions.push(Action::Url {
                label: "✅ Contactar por WhatsApp".to_string(),
                url: format!("https://wa.me/{number}"),
            });
        }

        actions.push(Action::Callback {
            label: "📦 Marcar como Entregado".to_string(),
            data: delivered_callback_data(user_id),
        });
        actions
    }
}

/// Phone as used in `wa.me` links: no `+`, no spaces.
pub fn whatsapp_number(phone: &str) -> String {
    phone.chars().filter(|c| *c != '+' && *c != ' ').collect()
}

pub fn delivered_callback_data(user_id: UserId) -> String {
    format!("{DELIVERED_CALLBACK_PREFIX}{user_id}")
}

/// Parses a `delivered_{user_id}` callback token.
pub fn delivered_user_id(data: &str) -> Option<UserId> {
    data.strip_prefix(DELIVERED_CALLBACK_PREFIX)?
        .parse()
        .ok()
        .map(UserId)
}

/// `1234.5` → `1,234.50`.
fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if value < 0.0 && formatted != "0.00" {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push('.');
    grouped.push_str(frac_part);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LineItem;
    use comanda_core::DeliveryFee;

    fn order() -> OrderRecord {
        OrderRecord {
            customer_name: "Ana".into(),
            phone: "584121234567".into(),
            payment_method: "efectivo".into(),
            line_items: vec![LineItem {
                product_name: "Arroz Chino".into(),
                quantity: 2,
            }],
            sauces: None,
            delivery_fee: DeliveryFee::ZERO,
            total: 2.0,
        }
    }

    fn urls(actions: &ActionSet) -> Vec<&str> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Url { url, .. } => Some(url.as_str()),
                Action::Callback { .. } => None,
            })
            .collect()
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0.0), "0.00");
        assert_eq!(group_thousands(999.999), "1,000.00");
        assert_eq!(group_thousands(1234.56), "1,234.56");
        assert_eq!(group_thousands(1234567.0), "1,234,567.00");
        assert_eq!(group_thousands(-1234.5), "-1,234.50");
    }

    #[test]
    fn full_summary_layout() {
        let summary = OrderSummaryFormatter::default().format(&order(), UserId(42), Some(36.5));
        assert_eq!(
            summary.text,
            "🍚 ¡Nuevo Pedido Recibido! 🍚\n\n\
             👤 Cliente: Ana\n\
             📞 Número: `584121234567`\n\
             💳 Método de Pago: efectivo\n\n\
             📋 Pedido:\n\
             - 2x Arroz Chino\n\n\
             💰 Total a Pagar: $2.00 (Aprox. Bs. 73.00)"
        );
    }

    #[test]
    fn total_line_without_rate() {
        let summary = OrderSummaryFormatter::default().format(&order(), UserId(42), None);
        assert!(summary
            .text
            .ends_with("💰 Total a Pagar: $2.00 (Tasa BCV no disponible)"));

        let summary = OrderSummaryFormatter::default().format(&order(), UserId(42), Some(0.0));
        assert!(summary.text.contains("Tasa BCV no disponible"));
    }

    #[test]
    fn converted_total_uses_grouping() {
        let mut o = order();
        o.total = 33.5;
        let summary = OrderSummaryFormatter::default().format(&o, UserId(1), Some(100.0));
        assert!(summary.text.contains("(Aprox. Bs. 3,350.00)"));
    }

    #[test]
    fn delivery_and_sauce_lines_are_conditional() {
        let plain = OrderSummaryFormatter::default().format(&order(), UserId(1), None);
        assert!(!plain.text.contains("Delivery"));
        assert!(!plain.text.contains("Salsas"));

        let mut o = order();
        o.delivery_fee = DeliveryFee(33.5);
        o.sauces = Some(vec!["Guasacaca".into(), "Salsa Agridulce".into()]);
        let full = OrderSummaryFormatter::default().format(&o, UserId(1), None);
        assert!(full.text.contains("🛵 Delivery: $33.50\n"));
        assert!(full.text.contains("🌶️ Salsas: Guasacaca, Salsa Agridulce\n"));
    }

    #[test]
    fn venezuelan_phone_gets_whatsapp_button() {
        let summary = OrderSummaryFormatter::default().format(&order(), UserId(42), None);
        assert_eq!(
            urls(&summary.actions),
            vec!["tg://user?id=42", "https://wa.me/584121234567"]
        );
        assert_eq!(
            summary.actions.iter().last(),
            Some(&Action::Callback {
                label: "📦 Marcar como Entregado".into(),
                data: "delivered_42".into(),
            })
        );
    }

    #[test]
    fn formatted_phone_is_normalized_for_whatsapp() {
        let mut o = order();
        o.phone = "+58 412 123 4567".into();
        let summary = OrderSummaryFormatter::default().format(&o, UserId(7), None);
        assert!(urls(&summary.actions).contains(&"https://wa.me/584121234567"));
    }

    #[test]
    fn other_prefixes_get_no_whatsapp_button() {
        let mut o = order();
        o.phone = "04121234567".into();
        let summary = OrderSummaryFormatter::default().format(&o, UserId(7), None);
        assert_eq!(urls(&summary.actions), vec!["tg://user?id=7"]);
        assert_eq!(summary.actions.len(), 2);

        let colombia = OrderSummaryFormatter::new("57");
        o.phone = "573001234567".into();
        assert_eq!(colombia.format(&o, UserId(7), None).actions.len(), 3);
    }

    #[test]
    fn delivered_token_round_trips() {
        assert_eq!(delivered_user_id(&delivered_callback_data(UserId(99))), Some(UserId(99)));
        assert_eq!(delivered_user_id("delivered_abc"), None);
        assert_eq!(delivered_user_id("other_99"), None);
    }
}
