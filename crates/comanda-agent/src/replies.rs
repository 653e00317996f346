// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed customer-facing texts.
//!
//! None of these mention the payload format; a customer only ever sees
//! restaurant talk.

use comanda_core::DeliveryFee;

pub const ORDER_CONFIRMED: &str =
    "¡Pedido completado y enviado a la cocina! Gracias por tu compra. 👨‍🍳";

pub const EXTRACTION_RETRY: &str = "¡Ay, caramba! Entendí que terminaste, pero los datos del pedido \
vinieron con un error. Por favor, di 'confirmar pedido' para intentarlo de nuevo.";

pub const DISPATCH_RETRY: &str = "¡Uy! No pude enviar tu pedido a la cocina. 😥 \
Por favor, di 'confirmar pedido' en un momento para intentarlo de nuevo.";

pub const PROVIDER_ERROR: &str =
    "Uhm... mi cerebro tuvo un cortocircuito. 🧠💥 Intenta de nuevo en un momento.";

pub const CANCELLED: &str = "¡Entendido! He borrado todo. Cuando quieras empezar de nuevo, \
solo tienes que hablarme.";

pub fn greeting(bot_name: &str) -> String {
    format!(
        "¡Hola! Soy {bot_name}. ¡Tu sesión ha sido reiniciada! Estoy listo para tomar tu pedido. \
         ¿Qué te provoca hoy?"
    )
}

/// Sent to the customer right after a location share.
pub fn location_received(fee: DeliveryFee) -> String {
    format!("¡Ubicación recibida! Tu delivery costará {fee} 🛵.")
}

/// Appended to history (as the customer) so the model knows the fee.
pub fn location_note(fee: DeliveryFee) -> String {
    format!(
        "El cliente ha compartido su ubicación. El costo del delivery es de {fee}. \
         Informa al cliente de este costo y ahora pídele su pedido."
    )
}
