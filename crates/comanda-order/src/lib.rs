// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order finalization for the Comanda bot.
//!
//! - [`OrderExtractor`] pulls an [`OrderRecord`] out of a model reply that
//!   carries the completion marker.
//! - [`OrderSummaryFormatter`] renders that record for the staff chat,
//!   together with contact and mark-delivered actions.

pub mod extractor;
pub mod record;
pub mod summary;

pub use extractor::{ExtractionError, OrderExtractor, DEFAULT_MARKER};
pub use record::{LineItem, OrderRecord, UNKNOWN_ITEM};
pub use summary::{
    delivered_callback_data, delivered_user_id, whatsapp_number, OrderSummary,
    OrderSummaryFormatter,
};
