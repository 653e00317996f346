// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the external collaborators of the order bot.
//!
//! Channel and provider adapters extend the [`PluginAdapter`] base trait and
//! use `#[async_trait]` for dynamic dispatch compatibility. Distance and rate
//! sources are plain async lookups that always produce a usable value.

pub mod adapter;
pub mod channel;
pub mod distance;
pub mod provider;
pub mod rates;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use distance::DistanceSource;
pub use provider::ProviderAdapter;
pub use rates::RateSource;
