// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Comanda integration tests.
//!
//! Provides mock adapters and a harness that wires a real [`OrderAgent`]
//! to them, so conversation flows run without Telegram, OpenRouter, or
//! any HTTP service.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted model replies, with request capture
//! - [`MockChannel`] - Event injection and outbound capture
//! - [`FixedDistance`] / [`FixedRate`] - Canned distance and exchange rate
//!
//! [`OrderAgent`]: comanda_agent::OrderAgent

pub mod fixed;
pub mod harness;
pub mod mock_channel;
pub mod mock_provider;

pub use fixed::{FixedDistance, FixedRate};
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_channel::MockChannel;
pub use mock_provider::MockProvider;
