// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Comanda order bot.

use thiserror::Error;

/// The primary error type used across all Comanda adapter traits and core operations.
#[derive(Debug, Error)]
pub enum ComandaError {
    /// Configuration errors (missing credentials, invalid coordinates, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Channel adapter errors (connection failure, message format, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM provider errors (API failure, auth, rate limits, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A latitude/longitude pair outside the valid ranges.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
