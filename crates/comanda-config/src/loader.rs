// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./comanda.toml` > `~/.config/comanda/comanda.toml` > `/etc/comanda/comanda.toml`
//! with environment variable overrides via `COMANDA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ComandaConfig;

/// Config sections, in the order used for env var key mapping.
const SECTIONS: &[&str] = &[
    "agent",
    "telegram",
    "openrouter",
    "restaurant",
    "delivery",
    "routing",
    "rates",
    "order",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/comanda/comanda.toml` (system-wide)
/// 3. `~/.config/comanda/comanda.toml` (user XDG config)
/// 4. `./comanda.toml` (local directory)
/// 5. `COMANDA_*` environment variables
pub fn load_config() -> Result<ComandaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ComandaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ComandaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ComandaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ComandaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ComandaConfig::default()))
        .merge(Toml::file("/etc/comanda/comanda.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("comanda/comanda.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("comanda.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` because key names contain underscores:
/// `COMANDA_TELEGRAM_STAFF_CHAT_ID` must map to `telegram.staff_chat_id`.
fn env_provider() -> Env {
    Env::prefixed("COMANDA_").map(|key| env_key_to_path(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
