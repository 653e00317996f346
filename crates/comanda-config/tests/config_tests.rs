// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Comanda configuration system.

use std::io::Write;

use comanda_config::diagnostic::{suggest_key, ConfigError};
use comanda_config::model::{ComandaConfig, RoundingMode};
use comanda_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

const COMPLETE: &str = r#"
[telegram]
bot_token = "123:ABC"
staff_chat_id = "-1001234567890"

[openrouter]
api_key = "sk-or-123"

[restaurant]
latitude = 10.5
longitude = -66.9
"#;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_comanda_config() {
    let toml = r#"
[agent]
name = "TestBot"
log_level = "debug"
system_prompt = "Eres un asistente."
drain_timeout_secs = 3

[telegram]
bot_token = "123:ABC"
staff_chat_id = "@cocina"

[openrouter]
api_key = "sk-or-123"
model = "openai/gpt-4o-mini"
base_url = "http://localhost:8080/v1"
timeout_secs = 20
referer = "https://arrozeria.com"
app_title = "ArrozinBot"

[restaurant]
latitude = 10.5
longitude = -66.9

[delivery]
rate_per_km = 0.75
rounding = "cents"
increment = 0.25
minimum_fee = 2.0

[routing]
base_url = "http://localhost:5000"
profile = "bike"
timeout_secs = 5

[rates]
url = "http://localhost:9000/rate"
price_pointer = "/price"
timeout_secs = 4

[order]
completion_marker = "<DONE>"
whatsapp_prefix = "57"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "TestBot");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.system_prompt.as_deref(), Some("Eres un asistente."));
    assert_eq!(config.agent.drain_timeout_secs, 3);
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.staff_chat_id.as_deref(), Some("@cocina"));
    assert_eq!(config.openrouter.api_key.as_deref(), Some("sk-or-123"));
    assert_eq!(config.openrouter.model, "openai/gpt-4o-mini");
    assert_eq!(config.openrouter.timeout_secs, 20);
    assert_eq!(config.openrouter.app_title.as_deref(), Some("ArrozinBot"));
    assert_eq!(config.restaurant.latitude, Some(10.5));
    assert_eq!(config.delivery.rate_per_km, 0.75);
    assert_eq!(config.delivery.rounding, RoundingMode::Cents);
    assert_eq!(config.delivery.minimum_fee, 2.0);
    assert_eq!(config.routing.profile, "bike");
    assert_eq!(config.rates.price_pointer, "/price");
    assert_eq!(config.order.completion_marker, "<DONE>");
    assert_eq!(config.order.whatsapp_prefix, "57");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "ArrozinBot");
    assert_eq!(config.agent.log_level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.openrouter.api_key.is_none());
    assert_eq!(config.openrouter.model, "anthropic/claude-3-haiku");
    assert_eq!(config.openrouter.timeout_secs, 30);
    assert_eq!(config.delivery.rate_per_km, 0.6);
    assert_eq!(config.delivery.rounding, RoundingMode::Increment);
    assert_eq!(config.delivery.increment, 0.5);
    assert_eq!(config.delivery.minimum_fee, 1.0);
    assert_eq!(config.routing.base_url, "http://router.project-osrm.org");
    assert_eq!(config.routing.timeout_secs, 10);
    assert_eq!(config.rates.price_pointer, "/monitors/usd/price");
    assert_eq!(config.order.completion_marker, "<ORDEN_FINALIZADA>");
    assert_eq!(config.order.whatsapp_prefix, "58");
}

/// Required credentials and coordinates make an empty config fatal.
#[test]
fn empty_config_fails_validation_with_missing_keys() {
    let errors = load_and_validate_str("").expect_err("required keys are missing");
    let missing: Vec<_> = errors
        .iter()
        .filter_map(|e| match e {
            ConfigError::MissingKey { key, .. } => Some(key.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(missing.len(), 5, "got: {missing:?}");
}

#[test]
fn complete_config_validates() {
    let config = load_and_validate_str(COMPLETE).expect("complete config should validate");
    assert_eq!(config.restaurant.origin().unwrap().longitude, -66.9);
}

/// Dotted keys (what the env provider produces) override TOML values.
#[test]
fn dotted_override_replaces_toml_value() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: ComandaConfig = Figment::new()
        .merge(Serialized::defaults(ComandaConfig::default()))
        .merge(Toml::string(COMPLETE))
        .merge(("telegram.staff_chat_id", "-42"))
        .merge(("delivery.rate_per_km", 1.1))
        .extract()
        .expect("should merge override");

    assert_eq!(config.telegram.staff_chat_id.as_deref(), Some("-42"));
    assert_eq!(config.delivery.rate_per_km, 1.1);
}

#[test]
fn unknown_field_in_restaurant_produces_error() {
    let toml = r#"
[restaurant]
latitud = 10.5
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("latitud"),
        "error should mention unknown field, got: {err_str}"
    );
}

#[test]
fn unknown_rounding_mode_is_rejected() {
    let toml = r#"
[delivery]
rounding = "banker"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[storage]
database_path = "x.db"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("storage"),
        "error should mention unknown field, got: {err_str}"
    );
}

#[test]
fn diagnostic_error_includes_suggestion_and_valid_keys() {
    let toml = r#"
[restaurant]
latitud = 10.5
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, section, suggestion, valid_keys, .. } if {
            key == "latitud"
                && section == "restaurant"
                && suggestion.as_deref() == Some("latitude")
                && valid_keys.contains("longitude")
        })
    });
    assert!(has_unknown_key, "got: {errors:?}");
}

#[test]
fn wrong_type_names_the_dotted_key() {
    let toml = r#"
[restaurant]
latitude = "norte"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(
        errors.iter().any(|e| matches!(
            e,
            ConfigError::InvalidType { key, .. } if key == "restaurant.latitude"
        )),
        "got: {errors:?}"
    );
}

#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    let valid_keys = &["bot_token", "staff_chat_id"];
    assert!(suggest_key("qqqqqq", valid_keys).is_none());
}

#[test]
fn load_from_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(COMPLETE.as_bytes()).unwrap();

    let config = load_and_validate_path(file.path()).expect("file config should validate");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
}

#[test]
fn prompt_file_that_exists_validates() {
    let mut prompt = tempfile::NamedTempFile::new().unwrap();
    prompt.write_all(b"Eres ArrozinBot.").unwrap();

    let toml = format!(
        "{COMPLETE}\n[agent]\nsystem_prompt_file = \"{}\"\n",
        prompt.path().display()
    );
    let config = load_and_validate_str(&toml).expect("existing prompt file should validate");
    assert!(config.agent.system_prompt_file.is_some());
}
