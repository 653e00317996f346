// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Every problem with `comanda.toml` or a `COMANDA_*` variable becomes a
//! [`ConfigError`] rendered by miette. Unknown keys point at the offending
//! line and suggest the closest valid key; missing keys name the environment
//! variable that would also satisfy them.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score above which a valid key is offered as a correction.
/// `latitud` -> `latitude` and `staff_chat` -> `staff_chat_id` both clear it.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "COMANDA_";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` {}", section_label(.section))]
    #[diagnostic(
        code(comanda::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Dotted section the key was found in; empty at the top level.
        section: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a comanda setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(
        code(comanda::config::invalid_type),
        help("quote text values; coordinates and prices are plain numbers")
    )]
    InvalidType {
        key: String,
        detail: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A setting the bot cannot start without.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(comanda::config::missing_key),
        help("set `{key}` in comanda.toml or export {env_var}")
    )]
    MissingKey { key: String, env_var: String },

    #[error("restaurant location is invalid: {reason}")]
    #[diagnostic(
        code(comanda::config::location),
        help("restaurant.latitude must be within [-90, 90] and restaurant.longitude within [-180, 180]")
    )]
    InvalidLocation { reason: String },

    #[error("`{key}` must be {requirement}, got {value}")]
    #[diagnostic(
        code(comanda::config::pricing),
        help("a delivery costs kilometers x delivery.rate_per_km, rounded by delivery.rounding")
    )]
    InvalidPricing {
        key: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("validation error: {message}")]
    #[diagnostic(code(comanda::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(comanda::config::other))]
    Other(String),
}

impl ConfigError {
    /// A missing key together with its environment override.
    pub fn missing(key: &str) -> Self {
        Self::MissingKey {
            key: key.to_string(),
            env_var: env_var_for(key),
        }
    }

    fn from_figment(error: figment::Error, sources: &[(String, String)]) -> Self {
        let path: Vec<String> = error.path.clone();
        match &error.kind {
            Kind::UnknownField(field, expected) => {
                let (span, src) = locate(&error, &path, field, sources);
                Self::UnknownKey {
                    key: field.clone(),
                    section: path.join("."),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => {
                let mut full = path;
                full.push(field.to_string());
                Self::missing(&full.join("."))
            }
            Kind::InvalidType(actual, expected) => {
                let (section, field) = match path.split_last() {
                    Some((field, section)) => (section.to_vec(), field.clone()),
                    None => (Vec::new(), String::new()),
                };
                let (span, src) = locate(&error, &section, &field, sources);
                Self::InvalidType {
                    key: path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    span,
                    src,
                }
            }
            _ => Self::Other(error.to_string()),
        }
    }
}

fn section_label(section: &str) -> String {
    if section.is_empty() {
        "at the top level".to_string()
    } else {
        format!("in [{section}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// `telegram.bot_token` -> `COMANDA_TELEGRAM_BOT_TOKEN`.
pub fn env_var_for(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.replace('.', "_").to_uppercase())
}

/// Splits a figment error into one diagnostic per underlying problem.
///
/// `sources` pairs each TOML file path (or `<inline>`) with its content and
/// is only used to attach source spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| ConfigError::from_figment(error, sources))
        .collect()
}

/// Finds the file an error came from and the key's span inside it.
///
/// Errors from a TOML string carry no file path; a lone source is assumed
/// to be that string.
fn locate(
    error: &figment::Error,
    section: &[String],
    field: &str,
    sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let source = match file {
        Some(path) => sources.iter().find(|(p, _)| *p == path),
        None if sources.len() == 1 => sources.first(),
        None => None,
    };

    let Some((name, content)) = source else {
        return (None, None);
    };
    match find_key_offset(content, section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(name, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` inside the `[section]` table of a TOML document.
///
/// Nested sections are matched by their dotted header (`[a.b]`). An empty
/// section searches the lines before the first table header.
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let header = (!section.is_empty()).then(|| format!("[{}]", section.join(".")));
    let mut in_section = header.is_none();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            in_section = header
                .as_deref()
                .is_some_and(|h| trimmed.trim_end().starts_with(h));
        } else if in_section
            && let Some(rest) = trimmed.strip_prefix(field)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + line.len() - trimmed.len());
        }
        offset += line.len();
    }
    None
}

/// Closest valid key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each error to stderr with miette's graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
