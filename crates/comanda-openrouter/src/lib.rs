// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenRouter provider adapter for Comanda.
//!
//! Implements [`ProviderAdapter`] over the OpenAI-compatible chat
//! completions endpoint. The agent hands over the full message list (system
//! prompt first) and gets back the first choice's text.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use comanda_config::model::OpenRouterConfig;
use comanda_core::{
    AdapterType, ComandaError, HealthStatus, PluginAdapter, ProviderAdapter, ProviderRequest,
    ProviderResponse,
};
use tracing::{debug, info, warn};

use crate::client::{ClientOptions, OpenRouterClient};
use crate::types::{ApiMessage, CompletionRequest};

/// OpenRouter provider implementing [`ProviderAdapter`].
pub struct OpenRouterProvider {
    client: OpenRouterClient,
    default_model: String,
}

impl OpenRouterProvider {
    /// Creates a provider from configuration. The API key is required.
    pub fn new(config: &OpenRouterConfig) -> Result<Self, ComandaError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ComandaError::Config("openrouter.api_key is not set".into()))?;

        let client = OpenRouterClient::new(
            api_key,
            ClientOptions {
                base_url: config.base_url.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
                referer: config.referer.clone(),
                app_title: config.app_title.clone(),
            },
        )?;

        info!(model = config.model, "OpenRouter provider initialized");

        Ok(Self {
            client,
            default_model: config.model.clone(),
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn to_completion_request(&self, request: &ProviderRequest) -> CompletionRequest {
        let model = if request.model.trim().is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };
        CompletionRequest {
            model,
            messages: request.messages.iter().map(ApiMessage::from).collect(),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ComandaError> {
        // A real request would be billed, so health is assumed.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ComandaError> {
        debug!("OpenRouter provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenRouterProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ComandaError> {
        let api_request = self.to_completion_request(&request);
        let response = match self.client.complete(&api_request).await {
            Ok(r) => r,
            Err(e) => {
                metrics::counter!("comanda_provider_errors_total").increment(1);
                return Err(e);
            }
        };

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty());

        let Some(content) = content else {
            warn!(id = ?response.id, "completion contained no text");
            metrics::counter!("comanda_provider_errors_total").increment(1);
            return Err(ComandaError::Provider {
                message: "completion contained no text".into(),
                source: None,
            });
        };

        Ok(ProviderResponse {
            content,
            model: response.model.unwrap_or(api_request.model),
        })
    }
}
