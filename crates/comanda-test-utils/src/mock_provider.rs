// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use comanda_core::{
    AdapterType, ComandaError, HealthStatus, PluginAdapter, ProviderAdapter, ProviderRequest,
    ProviderResponse,
};

/// A mock provider that replays a script.
///
/// Each entry is either a reply or an error message. When the script runs
/// out, a default "mock response" reply is returned. Every request is
/// recorded for later assertions.
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-loads successful replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(Ok(text.into()));
    }

    /// Queues a failed call.
    pub async fn add_error(&self, message: impl Into<String>) {
        self.script.lock().await.push_back(Err(message.into()));
    }

    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().await.last().cloned()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ComandaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ComandaError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ComandaError> {
        let model = request.model.clone();
        self.requests.lock().await.push(request);

        let next = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock response".to_string()));

        match next {
            Ok(content) => Ok(ProviderResponse { content, model }),
            Err(message) => Err(ComandaError::Provider {
                message,
                source: None,
            }),
        }
    }
}
