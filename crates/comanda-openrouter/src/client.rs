// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenRouter chat completions API.
//!
//! Provides [`OpenRouterClient`] which handles authentication, the app
//! attribution headers, and one retry on transient errors.

use std::time::Duration;

use comanda_core::ComandaError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, CompletionRequest, CompletionResponse};

/// Default OpenRouter API base.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Options beyond the API key.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
    /// Sent as `HTTP-Referer`.
    pub referer: Option<String>,
    /// Sent as `X-Title`.
    pub app_title: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            referer: None,
            app_title: None,
        }
    }
}

/// HTTP client for OpenRouter.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenRouterClient {
    pub fn new(api_key: &str, options: ClientOptions) -> Result<Self, ComandaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| ComandaError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(referer) = &options.referer {
            headers.insert(
                "HTTP-Referer",
                HeaderValue::from_str(referer)
                    .map_err(|e| ComandaError::Config(format!("invalid referer header value: {e}")))?,
            );
        }
        if let Some(title) = &options.app_title {
            headers.insert(
                "X-Title",
                HeaderValue::from_str(title)
                    .map_err(|e| ComandaError::Config(format!("invalid title header value: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|e| ComandaError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/chat/completions",
                options.base_url.trim_end_matches('/')
            ),
            timeout: options.timeout,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Shortens the pause between attempts (for tests).
    #[cfg(test)]
    pub(crate) fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sends a completion request.
    ///
    /// On transient errors (429, 500, 502, 503), retries once after a short delay.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ComandaError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .await
                .map_err(|e| self.request_error(e))?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| self.request_error(e))?;
                return serde_json::from_str(&body).map_err(|e| ComandaError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(api_error(status, &body));
                continue;
            }

            return Err(api_error(status, &body));
        }

        Err(last_error.unwrap_or_else(|| ComandaError::Provider {
            message: "completion request failed after retries".into(),
            source: None,
        }))
    }

    fn request_error(&self, e: reqwest::Error) -> ComandaError {
        if e.is_timeout() {
            ComandaError::Timeout {
                duration: self.timeout,
            }
        } else {
            ComandaError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

fn api_error(status: reqwest::StatusCode, body: &str) -> ComandaError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!("OpenRouter API error ({status}): {}", api_err.error.message),
        Err(_) => format!("API returned {status}: {body}"),
    };
    ComandaError::Provider {
        message,
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
