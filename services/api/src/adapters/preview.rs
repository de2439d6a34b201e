//! services/api/src/adapters/preview.rs
//!
//! This module contains the adapter for the AI preview-generation service.
//! It implements the `PreviewGenerationService` port from the `core` crate by
//! POSTing `{"prompt": ...}` and reading `{"imageUrl": ...}` back.

use async_trait::async_trait;
use painting_order_core::{PortError, PortResult, PreviewGenerationService};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct PreviewRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewResponse {
    image_url: Option<String>,
    error: Option<String>,
}

impl PreviewResponse {
    fn into_image_url(self) -> PortResult<String> {
        if let Some(message) = self.error {
            return Err(PortError::Unexpected(format!(
                "Preview service reported an error: {}",
                message
            )));
        }
        self.image_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                PortError::Unexpected(
                    "Preview service response contained no image URL.".to_string(),
                )
            })
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `PreviewGenerationService` over HTTP.
#[derive(Clone)]
pub struct HttpPreviewAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpPreviewAdapter {
    /// Creates a new `HttpPreviewAdapter` with its own client and request timeout.
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

//=========================================================================================
// `PreviewGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PreviewGenerationService for HttpPreviewAdapter {
    async fn generate_image(&self, prompt: &str) -> PortResult<String> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&PreviewRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Preview service returned {}: {}", status, body);
            return Err(PortError::Unexpected(format!(
                "Preview service error ({}): {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json::<PreviewResponse>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into_image_url()
    }
}
