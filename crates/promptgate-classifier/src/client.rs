//! Abstract completion-client boundary
//!
//! The gateway treats every language-model provider as a single
//! `generate(prompt) -> text` capability. Provider-specific adapters live
//! behind this trait; the bundled implementation speaks a minimal JSON
//! HTTP contract.

use async_trait::async_trait;
use promptgate_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A text-generation capability used for classification calls
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a completion for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// HTTP completion client.
///
/// Posts `{"prompt": ...}` to the configured endpoint and expects
/// `{"text": ...}` back. Transport-level timeouts are owned by the adapter,
/// not this client.
pub struct HttpCompletionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpCompletionClient {
    /// Create a client for the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::classifier(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// The configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .map_err(|e| Error::classifier(format!("transport failure: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::classifier(format!(
                "classification endpoint returned {}",
                status
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::classifier(format!("unreadable response body: {}", e)))?;

        Ok(body.text)
    }
}
