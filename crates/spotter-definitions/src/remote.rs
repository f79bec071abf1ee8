//! HTTP client for a remote definition service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::DefinitionError;
use crate::service::DictionaryService;
use crate::wire::{DefinitionRequest, DefinitionResponse, Definitions, ServiceErrorBody};

/// Calls a service that speaks the `/get_definitions` contract.
pub struct HttpDictionaryClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpDictionaryClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DictionaryService for HttpDictionaryClient {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn define(&self, keywords: &[String]) -> Result<Definitions, DefinitionError> {
        if keywords.is_empty() {
            return Err(DefinitionError::Validation("Missing keywords".to_string()));
        }

        let request = DefinitionRequest {
            keywords: keywords.to_vec(),
        };
        tracing::debug!(
            endpoint = %self.endpoint,
            keyword_count = keywords.len(),
            "Requesting definitions"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let parsed: DefinitionResponse = serde_json::from_slice(&body)
                .map_err(|e| DefinitionError::MalformedResponse(e.to_string()))?;
            return Ok(parsed.definitions);
        }

        let message = serde_json::from_slice::<ServiceErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));

        if status == StatusCode::BAD_REQUEST {
            Err(DefinitionError::Validation(message))
        } else {
            Err(DefinitionError::Generation(message))
        }
    }
}
