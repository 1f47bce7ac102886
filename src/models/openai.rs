//! OpenAI-compatible embeddings endpoint
//!
//! Works against api.openai.com as well as self-hosted servers exposing the same
//! `/embeddings` route (text-embeddings-inference, vLLM, LocalAI serving BAAI/bge-m3).

use crate::core::{GatewayError, ModelConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct OpenAIModel {
    name: String,
    dimension: usize,
    client: Client,
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl OpenAIModel {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: config.model_name.clone(),
            dimension: config.dimension,
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url(),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl crate::models::EmbeddingModel for OpenAIModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    // Truncation is left to the server; the route has no max-length field.
    async fn generate(&self, texts: Vec<String>, _max_length: usize) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let count = texts.len();
        let request = OpenAIEmbeddingRequest {
            model: self.name.clone(),
            input: texts,
        };

        let mut builder = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::from_provider(e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider(format!(
                "OpenAI API error: {} - {}",
                status, error_text
            )));
        }

        let embedding_response: OpenAIEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Provider(format!("Failed to parse response: {}", e)))?;

        // `data` is not guaranteed to come back in input order; place by `index`.
        let mut embeddings = vec![Vec::new(); count];
        for item in embedding_response.data {
            if let Some(slot) = embeddings.get_mut(item.index) {
                *slot = item.embedding;
            }
        }

        Ok(embeddings)
    }
}

#[derive(Serialize)]
struct OpenAIEmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize)]
struct OpenAIEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}
