//! Ollama model integration via HTTP API
//!
//! Connects to a local or remote Ollama server for embedding generation.
//! Uses the batched `/api/embed` endpoint.

use crate::core::{GatewayError, ModelConfig, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for Ollama embed API
#[derive(Debug, Serialize)]
struct OllamaEmbedRequest {
    model: String,
    input: Vec<String>,
    truncate: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_ctx: usize,
}

/// Response from Ollama embed API
#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaModel {
    name: String,
    ollama_url: String,
    dimension: usize,
    client: reqwest::Client,
    timeout: Duration,
}

impl OllamaModel {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: config.model_name.clone(),
            ollama_url: config.base_url(),
            dimension: config.dimension,
            client,
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl crate::models::EmbeddingModel for OllamaModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn generate(&self, texts: Vec<String>, max_length: usize) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = OllamaEmbedRequest {
            model: self.name.clone(),
            input: texts,
            truncate: true,
            options: OllamaOptions { num_ctx: max_length },
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.ollama_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::from_provider(e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Provider(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: OllamaEmbedResponse = response.json().await.map_err(|e| {
            GatewayError::Provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        Ok(result.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, ProviderKind};
    use crate::models::EmbeddingModel;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model_for(server: &MockServer) -> OllamaModel {
        let mut config = Config::default().models;
        config.provider = ProviderKind::Ollama;
        config.model_name = "bge-m3".to_string();
        config.base_url = Some(server.uri());
        config.dimension = 2;
        OllamaModel::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_batch_and_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(json!({
                "model": "bge-m3",
                "input": ["x", " "],
                "truncate": true,
                "options": {"num_ctx": 512}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embeddings": [[0.1, 0.2], [0.3, 0.4]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = model_for(&server);
        let out = model
            .generate(vec!["x".to_string(), " ".to_string()], 512)
            .await
            .unwrap();
        assert_eq!(out, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let err = model.generate(vec!["x".to_string()], 512).await.unwrap_err();
        assert!(err.is_provider_failure());
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let model = model_for(&server);
        assert!(model.generate(vec![], 512).await.unwrap().is_empty());
    }
}
