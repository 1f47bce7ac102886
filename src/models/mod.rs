//! Embedding providers

pub mod ollama;
pub mod openai;

pub use ollama::OllamaModel;
pub use openai::OpenAIModel;

use crate::core::{ModelConfig, ProviderKind, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Per-call knobs passed through to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {
    /// Maximum input length (tokens) the provider should consider.
    pub max_length: usize,
    /// Number of texts per upstream request.
    pub batch_size: usize,
}

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    fn name(&self) -> &str;

    /// Dimension the provider is declared to produce.
    fn dimension(&self) -> usize;

    /// Embeds `texts` in a single upstream request.
    ///
    /// The output is index-aligned with `texts` as far as the provider answered; it
    /// may be shorter, and any element may have the wrong length.
    async fn generate(&self, texts: Vec<String>, max_length: usize) -> Result<Vec<Vec<f32>>>;

    /// Embeds `texts` in chunks of `options.batch_size`.
    ///
    /// Every chunk's output is padded (with empty vectors) or truncated to the chunk's
    /// length, so the result always has exactly `texts.len()` elements and a short
    /// chunk never shifts later vectors onto the wrong input.
    async fn generate_batch(&self, texts: Vec<String>, options: EmbedOptions) -> Result<Vec<Vec<f32>>> {
        let batch_size = options.batch_size.max(1);
        let mut embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(batch_size) {
            let mut chunk_embeddings = self.generate(chunk.to_vec(), options.max_length).await?;
            chunk_embeddings.resize_with(chunk.len(), Vec::new);
            embeddings.extend(chunk_embeddings);
        }

        Ok(embeddings)
    }
}

/// Builds the provider named by the configuration.
pub fn build_model(config: &ModelConfig) -> Result<Arc<dyn EmbeddingModel>> {
    let model: Arc<dyn EmbeddingModel> = match config.provider {
        ProviderKind::OpenAI => Arc::new(OpenAIModel::new(config)?),
        ProviderKind::Ollama => Arc::new(OllamaModel::new(config)?),
    };
    tracing::info!(
        "Using {:?} embedding provider: {} (dim {})",
        config.provider,
        model.name(),
        model.dimension()
    );
    Ok(model)
}
