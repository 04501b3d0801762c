use super::{EmbeddingProvider, ModelChoice};
use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;
use anyhow::{Context, Result};
use fastembed::{InitOptions, TextEmbedding};
use std::sync::Mutex;

/// FastEmbed-based embedding provider (ONNX runtime, inference only)
pub struct FastEmbedManager {
    // `TextEmbedding::embed` takes `&mut self`
    model: Mutex<TextEmbedding>,
    choice: ModelChoice,
}

impl FastEmbedManager {
    /// Create a new FastEmbedManager with the default model (all-MiniLM-L6-v2)
    pub fn new() -> Result<Self> {
        Self::from_config(&EmbeddingConfig::default())
    }

    /// Load the model named in the configuration, downloading it into the
    /// cache directory on first use.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let choice = ModelChoice::from_name(&config.model_name)
            .ok_or_else(|| EmbeddingError::UnknownModel(config.model_name.clone()))?;

        tracing::info!(
            "Initializing FastEmbed model: {} (max {} tokens, cache {})",
            choice,
            config.max_tokens,
            config.cache_dir.display()
        );

        let mut options = InitOptions::default();
        options.model_name = choice.fastembed_model();
        options.max_length = config.max_tokens;
        options.cache_dir = config.cache_dir.clone();
        options.show_download_progress = config.show_download_progress;

        let embedding_model =
            TextEmbedding::try_new(options).context("Failed to initialize FastEmbed model")?;

        Ok(Self {
            model: Mutex::new(embedding_model),
            choice,
        })
    }

    pub fn choice(&self) -> ModelChoice {
        self.choice
    }
}

impl EmbeddingProvider for FastEmbedManager {
    fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!("Generating embeddings for {} texts", texts.len());

        let mut model = self
            .model
            .lock()
            .map_err(|e| EmbeddingError::LockPoisoned(e.to_string()))?;
        let embeddings = model
            .embed(texts, None)
            .context("Failed to generate embeddings")?;

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.choice.dimension()
    }

    fn model_name(&self) -> &str {
        self.choice.name()
    }
}
