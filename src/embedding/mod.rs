mod fastembed_manager;
mod generator;

pub use fastembed_manager::FastEmbedManager;
pub use generator::{EmbeddingGenerator, EncoderStatus};

use anyhow::Result;
use fastembed::EmbeddingModel;

/// Trait for embedding generation
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of text
    fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Get the dimension of the embeddings
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Encoders that can be selected by name in the configuration.
///
/// Every choice pools by averaging the final hidden states over tokens;
/// CLS-pooled models are not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelChoice {
    #[default]
    AllMiniLmL6V2,
    AllMiniLmL12V2,
    JinaV2BaseCode,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 3] = [
        ModelChoice::AllMiniLmL6V2,
        ModelChoice::AllMiniLmL12V2,
        ModelChoice::JinaV2BaseCode,
    ];

    /// Look a model up by its configured name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|choice| choice.name().eq_ignore_ascii_case(name))
    }

    pub fn known_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|choice| choice.name()).collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            ModelChoice::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            ModelChoice::AllMiniLmL12V2 => "all-MiniLM-L12-v2",
            ModelChoice::JinaV2BaseCode => "jinaai/jina-embeddings-v2-base-code",
        }
    }

    /// Length of every vector the model produces
    pub fn dimension(self) -> usize {
        match self {
            ModelChoice::AllMiniLmL6V2 => 384,
            ModelChoice::AllMiniLmL12V2 => 384,
            ModelChoice::JinaV2BaseCode => 768,
        }
    }

    pub(crate) fn fastembed_model(self) -> EmbeddingModel {
        match self {
            ModelChoice::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
            ModelChoice::AllMiniLmL12V2 => EmbeddingModel::AllMiniLML12V2,
            ModelChoice::JinaV2BaseCode => EmbeddingModel::JinaEmbeddingsV2BaseCode,
        }
    }
}

impl std::fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
