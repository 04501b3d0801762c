//! Process-wide encoder used to attach a vector to every snippet

use super::{EmbeddingProvider, FastEmbedManager};
use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Arc<EmbeddingGenerator>> = OnceLock::new();

/// Snippet characters shown when an embedding failure is logged
const LOG_PREVIEW_CHARS: usize = 50;

/// Whether the encoder loaded; fixed for the life of a generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderStatus {
    Ready,
    Unavailable,
}

/// Wraps an [`EmbeddingProvider`] and turns every failure into `None`.
///
/// A generator whose model failed to load stays unavailable; callers get
/// records without embeddings instead of errors.
pub struct EmbeddingGenerator {
    provider: Option<Arc<dyn EmbeddingProvider>>,
    unavailable_reason: Option<String>,
}

impl EmbeddingGenerator {
    /// Load the configured model. Failure is logged and yields an
    /// unavailable generator.
    pub fn initialize(config: &EmbeddingConfig) -> Self {
        match FastEmbedManager::from_config(config) {
            Ok(manager) => {
                tracing::info!("Embedding model {} loaded", manager.model_name());
                Self::with_provider(Arc::new(manager))
            }
            Err(e) => {
                let error = EmbeddingError::InitializationFailed(format!("{:#}", e));
                tracing::error!("{}; records will carry no embeddings", error);
                Self::unavailable(error.to_string())
            }
        }
    }

    pub fn with_provider(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider: Some(provider),
            unavailable_reason: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            provider: None,
            unavailable_reason: Some(reason.into()),
        }
    }

    /// The shared generator, loaded on first call.
    ///
    /// Only the first caller's configuration is used; later calls get the
    /// same instance whatever they pass.
    pub fn global(config: &EmbeddingConfig) -> Arc<Self> {
        GLOBAL
            .get_or_init(|| Arc::new(Self::initialize(config)))
            .clone()
    }

    pub fn status(&self) -> EncoderStatus {
        if self.provider.is_some() {
            EncoderStatus::Ready
        } else {
            EncoderStatus::Unavailable
        }
    }

    pub fn dimension(&self) -> Option<usize> {
        self.provider.as_ref().map(|p| p.dimension())
    }

    pub fn model_name(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.model_name())
    }

    /// Embed one snippet, reporting why no vector came back.
    pub fn try_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let Some(provider) = &self.provider else {
            return Err(EmbeddingError::Unavailable(
                self.unavailable_reason
                    .clone()
                    .unwrap_or_else(|| "no encoder loaded".to_string()),
            ));
        };

        let embedding = provider
            .embed_batch(vec![text.to_string()])
            .map_err(|e| EmbeddingError::GenerationFailed(format!("{:#}", e)))?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyOutput)?;

        if embedding.is_empty() {
            return Err(EmbeddingError::EmptyOutput);
        }
        if embedding.len() != provider.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: provider.dimension(),
                actual: embedding.len(),
            });
        }
        if !embedding.iter().all(|v| v.is_finite()) {
            return Err(EmbeddingError::NonFinite);
        }

        Ok(embedding)
    }

    /// Embed one snippet; any failure is logged and gives `None`.
    pub fn embed(&self, text: &str) -> Option<Vec<f32>> {
        match self.try_embed(text) {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                let preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
                tracing::warn!("No embedding for snippet {:?}...: {}", preview, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for EmbeddingGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingGenerator")
            .field("status", &self.status())
            .field("model", &self.model_name())
            .field("unavailable_reason", &self.unavailable_reason)
            .finish()
    }
}
