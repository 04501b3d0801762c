//! Core library client for code-summarizer
//!
//! This module provides the main client interface for turning a file or a
//! whole repository into function records.

mod processing;

use crate::config::Config;
use crate::embedding::{EmbeddingGenerator, EncoderStatus};
use crate::error::SummarizerError;
use crate::indexer::SnippetExtractor;
use crate::paths::to_posix_string;
use crate::types::{FunctionRecord, ProcessingResult};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Main client for summarizing source code
///
/// Holds the extraction strategy table, the encoder and the configuration.
/// Cloning is cheap; every worker gets its own clone.
///
/// # Example
///
/// ```no_run
/// use code_summarizer::{Config, SummarizerClient};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = SummarizerClient::with_config(Config::default())?;
///
///     let result = client
///         .process_repository("/path/to/checkout", "https://github.com/owner/repo")
///         .await?;
///     println!("{}", result);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct SummarizerClient {
    pub(crate) config: Arc<Config>,
    pub(crate) extractor: Arc<SnippetExtractor>,
    pub(crate) encoder: Arc<EmbeddingGenerator>,
}

impl SummarizerClient {
    /// Create a client from the default configuration file and environment
    ///
    /// Loading the encoder may download model files; call it off the async
    /// runtime or inside `spawn_blocking`.
    pub fn new() -> Result<Self, SummarizerError> {
        let config = Config::new()?;
        Self::with_config(config)
    }

    /// Create a client that shares the process-wide encoder
    ///
    /// The encoder is loaded on first use with this configuration's
    /// embedding section. A model that fails to load leaves the encoder
    /// unavailable; records are still produced, without embeddings.
    pub fn with_config(config: Config) -> Result<Self, SummarizerError> {
        config.validate()?;
        let encoder = EmbeddingGenerator::global(&config.embedding);
        Self::with_encoder(config, encoder)
    }

    /// Create a client around an explicit encoder
    pub fn with_encoder(
        config: Config,
        encoder: Arc<EmbeddingGenerator>,
    ) -> Result<Self, SummarizerError> {
        config.validate()?;
        tracing::debug!("Embedding model: {:?}", encoder.model_name());
        tracing::debug!("Worker pool size: {}", config.indexing.max_workers);
        tracing::debug!(
            "Structural languages: {:?}",
            config.extraction.structural_languages
        );

        let extractor = SnippetExtractor::new(&config.extraction)?;

        Ok(Self {
            config: Arc::new(config),
            extractor: Arc::new(extractor),
            encoder,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn encoder_status(&self) -> EncoderStatus {
        self.encoder.status()
    }

    /// Turn one file into records, in extraction order.
    ///
    /// Unsupported, unreadable or unparsable files give an empty list.
    /// `file_path` in each record is `path` as given, with forward slashes.
    pub fn process_file(&self, path: impl AsRef<Path>, repo_id: &str) -> Vec<FunctionRecord> {
        let path = path.as_ref();
        let display_path = to_posix_string(path);

        match self.summarize_file(path, &display_path, repo_id, &CancellationToken::new()) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Skipping file {}: {}", display_path, e);
                Vec::new()
            }
        }
    }

    /// Process every supported file under `root` on the worker pool.
    ///
    /// Fails only when `root` is missing, not a directory or cannot be
    /// listed. Per-file failures are logged and counted in the result.
    pub async fn process_repository(
        &self,
        root: impl AsRef<Path>,
        repo_id: &str,
    ) -> Result<ProcessingResult, SummarizerError> {
        processing::process_repository(self, root.as_ref(), repo_id).await
    }
}
