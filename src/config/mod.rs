/// Configuration system for code-summarizer
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::embedding::ModelChoice;
use crate::error::{ConfigError, SummarizerError};
use crate::indexer::SupportedLanguage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Traversal and worker pool configuration
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Per-language extraction strategy selection
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Local output written by the CLI
    #[serde(default)]
    pub output: OutputConfig,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name (e.g., "all-MiniLM-L6-v2", "jinaai/jina-embeddings-v2-base-code")
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Token budget per snippet; longer input is truncated
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Where downloaded model files are cached
    #[serde(default = "default_model_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default)]
    pub show_download_progress: bool,
}

/// Traversal and worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Maximum file size to process (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Files processed concurrently
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Ceiling for one file, extraction and embedding included
    #[serde(default = "default_file_timeout")]
    pub file_timeout_secs: u64,

    /// Ceiling for a whole repository run; unset means unbounded
    #[serde(default)]
    pub repository_timeout_secs: Option<u64>,

    /// Honor .gitignore and friends while walking
    #[serde(default)]
    pub respect_gitignore: bool,

    /// Glob patterns (relative to the root) to leave out
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Per-language extraction strategy selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Languages parsed with tree-sitter; the rest use header patterns
    #[serde(default = "default_structural_languages")]
    pub structural_languages: Vec<SupportedLanguage>,
}

/// Local output written by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,
}

/// Serialization used for the local output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One pretty-printed JSON array
    #[default]
    Json,
    /// One record per line
    Jsonl,
}

// Default value functions
fn default_model_name() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_max_tokens() -> usize {
    512
}

fn default_model_cache_dir() -> PathBuf {
    crate::paths::PlatformPaths::default_model_cache_path()
}

fn default_max_file_size() -> u64 {
    1_048_576 // 1 MB
}

/// Upper bound for `indexing.max_workers`
pub const MAX_WORKERS: usize = 1024;

fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().min(MAX_WORKERS))
        .unwrap_or(4)
}

fn default_file_timeout() -> u64 {
    120
}

fn default_structural_languages() -> Vec<SupportedLanguage> {
    vec![SupportedLanguage::Python]
}

fn default_output_path() -> PathBuf {
    PathBuf::from("outputs").join("summaries.json")
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            max_tokens: default_max_tokens(),
            cache_dir: default_model_cache_dir(),
            show_download_progress: false,
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_workers: default_max_workers(),
            file_timeout_secs: default_file_timeout(),
            repository_timeout_secs: None,
            respect_gitignore: false,
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            structural_languages: default_structural_languages(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, SummarizerError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, SummarizerError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), SummarizerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), SummarizerError> {
        if ModelChoice::from_name(&self.embedding.model_name).is_none() {
            return Err(ConfigError::InvalidValue {
                key: "embedding.model_name".to_string(),
                reason: format!(
                    "unknown model '{}', expected one of: {}",
                    self.embedding.model_name,
                    ModelChoice::known_names().join(", ")
                ),
            }
            .into());
        }

        if self.embedding.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                key: "embedding.max_tokens".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.indexing.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "indexing.max_file_size".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.indexing.max_workers == 0 || self.indexing.max_workers > MAX_WORKERS {
            return Err(ConfigError::InvalidValue {
                key: "indexing.max_workers".to_string(),
                reason: format!("must be between 1 and {}", MAX_WORKERS),
            }
            .into());
        }

        if self.indexing.file_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "indexing.file_timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.indexing.repository_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "indexing.repository_timeout_secs".to_string(),
                reason: "must be greater than 0 when set".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; split out so tests need not
    /// touch the process environment.
    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("CODE_SUMMARIZER_MODEL") {
            self.embedding.model_name = model;
        }

        if let Some(max_tokens) = lookup("CODE_SUMMARIZER_MAX_TOKENS")
            && let Ok(tokens) = max_tokens.parse()
        {
            self.embedding.max_tokens = tokens;
        }

        if let Some(workers) = lookup("CODE_SUMMARIZER_WORKERS")
            && let Ok(count) = workers.parse()
        {
            self.indexing.max_workers = count;
        }

        if let Some(timeout) = lookup("CODE_SUMMARIZER_FILE_TIMEOUT")
            && let Ok(secs) = timeout.parse()
        {
            self.indexing.file_timeout_secs = secs;
        }

        if let Some(size) = lookup("CODE_SUMMARIZER_MAX_FILE_SIZE")
            && let Ok(bytes) = size.parse()
        {
            self.indexing.max_file_size = bytes;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, SummarizerError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
