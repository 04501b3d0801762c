/// Centralized error types for code-summarizer using thiserror
///
/// File-level and snippet-level failures are recovered inside the pipeline;
/// these types describe them for logging and for the few operations that do
/// surface errors (configuration, an inaccessible root, sinks).
use thiserror::Error;

/// Main error type for the summarizer
#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Indexing error: {0}")]
    Indexing(#[from] IndexingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors related to embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    InitializationFailed(String),

    #[error("Embedding model is unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),

    #[error("Encoder returned no embedding")]
    EmptyOutput,

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding contains non-finite values")]
    NonFinite,

    #[error("Unknown embedding model: {0}")]
    UnknownModel(String),

    #[error("Model lock was poisoned: {0}")]
    LockPoisoned(String),
}

/// Errors raised while pulling snippets out of a single file
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to read file '{file}': {reason}")]
    FileReadFailed { file: String, reason: String },

    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Syntax error in '{0}'")]
    SyntaxError(String),

    #[error("Failed to parse code: {0}")]
    ParseFailed(String),

    #[error("Failed to load grammar for {language}: {reason}")]
    GrammarFailed { language: String, reason: String },

    #[error("Invalid extraction pattern for {language}: {reason}")]
    InvalidPattern { language: String, reason: String },

    #[error("Extraction was cancelled")]
    Cancelled,
}

/// Errors related to repository traversal and per-file processing
#[derive(Error, Debug)]
pub enum IndexingError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to walk directory: {0}")]
    WalkFailed(String),

    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Processing of '{file}' timed out after {seconds} seconds")]
    FileTimeout { file: String, seconds: u64 },

    #[error("Repository time budget exhausted before '{0}' was processed")]
    RepositoryTimeout(String),

    #[error("Worker for '{file}' panicked: {reason}")]
    WorkerPanicked { file: String, reason: String },

    #[error("Processing was cancelled")]
    Cancelled,
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors raised by record sinks
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to serialize record for '{file}': {reason}")]
    SerializeFailed { file: String, reason: String },

    #[error("Failed to write records: {0}")]
    WriteFailed(String),
}

// Conversion from anyhow::Error to SummarizerError
impl From<anyhow::Error> for SummarizerError {
    fn from(err: anyhow::Error) -> Self {
        SummarizerError::Other(format!("{:#}", err))
    }
}

impl SummarizerError {
    /// Check if this is a user error (bad configuration or input path) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SummarizerError::Config(_)
                | SummarizerError::Indexing(IndexingError::DirectoryNotFound(_))
                | SummarizerError::Indexing(IndexingError::NotADirectory(_))
        )
    }
}
