//! # Code Summarizer - Function Extraction and Embedding for Source Repositories
//!
//! Walks a checked-out repository, pulls every function or method out of
//! the supported source files, and turns each one into a record carrying
//! the raw code, a one-line description and a dense embedding vector.
//!
//! ## Key Features
//!
//! - **Eight Languages**: Python, JavaScript, TypeScript, Java, C, C++, C# and Go
//! - **Structural Extraction**: Tree-sitter parsing (Python by default, any
//!   supported language on request)
//! - **Pattern Extraction**: Header regexes plus brace matching for the rest
//! - **Local Embeddings**: FastEmbed (all-MiniLM-L6-v2 by default), loaded
//!   once per process
//! - **Bounded Concurrency**: Per-file workers with file and repository
//!   time limits
//! - **Failure Isolation**: A bad file costs its own records, never the run
//!
//! ## Architecture
//!
//! ```text
//! process_repository
//!        |
//!   FileWalker ──> worker pool (max_workers)
//!                      |
//!        classify ─> extract ─> embed + describe ─> FunctionRecord
//!                      |
//!        merge in traversal order ─> ProcessingResult ─> RecordSink
//! ```
//!
//! ## Modules
//!
//! - [`client`]: File processor and repository aggregator
//! - [`indexer`]: Language detection, snippet extraction and file walking
//! - [`embedding`]: Embedding generation using FastEmbed
//! - [`summary`]: Deterministic one-line descriptions
//! - [`sink`]: Record destinations (memory, JSON Lines, JSON array)
//! - [`config`]: Configuration management with environment variable support
//! - [`types`]: Record and result types
//! - [`error`]: Error types
//! - [`paths`]: Platform directories and path normalization
//!
//! ## Usage Example
//!
//! ```no_run
//! use code_summarizer::{Config, SummarizerClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SummarizerClient::with_config(Config::default())?;
//!
//!     let result = client.process_repository("./my-repo", "my-repo").await?;
//!     for record in &result.records {
//!         println!("{}: {}", record.file_path, record.summary);
//!     }
//!
//!     Ok(())
//! }
//! ```

/// File processing and repository aggregation
pub mod client;

/// Configuration management with environment variable overrides
pub mod config;

/// Embedding generation using FastEmbed
pub mod embedding;

/// Error types and utilities
pub mod error;

/// Language detection, snippet extraction and directory traversal
pub mod indexer;

/// Platform directories and path normalization
pub mod paths;

/// Record destinations
pub mod sink;

/// One-line snippet descriptions
pub mod summary;

/// Function records and processing results
pub mod types;

pub use client::SummarizerClient;
pub use config::Config;
pub use embedding::{EmbeddingGenerator, EncoderStatus};
pub use error::SummarizerError;
pub use indexer::{CodeSnippet, SupportedLanguage, classify, extract_snippets};
pub use summary::describe;
pub use types::{FunctionRecord, ProcessingResult};
