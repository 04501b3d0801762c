//! Language detection, snippet extraction and directory traversal
//!
//! Turns files on disk into ordered function snippets. Python is parsed
//! with tree-sitter by default; the other languages go through the
//! pattern-based extractor unless configured otherwise.

mod ast_parser;
mod extractor;
mod file_walker;
mod language;
mod pattern;

pub use ast_parser::{AstParser, StructuralGrammar};
pub use extractor::{Extraction, ExtractionStrategy, SnippetExtractor, extract_snippets};
pub use file_walker::{DiscoveredFile, FileWalker, WalkOutcome};
pub use language::{SupportedLanguage, classify};
pub use pattern::PatternSet;

use std::path::PathBuf;

/// Raw text of one function, signature included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSnippet {
    pub content: String,
    /// File the snippet was read from
    pub file_path: PathBuf,
    pub language: SupportedLanguage,
}
