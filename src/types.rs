use crate::indexer::SupportedLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One extracted function with its label and optional embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Caller-supplied identifier of the repository, stored verbatim
    #[serde(rename = "repo_url")]
    pub repo_id: String,
    /// Path of the source file, forward slashes
    pub file_path: String,
    pub language: SupportedLanguage,
    /// Raw function text, signature included
    pub function_code: String,
    /// Short human-readable description
    pub summary: String,
    /// Encoder output; absent when the encoder was unavailable or failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl FunctionRecord {
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }

    /// True when the embedding, if any, is non-empty and all finite.
    pub fn embedding_is_valid(&self) -> bool {
        match &self.embedding {
            Some(values) => !values.is_empty() && values.iter().all(|v| v.is_finite()),
            None => true,
        }
    }
}

/// Result of processing a repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Records in traversal order, then extraction order within a file
    pub records: Vec<FunctionRecord>,
    /// Number of files that produced at least one record
    pub files_with_records: usize,
    /// Number of supported files handed to a worker
    pub files_visited: usize,
    /// Files that failed, timed out or were never started
    pub files_failed: usize,
    /// Supported files left out because of their size
    pub files_skipped: usize,
    /// Any errors encountered (non-fatal)
    #[serde(default)]
    pub errors: Vec<String>,
    /// Time taken in milliseconds
    pub duration_ms: u64,
}

impl ProcessingResult {
    /// Number of records that carry an embedding
    pub fn embeddings_generated(&self) -> usize {
        self.records.iter().filter(|r| r.has_embedding()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Human-readable lines for the first `limit` records
    pub fn preview(&self, limit: usize) -> String {
        self.records
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, record)| {
                format!(
                    "{:>3}. {} [{}] {} (embedding: {})",
                    i + 1,
                    record.file_path,
                    record.language,
                    record.summary,
                    if record.has_embedding() { "yes" } else { "no" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for ProcessingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} functions from {} files ({} visited, {} failed, {} skipped, {} embedded) in {} ms",
            self.records.len(),
            self.files_with_records,
            self.files_visited,
            self.files_failed,
            self.files_skipped,
            self.embeddings_generated(),
            self.duration_ms
        )
    }
}

#[cfg(test)]
mod tests;
