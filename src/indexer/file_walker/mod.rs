//! File walking functionality for directory traversal

use super::language::{SupportedLanguage, classify};
use crate::error::IndexingError;
use crate::paths::to_posix_string;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// A supported source file found under the walk root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Path relative to the root, with forward slashes
    pub relative_path: String,
    pub language: SupportedLanguage,
}

/// Everything a walk produced, including what it had to leave out
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<DiscoveredFile>,
    /// Supported files left out because of the size ceiling
    pub skipped: usize,
    /// Entries that could not be read; the walk continued past them
    pub errors: Vec<String>,
}

pub struct FileWalker {
    pub(crate) root: PathBuf,
    pub(crate) max_file_size: u64,
    pub(crate) exclude_patterns: Vec<String>,
    pub(crate) respect_gitignore: bool,
}

impl FileWalker {
    pub fn new(root: impl AsRef<Path>, max_file_size: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_file_size,
            exclude_patterns: vec![],
            respect_gitignore: false,
        }
    }

    /// Glob patterns matched against the root-relative path
    pub fn with_exclude_patterns(mut self, exclude_patterns: Vec<String>) -> Self {
        self.exclude_patterns = exclude_patterns;
        self
    }

    pub fn with_gitignore(mut self, respect_gitignore: bool) -> Self {
        self.respect_gitignore = respect_gitignore;
        self
    }

    /// Walk the directory and collect every supported regular file.
    ///
    /// Only a root that cannot be listed is an error. Unreadable entries
    /// further down are recorded in [`WalkOutcome::errors`].
    pub fn walk(&self) -> Result<WalkOutcome, IndexingError> {
        if !self.root.exists() {
            return Err(IndexingError::DirectoryNotFound(
                self.root.display().to_string(),
            ));
        }
        if !self.root.is_dir() {
            return Err(IndexingError::NotADirectory(self.root.display().to_string()));
        }
        fs::read_dir(&self.root).map_err(|e| {
            IndexingError::WalkFailed(format!("{}: {}", self.root.display(), e))
        })?;

        let excludes = self.compile_excludes()?;
        let mut outcome = WalkOutcome::default();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(self.respect_gitignore)
            .hidden(false) // Hidden files are source files too
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .require_git(false)
            .follow_links(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    outcome.errors.push(format!("Failed to read directory entry: {}", e));
                    continue;
                }
            };
            let path = entry.path();

            // Regular files only; symlinks are not followed
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            // Explicitly skip .git directory contents
            if path.components().any(|c| c.as_os_str() == ".git") {
                continue;
            }

            let Some(language) = classify(path) else {
                continue;
            };

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            let relative_path = to_posix_string(relative);

            if excludes.as_ref().is_some_and(|set| set.is_match(&relative_path)) {
                tracing::debug!("Excluded by pattern: {}", relative_path);
                continue;
            }

            match entry.metadata() {
                Ok(metadata) if metadata.len() > self.max_file_size => {
                    tracing::debug!(
                        "Skipping large file: {} ({} bytes)",
                        relative_path,
                        metadata.len()
                    );
                    outcome.skipped += 1;
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    // The file processor reports the read failure itself
                    tracing::debug!("Could not stat {}: {}", relative_path, e);
                }
            }

            outcome.files.push(DiscoveredFile {
                path: path.to_path_buf(),
                relative_path,
                language,
            });
        }

        tracing::info!(
            "Found {} supported files under {}",
            outcome.files.len(),
            self.root.display()
        );
        Ok(outcome)
    }

    pub(crate) fn compile_excludes(&self) -> Result<Option<GlobSet>, IndexingError> {
        if self.exclude_patterns.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            let glob = Glob::new(pattern).map_err(|e| IndexingError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
        }

        builder
            .build()
            .map(Some)
            .map_err(|e| IndexingError::InvalidPattern {
                pattern: self.exclude_patterns.join(", "),
                reason: e.to_string(),
            })
    }
}
