//! Language dispatch for snippet extraction

use super::ast_parser::{AstParser, StructuralGrammar};
use super::language::{SupportedLanguage, classify};
use super::pattern::PatternSet;
use super::CodeSnippet;
use crate::config::ExtractionConfig;
use crate::error::ExtractionError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// How snippets are pulled out of one language
#[derive(Debug, Clone)]
pub enum ExtractionStrategy {
    /// Full tree-sitter parse
    Structural(StructuralGrammar),
    /// Header regexes plus brace counting
    PatternBased(Arc<PatternSet>),
    /// Supported language with neither a parser nor a pattern configured
    Unsupported,
}

static UNSUPPORTED: ExtractionStrategy = ExtractionStrategy::Unsupported;

/// Snippets found in one file
#[derive(Debug, Clone)]
pub struct Extraction {
    pub language: SupportedLanguage,
    pub snippets: Vec<CodeSnippet>,
}

/// Strategy table, built once and shared across workers
#[derive(Debug, Clone)]
pub struct SnippetExtractor {
    strategies: HashMap<SupportedLanguage, ExtractionStrategy>,
}

impl SnippetExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let strategies = SupportedLanguage::ALL
            .into_iter()
            .map(|language| {
                let structural = config.structural_languages.contains(&language);
                build_strategy(language, structural).map(|strategy| (language, strategy))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self { strategies })
    }

    pub fn strategy_for(&self, language: SupportedLanguage) -> &ExtractionStrategy {
        self.strategies.get(&language).unwrap_or(&UNSUPPORTED)
    }

    /// Extract snippets from the file at `path`.
    ///
    /// `Ok(None)` means the extension is not supported. Blank snippets are
    /// already filtered out of the result.
    pub fn try_extract(&self, path: &Path) -> Result<Option<Extraction>, ExtractionError> {
        self.try_extract_cancellable(path, &CancellationToken::new())
    }

    /// Like [`try_extract`](Self::try_extract), but parsing and pattern
    /// scanning stop with [`ExtractionError::Cancelled`] once `cancel` fires.
    pub fn try_extract_cancellable(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Option<Extraction>, ExtractionError> {
        let Some(language) = classify(path) else {
            return Ok(None);
        };

        let texts = match self.strategy_for(language) {
            ExtractionStrategy::Unsupported => {
                tracing::debug!(
                    "No extraction strategy configured for {} in file {:?}",
                    language,
                    path
                );
                Vec::new()
            }
            ExtractionStrategy::Structural(grammar) => {
                let source = read_source(path)?;
                let mut parser = AstParser::new(*grammar)?;
                let origin = path.display().to_string();
                parser.extract_functions_cancellable(&source, &origin, cancel)?
            }
            ExtractionStrategy::PatternBased(patterns) => {
                let source = read_source(path)?;
                patterns.extract_cancellable(&source, cancel)?
            }
        };

        Ok(Some(Extraction {
            language,
            snippets: into_snippets(texts, path, language),
        }))
    }

    /// Like [`try_extract`](Self::try_extract), but read and parse failures
    /// are logged and turned into an empty result.
    pub fn extract(&self, path: &Path) -> (Option<SupportedLanguage>, Vec<CodeSnippet>) {
        match self.try_extract(path) {
            Ok(Some(extraction)) => (Some(extraction.language), extraction.snippets),
            Ok(None) => (None, Vec::new()),
            Err(e) => {
                tracing::warn!("Skipping file {:?} due to extraction error: {}", path, e);
                (classify(path), Vec::new())
            }
        }
    }
}

impl Default for SnippetExtractor {
    fn default() -> Self {
        let defaults = ExtractionConfig::default();
        let strategies = SupportedLanguage::ALL
            .into_iter()
            .map(|language| {
                let structural = defaults.structural_languages.contains(&language);
                let strategy = build_strategy(language, structural).unwrap_or_else(|e| {
                    tracing::error!("Disabling extraction for {}: {}", language, e);
                    ExtractionStrategy::Unsupported
                });
                (language, strategy)
            })
            .collect();

        Self { strategies }
    }
}

fn build_strategy(
    language: SupportedLanguage,
    structural: bool,
) -> Result<ExtractionStrategy, ExtractionError> {
    if structural {
        return Ok(ExtractionStrategy::Structural(
            StructuralGrammar::for_language(language),
        ));
    }

    Ok(match PatternSet::for_language(language)? {
        Some(patterns) => ExtractionStrategy::PatternBased(Arc::new(patterns)),
        None => ExtractionStrategy::Unsupported,
    })
}

/// Extract snippets with the default strategies (Python structural, the
/// rest pattern-based).
pub fn extract_snippets(path: impl AsRef<Path>) -> (Option<SupportedLanguage>, Vec<CodeSnippet>) {
    SnippetExtractor::default().extract(path.as_ref())
}

/// Wrap extracted texts, dropping empty and whitespace-only ones
fn into_snippets(
    texts: Vec<String>,
    path: &Path,
    language: SupportedLanguage,
) -> Vec<CodeSnippet> {
    texts
        .into_iter()
        .filter(|text| !text.trim().is_empty())
        .map(|content| CodeSnippet {
            content,
            file_path: path.to_path_buf(),
            language,
        })
        .collect()
}

fn read_source(path: &Path) -> Result<String, ExtractionError> {
    let bytes = fs::read(path).map_err(|e| ExtractionError::FileReadFailed {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;

    String::from_utf8(bytes).map_err(|_| ExtractionError::InvalidUtf8(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_strategy_table() {
        let extractor = SnippetExtractor::default();
        assert!(matches!(
            extractor.strategy_for(SupportedLanguage::Python),
            ExtractionStrategy::Structural(_)
        ));
        for language in SupportedLanguage::ALL
            .into_iter()
            .filter(|l| *l != SupportedLanguage::Python)
        {
            assert!(matches!(
                extractor.strategy_for(language),
                ExtractionStrategy::PatternBased(_)
            ));
        }
    }

    #[test]
    fn test_configured_strategy_table_matches_default() {
        let extractor = SnippetExtractor::new(&ExtractionConfig::default()).unwrap();
        assert!(matches!(
            extractor.strategy_for(SupportedLanguage::Python),
            ExtractionStrategy::Structural(_)
        ));
        assert!(matches!(
            extractor.strategy_for(SupportedLanguage::Go),
            ExtractionStrategy::PatternBased(_)
        ));
    }

    #[test]
    fn test_python_without_parser_is_unsupported() {
        let config = ExtractionConfig {
            structural_languages: vec![SupportedLanguage::Go],
        };
        let extractor = SnippetExtractor::new(&config).unwrap();
        assert!(matches!(
            extractor.strategy_for(SupportedLanguage::Python),
            ExtractionStrategy::Unsupported
        ));
        assert!(matches!(
            extractor.strategy_for(SupportedLanguage::Go),
            ExtractionStrategy::Structural(_)
        ));

        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.py", b"def f():\n    return 1\n");
        let (language, snippets) = extractor.extract(&path);
        assert_eq!(language, Some(SupportedLanguage::Python));
        assert!(snippets.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.txt", b"def f():\n    pass\n");
        let (language, snippets) = extract_snippets(&path);
        assert!(language.is_none());
        assert!(snippets.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (language, snippets) = extract_snippets("/nonexistent/dir/missing.py");
        assert_eq!(language, Some(SupportedLanguage::Python));
        assert!(snippets.is_empty());

        let err = SnippetExtractor::default()
            .try_extract(Path::new("/nonexistent/dir/missing.py"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::FileReadFailed { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bin.go", &[0x66, 0x75, 0x6e, 0x63, 0xff, 0xfe]);
        let err = SnippetExtractor::default().try_extract(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidUtf8(_)));
        assert!(extract_snippets(&path).1.is_empty());
    }

    #[test]
    fn test_python_syntax_error_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.py", b"def oops(:\n  pass\n");
        let (language, snippets) = extract_snippets(&path);
        assert_eq!(language, Some(SupportedLanguage::Python));
        assert!(snippets.is_empty());
    }

    #[test]
    fn test_blank_texts_are_dropped() {
        let texts = vec![
            String::new(),
            "  \n\t".to_string(),
            "def f(): pass".to_string(),
        ];
        let snippets = into_snippets(texts, Path::new("a.py"), SupportedLanguage::Python);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].content, "def f(): pass");
    }

    #[test]
    fn test_python2_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "legacy.py", b"def f():\n    print \"hi\"\n");
        let err = SnippetExtractor::default().try_extract(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::SyntaxError(_)));
        assert!(extract_snippets(&path).1.is_empty());
    }

    #[test]
    fn test_cancelled_extraction() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "main.go", b"package main\n\nfunc Foo() { return 1 }\n");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = SnippetExtractor::default()
            .try_extract_cancellable(&path, &cancel)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Cancelled));
    }

    #[test]
    fn test_snippets_carry_origin() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "main.go", b"package main\n\nfunc Foo() { return 1 }\n");
        let (language, snippets) = extract_snippets(&path);
        assert_eq!(language, Some(SupportedLanguage::Go));
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].content, "func Foo() { return 1 }");
        assert_eq!(snippets[0].file_path, path);
        assert_eq!(snippets[0].language, SupportedLanguage::Go);
    }
}
