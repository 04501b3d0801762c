//! Programming language detection from file extensions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The closed set of languages the pipeline extracts functions from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    Python,
    JavaScript,
    Java,
    Cpp,
    C,
    CSharp,
    TypeScript,
    Go,
}

impl SupportedLanguage {
    pub const ALL: [SupportedLanguage; 8] = [
        SupportedLanguage::Python,
        SupportedLanguage::JavaScript,
        SupportedLanguage::Java,
        SupportedLanguage::Cpp,
        SupportedLanguage::C,
        SupportedLanguage::CSharp,
        SupportedLanguage::TypeScript,
        SupportedLanguage::Go,
    ];

    /// Lowercase tag used in records and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedLanguage::Python => "python",
            SupportedLanguage::JavaScript => "javascript",
            SupportedLanguage::Java => "java",
            SupportedLanguage::Cpp => "cpp",
            SupportedLanguage::C => "c",
            SupportedLanguage::CSharp => "csharp",
            SupportedLanguage::TypeScript => "typescript",
            SupportedLanguage::Go => "go",
        }
    }

    /// Map a bare extension (without the dot) to a language
    pub fn from_extension(extension: &str) -> Option<Self> {
        let lang = match extension.to_lowercase().as_str() {
            "py" => SupportedLanguage::Python,
            "js" => SupportedLanguage::JavaScript,
            "java" => SupportedLanguage::Java,
            "cpp" => SupportedLanguage::Cpp,
            "c" => SupportedLanguage::C,
            "cs" => SupportedLanguage::CSharp,
            "ts" => SupportedLanguage::TypeScript,
            "go" => SupportedLanguage::Go,
            _ => return None,
        };

        Some(lang)
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupportedLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SupportedLanguage::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported language '{}'", s))
    }
}

/// Classify a file by its extension.
///
/// `None` means "skip this file", not an error.
pub fn classify(path: impl AsRef<Path>) -> Option<SupportedLanguage> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .and_then(SupportedLanguage::from_extension)
}
