/// Platform-specific directories and path normalization
///
/// Follows the XDG Base Directory specification on Unix-like systems.
use std::path::{Component, Path, PathBuf};

const PROJECT_DIR_NAME: &str = "code-summarizer";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the appropriate cache directory for the current platform
    ///
    /// - Windows: %LOCALAPPDATA%
    /// - macOS: ~/Library/Caches
    /// - Linux/Unix: $XDG_CACHE_HOME or ~/.cache
    pub fn cache_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            std::env::var("LOCALAPPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else if cfg!(target_os = "macos") {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join("Library/Caches"))
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::var("XDG_CACHE_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".cache")))
                .unwrap_or_else(|_| PathBuf::from("."))
        }
    }

    /// Get the appropriate config directory for the current platform
    ///
    /// - Windows: %APPDATA%
    /// - macOS: ~/Library/Application Support
    /// - Linux/Unix: $XDG_CONFIG_HOME or ~/.config
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            std::env::var("APPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else if cfg!(target_os = "macos") {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join("Library/Application Support"))
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
                .unwrap_or_else(|_| PathBuf::from("."))
        }
    }

    /// Returns: {cache_dir}/code-summarizer
    pub fn project_cache_dir() -> PathBuf {
        Self::cache_dir().join(PROJECT_DIR_NAME)
    }

    /// Returns: {config_dir}/code-summarizer
    pub fn project_config_dir() -> PathBuf {
        Self::config_dir().join(PROJECT_DIR_NAME)
    }

    /// Directory where downloaded encoder weights are kept
    ///
    /// Returns: {cache_dir}/code-summarizer/models
    pub fn default_model_cache_path() -> PathBuf {
        Self::project_cache_dir().join("models")
    }

    /// Get default config file path
    ///
    /// Returns: {config_dir}/code-summarizer/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::project_config_dir().join("config.toml")
    }
}

/// Render a path with forward slashes regardless of platform.
///
/// Root and prefix components are kept so absolute paths stay absolute;
/// `.` components are dropped.
pub fn to_posix_string(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut rooted = false;
    let mut prefixed = false;

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                prefixed = true;
                parts.push(prefix.as_os_str().to_string_lossy().to_string())
            }
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => parts.push("..".to_string()),
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
        }
    }

    let joined = parts.join("/");
    if rooted && !prefixed {
        format!("/{}", joined)
    } else {
        joined
    }
}
