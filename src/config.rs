//! Configuration file parser for ~/.config/reel/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted and logged as warnings, since they are usually
//! typos. Command-line flags override whatever the file sets.
use crate::feed::{DEFAULT_COLLECTION, DEFAULT_ENDPOINT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Collection id must not be empty")]
    EmptyCollection,

    #[error("HOME environment variable not set")]
    NoHome,
}

// ============================================================================
// Configuration
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Archive collection identifier to browse.
    pub collection: String,

    /// Search endpoint returning the collection feed.
    pub endpoint: String,

    /// Per-page fetch timeout in seconds. 0 = wait indefinitely.
    pub request_timeout_secs: u64,

    /// Player command for video URLs, e.g. `"mpv --force-window"`. The URL is
    /// appended as the last argument. Unset = system opener.
    pub player: Option<String>,

    /// Page loaded at startup.
    pub start_page: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            player: None,
            start_page: 1,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "collection",
        "endpoint",
        "request_timeout_secs",
        "player",
        "start_page",
    ];

    /// Default location: `~/.config/reel/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("reel")
            .join("config.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            collection = %config.collection,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Checks the settings that cannot be expressed in the TOML types and
    /// returns the parsed endpoint.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.collection.trim().is_empty() {
            return Err(ConfigError::EmptyCollection);
        }

        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            url: self.endpoint.clone(),
            reason,
        };
        let url = Url::parse(&self.endpoint).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(invalid(format!("unsupported scheme {}", scheme))),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Start page, never below 1.
    pub fn start_page(&self) -> u32 {
        self.start_page.max(1)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("reel_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.collection, "giant-bomb-archive");
        assert_eq!(config.endpoint, "https://archive.org/services/collection-rss.php");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.player.is_none());
        assert_eq!(config.start_page, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/reel_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "collection = \"gamespot-archive\"\n");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.collection, "gamespot-archive");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout_secs, 30);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
collection = "some-collection"
endpoint = "http://localhost:5173/api/search"
request_timeout_secs = 0
player = "mpv --force-window"
start_page = 4
"#;
        let (dir, path) = write_config("full", content);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.collection, "some-collection");
        assert_eq!(config.endpoint, "http://localhost:5173/api/search");
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.player.as_deref(), Some("mpv --force-window"));
        assert_eq!(config.start_page(), 4);
        assert_eq!(config.validate().unwrap().path(), "/api/search");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "collection = \"x\"\ntheme = \"dark\"\n");
        assert_eq!(Config::load(&path).unwrap().collection, "x");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "start_page = \"two\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = Config {
            endpoint: "ftp://archive.org/feed".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));

        let config = Config {
            endpoint: "not a url".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_collection() {
        let config = Config {
            collection: "  ".into(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyCollection)));
    }

    #[test]
    fn test_start_page_floor() {
        let config = Config {
            start_page: 0,
            ..Config::default()
        };
        assert_eq!(config.start_page(), 1);
    }
}
