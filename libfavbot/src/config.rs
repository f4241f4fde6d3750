//! Configuration management for favbot
//!
//! The configuration is a single JSON file holding API credentials, pacing
//! parameters and the search terms to process.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::error::{ConfigError, Result};
use crate::pacing::RateLimitConfig;
use crate::types::{limit_from_count, Limit};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Default Fediverse instance used when `instance` is absent
pub const DEFAULT_INSTANCE: &str = "https://mastodon.social";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_secret")]
    pub consumer_key: SecretString,
    #[serde(deserialize_with = "deserialize_secret")]
    pub consumer_secret: SecretString,
    #[serde(deserialize_with = "deserialize_secret")]
    pub access_token: SecretString,
    #[serde(deserialize_with = "deserialize_secret")]
    pub access_token_secret: SecretString,

    /// Seconds to wait after every request
    pub request_interval: u64,
    /// Seconds to wait after a rate-limit rejection
    pub request_window: u64,

    /// Search queries, processed in order
    pub terms: Vec<String>,
    /// Maximum posts to favorite per term (0 means no limit)
    pub tweets_count: usize,

    #[serde(default = "default_instance")]
    pub instance: String,
}

fn default_instance() -> String {
    DEFAULT_INSTANCE.to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl Config {
    /// Load configuration from a specific path
    ///
    /// A leading `~` is expanded to the home directory.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string());

        if !expanded.exists() {
            return Err(ConfigError::NotFound(expanded).into());
        }

        let content = std::fs::read_to_string(&expanded).map_err(ConfigError::Read)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            interval: self.request_interval,
            window: self.request_window,
        }
    }

    pub fn search_limit(&self) -> Limit {
        limit_from_count(self.tweets_count)
    }

    /// Instance base URL with an `https://` scheme added when missing
    pub fn instance_url(&self) -> String {
        if self.instance.starts_with("http://") || self.instance.starts_with("https://") {
            self.instance.clone()
        } else {
            format!("https://{}", self.instance)
        }
    }

    pub fn credentials(&self) -> Credentials<'_> {
        Credentials {
            consumer_key: &self.consumer_key,
            consumer_secret: &self.consumer_secret,
            access_token: &self.access_token,
            access_token_secret: &self.access_token_secret,
        }
    }
}

/// Borrowed view over the four API credentials
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub consumer_key: &'a SecretString,
    pub consumer_secret: &'a SecretString,
    pub access_token: &'a SecretString,
    pub access_token_secret: &'a SecretString,
}

impl Credentials<'_> {
    /// The bearer token used by OAuth2 platforms
    pub fn bearer_token(&self) -> &str {
        self.access_token.expose_secret().trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FavbotError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"{
        "consumer_key": "ck",
        "consumer_secret": "cs",
        "access_token": "at-123",
        "access_token_secret": "ats",
        "request_interval": 3,
        "request_window": 900,
        "terms": ["rust", "ferris"],
        "tweets_count": 10
    }"#;

    #[test]
    fn test_parse_valid_config() {
        let config = Config::from_json(VALID).unwrap();
        assert_eq!(config.request_interval, 3);
        assert_eq!(config.request_window, 900);
        assert_eq!(config.terms, vec!["rust", "ferris"]);
        assert_eq!(config.tweets_count, 10);
        assert_eq!(config.search_limit(), Some(10));
        assert_eq!(config.instance, DEFAULT_INSTANCE);
        assert_eq!(config.credentials().bearer_token(), "at-123");
        assert_eq!(
            config.rate_limit(),
            RateLimitConfig {
                interval: 3,
                window: 900
            }
        );
    }

    #[test]
    fn test_zero_count_is_unbounded() {
        let json = VALID.replace("\"tweets_count\": 10", "\"tweets_count\": 0");
        let config = Config::from_json(&json).unwrap();
        assert_eq!(config.search_limit(), None);
    }

    #[test]
    fn test_missing_key_is_parse_error() {
        let json = VALID.replace("\"terms\": [\"rust\", \"ferris\"],", "");
        let result = Config::from_json(&json);
        assert!(matches!(
            result,
            Err(FavbotError::Config(ConfigError::Parse(_)))
        ));
    }

    #[test]
    fn test_negative_interval_rejected() {
        let json = VALID.replace("\"request_interval\": 3", "\"request_interval\": -3");
        let result = Config::from_json(&json);
        assert!(matches!(
            result,
            Err(FavbotError::Config(ConfigError::Parse(_)))
        ));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = Config::from_json("{ not json");
        assert!(matches!(
            result,
            Err(FavbotError::Config(ConfigError::Parse(_)))
        ));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let json = VALID.replace("\"tweets_count\": 10", "\"tweets_count\": 10, \"extra\": true");
        assert!(Config::from_json(&json).is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load_from_path(Path::new("/nonexistent/favbot/config.json"));
        match result {
            Err(FavbotError::Config(ConfigError::NotFound(path))) => {
                assert!(path.ends_with("config.json"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(VALID.as_bytes()).expect("Failed to write config");
        file.flush().expect("Failed to flush");

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.terms.len(), 2);
    }

    #[test]
    fn test_instance_url_normalization() {
        let json = VALID.replace("\"tweets_count\": 10", "\"tweets_count\": 10, \"instance\": \"fosstodon.org\"");
        let config = Config::from_json(&json).unwrap();
        assert_eq!(config.instance_url(), "https://fosstodon.org");

        let json = VALID.replace(
            "\"tweets_count\": 10",
            "\"tweets_count\": 10, \"instance\": \"http://localhost:3000\"",
        );
        let config = Config::from_json(&json).unwrap();
        assert_eq!(config.instance_url(), "http://localhost:3000");
    }

    #[test]
    fn test_credentials_not_exposed_in_debug() {
        let config = Config::from_json(VALID).unwrap();
        let debug_output = format!("{:?}", config);

        assert!(!debug_output.contains("at-123"));
        assert!(!debug_output.contains("\"ats\""));
        assert!(debug_output.contains("REDACTED"));
    }
}
