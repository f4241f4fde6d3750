//! Error types for favbot

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FavbotError>;

#[derive(Error, Debug)]
pub enum FavbotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl FavbotError {
    /// Returns the process exit code for this error
    ///
    /// Every error that reaches the top level is fatal for the run, so they
    /// all share exit code 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            FavbotError::Config(_) => 1,
            FavbotError::Platform(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Specified configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("An error occurred while parsing configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors reported by a platform adapter
///
/// Adapters classify every failure into one of these variants so the request
/// retrier never has to look inside the underlying client's error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Already favorited: {0}")]
    AlreadyFavorited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// How the request retrier treats a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// HTTP 429: wait out the window, then retry once
    RateLimited,
    /// Expected and silently ignored
    AlreadyFavorited,
    /// Logged at debug level and skipped
    Other,
}

impl PlatformError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PlatformError::RateLimit(_) => ErrorClass::RateLimited,
            PlatformError::AlreadyFavorited(_) => ErrorClass::AlreadyFavorited,
            PlatformError::Authentication(_)
            | PlatformError::Network(_)
            | PlatformError::Request(_) => ErrorClass::Other,
        }
    }

    /// Network failures may succeed on a later pass; everything else will not
    pub fn is_transient(&self) -> bool {
        matches!(self, PlatformError::Network(_) | PlatformError::RateLimit(_))
    }
}
