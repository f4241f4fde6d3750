//! favbot - search a social platform and favorite what you find
//!
//! This library provides the pieces behind the `favbot` binary: a paced,
//! rate-limit-aware request loop over a platform API, and the search and
//! favorite pass built on top of it.

pub mod bot;
pub mod config;
pub mod duration;
pub mod error;
pub mod logging;
pub mod pacing;
pub mod platforms;
pub mod retry;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use bot::{FavoriteBot, RunSummary};
pub use config::Config;
pub use duration::format_duration;
pub use error::{FavbotError, Result};
pub use pacing::{RateLimitConfig, SleepCoordinator};
pub use retry::{RequestRetrier, RetryOutcome};
pub use types::{Post, User};
