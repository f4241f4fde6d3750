//! Platform abstraction and implementations
//!
//! This module provides the [`SocialApi`] trait: the small surface of a social
//! media API the bot needs (search, favorite, and a few listings). Each
//! implementation maps its client's failures onto [`PlatformError`] so the
//! request retrier can classify them.
//!
//! # Examples
//!
//! ```no_run
//! use libfavbot::platforms::{mastodon::MastodonApi, SocialApi};
//!
//! # fn example() -> libfavbot::error::Result<()> {
//! let mut api = MastodonApi::new("https://mastodon.social".to_string(), "token".to_string())?;
//! api.authenticate()?;
//!
//! for post in api.search("rustlang", Some(5))? {
//!     api.favorite(&post.id)?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::PlatformError;
use crate::types::{Limit, Post, User};

pub mod mastodon;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Result of a single platform call
pub type ApiResult<T> = std::result::Result<T, PlatformError>;

/// Blocking interface to a social media platform
///
/// Listing operations gather up to `limit` items, paging through the
/// platform's results as needed; `None` gathers everything available.
pub trait SocialApi {
    /// Verify the configured credentials
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` if the platform rejects them.
    fn authenticate(&mut self) -> ApiResult<()>;

    /// Search posts matching `query`
    fn search(&self, query: &str, limit: Limit) -> ApiResult<Vec<Post>>;

    /// Mark a post as favorite
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::AlreadyFavorited` when the platform reports the
    /// post was favorited before.
    fn favorite(&self, post_id: &str) -> ApiResult<()>;

    /// Posts the authenticated account has favorited
    fn favorites(&self, limit: Limit) -> ApiResult<Vec<Post>>;

    /// Accounts following the authenticated account
    fn followers(&self, limit: Limit) -> ApiResult<Vec<User>>;

    /// The authenticated account's home timeline
    fn home_timeline(&self, limit: Limit) -> ApiResult<Vec<Post>>;

    /// Lowercase platform identifier (e.g., "mastodon")
    fn name(&self) -> &str;
}
