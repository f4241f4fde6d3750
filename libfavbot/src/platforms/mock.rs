//! Mock platform implementation for testing
//!
//! This module provides a configurable mock platform that serves canned posts
//! and scripted failures. It's designed for use in integration tests to verify
//! the bot's favorite loop without requiring platform credentials or network
//! access.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::PlatformError;
use crate::platforms::{ApiResult, SocialApi};
use crate::types::{Limit, Post, User};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name
    pub name: String,

    /// Whether authentication should succeed
    pub auth_succeeds: bool,

    /// Posts returned by `search`, keyed by query
    pub search_results: HashMap<String, Vec<Post>>,

    /// Accounts returned by `followers`
    pub followers: Vec<User>,

    /// Posts returned by `home_timeline`
    pub timeline: Vec<Post>,

    /// Errors returned by upcoming calls, keyed by operation name
    /// ("search", "favorite", "favorites", "followers", "home_timeline")
    pub scripted_errors: Arc<Mutex<HashMap<String, VecDeque<PlatformError>>>>,

    /// Operations invoked so far, in order
    pub calls: Arc<Mutex<Vec<String>>>,

    /// Post IDs favorited so far
    pub favorited: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_succeeds: true,
            search_results: HashMap::new(),
            followers: Vec::new(),
            timeline: Vec::new(),
            scripted_errors: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            favorited: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
pub struct MockApi {
    config: MockConfig,
    authenticated: bool,
}

impl MockApi {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// Create a mock platform that always succeeds and has no content
    pub fn success() -> Self {
        Self::new(MockConfig::default())
    }

    /// Create a mock platform that fails authentication
    pub fn auth_failure() -> Self {
        Self::new(MockConfig {
            auth_succeeds: false,
            ..Default::default()
        })
    }

    /// Add posts returned when searching `query`
    pub fn with_search_results(mut self, query: &str, posts: Vec<Post>) -> Self {
        self.config.search_results.insert(query.to_string(), posts);
        self
    }

    pub fn with_followers(mut self, followers: Vec<User>) -> Self {
        self.config.followers = followers;
        self
    }

    pub fn with_timeline(mut self, timeline: Vec<Post>) -> Self {
        self.config.timeline = timeline;
        self
    }

    /// Make the next call to `operation` fail with `error`
    ///
    /// Errors queue up: scripting two errors fails the next two calls.
    pub fn fail_next(self, operation: &str, error: PlatformError) -> Self {
        if let Ok(mut scripted) = self.config.scripted_errors.lock() {
            scripted
                .entry(operation.to_string())
                .or_default()
                .push_back(error);
        }
        self
    }

    /// Operations invoked so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.config.calls.lock().unwrap().clone()
    }

    /// Number of times `operation` was invoked
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == operation).count()
    }

    /// Post IDs favorited so far
    pub fn favorited(&self) -> Vec<String> {
        self.config.favorited.lock().unwrap().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Record the call and pop a scripted error, if any
    fn enter(&self, operation: &str) -> ApiResult<()> {
        self.config
            .calls
            .lock()
            .unwrap()
            .push(operation.to_string());

        if !self.authenticated {
            return Err(PlatformError::Authentication(
                "Not authenticated".to_string(),
            ));
        }

        let scripted = self
            .config
            .scripted_errors
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn take<T: Clone>(items: &[T], limit: Limit) -> Vec<T> {
    let count = limit.unwrap_or(items.len()).min(items.len());
    items[..count].to_vec()
}

impl SocialApi for MockApi {
    fn authenticate(&mut self) -> ApiResult<()> {
        self.config
            .calls
            .lock()
            .unwrap()
            .push("authenticate".to_string());

        if self.config.auth_succeeds {
            self.authenticated = true;
            Ok(())
        } else {
            Err(PlatformError::Authentication(
                "Mock authentication failed".to_string(),
            ))
        }
    }

    fn search(&self, query: &str, limit: Limit) -> ApiResult<Vec<Post>> {
        self.enter("search")?;
        let posts = self
            .config
            .search_results
            .get(query)
            .map(|posts| take(posts, limit))
            .unwrap_or_default();
        Ok(posts)
    }

    fn favorite(&self, post_id: &str) -> ApiResult<()> {
        self.enter("favorite")?;

        let mut favorited = self.config.favorited.lock().unwrap();
        if favorited.iter().any(|id| id == post_id) {
            return Err(PlatformError::AlreadyFavorited(format!(
                "Post {} is already favorited",
                post_id
            )));
        }
        favorited.push(post_id.to_string());
        Ok(())
    }

    fn favorites(&self, limit: Limit) -> ApiResult<Vec<Post>> {
        self.enter("favorites")?;

        let favorited = self.config.favorited.lock().unwrap().clone();
        let known: Vec<Post> = self
            .config
            .search_results
            .values()
            .flatten()
            .chain(self.config.timeline.iter())
            .cloned()
            .collect();

        // Most recent first, like the real endpoint
        let posts: Vec<Post> = favorited
            .iter()
            .rev()
            .map(|id| {
                known
                    .iter()
                    .find(|post| &post.id == id)
                    .cloned()
                    .unwrap_or_else(|| Post::new(id.clone(), ""))
            })
            .collect();

        Ok(take(&posts, limit))
    }

    fn followers(&self, limit: Limit) -> ApiResult<Vec<User>> {
        self.enter("followers")?;
        Ok(take(&self.config.followers, limit))
    }

    fn home_timeline(&self, limit: Limit) -> ApiResult<Vec<Post>> {
        self.enter("home_timeline")?;
        Ok(take(&self.config.timeline, limit))
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
