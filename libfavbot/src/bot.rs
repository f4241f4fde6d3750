//! Search-and-favorite orchestration
//!
//! [`FavoriteBot`] drives one pass over the configured search terms: gather
//! matching posts, favorite each of them, then list the account's favorites.
//! Every platform call goes through the request retrier and is followed by the
//! pacing interval, so the run stays under the platform's rate limits.

use tracing::info;

use crate::config::Config;
use crate::error::{PlatformError, Result};
use crate::pacing::{SleepCoordinator, Sleeper, ThreadSleeper};
use crate::platforms::SocialApi;
use crate::retry::{RequestRetrier, RetryOutcome};
use crate::types::{plural, Limit, Post, User};

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Search terms processed
    pub terms: usize,
    /// Posts returned by all searches
    pub found: usize,
    /// Posts favorited during this run
    pub favorited: usize,
    /// Posts that could not be favorited (already favorited or failed)
    pub skipped: usize,
    /// Favorites listed at the end of the run
    pub favorites: usize,
}

/// Outcome of favoriting a batch of posts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FavoriteReport {
    pub favorited: usize,
    pub skipped: usize,
}

pub struct FavoriteBot<A: SocialApi, S: Sleeper = ThreadSleeper> {
    api: A,
    pacer: SleepCoordinator<S>,
}

impl<A: SocialApi, S: Sleeper> FavoriteBot<A, S> {
    pub fn new(api: A, pacer: SleepCoordinator<S>) -> Self {
        Self { api, pacer }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn pacer(&self) -> &SleepCoordinator<S> {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut SleepCoordinator<S> {
        &mut self.pacer
    }

    /// Authenticate against the platform
    ///
    /// Failing here is fatal for the run.
    pub fn authenticate(&mut self) -> Result<()> {
        info!("Authenticating on {} API", self.api.name());
        self.api.authenticate()?;
        Ok(())
    }

    /// Run one full pass: search and favorite every term, then list favorites
    pub fn run(&mut self, config: &Config) -> Result<RunSummary> {
        self.pacer.set_interval(config.request_interval);
        self.pacer.set_window(config.request_window);

        self.authenticate()?;

        let mut summary = RunSummary::default();
        for term in &config.terms {
            let posts = self.search_posts(term, config.search_limit(), false);
            let report = self.favorite_posts(&posts);

            summary.terms += 1;
            summary.found += posts.len();
            summary.favorited += report.favorited;
            summary.skipped += report.skipped;
        }

        summary.favorites = self.favorites(None, false).len();

        info!(
            "Done: {} term{}, {} post{} found, {} favorited, {} skipped",
            summary.terms,
            plural(summary.terms),
            summary.found,
            plural(summary.found),
            summary.favorited,
            summary.skipped
        );
        Ok(summary)
    }

    /// Search for posts containing `term`
    pub fn search_posts(&self, term: &str, limit: Limit, display: bool) -> Vec<Post> {
        match limit {
            Some(count) => info!(
                "Gathering {} post{} containing '{}'",
                count,
                plural(count),
                term
            ),
            None => info!("Gathering posts containing '{}'", term),
        }

        let posts = self.guarded("search", |api| api.search(term, limit));
        if let Some(posts) = &posts {
            info!(
                "{} post{} containing '{}'",
                posts.len(),
                plural(posts.len()),
                term
            );
            display_posts(posts, display);
        }

        self.pacer.sleep_for_interval();
        posts.unwrap_or_default()
    }

    /// Favorite each post, pacing after every attempt
    ///
    /// Failures are skipped; they never abort the batch.
    pub fn favorite_posts(&self, posts: &[Post]) -> FavoriteReport {
        info!("Adding gathered posts to favorites");

        let retrier = RequestRetrier::new(&self.pacer);
        let mut report = FavoriteReport::default();

        for post in posts {
            match retrier.execute_outcome("favorite", || self.api.favorite(&post.id)) {
                RetryOutcome::Success(()) => report.favorited += 1,
                RetryOutcome::Failure(_) => report.skipped += 1,
            }
            self.pacer.sleep_for_interval();
        }

        report
    }

    /// Posts the account has favorited
    pub fn favorites(&self, limit: Limit, display: bool) -> Vec<Post> {
        info!("Gathering favorites");

        let posts = self.guarded("favorites", |api| api.favorites(limit));
        if let Some(posts) = &posts {
            info!("{} post{}", posts.len(), plural(posts.len()));
            display_posts(posts, display);
        }

        self.pacer.sleep_for_interval();
        posts.unwrap_or_default()
    }

    /// Accounts following the authenticated account
    pub fn followers(&self, limit: Limit, display: bool) -> Vec<User> {
        info!("Gathering followers");

        let users = self.guarded("followers", |api| api.followers(limit));
        if let Some(users) = &users {
            info!("{} user{}", users.len(), plural(users.len()));
            if display {
                for user in users {
                    info!("\u{279c} @{}", user.handle);
                }
            }
        }

        self.pacer.sleep_for_interval();
        users.unwrap_or_default()
    }

    /// The authenticated account's home timeline
    pub fn home_timeline(&self, limit: Limit, display: bool) -> Vec<Post> {
        info!("Gathering home timeline");

        let posts = self.guarded("home timeline", |api| api.home_timeline(limit));
        if let Some(posts) = &posts {
            info!("{} post{}", posts.len(), plural(posts.len()));
            display_posts(posts, display);
        }

        self.pacer.sleep_for_interval();
        posts.unwrap_or_default()
    }

    fn guarded<T, F>(&self, operation: &str, mut call: F) -> Option<T>
    where
        F: FnMut(&A) -> std::result::Result<T, PlatformError>,
    {
        RequestRetrier::new(&self.pacer).execute(operation, || call(&self.api))
    }
}

fn display_posts(posts: &[Post], display: bool) {
    if display {
        for post in posts {
            info!("\u{279c} {}", post.text);
        }
    }
}
