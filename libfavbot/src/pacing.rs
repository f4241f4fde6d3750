//! Request pacing for rate-limited platform APIs
//!
//! The [`SleepCoordinator`] inserts a fixed delay after every API call
//! (the *interval*) and waits out a longer recovery period (the *window*)
//! when the platform answers with "too many requests". Both sleeps block the
//! calling thread; the actual blocking is delegated to a [`Sleeper`] so tests
//! can observe requested sleeps without waiting for them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::duration::format_duration;

/// Default pause between two requests, in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 3;

/// Default wait after a rate-limit rejection, in seconds
pub const DEFAULT_WINDOW_SECS: u64 = 900;

/// Interval and window durations, in whole seconds
///
/// A value of 0 disables the corresponding sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub interval: u64,
    pub window: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL_SECS,
            window: DEFAULT_WINDOW_SECS,
        }
    }
}

/// Blocking sleep primitive
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested sleeps and returns immediately
///
/// Clones share the same record, so a test can keep one handle while the
/// coordinator owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// All durations requested so far, in order
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.slept.lock().map(|s| s.len()).unwrap_or_default()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
    }
}

/// Coordinates the interval and window sleeps of a run
#[derive(Debug)]
pub struct SleepCoordinator<S = ThreadSleeper> {
    config: RateLimitConfig,
    sleeper: S,
}

impl SleepCoordinator<ThreadSleeper> {
    /// Create a coordinator that sleeps on the current thread
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_sleeper(config, ThreadSleeper)
    }
}

impl<S: Sleeper> SleepCoordinator<S> {
    pub fn with_sleeper(config: RateLimitConfig, sleeper: S) -> Self {
        Self { config, sleeper }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    pub fn interval(&self) -> u64 {
        self.config.interval
    }

    pub fn window(&self) -> u64 {
        self.config.window
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Update the per-request interval
    ///
    /// Emits an info event with the new value.
    pub fn set_interval(&mut self, seconds: u64) {
        info!("Updating request interval to {}", format_duration(seconds));
        self.config.interval = seconds;
    }

    /// Update the rate-limit recovery window
    ///
    /// Emits an info event with the new value.
    pub fn set_window(&mut self, seconds: u64) {
        info!("Updating request window to {}", format_duration(seconds));
        self.config.window = seconds;
    }

    /// Pause between two requests
    pub fn sleep_for_interval(&self) {
        if self.config.interval > 0 {
            self.sleeper.sleep(Duration::from_secs(self.config.interval));
        }
    }

    /// Wait out a rate-limit rejection
    pub fn sleep_for_window(&self) {
        error!(
            "Maximum requests exceeded, sleeping for {}",
            format_duration(self.config.window)
        );
        if self.config.window > 0 {
            self.sleeper.sleep(Duration::from_secs(self.config.window));
        }
    }
}
