//! Guarded API calls with a single retry after a rate-limit window
//!
//! Every platform call goes through [`RequestRetrier`]. A "too many requests"
//! rejection makes the retrier wait out the configured window and try the call
//! exactly once more. Any other failure is logged at debug level and the call
//! is given up, so a single bad item never aborts a batch.

use tracing::debug;

use crate::error::{ErrorClass, PlatformError};
use crate::pacing::{SleepCoordinator, Sleeper};

/// Number of extra attempts after a rate-limit rejection
const RATE_LIMIT_RETRIES: usize = 1;

/// Why a guarded call produced no result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Still rate limited after the retry
    RateLimited,
    /// Network-level failure
    Transient,
    /// Rejected by the platform
    Permanent,
}

/// Result of one guarded API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Success(T),
    Failure(FailureReason),
}

impl<T> RetryOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            RetryOutcome::Success(value) => Some(value),
            RetryOutcome::Failure(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Success(_))
    }
}

/// Wraps API calls with the rate-limit retry policy
pub struct RequestRetrier<'a, S: Sleeper> {
    pacer: &'a SleepCoordinator<S>,
}

impl<'a, S: Sleeper> RequestRetrier<'a, S> {
    pub fn new(pacer: &'a SleepCoordinator<S>) -> Self {
        Self { pacer }
    }

    /// Run `call`, returning its payload or `None` if it failed
    ///
    /// `operation` names the call in log messages.
    pub fn execute<T, F>(&self, operation: &str, call: F) -> Option<T>
    where
        F: FnMut() -> Result<T, PlatformError>,
    {
        self.execute_outcome(operation, call).into_option()
    }

    /// Run `call` and report why it failed, if it did
    pub fn execute_outcome<T, F>(&self, operation: &str, mut call: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Result<T, PlatformError>,
    {
        let mut retries_left = RATE_LIMIT_RETRIES;

        loop {
            let error = match call() {
                Ok(value) => return RetryOutcome::Success(value),
                Err(error) => error,
            };

            match error.class() {
                ErrorClass::RateLimited if retries_left > 0 => {
                    retries_left -= 1;
                    self.pacer.sleep_for_window();
                }
                ErrorClass::RateLimited => {
                    debug!("{} still rate limited after retry: {}", operation, error);
                    return RetryOutcome::Failure(FailureReason::RateLimited);
                }
                ErrorClass::AlreadyFavorited => {
                    return RetryOutcome::Failure(FailureReason::Permanent);
                }
                ErrorClass::Other => {
                    debug!("{} failed: {}", operation, error);
                    let reason = if error.is_transient() {
                        FailureReason::Transient
                    } else {
                        FailureReason::Permanent
                    };
                    return RetryOutcome::Failure(reason);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::{RateLimitConfig, RecordingSleeper};
    use crate::test_support::capture_logs;
    use std::time::Duration;

    fn pacer() -> SleepCoordinator<RecordingSleeper> {
        SleepCoordinator::with_sleeper(
            RateLimitConfig {
                interval: 0,
                window: 900,
            },
            RecordingSleeper::new(),
        )
    }

    /// Returns the scripted results in order, then keeps repeating the last one
    fn scripted<'a>(
        mut results: Vec<Result<&'static str, PlatformError>>,
        calls: &'a std::cell::Cell<usize>,
    ) -> impl FnMut() -> Result<&'static str, PlatformError> + 'a {
        results.reverse();
        move || {
            calls.set(calls.get() + 1);
            if results.len() > 1 {
                results.pop().unwrap()
            } else {
                results[0].clone()
            }
        }
    }

    fn rate_limited() -> PlatformError {
        PlatformError::RateLimit("HTTP 429 Too Many Requests".to_string())
    }

    #[test]
    fn test_success_first_attempt() {
        let pacer = pacer();
        let calls = std::cell::Cell::new(0);
        let result = RequestRetrier::new(&pacer).execute("search", scripted(vec![Ok("ok")], &calls));

        assert_eq!(result, Some("ok"));
        assert_eq!(calls.get(), 1);
        assert_eq!(pacer.sleeper().call_count(), 0);
    }

    #[test]
    fn test_rate_limited_once_then_success() {
        let pacer = pacer();
        let calls = std::cell::Cell::new(0);
        let result = RequestRetrier::new(&pacer).execute(
            "search",
            scripted(vec![Err(rate_limited()), Ok("payload")], &calls),
        );

        assert_eq!(result, Some("payload"));
        assert_eq!(calls.get(), 2);
        assert_eq!(pacer.sleeper().recorded(), vec![Duration::from_secs(900)]);
    }

    #[test]
    fn test_always_rate_limited_retries_exactly_once() {
        let pacer = pacer();
        let calls = std::cell::Cell::new(0);
        let outcome = RequestRetrier::new(&pacer)
            .execute_outcome("favorite", scripted(vec![Err(rate_limited())], &calls));

        assert_eq!(outcome, RetryOutcome::Failure(FailureReason::RateLimited));
        assert_eq!(calls.get(), 2);
        assert_eq!(pacer.sleeper().call_count(), 1);
    }

    #[test]
    fn test_already_favorited_is_silent() {
        let pacer = pacer();
        let calls = std::cell::Cell::new(0);
        let mut result = Some("unset");
        let logs = capture_logs(|| {
            result = RequestRetrier::new(&pacer).execute(
                "favorite",
                scripted(
                    vec![Err(PlatformError::AlreadyFavorited(
                        "You have already favorited this status".to_string(),
                    ))],
                    &calls,
                ),
            );
        });

        assert_eq!(result, None);
        assert_eq!(calls.get(), 1);
        assert!(!logs.contains("ERROR"));
        assert!(logs.is_empty(), "expected no log output, got: {}", logs);
        assert_eq!(pacer.sleeper().call_count(), 0);
    }

    #[test]
    fn test_other_error_logged_at_debug_and_not_retried() {
        let pacer = pacer();
        let calls = std::cell::Cell::new(0);
        let mut outcome = RetryOutcome::Success("unset");
        let logs = capture_logs(|| {
            outcome = RequestRetrier::new(&pacer).execute_outcome(
                "favorites",
                scripted(
                    vec![Err(PlatformError::Request("HTTP 404 Not Found".to_string()))],
                    &calls,
                ),
            );
        });

        assert_eq!(outcome, RetryOutcome::Failure(FailureReason::Permanent));
        assert_eq!(calls.get(), 1);
        assert!(logs.contains("DEBUG"));
        assert!(logs.contains("favorites failed"));
        assert!(!logs.contains("ERROR"));
    }

    #[test]
    fn test_network_error_is_transient_failure() {
        let pacer = pacer();
        let calls = std::cell::Cell::new(0);
        let outcome = RequestRetrier::new(&pacer).execute_outcome(
            "timeline",
            scripted(vec![Err(PlatformError::Network("timed out".to_string()))], &calls),
        );

        assert_eq!(outcome, RetryOutcome::Failure(FailureReason::Transient));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_rate_limit_then_other_error_gives_up() {
        let pacer = pacer();
        let calls = std::cell::Cell::new(0);
        let outcome = RequestRetrier::new(&pacer).execute_outcome(
            "search",
            scripted(
                vec![
                    Err(rate_limited()),
                    Err(PlatformError::Request("HTTP 500".to_string())),
                    Ok("never reached"),
                ],
                &calls,
            ),
        );

        assert_eq!(outcome, RetryOutcome::Failure(FailureReason::Permanent));
        assert_eq!(calls.get(), 2);
        assert_eq!(pacer.sleeper().call_count(), 1);
    }

    #[test]
    fn test_outcome_into_option() {
        assert_eq!(RetryOutcome::Success(3).into_option(), Some(3));
        assert_eq!(
            RetryOutcome::<u8>::Failure(FailureReason::Transient).into_option(),
            None
        );
        assert!(RetryOutcome::Success(()).is_success());
    }
}
