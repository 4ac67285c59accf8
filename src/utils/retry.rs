//! Retry utilities with exponential backoff for upstream calls.
//!
//! The default configuration makes exactly one attempt. Raising
//! `max_attempts` turns on bounded retry for transient failures only.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Set the number of attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Backoff before the given retry (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powf(retry.saturating_sub(1) as f64);
        Duration::from_secs_f64(exp.min(self.max_delay.as_secs_f64()))
    }
}

/// Classes of failure worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// Connection or timeout failure
    Network,
    /// Upstream answered 429
    TooManyRequests,
    /// Upstream answered 5xx
    ServerError,
}

impl TransientError {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            429 => Some(TransientError::TooManyRequests),
            500..=599 => Some(TransientError::ServerError),
            _ => None,
        }
    }
}

/// Errors that can tell whether a retry might succeed
pub trait Retryable {
    /// `Some` when the failure is transient
    fn transient(&self) -> Option<TransientError>;
}

/// Execute an async operation, retrying transient failures with backoff
pub async fn with_retry<T, E, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, E>
where
    E: Retryable + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!("Operation succeeded on attempt {}", attempts);
                }
                return Ok(result);
            }
            Err(error) => {
                let Some(transient) = error.transient() else {
                    return Err(error);
                };

                if attempts >= config.max_attempts {
                    if config.max_attempts > 1 {
                        tracing::warn!("Operation failed after {} attempts: {}", attempts, error);
                    }
                    return Err(error);
                }

                let delay = config.delay_for(attempts);
                tracing::debug!(
                    "Transient error on attempt {}: {:?}, retrying in {:?}",
                    attempts,
                    transient,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    enum TestError {
        Flaky,
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl Retryable for TestError {
        fn transient(&self) -> Option<TransientError> {
            match self {
                TestError::Flaky => Some(TransientError::Network),
                TestError::Fatal => None,
            }
        }
    }

    fn fast(attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts: attempts,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_default_makes_single_attempt() {
        let calls = Rc::new(RefCell::new(0));
        let result: Result<(), TestError> = {
            let calls = calls.clone();
            with_retry(RetryConfig::default(), move || {
                let calls = calls.clone();
                async move {
                    *calls.borrow_mut() += 1;
                    Err(TestError::Flaky)
                }
            })
        }
        .await;

        assert!(result.is_err());
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let calls = Rc::new(RefCell::new(0));
        let result = {
            let calls = calls.clone();
            with_retry(fast(4), move || {
                let calls = calls.clone();
                async move {
                    *calls.borrow_mut() += 1;
                    if *calls.borrow() < 3 {
                        Err(TestError::Flaky)
                    } else {
                        Ok("done")
                    }
                }
            })
        }
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(*calls.borrow(), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = Rc::new(RefCell::new(0));
        let result: Result<(), TestError> = {
            let calls = calls.clone();
            with_retry(fast(5), move || {
                let calls = calls.clone();
                async move {
                    *calls.borrow_mut() += 1;
                    Err(TestError::Fatal)
                }
            })
        }
        .await;

        assert!(matches!(result, Err(TestError::Fatal)));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = fast(10);
        assert_eq!(config.delay_for(1), Duration::from_millis(5));
        assert_eq!(config.delay_for(2), Duration::from_millis(10));
        assert_eq!(config.delay_for(6), Duration::from_millis(20));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(TransientError::from_status(429), Some(TransientError::TooManyRequests));
        assert_eq!(TransientError::from_status(503), Some(TransientError::ServerError));
        assert_eq!(TransientError::from_status(404), None);
    }
}
