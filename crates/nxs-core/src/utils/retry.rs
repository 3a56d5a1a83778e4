use crate::error::DeviceError;
use backoff::{
    ExponentialBackoff,
    backoff::{Backoff, Constant},
};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Retry configuration for idempotent gateway reads
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts
    pub max_retries: u32,
    /// Initial retry delay
    pub initial_delay: Duration,
    /// Maximum retry delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 1,
            ..Self::default()
        }
    }
}

pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an async operation, retrying transient gateway failures
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, DeviceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, DeviceError>>,
    {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.initial_delay,
            current_interval: self.config.initial_delay,
            max_interval: self.config.max_delay,
            multiplier: self.config.multiplier,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if !self.should_retry(&error, attempt) {
                        return Err(error);
                    }

                    match backoff.next_backoff() {
                        Some(delay) => {
                            log::debug!(
                                "Retrying gateway request after {:?} (attempt {})",
                                delay,
                                attempt
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(error),
                    }
                }
            }
        }
    }

    fn should_retry(&self, error: &DeviceError, attempt: u32) -> bool {
        if attempt >= self.config.max_retries {
            return false;
        }

        match error {
            DeviceError::Http {
                status: 500..=599, ..
            } => true,
            DeviceError::Timeout { .. } => true,
            _ => false,
        }
    }
}

pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded fixed-interval polling used while waiting for servers and devices.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
    /// Slack on top of [`PollPolicy::budget`] for a check still in flight
    pub check_timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 1000,
            interval: Duration::from_millis(10),
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }
}

impl PollPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts,
            interval,
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    pub fn with_check_timeout(mut self, check_timeout: Duration) -> Self {
        self.check_timeout = check_timeout;
        self
    }

    /// Time spent sleeping between attempts
    pub fn budget(&self) -> Duration {
        self.interval * self.attempts
    }

    /// Hard limit on a whole poll, slow checks included
    pub fn deadline(&self) -> Duration {
        self.budget() + self.check_timeout
    }
}

/// Run `check` until it reports success, the attempts run out or the
/// [`PollPolicy::deadline`] passes.
///
/// Returns `true` as soon as `check` yields `true`. There is no sleep before
/// the first attempt and none after the last one. A check still running at
/// the deadline is dropped.
pub async fn poll_until<F, Fut>(policy: &PollPolicy, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + policy.deadline();
    let mut backoff = Constant::new(policy.interval);

    for attempt in 1..=policy.attempts {
        match tokio::time::timeout_at(deadline, check()).await {
            Ok(true) => {
                log::debug!("Poll succeeded after {} attempt(s)", attempt);
                return true;
            }
            Ok(false) => {}
            Err(_) => {
                log::debug!("Poll hit its {:?} deadline", policy.deadline());
                return false;
            }
        }
        if attempt < policy.attempts {
            if let Some(delay) = backoff.next_backoff() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    log::debug!("Poll gave up after {} attempt(s)", policy.attempts);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_success_immediate() {
        let executor = RetryExecutor::new(RetryConfig::default());

        let result = executor
            .execute(|| async { Ok::<i32, DeviceError>(42) })
            .await;

        assert_eq!(result.ok(), Some(42));
    }

    #[tokio::test]
    async fn test_retry_gives_up_on_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(RetryConfig::default());

        let counter = Arc::clone(&calls);
        let result: Result<String, DeviceError> = executor
            .execute(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(DeviceError::NotFound {
                        endpoint: "/devices/a/b/c".to_string(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_retries_server_errors_up_to_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(RetryConfig {
            max_retries: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            multiplier: 1.0,
        });

        let counter = Arc::clone(&calls);
        let result: Result<(), DeviceError> = executor
            .execute(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(DeviceError::Http {
                        status: 503,
                        endpoint: "/state".to_string(),
                        message: "busy".to_string(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_poll_policy_defaults() {
        let policy = PollPolicy::default();
        assert_eq!(policy.attempts, 1000);
        assert_eq!(policy.interval, Duration::from_millis(10));
        assert_eq!(policy.budget(), Duration::from_secs(10));
        assert_eq!(policy.deadline(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_poll_until_stops_on_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = PollPolicy::new(10, Duration::from_millis(1));

        let counter = Arc::clone(&calls);
        let found = poll_until(&policy, move || {
            let counter = Arc::clone(&counter);
            async move { counter.fetch_add(1, Ordering::SeqCst) + 1 >= 3 }
        })
        .await;

        assert!(found);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_until_is_bounded() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = PollPolicy::new(5, Duration::from_millis(1));

        let counter = Arc::clone(&calls);
        let found = poll_until(&policy, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }
        })
        .await;

        assert!(!found);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_poll_until_drops_a_hanging_check() {
        let policy = PollPolicy::new(3, Duration::from_millis(10))
            .with_check_timeout(Duration::from_millis(50));

        let started = Instant::now();
        let found = poll_until(&policy, || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            true
        })
        .await;

        assert!(!found);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
