use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

/// How an error should be treated by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Transient: network failures, 5xx responses, rate limits.
    Retryable,
    /// Permanent: authorization and malformed-request errors. Aborts
    /// immediately without consuming remaining attempts.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay slept after the given failed attempt (1-based):
    /// `base * 2^(attempt-1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Run `operation` up to `policy.max_attempts` times.
///
/// A fatal error aborts at once; a retryable one sleeps the backoff delay
/// and tries again. After the final attempt the last error is surfaced
/// unchanged.
pub async fn retry<T, E, F, Fut, C>(
    policy: RetryPolicy,
    operation_name: &str,
    classify: C,
    mut operation: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> Classification,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if classify(&e) == Classification::Fatal => {
                error!("{} failed with non-retryable error: {}", operation_name, e);
                return Err(e);
            }
            Err(e) if attempt >= policy.max_attempts => {
                error!(
                    "{} failed after {} attempts, giving up: {}",
                    operation_name, attempt, e
                );
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    operation_name, attempt, policy.max_attempts, delay, e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use thiserror::Error;
    use tokio::time::Instant;

    #[derive(Debug, Error)]
    enum TestError {
        #[error("transient")]
        Transient,
        #[error("permanent")]
        Permanent,
    }

    fn classify(e: &TestError) -> Classification {
        match e {
            TestError::Transient => Classification::Retryable,
            TestError::Permanent => Classification::Fatal,
        }
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(4, Duration::from_millis(50));
        assert_eq!(policy.delay_for(1), Duration::from_millis(50));
        assert_eq!(policy.delay_for(2), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(200));
        assert_eq!(policy.delay_for(4), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_invokes_exactly_max_attempts() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        let calls = Arc::new(AtomicU32::new(0));
        let timestamps: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));

        let result: Result<(), TestError> = retry(policy, "always_fails", classify, || {
            let calls = calls.clone();
            let timestamps = timestamps.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                timestamps.lock().unwrap().push(Instant::now());
                Err(TestError::Transient)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        // Delays between attempts strictly increase: 100, 200, 400ms.
        let timestamps = timestamps.lock().unwrap();
        let gaps: Vec<Duration> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(gaps.len(), 3);
        assert_eq!(gaps[0], Duration::from_millis(100));
        assert_eq!(gaps[1], Duration::from_millis(200));
        assert_eq!(gaps[2], Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_single_transient_failure() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<u32, TestError> = retry(policy, "flaky", classify, || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_aborts_immediately() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), TestError> = retry(policy, "unauthorized", classify, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Permanent)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Permanent)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_never_sleeps() {
        let policy = RetryPolicy::new(1, Duration::from_secs(3600));
        let start = Instant::now();

        let result: Result<(), TestError> =
            retry(policy, "one_shot", classify, || async { Err(TestError::Transient) }).await;

        assert!(result.is_err());
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }
}
