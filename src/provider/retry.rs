// provider/retry.rs — bounded exponential backoff for provider calls.

use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first try.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryConfig {
    /// No waiting — for unit tests.
    #[cfg(test)]
    pub fn instant() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }
}

/// Call `f` until it succeeds, it fails non-transiently, or attempts run
/// out. Between transient failures, sleeps the current delay and doubles it
/// (capped at `max_delay`). Returns the first non-transient or the last
/// error.
pub async fn retry_if<F, Fut, T, E>(
    config: &RetryConfig,
    should_retry: impl Fn(&E) -> bool,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;

    for attempt in 1..=attempts {
        match f().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "call succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt < attempts && should_retry(&err) => {
                warn!(
                    attempt,
                    max = attempts,
                    delay_ms = delay.as_millis() as u64,
                    %err,
                    "transient failure — backing off"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(config.max_delay);
            }
            Err(err) => return Err(err),
        }
    }
    unreachable!("final attempt either returned Ok or Err")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (calls.clone(), calls)
    }

    #[tokio::test]
    async fn first_success_needs_one_call() {
        let (calls, calls2) = counter();
        let result: Result<u32, String> = retry_if(&RetryConfig::instant(), |_| true, || {
            let c = calls2.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let (calls, calls2) = counter();
        let result: Result<u32, String> = retry_if(&RetryConfig::instant(), |_| true, || {
            let c = calls2.clone();
            async move {
                let n = c.fetch_add(1, Ordering::Relaxed) + 1;
                if n < 3 {
                    Err(format!("attempt {n} failed"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn non_transient_error_fails_immediately() {
        let (calls, calls2) = counter();
        let result: Result<u32, String> = retry_if(&RetryConfig::instant(), |_| false, || {
            let c = calls2.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
                Err("bad request".to_string())
            }
        })
        .await;
        assert_eq!(result.unwrap_err(), "bad request");
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn exhaustion_returns_last_error() {
        let (calls, calls2) = counter();
        let result: Result<u32, String> = retry_if(&RetryConfig::instant(), |_| true, || {
            let c = calls2.clone();
            async move {
                let n = c.fetch_add(1, Ordering::Relaxed) + 1;
                Err(format!("failure {n}"))
            }
        })
        .await;
        assert_eq!(result.unwrap_err(), "failure 3");
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }
}
