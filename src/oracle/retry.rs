use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use rand::Rng;

use crate::settings::OracleSettings;

const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Bounded retries with a per-attempt timeout and jittered exponential
/// backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempt_timeout: Duration,
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &OracleSettings) -> Self {
        Self {
            attempt_timeout: settings.request_timeout(),
            max_attempts: settings.max_attempts.max(1),
            base_backoff: settings.base_backoff(),
        }
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1)
    /// plus up to half of that again, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self
            .base_backoff
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16));
        let jitter_ms = if exp.as_millis() > 1 {
            rand::thread_rng().gen_range(0..=(exp.as_millis() as u64 / 2))
        } else {
            0
        };
        (exp + Duration::from_millis(jitter_ms)).min(MAX_BACKOFF)
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = anyhow!("{label}: no attempt made");

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.attempt_timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => {
                    log::debug!("{label} attempt {attempt}/{attempts} failed: {err:#}");
                    last_error = err;
                }
                Err(_) => {
                    log::debug!(
                        "{label} attempt {attempt}/{attempts} timed out after {:?}",
                        self.attempt_timeout
                    );
                    last_error = anyhow!("{label} timed out after {:?}", self.attempt_timeout);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.backoff(attempt)).await;
            }
        }

        Err(last_error.context(format!("{label} failed after {attempts} attempt(s)")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempt_timeout: Duration::from_millis(50),
            max_attempts: attempts,
            base_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .run("flaky", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(anyhow!("not yet"))
                } else {
                    Ok(42)
                }
            })
            .await
            .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy(2)
            .run("broken", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow!("boom"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn slow_attempts_time_out() {
        let result: Result<()> = policy(1)
            .run("slow", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("timed out"), "{message}");
    }

    #[test]
    fn backoff_grows_and_is_capped() {
        let policy = RetryPolicy {
            attempt_timeout: Duration::from_secs(1),
            max_attempts: 5,
            base_backoff: Duration::from_millis(100),
        };
        let first = policy.backoff(1);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(150));
        let third = policy.backoff(3);
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(600));
        assert_eq!(policy.backoff(30), MAX_BACKOFF);
    }
}
