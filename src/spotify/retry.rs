use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::{Error, Res, warning};

/// The one retry policy every remote call goes through.
///
/// - Rate limits sleep for the provider's `Retry-After` and retry without
///   consuming an attempt.
/// - Other remote failures sleep `base_delay * attempt` and retry until
///   `attempts` is reached, then fail with [`Error::Exhausted`].
/// - Non-retryable errors (see [`Error::is_retryable`]) propagate untouched.
#[derive(Debug, Clone)]
pub struct RetryingCaller {
    attempts: u32,
    base_delay: Duration,
}

impl Default for RetryingCaller {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(2000))
    }
}

impl RetryingCaller {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub async fn call<T, F, Fut>(&self, label: &str, mut operation: F) -> Res<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Res<T>>,
    {
        let mut attempt = 1;

        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if let Error::RateLimited { retry_after } = err {
                warning!("Rate limited on \"{}\". Retrying in {}s...", label, retry_after);
                sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            if !err.is_retryable() {
                return Err(err);
            }

            if attempt >= self.attempts {
                return Err(Error::Exhausted {
                    label: label.to_string(),
                    attempts: attempt,
                    source: Box::new(err),
                });
            }

            let delay = self.base_delay * attempt;
            warning!(
                "\"{}\" attempt {} failed: {}. Retrying in {}ms...",
                label,
                attempt,
                err,
                delay.as_millis()
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
