//! Generic bounded-retry helper.
//!
//! The retry behavior is a value — attempt cap, backoff schedule, and a
//! retryability predicate — consumed by one call-with-policy function, so
//! the policy stays decoupled from whichever external call it wraps.

use std::time::Duration;

pub struct RetryPolicy<E> {
    max_attempts: u32,
    backoff: Box<dyn Fn(u32) -> Duration + Send + Sync>,
    is_retryable: Box<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<E> RetryPolicy<E> {
    pub fn new(
        max_attempts: u32,
        backoff: impl Fn(u32) -> Duration + Send + Sync + 'static,
        is_retryable: impl Fn(&E) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Box::new(backoff),
            is_retryable: Box::new(is_retryable),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the attempt following attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        (self.backoff)(attempt)
    }

    pub fn is_retryable(&self, err: &E) -> bool {
        (self.is_retryable)(err)
    }
}

/// Run `call` under a policy: sequential attempts, sleeping the policy's
/// backoff between them, retrying only failures the policy accepts.
/// The last error is returned once attempts are exhausted.
pub fn call_with_policy<T, E>(
    policy: &RetryPolicy<E>,
    mut call: impl FnMut() -> Result<T, E>,
) -> Result<T, E>
where
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match call() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts() && policy.is_retryable(&e) => {
                let wait = policy.backoff_for(attempt);
                tracing::warn!(
                    attempt,
                    wait_secs = wait.as_secs(),
                    error = %e,
                    "Retryable failure, backing off"
                );
                if !wait.is_zero() {
                    std::thread::sleep(wait);
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
