//! Bounded retries for key-value store calls

use std::future::Future;
use std::time::Duration;
use wayfarer_core::error::Result;

/// Exponential backoff applied to transient failures only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_millis(800),
        }
    }
}

impl RetryPolicy {
    /// Try exactly once
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Retry without sleeping between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self { max_attempts, initial_backoff: Duration::ZERO, max_backoff: Duration::ZERO }
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    pub async fn run<T, F, Fut>(&self, action: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::debug!(
                        action,
                        attempt,
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Retrying key-value operation"
                    );
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                    backoff = backoff.saturating_mul(2).min(self.max_backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wayfarer_core::error::WayfarerError;
    use wayfarer_core::models::RouteId;

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::immediate(3)
            .run("get", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(WayfarerError::Cache("connection reset".into()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = RetryPolicy::immediate(4)
            .run("set", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(WayfarerError::Cache("timeout".into()))
            })
            .await;

        assert!(matches!(result, Err(WayfarerError::Cache(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = RetryPolicy::immediate(5)
            .run("get", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(WayfarerError::RouteNotFound { route_id: RouteId(1) })
            })
            .await;

        assert!(matches!(result, Err(WayfarerError::RouteNotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_none_policy_tries_once() {
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
