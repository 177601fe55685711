// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Conflict-retry for read-modify-write cycles against the API server.

use crate::error::{DeployError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Bounded exponential backoff policy for conflict retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry
    pub factor: u32,
    /// Upper bound on the delay between retries
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 5,
            initial_delay: Duration::from_millis(10),
            factor: 2,
            max_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before re-running the attempt with the given zero-based index.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(self.factor.saturating_pow(attempt))
            .min(self.max_delay)
    }
}

/// Check whether an error is a version conflict (HTTP 409) reported by the
/// API server.
pub fn is_conflict(err: &DeployError) -> bool {
    matches!(err, DeployError::KubeError(kube::Error::Api(resp)) if resp.code == 409)
}

/// Re-run `attempt` as long as it fails with a version conflict.
///
/// Any other error is returned immediately. When the attempt budget is
/// exhausted, the last conflict error is returned.
pub async fn retry_on_conflict<T, F, Fut>(policy: &RetryPolicy, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut tries = 0;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if is_conflict(&e) => {
                tries += 1;
                if tries >= policy.attempts {
                    warn!("Giving up after {} conflicted attempts", tries);
                    return Err(e);
                }
                let delay = policy.delay_for(tries - 1);
                debug!(
                    "Version conflict on attempt {}, retrying in {:?}",
                    tries, delay
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn conflict_err() -> DeployError {
        DeployError::KubeError(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "the object has been modified".to_string(),
            reason: "Conflict".to_string(),
            code: 409,
        }))
    }

    fn not_found_err() -> DeployError {
        DeployError::KubeError(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "deployment not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        }))
    }

    fn quick_policy() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            initial_delay: Duration::from_millis(1),
            factor: 2,
            max_delay: Duration::from_millis(10),
        }
    }

    #[test]
    fn delay_grows_exponentially_up_to_the_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(10));
        assert_eq!(policy.delay_for(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for(2), Duration::from_millis(40));
        assert_eq!(policy.delay_for(10), Duration::from_secs(1));
    }

    #[test]
    fn conflict_detection_checks_the_status_code() {
        assert!(is_conflict(&conflict_err()));
        assert!(!is_conflict(&not_found_err()));
        assert!(!is_conflict(&DeployError::KubeconfigError("x".into())));
    }

    #[tokio::test]
    async fn returns_first_success_without_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result = retry_on_conflict(&quick_policy(), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_through_conflicts_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result = retry_on_conflict(&quick_policy(), move || {
            let c = c.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(conflict_err())
                } else {
                    Ok("updated")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "updated");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn surfaces_the_last_conflict_when_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<()> = retry_on_conflict(&quick_policy(), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(conflict_err())
            }
        })
        .await;

        assert!(is_conflict(&result.unwrap_err()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_conflict_errors_bypass_the_retry_loop() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<()> = retry_on_conflict(&quick_policy(), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(not_found_err())
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(!is_conflict(&err));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
