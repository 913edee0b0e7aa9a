//! Retry with linear backoff
//!
//! The delay grows linearly with the attempt number (attempt × unit), with
//! no jitter. A call that exhausts its attempts returns the last error.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

/// Run `op` up to `max_attempts` times, sleeping `attempt × unit` between
/// failures
pub(crate) async fn with_backoff<T, E, F, Fut>(
    max_attempts: u32,
    unit: Duration,
    mut op: F,
) -> std::result::Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => return Err(err),
            Err(err) => {
                warn!(attempt, error = %err, "Attempt failed, retrying");
                sleep(unit * attempt).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(3, Duration::ZERO, || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err("transient")
                } else {
                    Ok(call)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = with_backoff(3, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("persistent") }
        })
        .await;

        assert_eq!(result, Err("persistent"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn first_success_makes_no_further_calls() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(3, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, &str>(()) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = with_backoff(0, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("nope") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
