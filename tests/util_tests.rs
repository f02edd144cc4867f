//! Tests for utility modules (retry, timeout).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use foundry_agents::error::FoundryError;
use foundry_agents::util::retry::RetryPolicy;
use foundry_agents::util::timeout::with_optional_timeout;

#[tokio::test(start_paused = true)]
async fn retry_policy_retries_retryable_errors_until_success() {
    let policy = RetryPolicy {
        max_attempts: 4,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_millis(100),
        multiplier: 2.0,
    };
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_task = attempts.clone();

    let task = tokio::spawn(async move {
        policy
            .execute(|| {
                let attempts = attempts_for_task.clone();
                async move {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(FoundryError::api(503, "Service Unavailable"))
                    } else {
                        Ok::<_, FoundryError>("ok")
                    }
                }
            })
            .await
    });

    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(1)).await;
    let result = task.await.unwrap();

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_policy_stops_immediately_for_non_retryable_errors() {
    let policy = RetryPolicy {
        max_attempts: 5,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
        multiplier: 2.0,
    };
    let attempts = Arc::new(AtomicUsize::new(0));

    let result = policy
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(FoundryError::api(404, "No assistant found"))
            }
        })
        .await;

    assert!(result.unwrap_err().is_not_found());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_policy_honours_retry_after_and_returns_last_error() {
    let policy = RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(50),
        max_backoff: Duration::from_secs(10),
        multiplier: 2.0,
    };
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_for_task = attempts.clone();
    let started = tokio::time::Instant::now();

    let result = policy
        .execute(|| {
            let attempts = attempts_for_task.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(FoundryError::RateLimited {
                    retry_after_ms: Some(2000),
                })
            }
        })
        .await;

    match result {
        Err(FoundryError::RateLimited { retry_after_ms }) => assert_eq!(retry_after_ms, Some(2000)),
        other => panic!("expected rate limit error, got {other:?}"),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    // Two waits of the server-provided delay.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
}

#[tokio::test]
async fn retry_policy_with_zero_attempts_still_runs_once() {
    let policy = RetryPolicy {
        max_attempts: 0,
        ..RetryPolicy::default()
    };
    let attempts = Arc::new(AtomicUsize::new(0));

    let result = policy
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FoundryError>(())
            }
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn optional_timeout_bounds_only_when_set() {
    let slow = || async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok::<_, FoundryError>("done")
    };

    let bounded = with_optional_timeout(Some(Duration::from_secs(1)), slow()).await;
    assert!(matches!(bounded, Err(FoundryError::Timeout(1000))));

    let unbounded = with_optional_timeout(None, slow()).await;
    assert_eq!(unbounded.unwrap(), "done");
}
