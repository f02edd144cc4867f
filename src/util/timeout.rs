//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::FoundryError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, FoundryError>>,
) -> Result<T, FoundryError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(FoundryError::Timeout(duration.as_millis() as u64)),
    }
}

/// Like [`with_timeout`], but waits forever when no bound is given.
pub async fn with_optional_timeout<T>(
    duration: Option<Duration>,
    future: impl Future<Output = Result<T, FoundryError>>,
) -> Result<T, FoundryError> {
    match duration {
        Some(duration) => with_timeout(duration, future).await,
        None => future.await,
    }
}
