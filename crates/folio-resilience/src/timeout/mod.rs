//! Timeout wrapper for async operations.

use folio_core::FolioError;
use std::time::Duration;

/// Wraps an async operation with a timeout.
pub async fn with_timeout<F, Fut, T>(duration: Duration, f: F) -> Result<T, FolioError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, FolioError>>,
{
    tokio::time::timeout(duration, f())
        .await
        .map_err(|_| FolioError::Timeout(format!("Operation timed out after {:?}", duration)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_success() {
        let result = with_timeout(Duration::from_secs(1), || async { Ok::<_, FolioError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_exceeded() {
        let result = with_timeout(Duration::from_millis(10), || async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, FolioError>(42)
        })
        .await;

        assert!(matches!(result, Err(FolioError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let result: Result<(), _> = with_timeout(Duration::from_secs(1), || async {
            Err(FolioError::Database("down".to_string()))
        })
        .await;

        assert!(matches!(result, Err(FolioError::Database(_))));
    }
}
