//! Retry policy for external model calls.
//!
//! Only rate-limit failures are retried; anything else surfaces
//! immediately so a genuinely broken request is not hammered three more
//! times. Backoff doubles from a 4 second base.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use arclens_core::defaults::{BACKOFF_BASE_MS, MAX_RETRIES};
use arclens_core::Result;

/// Run `op`, retrying up to [`MAX_RETRIES`] times on rate-limit errors
/// with exponential backoff.
pub async fn with_rate_limit_retry<T, F, Fut>(operation: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_rate_limit() && attempt < MAX_RETRIES => {
                let delay = Duration::from_millis(BACKOFF_BASE_MS << attempt);
                warn!(
                    op = operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
