//! Process-wide request pacing.
//!
//! The upstream enforces a requests-per-second ceiling across the whole
//! account, so one [`Pacer`] is shared by every in-flight task. The pacing
//! lock is held across the pacing sleep: that is the serialization point
//! that makes the bound exact under arbitrary concurrency.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Gate enforcing a minimum interval between upstream request dispatches.
pub struct Pacer {
    min_gap: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl Pacer {
    /// A pacer that allows at most `requests_per_second` dispatches per
    /// second. A ceiling of zero is treated as one.
    #[must_use]
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            min_gap: Duration::from_secs(1) / requests_per_second.max(1),
            last_dispatch: Mutex::new(None),
        }
    }

    /// Blocks the calling task until at least `1/R` seconds have elapsed
    /// since the previous dispatch, then records the new dispatch time.
    pub async fn acquire(&self) {
        let mut last = self.last_dispatch.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_gap {
                sleep(self.min_gap - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
