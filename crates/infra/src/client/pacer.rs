//! Request pacing
//!
//! The remote API throttles aggressively; a minimum gap between
//! consecutive requests keeps a busy sync run under its limits. Pacing
//! state is per client instance, so two tenants' clients never stall
//! each other.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive requests
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last_request: Mutex::new(None) }
    }

    /// Wait until this request may be sent.
    ///
    /// The lock is held across the sleep so concurrent callers are
    /// serialized and each is granted its own slot.
    pub async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
