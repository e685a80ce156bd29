//! Polling until a condition holds.

use std::time::Duration;
use tokio::time::{sleep, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Poll `condition` until it returns true or `timeout` elapses.
///
/// Returns whether the condition held before the timeout.
pub async fn wait_for_condition<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}
