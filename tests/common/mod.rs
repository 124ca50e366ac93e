//! Common test utilities, fixtures, and mocks
//! Shared by the scheduler and idle supervisor test suites.
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use std::time::Duration;

/// Give up on a condition after this long.
const WAIT_LIMIT: Duration = Duration::from_secs(2);

/// Poll `condition` until it holds, panicking after `WAIT_LIMIT`.
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(WAIT_LIMIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

/// Let background drivers run for a few poll intervals.
pub async fn settle() {
    tokio::time::sleep(fixtures::POLL_INTERVAL * 5).await;
}
