//! # Engine
//!
//! Runs expanded test cases against the target server on a fixed pool of
//! workers and folds the outcomes into a [`RunReport`](crate::testing::report::RunReport).

mod runner;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub use runner::{execute_case, run_cases};

static RUN_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or_default()
}

pub fn generate_id(prefix: &str) -> String {
    let counter = RUN_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{counter}", now_ms())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let first = generate_id("run");
        let second = generate_id("run");
        assert!(first.starts_with("run-"));
        assert_ne!(first, second);
    }
}
