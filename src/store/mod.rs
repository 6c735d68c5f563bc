//! Run history: every run's classifications, kept in SQLite so two runs
//! can be compared case by case.

pub mod sqlite;

use serde::Serialize;

/// One row of the `runs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub base_url: String,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub fatal: u64,
}
