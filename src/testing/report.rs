use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::domain::Scenario;
use crate::http::request::RequestInput;
use crate::http::response::HttpResponse;

use super::AssertionResult;

/// Classification of one case after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    /// The server answered and at least one check failed.
    Failed,
    /// No usable response: timeout, connection failure, unreadable body.
    Fatal,
}

impl CaseOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseOutcome::Passed => "passed",
            CaseOutcome::Failed => "failed",
            CaseOutcome::Fatal => "fatal",
        }
    }

    pub fn from_str_lossy(value: &str) -> Option<Self> {
        match value {
            "passed" => Some(CaseOutcome::Passed),
            "failed" => Some(CaseOutcome::Failed),
            "fatal" => Some(CaseOutcome::Fatal),
            _ => None,
        }
    }
}

impl std::fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub case_id: String,
    pub scenario: Scenario,
    pub outcome: CaseOutcome,
    pub request: RequestInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<HttpResponse>,
    pub assertions: Vec<AssertionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl CaseReport {
    pub fn failed_assertions(&self) -> impl Iterator<Item = &AssertionResult> {
        self.assertions.iter().filter(|result| !result.passed)
    }
}

/// Summary report for a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub base_url: String,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub fatal: usize,
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    pub fn new(
        run_id: String,
        base_url: String,
        started_at_ms: u64,
        finished_at_ms: u64,
        cases: Vec<CaseReport>,
    ) -> Self {
        let count = |outcome: CaseOutcome| {
            cases
                .iter()
                .filter(|case| case.outcome == outcome)
                .count()
        };
        Self {
            run_id,
            base_url,
            started_at_ms,
            finished_at_ms,
            total: cases.len(),
            passed: count(CaseOutcome::Passed),
            failed: count(CaseOutcome::Failed),
            fatal: count(CaseOutcome::Fatal),
            cases,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.finished_at_ms.saturating_sub(self.started_at_ms)
    }

    /// Human readable report: one line per case, failure details indented
    /// below it, then the totals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for case in &self.cases {
            let status = case
                .response
                .as_ref()
                .map(|response| response.status.to_string())
                .unwrap_or_else(|| "---".to_string());
            let _ = writeln!(
                out,
                "{:<6} {status} {:>5}ms  {}",
                case.outcome.as_str().to_uppercase(),
                case.duration_ms,
                case.case_id
            );

            if let Some(error) = &case.error {
                let kind = case.error_kind.as_deref().unwrap_or("ERROR");
                let _ = writeln!(out, "         {kind}: {error}");
            }
            for failed in case.failed_assertions() {
                let _ = writeln!(out, "         {}", failed.message);
            }
        }

        let _ = writeln!(
            out,
            "\n{} cases: {} passed, {} failed, {} fatal ({} ms)",
            self.total,
            self.passed,
            self.failed,
            self.fatal,
            self.duration_ms()
        );
        out
    }
}

/// A case whose classification differs between two runs. `None` means the
/// case did not exist in that run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationDrift {
    pub case_id: String,
    pub before: Option<CaseOutcome>,
    pub after: Option<CaseOutcome>,
}

pub fn diff_classifications(
    before: &BTreeMap<String, CaseOutcome>,
    after: &BTreeMap<String, CaseOutcome>,
) -> Vec<ClassificationDrift> {
    let mut ids: Vec<&String> = before.keys().chain(after.keys()).collect();
    ids.sort();
    ids.dedup();

    ids.into_iter()
        .filter_map(|id| {
            let old = before.get(id).copied();
            let new = after.get(id).copied();
            (old != new).then(|| ClassificationDrift {
                case_id: id.clone(),
                before: old,
                after: new,
            })
        })
        .collect()
}
