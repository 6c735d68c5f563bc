//! # Testing & Assertions
//!
//! Judges raw responses against expected outcomes and collects the results
//! of a run into reports.

pub mod report;
mod validator;

use serde::{Deserialize, Serialize};

pub use validator::{all_passed, validate};

/// Target of an assertion within the HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum AssertionTarget {
    StatusCode,
    /// The body as a whole: parseable, non-empty, right shape.
    Body,
    JsonField(String),
    XmlFragment(String),
    ErrorField(String),
    CountEntry(String),
}

/// Result of evaluating one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionResult {
    pub target: AssertionTarget,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    pub message: String,
}

impl AssertionResult {
    pub fn pass(
        target: AssertionTarget,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            target,
            passed: true,
            expected: expected.into(),
            actual: actual.into(),
            message: String::new(),
        }
    }

    pub fn fail(
        target: AssertionTarget,
        expected: impl Into<String>,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target,
            passed: false,
            expected: expected.into(),
            actual: actual.into(),
            message: message.into(),
        }
    }
}
