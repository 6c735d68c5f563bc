use serde::Serialize;
use std::collections::BTreeMap;

use super::types::{Accept, EntityKind, Format, Scenario};
use crate::http::method::HttpMethod;
use crate::payload::EncodedPayload;

/// Status codes a target may answer with when told to simulate a failure.
pub const SIMULATED_ERROR_STATUSES: [u16; 4] = [500, 501, 502, 503];

/// Header that asks the target server to simulate an unexpected failure.
pub const FORCE_ERROR_HEADER: &str = "X-Force-Error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "codes")]
pub enum StatusExpectation {
    Exact(u16),
    /// The target picks the exact code, e.g. the simulated-error family.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    pub fn simulated_error() -> Self {
        StatusExpectation::OneOf(SIMULATED_ERROR_STATUSES.to_vec())
    }

    pub fn matches(&self, status: u16) -> bool {
        match self {
            StatusExpectation::Exact(expected) => *expected == status,
            StatusExpectation::OneOf(codes) => codes.contains(&status),
        }
    }

    pub fn description(&self) -> String {
        match self {
            StatusExpectation::Exact(expected) => expected.to_string(),
            StatusExpectation::OneOf(codes) => {
                let codes: Vec<String> = codes.iter().map(u16::to_string).collect();
                format!("one of [{}]", codes.join(", "))
            }
        }
    }
}

/// Presence (and optionally value) of one top-level JSON field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCheck {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals: Option<serde_json::Value>,
}

impl FieldCheck {
    pub fn present(name: &str) -> Self {
        Self {
            name: name.to_string(),
            equals: None,
        }
    }

    pub fn equals(name: &str, value: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            equals: Some(value),
        }
    }
}

/// Body predicate for one response representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "checks")]
pub enum BodyExpectation {
    Ignore,
    /// Decoded JSON object; unlisted fields are not inspected.
    JsonFields(Vec<FieldCheck>),
    /// Serialized fragments that must appear verbatim in an XML body.
    XmlFragments(Vec<String>),
    /// Non-empty `code` and `message`, in whichever format the body came back.
    ErrorEnvelope,
    /// JSON object mapping string keys to non-negative integers.
    CountMap,
    NonEmptyText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedOutcome {
    pub status: StatusExpectation,
    pub body: BodyExpectation,
}

/// One independently runnable check against the target server.
///
/// Built fresh from the table for every run. The payload is encoded when
/// the case is built, so a fixture the format cannot carry never reaches
/// the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    pub id: String,
    pub entity: EntityKind,
    pub method: HttpMethod,
    /// Path template, `{{name}}` placeholders resolved from `vars`.
    pub path: String,
    pub vars: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    pub request_format: Option<Format>,
    pub payload: Option<EncodedPayload>,
    pub accept: Accept,
    pub force_error: bool,
    pub scenario: Scenario,
    pub expected: ExpectedOutcome,
}

impl TestCase {
    pub fn case_id(
        method: HttpMethod,
        path: &str,
        request_format: Option<Format>,
        accept: Accept,
        scenario: Scenario,
    ) -> String {
        let format = request_format.map(Format::as_str).unwrap_or("none");
        format!("{method} {path} [{format} -> {accept}] {scenario}")
    }
}
