use serde_json::Value;

use crate::domain::{BodyExpectation, ExpectedOutcome, FieldCheck, StatusExpectation};
use crate::http::response::HttpResponse;

use super::{AssertionResult, AssertionTarget};

const ERROR_FIELDS: [&str; 2] = ["code", "message"];
const ACTUAL_PREVIEW_CHARS: usize = 200;

/// Evaluate every check of `expected` against `response`.
///
/// The status check always runs. Body checks run regardless of the status
/// outcome so a report shows everything that was wrong at once.
pub fn validate(response: &HttpResponse, expected: &ExpectedOutcome) -> Vec<AssertionResult> {
    let mut results = vec![check_status(response.status, &expected.status)];

    match &expected.body {
        BodyExpectation::Ignore => {}
        BodyExpectation::JsonFields(checks) => {
            results.extend(check_json_fields(&response.body, checks))
        }
        BodyExpectation::XmlFragments(fragments) => {
            results.extend(check_xml_fragments(&response.body, fragments))
        }
        BodyExpectation::ErrorEnvelope => results.extend(check_error_envelope(response)),
        BodyExpectation::CountMap => results.extend(check_count_map(&response.body)),
        BodyExpectation::NonEmptyText => results.push(check_non_empty(&response.body)),
    }

    results
}

pub fn all_passed(results: &[AssertionResult]) -> bool {
    results.iter().all(|result| result.passed)
}

fn check_status(actual: u16, expected: &StatusExpectation) -> AssertionResult {
    if expected.matches(actual) {
        AssertionResult::pass(
            AssertionTarget::StatusCode,
            expected.description(),
            actual.to_string(),
        )
    } else {
        AssertionResult::fail(
            AssertionTarget::StatusCode,
            expected.description(),
            actual.to_string(),
            format!("Expected status {}, got {actual}", expected.description()),
        )
    }
}

fn parse_json_object(body: &str) -> Result<serde_json::Map<String, Value>, AssertionResult> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AssertionResult::fail(
            AssertionTarget::Body,
            "JSON object",
            preview(&other.to_string()),
            "Body is JSON but not an object",
        )),
        Err(err) => Err(AssertionResult::fail(
            AssertionTarget::Body,
            "JSON object",
            preview(body),
            format!("Body is not valid JSON: {err}"),
        )),
    }
}

fn check_json_fields(body: &str, checks: &[FieldCheck]) -> Vec<AssertionResult> {
    let object = match parse_json_object(body) {
        Ok(object) => object,
        Err(result) => return vec![result],
    };

    checks
        .iter()
        .map(|check| {
            let target = AssertionTarget::JsonField(check.name.clone());
            let expected = check
                .equals
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_else(|| "<present>".to_string());

            match (object.get(&check.name), &check.equals) {
                (None, _) => AssertionResult::fail(
                    target,
                    expected,
                    "<missing>",
                    format!("Field `{}` is missing", check.name),
                ),
                (Some(actual), None) => AssertionResult::pass(target, expected, actual.to_string()),
                (Some(actual), Some(wanted)) if values_match(wanted, actual) => {
                    AssertionResult::pass(target, expected, actual.to_string())
                }
                (Some(actual), Some(_)) => AssertionResult::fail(
                    target,
                    expected.clone(),
                    actual.to_string(),
                    format!("Field `{}` expected {expected}, got {actual}", check.name),
                ),
            }
        })
        .collect()
}

/// `10` and `10.0` are the same number on the wire. Integers compare
/// exactly; containers compare member by member.
fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(left), Value::Number(right)) => numbers_match(left, right),
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right).all(|(left, right)| values_match(left, right))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left.iter().all(|(name, left)| {
                    right
                        .get(name)
                        .is_some_and(|right| values_match(left, right))
                })
        }
        _ => expected == actual,
    }
}

fn numbers_match(left: &serde_json::Number, right: &serde_json::Number) -> bool {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return left == right;
    }
    if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
        return left == right;
    }
    if left.is_f64() || right.is_f64() {
        return match (left.as_f64(), right.as_f64()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        };
    }
    // one side negative, the other beyond i64
    false
}

fn check_xml_fragments(body: &str, fragments: &[String]) -> Vec<AssertionResult> {
    fragments
        .iter()
        .map(|fragment| {
            let target = AssertionTarget::XmlFragment(fragment.clone());
            if body.contains(fragment.as_str()) {
                AssertionResult::pass(target, fragment.clone(), fragment.clone())
            } else {
                AssertionResult::fail(
                    target,
                    fragment.clone(),
                    preview(body),
                    format!("Body does not contain `{fragment}`"),
                )
            }
        })
        .collect()
}

fn check_error_envelope(response: &HttpResponse) -> Vec<AssertionResult> {
    if response.is_xml() {
        return ERROR_FIELDS
            .iter()
            .map(|field| {
                let target = AssertionTarget::ErrorField(field.to_string());
                match xml_element_text(&response.body, field) {
                    Some(text) if !text.trim().is_empty() => {
                        AssertionResult::pass(target, "<non-empty>", text)
                    }
                    Some(_) => AssertionResult::fail(
                        target,
                        "<non-empty>",
                        "<empty>",
                        format!("Element <{field}> is empty"),
                    ),
                    None => AssertionResult::fail(
                        target,
                        "<non-empty>",
                        preview(&response.body),
                        format!("Element <{field}> is missing"),
                    ),
                }
            })
            .collect();
    }

    let object = match parse_json_object(&response.body) {
        Ok(object) => object,
        Err(result) => return vec![result],
    };

    ERROR_FIELDS
        .iter()
        .map(|field| {
            let target = AssertionTarget::ErrorField(field.to_string());
            match object.get(*field) {
                None => AssertionResult::fail(
                    target,
                    "<non-empty>",
                    "<missing>",
                    format!("Field `{field}` is missing"),
                ),
                Some(value) if is_non_empty_scalar(value) => {
                    AssertionResult::pass(target, "<non-empty>", value.to_string())
                }
                Some(value) => AssertionResult::fail(
                    target,
                    "<non-empty>",
                    value.to_string(),
                    format!("Field `{field}` is empty"),
                ),
            }
        })
        .collect()
}

fn is_non_empty_scalar(value: &Value) -> bool {
    match value {
        Value::String(text) => !text.trim().is_empty(),
        Value::Number(_) => true,
        _ => false,
    }
}

/// Text between the first `<name>` and the following `</name>`.
fn xml_element_text<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(&body[start..end])
}

fn check_count_map(body: &str) -> Vec<AssertionResult> {
    let object = match parse_json_object(body) {
        Ok(object) => object,
        Err(result) => return vec![result],
    };

    let bad: Vec<AssertionResult> = object
        .iter()
        .filter(|(_, value)| value.as_u64().is_none())
        .map(|(key, value)| {
            AssertionResult::fail(
                AssertionTarget::CountEntry(key.clone()),
                "non-negative integer",
                value.to_string(),
                format!("Count for `{key}` is not a non-negative integer"),
            )
        })
        .collect();

    if bad.is_empty() {
        vec![AssertionResult::pass(
            AssertionTarget::Body,
            "map of non-negative integers",
            format!("{} entries", object.len()),
        )]
    } else {
        bad
    }
}

fn check_non_empty(body: &str) -> AssertionResult {
    if body.trim().is_empty() {
        AssertionResult::fail(AssertionTarget::Body, "<non-empty>", "<empty>", "Body is empty")
    } else {
        AssertionResult::pass(AssertionTarget::Body, "<non-empty>", preview(body))
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() <= ACTUAL_PREVIEW_CHARS {
        return body.to_string();
    }
    let cut: String = body.chars().take(ACTUAL_PREVIEW_CHARS).collect();
    format!("{cut}…")
}
