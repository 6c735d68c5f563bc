//! # Fixture/Outcome Table
//!
//! Every endpoint the harness covers is one [`Endpoint`] value: its request
//! formats, the representations it can answer with, and one [`Row`] per
//! scenario. [`expand`] multiplies that out into independent [`TestCase`]s.
//! A new entity or format means new rows here, never new test code.

mod pet;
mod store;
mod user;

use std::collections::BTreeMap;

use crate::domain::{
    Accept, BodyExpectation, EntityFixture, EntityKind, ExpectedOutcome, FieldCheck, Format,
    Payload, Scenario, StatusExpectation, TestCase,
};
use crate::error::{EncodeError, HarnessError};
use crate::http::method::HttpMethod;
use crate::payload;

/// Format-independent description of what the response body must show.
/// Lowered to a [`BodyExpectation`] once the `Accept` of a case is known.
///
/// An `equal` field is compared whole in both representations: the full
/// JSON value, or the complete element as the XML encoder would write it.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyRule {
    Ignore,
    /// The response echoes an entity. `present` fields only need to exist;
    /// `equal` fields must carry the reference value.
    Entity {
        reference: EntityFixture,
        present: &'static [&'static str],
        equal: &'static [&'static str],
    },
    ErrorEnvelope,
    CountMap,
    NonEmptyText,
}

impl BodyRule {
    pub fn lower(&self, accept: Accept) -> Result<BodyExpectation, EncodeError> {
        let expectation = match self {
            BodyRule::Ignore => BodyExpectation::Ignore,
            BodyRule::ErrorEnvelope => BodyExpectation::ErrorEnvelope,
            BodyRule::CountMap => BodyExpectation::CountMap,
            BodyRule::NonEmptyText => BodyExpectation::NonEmptyText,
            BodyRule::Entity {
                reference,
                present,
                equal,
            } => match accept {
                Accept::Json => {
                    let mut checks: Vec<FieldCheck> =
                        present.iter().map(|name| FieldCheck::present(name)).collect();
                    for name in equal.iter() {
                        match reference.get(name) {
                            Some(value) => checks.push(FieldCheck::equals(name, value.to_json())),
                            None => checks.push(FieldCheck::present(name)),
                        }
                    }
                    BodyExpectation::JsonFields(checks)
                }
                Accept::Xml => {
                    let mut fragments = vec![format!("<{}>", reference.root_tag())];
                    fragments.extend(present.iter().map(|name| format!("<{name}>")));
                    for name in equal.iter() {
                        match reference.get(name) {
                            Some(value) => {
                                fragments.push(payload::fragment(reference.kind, name, value)?)
                            }
                            None => fragments.push(format!("<{name}>")),
                        }
                    }
                    BodyExpectation::XmlFragments(fragments)
                }
                Accept::Any => BodyExpectation::NonEmptyText,
            },
        };
        Ok(expectation)
    }
}

/// One scenario of an endpoint.
#[derive(Debug, Clone)]
pub struct Row {
    pub scenario: Scenario,
    pub vars: Vec<(&'static str, &'static str)>,
    pub query: Vec<(&'static str, &'static str)>,
    pub payload: Option<Payload>,
    /// Replaces the endpoint's accept list for this row only.
    pub accepts: Option<Vec<Accept>>,
    pub status: StatusExpectation,
    pub body: BodyRule,
}

impl Row {
    pub fn new(scenario: Scenario, status: u16) -> Self {
        Self {
            scenario,
            vars: Vec::new(),
            query: Vec::new(),
            payload: None,
            accepts: None,
            status: StatusExpectation::Exact(status),
            body: BodyRule::Ignore,
        }
    }

    /// Force-error row: any status of the simulated family, error envelope body.
    pub fn simulated_error() -> Self {
        Self {
            status: StatusExpectation::simulated_error(),
            body: BodyRule::ErrorEnvelope,
            ..Self::new(Scenario::SimulatedError, 500)
        }
    }

    pub fn var(mut self, name: &'static str, value: &'static str) -> Self {
        self.vars.push((name, value));
        self
    }

    pub fn query(mut self, name: &'static str, value: &'static str) -> Self {
        self.query.push((name, value));
        self
    }

    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn accepts(mut self, accepts: &[Accept]) -> Self {
        self.accepts = Some(accepts.to_vec());
        self
    }

    pub fn body(mut self, body: BodyRule) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub entity: EntityKind,
    pub method: HttpMethod,
    /// Path relative to the base URL, `{{name}}` for path parameters.
    pub path: &'static str,
    /// Empty for endpoints without a request body.
    pub request_formats: Vec<Format>,
    pub accepts: Vec<Accept>,
    pub rows: Vec<Row>,
}

/// All endpoints of the target API, in a stable order.
pub fn endpoints() -> Vec<Endpoint> {
    let mut all = pet::endpoints();
    all.extend(store::endpoints());
    all.extend(user::endpoints());
    all
}

/// `/user/{{username}}` → `/user/{username}`
fn display_path(path: &str) -> String {
    path.replace("{{", "{").replace("}}", "}")
}

/// Expand endpoints into test cases, encoding every payload up front.
///
/// An encoding failure aborts the expansion: it is a fixture bug, and no
/// request should go out while the table is broken.
pub fn expand(endpoints: &[Endpoint]) -> Result<Vec<TestCase>, HarnessError> {
    let mut cases = Vec::new();

    for endpoint in endpoints {
        let path = display_path(endpoint.path);
        for row in &endpoint.rows {
            let formats: Vec<Option<Format>> = match &row.payload {
                Some(_) => endpoint.request_formats.iter().copied().map(Some).collect(),
                None => vec![None],
            };
            let accepts = row.accepts.as_ref().unwrap_or(&endpoint.accepts);

            for format in &formats {
                for accept in accepts {
                    let id =
                        TestCase::case_id(endpoint.method, &path, *format, *accept, row.scenario);

                    let broken_fixture = |source| HarnessError::Encode {
                        case: id.clone(),
                        source,
                    };
                    let encoded = match (&row.payload, format) {
                        (Some(payload), Some(format)) => {
                            Some(payload::encode(payload, *format).map_err(broken_fixture)?)
                        }
                        _ => None,
                    };
                    let body = row.body.lower(*accept).map_err(broken_fixture)?;

                    cases.push(TestCase {
                        id,
                        entity: endpoint.entity,
                        method: endpoint.method,
                        path: endpoint.path.to_string(),
                        vars: row
                            .vars
                            .iter()
                            .map(|(name, value)| (name.to_string(), value.to_string()))
                            .collect::<BTreeMap<_, _>>(),
                        query: row
                            .query
                            .iter()
                            .map(|(name, value)| (name.to_string(), value.to_string()))
                            .collect(),
                        request_format: *format,
                        payload: encoded,
                        accept: *accept,
                        force_error: row.scenario == Scenario::SimulatedError,
                        scenario: row.scenario,
                        expected: ExpectedOutcome {
                            status: row.status.clone(),
                            body,
                        },
                    });
                }
            }
        }
    }

    Ok(cases)
}

/// Narrow the expanded table. Unset criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub entity: Option<EntityKind>,
    pub method: Option<HttpMethod>,
    pub scenario: Option<Scenario>,
    pub format: Option<Format>,
    pub accept: Option<Accept>,
    pub id_contains: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, case: &TestCase) -> bool {
        self.entity.is_none_or(|entity| case.entity == entity)
            && self.method.is_none_or(|method| case.method == method)
            && self.scenario.is_none_or(|scenario| case.scenario == scenario)
            && self.format.is_none_or(|format| case.request_format == Some(format))
            && self.accept.is_none_or(|accept| case.accept == accept)
            && self
                .id_contains
                .as_deref()
                .is_none_or(|needle| case.id.contains(needle))
    }

    pub fn apply(&self, cases: Vec<TestCase>) -> Vec<TestCase> {
        cases.into_iter().filter(|case| self.matches(case)).collect()
    }
}

/// Build the full table and apply `filter`.
pub fn select(filter: &CaseFilter) -> Result<Vec<TestCase>, HarnessError> {
    Ok(filter.apply(expand(&endpoints())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;
    use crate::http::response::HttpResponse;
    use crate::testing::{all_passed, validate};
    use serde_json::json;
    use std::collections::HashSet;

    fn all_cases() -> Vec<TestCase> {
        expand(&endpoints()).expect("table expands")
    }

    fn response(content_type: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: BTreeMap::new(),
            content_type: content_type.to_string(),
            body: body.to_string(),
            size_bytes: body.len(),
            duration_ms: 1,
        }
    }

    #[test]
    fn every_case_id_is_unique() {
        let cases = all_cases();
        let ids: HashSet<&str> = cases.iter().map(|case| case.id.as_str()).collect();
        assert_eq!(ids.len(), cases.len());
    }

    #[test]
    fn expansion_is_deterministic() {
        let first: Vec<String> = all_cases().into_iter().map(|case| case.id).collect();
        let second: Vec<String> = all_cases().into_iter().map(|case| case.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn case_counts_follow_the_format_grid() {
        let cases = all_cases();
        let count = |method: HttpMethod, path: &str| {
            cases
                .iter()
                .filter(|case| case.method == method && case.path == path)
                .count()
        };

        // 3 formats x 2 accepts x 4 scenarios
        assert_eq!(count(HttpMethod::Post, "/pet"), 24);
        // 3 formats x 2 accepts x 5 scenarios
        assert_eq!(count(HttpMethod::Put, "/pet"), 30);
        assert_eq!(count(HttpMethod::Get, "/store/inventory"), 2);
        // 3 formats x 1 accept x 4 scenarios
        assert_eq!(count(HttpMethod::Post, "/store/order"), 12);
        assert_eq!(count(HttpMethod::Post, "/user"), 12);
        assert_eq!(count(HttpMethod::Post, "/user/createWithList"), 4);
        assert_eq!(count(HttpMethod::Get, "/user/login"), 6);
        assert_eq!(count(HttpMethod::Get, "/user/logout"), 2);
        assert_eq!(count(HttpMethod::Get, "/user/{{username}}"), 8);
        assert_eq!(count(HttpMethod::Put, "/user/{{username}}"), 12);
        assert_eq!(count(HttpMethod::Delete, "/user/{{username}}"), 4);
    }

    #[test]
    fn force_error_is_set_exactly_on_simulated_error_cases() {
        for case in all_cases() {
            assert_eq!(
                case.force_error,
                case.scenario == Scenario::SimulatedError,
                "{}",
                case.id
            );
            if case.force_error {
                assert_eq!(case.expected.status, StatusExpectation::simulated_error());
                assert_eq!(case.expected.body, BodyExpectation::ErrorEnvelope);
            }
        }
    }

    #[test]
    fn payload_content_type_matches_request_format() {
        for case in all_cases() {
            match (&case.payload, case.request_format) {
                (Some(payload), Some(format)) => {
                    assert_eq!(payload.format, format);
                    assert_eq!(payload.content_type, format.content_type());
                }
                (None, None) => {}
                other => panic!("{}: inconsistent payload {other:?}", case.id),
            }
        }
    }

    #[test]
    fn pet_success_checks_the_same_fields_in_both_representations() {
        let cases = all_cases();
        let find = |accept: Accept| {
            cases
                .iter()
                .find(|case| {
                    case.method == HttpMethod::Post
                        && case.path == "/pet"
                        && case.scenario == Scenario::Success
                        && case.request_format == Some(Format::Json)
                        && case.accept == accept
                })
                .expect("case exists")
        };

        assert_eq!(
            find(Accept::Json).expected.body,
            BodyExpectation::JsonFields(vec![
                FieldCheck::present("id"),
                FieldCheck::equals("name", json!("doggie")),
                FieldCheck::equals("category", json!({"id": 1, "name": "Dogs"})),
                FieldCheck::equals("photoUrls", json!(["http://example.com/photo1"])),
                FieldCheck::equals("tags", json!([{"id": 1, "name": "tag1"}])),
                FieldCheck::equals("status", json!("available")),
            ])
        );
        assert_eq!(
            find(Accept::Xml).expected.body,
            BodyExpectation::XmlFragments(vec![
                "<Pet>".to_string(),
                "<id>".to_string(),
                "<name>doggie</name>".to_string(),
                "<category><id>1</id><name>Dogs</name></category>".to_string(),
                "<photoUrls><photoUrl>http://example.com/photo1</photoUrl></photoUrls>".to_string(),
                "<tags><tag><id>1</id><name>tag1</name></tag></tags>".to_string(),
                "<status>available</status>".to_string(),
            ])
        );
    }

    #[test]
    fn wrong_nested_value_fails_in_both_representations() {
        let rule = BodyRule::Entity {
            reference: pet::example_pet(),
            present: &[],
            equal: &["category"],
        };
        let expected = |accept| ExpectedOutcome {
            status: StatusExpectation::Exact(200),
            body: rule.lower(accept).expect("lower"),
        };

        let json_body = r#"{"id":10,"category":{"id":2,"name":"Cats"}}"#;
        let xml_body = "<Pet><id>10</id><category><id>2</id><name>Cats</name></category></Pet>";
        let json = validate(&response("application/json", json_body), &expected(Accept::Json));
        let xml = validate(&response("application/xml", xml_body), &expected(Accept::Xml));
        assert!(!all_passed(&json), "{json:?}");
        assert!(!all_passed(&xml), "{xml:?}");

        let json_body = r#"{"id":10,"category":{"id":1,"name":"Dogs"}}"#;
        let xml_body = "<Pet><id>10</id><category><id>1</id><name>Dogs</name></category></Pet>";
        let json = validate(&response("application/json", json_body), &expected(Accept::Json));
        let xml = validate(&response("application/xml", xml_body), &expected(Accept::Xml));
        assert!(all_passed(&json), "{json:?}");
        assert!(all_passed(&xml), "{xml:?}");
    }

    #[test]
    fn reference_that_cannot_be_rendered_fails_the_expansion() {
        let broken = Endpoint {
            entity: EntityKind::User,
            method: HttpMethod::Get,
            path: "/user/login",
            request_formats: Vec::new(),
            accepts: vec![Accept::Json, Accept::Xml],
            rows: vec![Row::new(Scenario::Success, 200).body(BodyRule::Entity {
                reference: EntityFixture::new(EntityKind::User)
                    .with("roles", FieldValue::list(["admin"])),
                present: &[],
                equal: &["roles"],
            })],
        };

        match expand(&[broken]) {
            Err(HarnessError::Encode { case, source }) => {
                assert_eq!(case, "GET /user/login [none -> xml] success");
                assert!(matches!(source, EncodeError::MissingItemTag { .. }));
            }
            other => panic!("expected encode error, got {other:?}"),
        }
    }

    #[test]
    fn path_parameters_are_kept_per_case() {
        let cases = all_cases();
        let not_found = cases
            .iter()
            .find(|case| {
                case.method == HttpMethod::Delete && case.scenario == Scenario::NotFound
            })
            .expect("delete not found case");
        assert_eq!(not_found.vars.get("username").map(String::as_str), Some("nonExistentUser987"));
        assert_eq!(not_found.accept, Accept::Any);
        assert_eq!(not_found.id, "DELETE /user/{username} [none -> any] not_found");
    }

    #[test]
    fn batch_endpoint_is_json_only() {
        for case in all_cases()
            .iter()
            .filter(|case| case.path == "/user/createWithList")
        {
            assert_eq!(case.request_format, Some(Format::Json), "{}", case.id);
        }
    }

    #[test]
    fn broken_fixture_fails_the_whole_expansion() {
        let broken = Endpoint {
            entity: EntityKind::User,
            method: HttpMethod::Post,
            path: "/user",
            request_formats: vec![Format::Json, Format::Xml],
            accepts: vec![Accept::Json],
            rows: vec![Row::new(Scenario::Success, 200).payload(
                EntityFixture::new(EntityKind::User).with("roles", FieldValue::list(["admin"])),
            )],
        };

        match expand(&[broken]) {
            Err(HarnessError::Encode { case, .. }) => {
                assert_eq!(case, "POST /user [xml -> json] success")
            }
            other => panic!("expected encode error, got {other:?}"),
        }
    }

    #[test]
    fn filters_combine() {
        let filter = CaseFilter {
            entity: Some(EntityKind::Pet),
            scenario: Some(Scenario::Validation),
            format: Some(Format::Form),
            ..CaseFilter::default()
        };
        let cases = filter.apply(all_cases());
        assert_eq!(cases.len(), 4);
        assert!(cases.iter().all(|case| case.id.contains("[form -> ")));

        let filter = CaseFilter {
            id_contains: Some("/store/inventory".to_string()),
            ..CaseFilter::default()
        };
        assert_eq!(filter.apply(all_cases()).len(), 2);

        let filter = CaseFilter {
            format: Some(Format::Xml),
            method: Some(HttpMethod::Get),
            ..CaseFilter::default()
        };
        assert!(filter.apply(all_cases()).is_empty());
    }
}
