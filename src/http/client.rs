use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::domain::{FORCE_ERROR_HEADER, TestCase};
use crate::environment::{build_variable_map, interpolate};
use crate::error::DispatchError;

use super::request::RequestInput;
use super::response::HttpResponse;

/// Sends requests to the target server and hands back whatever it answered.
///
/// One client per run. Redirects are not followed and nothing is retried:
/// the harness records what the server did on the first attempt.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl Dispatcher {
    pub fn new(base_url: &Url, timeout_ms: u64) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| DispatchError::Request(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.clone(),
            timeout_ms,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Turn a case into a concrete request: path placeholders resolved,
    /// query appended, negotiation and force-error headers set.
    pub fn resolve(
        &self,
        case: &TestCase,
        overrides: &BTreeMap<String, String>,
    ) -> Result<RequestInput, DispatchError> {
        let variables = build_variable_map(&case.vars, overrides);
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| DispatchError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "base URL cannot carry a path".to_string(),
            })?;
            segments.pop_if_empty();
            // Each segment is interpolated separately so that a value like
            // " " or "a/b" stays inside its own segment, percent-encoded.
            for segment in case.path.trim_start_matches('/').split('/') {
                segments.push(&interpolate(segment, &variables));
            }
        }

        if !case.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &case.query {
                query_pairs.append_pair(key, value);
            }
        }

        let mut headers = vec![("Accept".to_string(), case.accept.header_value().to_string())];
        if let Some(payload) = &case.payload {
            headers.push(("Content-Type".to_string(), payload.content_type.to_string()));
        }
        if case.force_error {
            headers.push((FORCE_ERROR_HEADER.to_string(), "true".to_string()));
        }

        Ok(RequestInput {
            method: case.method,
            url: url.to_string(),
            headers,
            body: case.payload.as_ref().map(|payload| payload.body.clone()),
        })
    }

    pub async fn send(&self, request: &RequestInput) -> Result<HttpResponse, DispatchError> {
        let headers = build_headers(&request.headers)?;
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(headers);

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "dispatching request");
        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|err| classify_reqwest_error(&err, self.timeout_ms))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("Unknown").to_string();

        let mut response_headers = BTreeMap::new();
        for (key, value) in response.headers() {
            response_headers.insert(
                key.to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            );
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        let bytes = response.bytes().await.map_err(|err| {
            if err.is_timeout() {
                DispatchError::Timeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                DispatchError::Read(err.to_string())
            }
        })?;
        let duration_ms = started.elapsed().as_millis() as u64;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text,
            headers: response_headers,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            size_bytes: bytes.len(),
            duration_ms,
        })
    }
}

pub fn build_headers(input: &[(String, String)]) -> Result<HeaderMap, DispatchError> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let header_name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|err| DispatchError::InvalidHeader {
                name: key.clone(),
                reason: err.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| DispatchError::InvalidHeader {
            name: key.clone(),
            reason: err.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }

    if !headers.contains_key(ACCEPT) {
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    }

    Ok(headers)
}

fn classify_reqwest_error(err: &reqwest::Error, timeout_ms: u64) -> DispatchError {
    if err.is_timeout() {
        return DispatchError::Timeout { timeout_ms };
    }
    if err.is_connect() {
        return DispatchError::Connect(err.to_string());
    }
    if err.is_body() || err.is_decode() {
        return DispatchError::Read(err.to_string());
    }
    DispatchError::Request(err.to_string())
}

/// Flatten a response header map the way reports print it.
pub fn format_headers(headers: &BTreeMap<String, String>) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
