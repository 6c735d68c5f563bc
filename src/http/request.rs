use serde::Serialize;

use super::method::HttpMethod;

/// A fully resolved request, ready for the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestInput {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RequestInput {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
