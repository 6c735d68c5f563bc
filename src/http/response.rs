use serde::Serialize;
use std::collections::BTreeMap;

/// Raw outcome of one round trip. Every status, 4xx and 5xx included, is a
/// valid response here; judging it is the validator's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub content_type: String,
    pub body: String,
    pub size_bytes: usize,
    pub duration_ms: u64,
}

impl HttpResponse {
    pub fn is_xml(&self) -> bool {
        let content_type = self.content_type.to_ascii_lowercase();
        if content_type.contains("xml") {
            return true;
        }
        if content_type.contains("json") {
            return false;
        }
        self.body.trim_start().starts_with('<')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content_type: &str, body: &str) -> HttpResponse {
        HttpResponse {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            headers: BTreeMap::new(),
            content_type: content_type.to_string(),
            body: body.to_string(),
            size_bytes: body.len(),
            duration_ms: 1,
        }
    }

    #[test]
    fn sniffs_xml_from_content_type_then_body() {
        assert!(response("application/xml; charset=utf-8", "{}").is_xml());
        assert!(!response("application/json", "<code/>").is_xml());
        assert!(response("text/plain", "  <Error/>").is_xml());
        assert!(!response("text/plain", "{\"code\":\"1\"}").is_xml());
    }
}
