//! Payload encoding: one canonical fixture, three wire formats.
//!
//! Every encoder either represents every field of the fixture or fails with
//! an [`EncodeError`]. Nothing is dropped silently.

mod form;
mod json;
mod xml;

use serde::Serialize;

use crate::domain::{EntityFixture, FieldValue, Format, Payload};
use crate::error::EncodeError;

pub use form::leaf_pairs;
pub use xml::fragment;

/// A fixture rendered for one format, with its matching `Content-Type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedPayload {
    pub format: Format,
    pub content_type: &'static str,
    pub body: String,
}

pub fn encode(payload: &Payload, format: Format) -> Result<EncodedPayload, EncodeError> {
    let body = match (payload, format) {
        (Payload::Entity(fixture), Format::Json) => json::encode_entity(fixture)?,
        (Payload::Entity(fixture), Format::Xml) => xml::encode_entity(fixture)?,
        (Payload::Entity(fixture), Format::Form) => form::encode_entity(fixture)?,
        (Payload::Batch(items), Format::Json) => json::encode_batch(items)?,
        (Payload::Batch(items), format) => {
            return Err(EncodeError::BatchUnsupported {
                format,
                count: items.len(),
            });
        }
    };

    Ok(EncodedPayload {
        format,
        content_type: format.content_type(),
        body,
    })
}

/// Walk the fixture in declaration order, rejecting shapes that only JSON
/// can carry. Shared by the XML and form encoders.
pub(crate) fn reject_nested_lists(
    fixture: &EntityFixture,
    format: Format,
) -> Result<(), EncodeError> {
    fn walk(path: &str, value: &FieldValue, format: Format) -> Result<(), EncodeError> {
        match value {
            FieldValue::Object(fields) => {
                for (name, child) in fields {
                    walk(&format!("{path}.{name}"), child, format)?;
                }
                Ok(())
            }
            FieldValue::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if matches!(item, FieldValue::List(_)) {
                        return Err(EncodeError::NestedList {
                            format,
                            field: format!("{path}[{idx}]"),
                        });
                    }
                    walk(&format!("{path}[{idx}]"), item, format)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    for (name, value) in &fixture.fields {
        walk(name, value, format)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityKind;
    use super::xml::element;

    fn example_pet() -> EntityFixture {
        EntityFixture::new(EntityKind::Pet)
            .with("id", 10)
            .with("name", "doggie")
            .with(
                "category",
                FieldValue::object([("id", 1.into()), ("name", "Dogs".into())]),
            )
            .with("photoUrls", FieldValue::list(["http://example.com/photo1"]))
            .with(
                "tags",
                FieldValue::list([FieldValue::object([("id", 1.into()), ("name", "tag1".into())])]),
            )
            .with("status", "available")
    }

    #[test]
    fn every_format_reports_its_content_type() {
        let payload = Payload::Entity(example_pet());
        for format in Format::ALL {
            let encoded = encode(&payload, format).expect("encode");
            assert_eq!(encoded.format, format);
            assert_eq!(encoded.content_type, format.content_type());
            assert!(!encoded.body.is_empty());
        }
    }

    #[test]
    fn every_leaf_survives_every_format() {
        let fixture = example_pet();
        let payload = Payload::Entity(fixture.clone());
        let json: serde_json::Value =
            serde_json::from_str(&encode(&payload, Format::Json).expect("json").body)
                .expect("valid json");
        let xml = encode(&payload, Format::Xml).expect("xml").body;
        let form: Vec<(String, String)> =
            serde_urlencoded::from_str(&encode(&payload, Format::Form).expect("form").body)
                .expect("valid form");

        let leaves = leaf_pairs(&fixture).expect("leaves");
        assert_eq!(leaves, form);

        for (path, text) in &leaves {
            let pointer = format!(
                "/{}",
                path.replace('.', "/").replace('[', "/").replace(']', "")
            );
            let json_leaf = json.pointer(&pointer).expect("leaf present in JSON");
            let json_text = match json_leaf {
                serde_json::Value::String(value) => value.clone(),
                other => other.to_string(),
            };
            assert_eq!(&json_text, text, "JSON leaf {path}");

            let leaf_name = path
                .rsplit(['.', '['])
                .next()
                .unwrap_or(path)
                .trim_end_matches(']');
            let tag = if leaf_name.chars().all(|c| c.is_ascii_digit()) {
                "photoUrl"
            } else {
                leaf_name
            };
            assert!(
                xml.contains(&element(tag, text)),
                "XML is missing {tag}={text}: {xml}"
            );
        }
    }

    #[test]
    fn batch_is_json_only() {
        let payload = Payload::Batch(vec![example_pet(), example_pet().with("id", 11)]);
        let json = encode(&payload, Format::Json).expect("json");
        assert!(json.body.starts_with('['));

        assert_eq!(
            encode(&payload, Format::Xml),
            Err(EncodeError::BatchUnsupported {
                format: Format::Xml,
                count: 2
            })
        );
        assert!(matches!(
            encode(&payload, Format::Form),
            Err(EncodeError::BatchUnsupported { .. })
        ));
    }

    #[test]
    fn nested_lists_fail_outside_json() {
        let fixture = EntityFixture::new(EntityKind::User)
            .with("matrix", FieldValue::list([FieldValue::list([1, 2])]));
        let payload = Payload::Entity(fixture);

        assert!(encode(&payload, Format::Json).is_ok());
        assert_eq!(
            encode(&payload, Format::Form),
            Err(EncodeError::NestedList {
                format: Format::Form,
                field: "matrix[0]".to_string()
            })
        );
        assert!(encode(&payload, Format::Xml).is_err());
    }
}
