use crate::domain::{EntityFixture, EntityKind, FieldValue, Format};
use crate::error::EncodeError;

const PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub fn encode_entity(fixture: &EntityFixture) -> Result<String, EncodeError> {
    super::reject_nested_lists(fixture, Format::Xml)?;

    let root = fixture.root_tag();
    check_name(root)?;

    let mut out = String::from(PROLOG);
    out.push('\n');
    out.push_str(&format!("<{root}>"));
    for (name, value) in &fixture.fields {
        write_field(&mut out, fixture.kind, name, value)?;
    }
    out.push_str(&format!("</{root}>"));
    Ok(out)
}

/// One field rendered exactly as [`encode_entity`] writes it inside the
/// root element, e.g. `<category><id>1</id><name>Dogs</name></category>`.
pub fn fragment(kind: EntityKind, name: &str, value: &FieldValue) -> Result<String, EncodeError> {
    let mut out = String::new();
    write_field(&mut out, kind, name, value)?;
    Ok(out)
}

fn write_field(
    out: &mut String,
    kind: EntityKind,
    name: &str,
    value: &FieldValue,
) -> Result<(), EncodeError> {
    check_name(name)?;

    match value {
        FieldValue::Object(fields) if fields.is_empty() => out.push_str(&format!("<{name}/>")),
        FieldValue::Object(fields) => {
            out.push_str(&format!("<{name}>"));
            for (child_name, child) in fields {
                write_field(out, kind, child_name, child)?;
            }
            out.push_str(&format!("</{name}>"));
        }
        FieldValue::List(items) if items.is_empty() => out.push_str(&format!("<{name}/>")),
        FieldValue::List(items) => {
            let item_tag = kind
                .item_tag(name)
                .ok_or_else(|| EncodeError::MissingItemTag {
                    entity: kind,
                    field: name.to_string(),
                })?;
            out.push_str(&format!("<{name}>"));
            for item in items {
                write_field(out, kind, item_tag, item)?;
            }
            out.push_str(&format!("</{name}>"));
        }
        scalar => {
            let text = scalar.scalar_text().unwrap_or_default();
            check_text(name, &text)?;
            out.push_str(&element(name, &text));
        }
    }
    Ok(())
}

/// `<name>text</name>` with the text escaped.
pub fn element(name: &str, text: &str) -> String {
    format!("<{name}>{}</{name}>", escape_text(text))
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// XML 1.0 `Char`: tab, newline and carriage return are the only controls.
fn check_text(field: &str, text: &str) -> Result<(), EncodeError> {
    let forbidden = text.chars().find(|&ch| {
        (ch < '\u{20}' && !matches!(ch, '\t' | '\n' | '\r'))
            || matches!(ch, '\u{FFFE}' | '\u{FFFF}')
    });
    match forbidden {
        Some(ch) => Err(EncodeError::InvalidXmlChar {
            field: field.to_string(),
            code: u32::from(ch),
        }),
        None => Ok(()),
    }
}

fn check_name(name: &str) -> Result<(), EncodeError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
    let valid_rest = chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(EncodeError::InvalidElementName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_collections_use_wrapper_and_item_tags() {
        let fixture = EntityFixture::new(EntityKind::Pet)
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
            .with("status", "available");

        let body = encode_entity(&fixture).expect("encode");
        assert_eq!(
            body,
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                "\n<Pet><id>10</id><name>doggie</name>",
                "<category><id>1</id><name>Dogs</name></category>",
                "<photoUrls><photoUrl>http://example.com/photo1</photoUrl></photoUrls>",
                "<tags><tag><id>1</id><name>tag1</name></tag></tags>",
                "<status>available</status></Pet>"
            )
        );
    }

    #[test]
    fn booleans_and_numbers_render_as_text() {
        let fixture = EntityFixture::new(EntityKind::Order)
            .with("quantity", 7)
            .with("complete", true);

        let body = encode_entity(&fixture).expect("encode");
        assert!(body.contains("<order><quantity>7</quantity><complete>true</complete></order>"));
    }

    #[test]
    fn empty_values_become_empty_elements() {
        let fixture = EntityFixture::new(EntityKind::Pet)
            .with("name", "")
            .with("photoUrls", FieldValue::List(Vec::new()));

        let body = encode_entity(&fixture).expect("encode");
        assert!(body.ends_with("<Pet><name></name><photoUrls/></Pet>"));
    }

    #[test]
    fn malformed_root_override() {
        let fixture = EntityFixture::new(EntityKind::Pet)
            .with_root("invalid")
            .with("data", FieldValue::Object(Vec::new()));

        let body = encode_entity(&fixture).expect("encode");
        assert!(body.ends_with("<invalid><data/></invalid>"));
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(element("name", "Tom & <Jerry>"), "<name>Tom &amp; &lt;Jerry&gt;</name>");
    }

    #[test]
    fn nested_fragment_matches_the_encoded_body() {
        let category = FieldValue::object([("id", 1.into()), ("name", "Dogs".into())]);
        let tags =
            FieldValue::list([FieldValue::object([("id", 1.into()), ("name", "tag1".into())])]);
        let fixture = EntityFixture::new(EntityKind::Pet)
            .with("category", category.clone())
            .with("tags", tags.clone());
        let body = encode_entity(&fixture).expect("encode");

        let category = fragment(EntityKind::Pet, "category", &category).expect("fragment");
        assert_eq!(category, "<category><id>1</id><name>Dogs</name></category>");
        assert!(body.contains(&category));

        let tags = fragment(EntityKind::Pet, "tags", &tags).expect("fragment");
        assert_eq!(tags, "<tags><tag><id>1</id><name>tag1</name></tag></tags>");
        assert!(body.contains(&tags));
    }

    #[test]
    fn control_characters_fail_loudly() {
        let fixture = EntityFixture::new(EntityKind::User).with("firstName", "Jo\u{1}hn");
        assert_eq!(
            encode_entity(&fixture),
            Err(EncodeError::InvalidXmlChar {
                field: "firstName".to_string(),
                code: 1
            })
        );

        let fixture = EntityFixture::new(EntityKind::User).with("firstName", "line\none\tx");
        assert!(encode_entity(&fixture).is_ok());
    }

    #[test]
    fn list_without_item_rule_fails_loudly() {
        let fixture =
            EntityFixture::new(EntityKind::User).with("roles", FieldValue::list(["admin"]));

        assert_eq!(
            encode_entity(&fixture),
            Err(EncodeError::MissingItemTag {
                entity: EntityKind::User,
                field: "roles".to_string()
            })
        );
    }

    #[test]
    fn invalid_element_names_fail_loudly() {
        let fixture = EntityFixture::new(EntityKind::User).with("first name", "John");
        assert_eq!(
            encode_entity(&fixture),
            Err(EncodeError::InvalidElementName("first name".to_string()))
        );

        let fixture = EntityFixture::new(EntityKind::User).with("1st", "John");
        assert!(encode_entity(&fixture).is_err());
    }
}
