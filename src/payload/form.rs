use std::collections::HashSet;

use crate::domain::{EntityFixture, FieldValue, Format};
use crate::error::EncodeError;

/// Flatten a fixture into `(key, text)` pairs.
///
/// Objects nest with dots (`category.id`), every list item carries its
/// index (`photoUrls[0]`, `tags[0].name`). An empty list is kept as a single
/// empty key so the server still sees the field. Field names containing a
/// separator, empty objects and repeated keys are rejected.
pub fn leaf_pairs(fixture: &EntityFixture) -> Result<Vec<(String, String)>, EncodeError> {
    super::reject_nested_lists(fixture, Format::Form)?;

    let mut pairs = Vec::new();
    for (name, value) in &fixture.fields {
        check_name(name)?;
        flatten(name.clone(), value, &mut pairs)?;
    }

    let mut seen = HashSet::with_capacity(pairs.len());
    for (key, _) in &pairs {
        if !seen.insert(key.as_str()) {
            return Err(EncodeError::DuplicateFormKey(key.clone()));
        }
    }
    Ok(pairs)
}

fn flatten(
    key: String,
    value: &FieldValue,
    pairs: &mut Vec<(String, String)>,
) -> Result<(), EncodeError> {
    match value {
        FieldValue::Object(fields) if fields.is_empty() => {
            return Err(EncodeError::EmptyFormObject(key));
        }
        FieldValue::Object(fields) => {
            for (name, child) in fields {
                check_name(name)?;
                flatten(format!("{key}.{name}"), child, pairs)?;
            }
        }
        FieldValue::List(items) if items.is_empty() => pairs.push((key, String::new())),
        FieldValue::List(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten(format!("{key}[{idx}]"), item, pairs)?;
            }
        }
        scalar => pairs.push((key, scalar.scalar_text().unwrap_or_default())),
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), EncodeError> {
    if name.contains(['.', '[', ']']) {
        Err(EncodeError::AmbiguousFormKey(name.to_string()))
    } else {
        Ok(())
    }
}

pub fn encode_entity(fixture: &EntityFixture) -> Result<String, EncodeError> {
    let pairs = leaf_pairs(fixture)?;
    serde_urlencoded::to_string(&pairs).map_err(|err| EncodeError::Form(err.to_string()))
}
