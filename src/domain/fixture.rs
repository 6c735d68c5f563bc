use super::types::EntityKind;

/// A typed leaf or container inside a fixture.
///
/// Objects keep their declaration order so that every encoding of the same
/// fixture lists fields in the same order.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Bool(bool),
    Text(String),
    Object(Vec<(String, FieldValue)>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, FieldValue)>) -> Self {
        FieldValue::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    pub fn list<T: Into<FieldValue>>(items: impl IntoIterator<Item = T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Text rendering of a scalar as it appears in XML and form bodies.
    /// `None` for containers.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            FieldValue::Int(value) => Some(value.to_string()),
            FieldValue::Bool(value) => Some(value.to_string()),
            FieldValue::Text(value) => Some(value.clone()),
            FieldValue::Object(_) | FieldValue::List(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Int(value) => serde_json::Value::from(*value),
            FieldValue::Bool(value) => serde_json::Value::Bool(*value),
            FieldValue::Text(value) => serde_json::Value::String(value.clone()),
            FieldValue::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            FieldValue::List(items) => {
                serde_json::Value::Array(items.iter().map(FieldValue::to_json).collect())
            }
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Canonical, format-independent description of one resource instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFixture {
    pub kind: EntityKind,
    /// Overrides the XML root element; malformed fixtures use this.
    pub root: Option<String>,
    pub fields: Vec<(String, FieldValue)>,
}

impl EntityFixture {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            root: None,
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        match self.fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, existing)) => *existing = value.into(),
            None => self.fields.push((name.to_string(), value.into())),
        }
        self
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = Some(root.to_string());
        self
    }

    pub fn root_tag(&self) -> &str {
        self.root.as_deref().unwrap_or(self.kind.root_tag())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn to_json(&self) -> serde_json::Value {
        FieldValue::Object(self.fields.clone()).to_json()
    }
}

/// What a test case sends as its request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Entity(EntityFixture),
    /// A list of entities, e.g. `/user/createWithList`.
    Batch(Vec<EntityFixture>),
}

impl From<EntityFixture> for Payload {
    fn from(fixture: EntityFixture) -> Self {
        Payload::Entity(fixture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_replaces_existing_field_in_place() {
        let fixture = EntityFixture::new(EntityKind::Pet)
            .with("id", 10)
            .with("name", "doggie")
            .with("id", 999999);

        assert_eq!(fixture.fields.len(), 2);
        assert_eq!(fixture.fields[0].0, "id");
        assert_eq!(fixture.get("id"), Some(&FieldValue::Int(999999)));
    }

    #[test]
    fn json_keeps_scalar_types() {
        let fixture = EntityFixture::new(EntityKind::Order)
            .with("quantity", 7)
            .with("complete", true)
            .with("status", "approved");

        let json = fixture.to_json();
        assert_eq!(json["quantity"], serde_json::json!(7));
        assert_eq!(json["complete"], serde_json::json!(true));
        assert_eq!(json["status"], serde_json::json!("approved"));
    }

    #[test]
    fn root_override_wins_over_kind() {
        let fixture = EntityFixture::new(EntityKind::Pet).with_root("invalid");
        assert_eq!(fixture.root_tag(), "invalid");
        assert_eq!(EntityFixture::new(EntityKind::Pet).root_tag(), "Pet");
    }
}
