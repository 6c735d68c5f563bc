use crate::domain::EntityFixture;
use crate::error::EncodeError;

pub fn encode_entity(fixture: &EntityFixture) -> Result<String, EncodeError> {
    serde_json::to_string(&fixture.to_json()).map_err(|err| EncodeError::Json(err.to_string()))
}

pub fn encode_batch(items: &[EntityFixture]) -> Result<String, EncodeError> {
    let values: Vec<serde_json::Value> = items.iter().map(EntityFixture::to_json).collect();
    serde_json::to_string(&values).map_err(|err| EncodeError::Json(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityKind, FieldValue};
    use serde_json::json;

    #[test]
    fn nested_structures_keep_their_types() {
        let fixture = EntityFixture::new(EntityKind::Pet)
            .with("id", 10)
            .with(
                "category",
                FieldValue::object([("id", 1.into()), ("name", "Dogs".into())]),
            )
            .with("photoUrls", FieldValue::list(["http://example.com/photo1"]));

        let body = encode_entity(&fixture).expect("encode");
        let decoded: serde_json::Value = serde_json::from_str(&body).expect("valid json");
        assert_eq!(
            decoded,
            json!({
                "id": 10,
                "category": {"id": 1, "name": "Dogs"},
                "photoUrls": ["http://example.com/photo1"]
            })
        );
    }

    #[test]
    fn empty_values_stay_present() {
        let fixture = EntityFixture::new(EntityKind::Pet)
            .with("name", "")
            .with("photoUrls", FieldValue::List(Vec::new()));

        let decoded: serde_json::Value =
            serde_json::from_str(&encode_entity(&fixture).expect("encode")).expect("valid json");
        assert_eq!(decoded, json!({"name": "", "photoUrls": []}));
    }

    #[test]
    fn batch_is_an_array_in_order() {
        let first = EntityFixture::new(EntityKind::User).with("username", "theUser");
        let second = EntityFixture::new(EntityKind::User).with("username", "anotherUser");

        let decoded: serde_json::Value =
            serde_json::from_str(&encode_batch(&[first, second]).expect("encode"))
                .expect("valid json");
        assert_eq!(
            decoded,
            json!([{"username": "theUser"}, {"username": "anotherUser"}])
        );
    }
}
