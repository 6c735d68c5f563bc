use crate::domain::{Accept, EntityFixture, EntityKind, FieldValue, Format, Scenario};
use crate::http::method::HttpMethod;

use super::{BodyRule, Endpoint, Row};

pub(super) fn example_pet() -> EntityFixture {
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

/// Well-formed in every format, but not a pet.
fn bad_input() -> EntityFixture {
    EntityFixture::new(EntityKind::Pet)
        .with_root("invalid")
        .with("invalid", "payload")
}

fn failing_validation() -> EntityFixture {
    EntityFixture::new(EntityKind::Pet)
        .with("name", "")
        .with("photoUrls", FieldValue::List(Vec::new()))
}

fn unknown_pet() -> EntityFixture {
    example_pet().with("id", 999999)
}

pub(super) fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint {
            entity: EntityKind::Pet,
            method: HttpMethod::Post,
            path: "/pet",
            request_formats: Format::ALL.to_vec(),
            accepts: vec![Accept::Json, Accept::Xml],
            rows: vec![
                Row::new(Scenario::Success, 200)
                    .payload(example_pet())
                    // the server may assign its own id
                    .body(BodyRule::Entity {
                        reference: example_pet(),
                        present: &["id"],
                        equal: &["name", "category", "photoUrls", "tags", "status"],
                    }),
                Row::new(Scenario::BadInput, 400).payload(bad_input()),
                Row::new(Scenario::Validation, 422).payload(failing_validation()),
                Row::simulated_error().payload(example_pet()),
            ],
        },
        Endpoint {
            entity: EntityKind::Pet,
            method: HttpMethod::Put,
            path: "/pet",
            request_formats: Format::ALL.to_vec(),
            accepts: vec![Accept::Json, Accept::Xml],
            rows: vec![
                Row::new(Scenario::Success, 200)
                    .payload(example_pet())
                    .body(BodyRule::Entity {
                        reference: example_pet(),
                        present: &[],
                        equal: &["id", "name", "category", "photoUrls", "tags", "status"],
                    }),
                Row::new(Scenario::BadInput, 400).payload(bad_input()),
                Row::new(Scenario::NotFound, 404).payload(unknown_pet()),
                Row::new(Scenario::Validation, 422).payload(failing_validation()),
                Row::simulated_error().payload(example_pet()),
            ],
        },
    ]
}
