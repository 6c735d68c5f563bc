use crate::domain::{Accept, EntityFixture, EntityKind, Format, Scenario};
use crate::http::method::HttpMethod;

use super::{BodyRule, Endpoint, Row};

fn example_order() -> EntityFixture {
    EntityFixture::new(EntityKind::Order)
        .with("id", 10)
        .with("petId", 198772)
        .with("quantity", 7)
        .with("shipDate", "2023-10-27T10:00:00.000Z")
        .with("status", "approved")
        .with("complete", true)
}

fn bad_input() -> EntityFixture {
    EntityFixture::new(EntityKind::Order)
        .with("wrongField", "value")
        .with("id", "not-an-int")
}

fn failing_validation() -> EntityFixture {
    EntityFixture::new(EntityKind::Order)
        .with("id", 1)
        .with("petId", 1)
        .with("quantity", 1)
        .with("status", "invalid_status")
}

pub(super) fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint {
            entity: EntityKind::Order,
            method: HttpMethod::Get,
            path: "/store/inventory",
            request_formats: Vec::new(),
            accepts: vec![Accept::Json],
            rows: vec![
                Row::new(Scenario::Success, 200).body(BodyRule::CountMap),
                Row::simulated_error(),
            ],
        },
        Endpoint {
            entity: EntityKind::Order,
            method: HttpMethod::Post,
            path: "/store/order",
            request_formats: Format::ALL.to_vec(),
            accepts: vec![Accept::Json],
            rows: vec![
                Row::new(Scenario::Success, 200)
                    .payload(example_order())
                    .body(BodyRule::Entity {
                        reference: example_order(),
                        present: &[],
                        equal: &["id", "petId", "quantity", "status", "complete"],
                    }),
                Row::new(Scenario::BadInput, 400).payload(bad_input()),
                Row::new(Scenario::Validation, 422).payload(failing_validation()),
                Row::simulated_error().payload(example_order()),
            ],
        },
    ]
}
