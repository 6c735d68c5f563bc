use crate::domain::{Accept, EntityFixture, EntityKind, Format, Payload, Scenario};
use crate::http::method::HttpMethod;

use super::{BodyRule, Endpoint, Row};

const PROFILE_FIELDS: &[&str] = &[
    "username",
    "firstName",
    "lastName",
    "email",
    "password",
    "phone",
    "userStatus",
];

fn example_user(id: i64) -> EntityFixture {
    EntityFixture::new(EntityKind::User)
        .with("id", id)
        .with("username", "theUser")
        .with("firstName", "John")
        .with("lastName", "James")
        .with("email", "john@email.com")
        .with("password", "12345")
        .with("phone", "12345")
        .with("userStatus", 1)
}

fn another_user() -> EntityFixture {
    EntityFixture::new(EntityKind::User)
        .with("id", 11)
        .with("username", "anotherUser")
        .with("firstName", "Jane")
        .with("lastName", "Doe")
        .with("email", "jane@email.com")
        .with("password", "abcde")
        .with("phone", "54321")
        .with("userStatus", 2)
}

fn updated_user() -> EntityFixture {
    EntityFixture::new(EntityKind::User)
        .with("id", 10)
        .with("username", "updatedUser")
        .with("firstName", "Jane")
        .with("lastName", "Doe")
        .with("email", "jane.doe@email.com")
        .with("password", "newPassword")
        .with("phone", "54321")
        .with("userStatus", 2)
}

fn bad_input() -> EntityFixture {
    EntityFixture::new(EntityKind::User)
        .with_root("invalid")
        .with("invalid", "payload")
}

pub(super) fn endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint {
            entity: EntityKind::User,
            method: HttpMethod::Post,
            path: "/user",
            request_formats: Format::ALL.to_vec(),
            accepts: vec![Accept::Json, Accept::Xml],
            rows: vec![
                Row::new(Scenario::Success, 200)
                    .payload(example_user(1))
                    .body(BodyRule::Entity {
                        reference: example_user(1),
                        present: &["id"],
                        equal: PROFILE_FIELDS,
                    }),
                Row::simulated_error().payload(bad_input()),
            ],
        },
        Endpoint {
            entity: EntityKind::User,
            method: HttpMethod::Post,
            path: "/user/createWithList",
            request_formats: vec![Format::Json],
            accepts: vec![Accept::Json, Accept::Xml],
            rows: vec![
                Row::new(Scenario::Success, 200)
                    .payload(Payload::Batch(vec![example_user(10), another_user()]))
                    .body(BodyRule::Entity {
                        reference: example_user(10),
                        present: &["id", "email", "password", "phone", "userStatus"],
                        equal: &["username", "firstName", "lastName"],
                    }),
                Row::simulated_error().payload(Payload::Batch(Vec::new())),
            ],
        },
        Endpoint {
            entity: EntityKind::User,
            method: HttpMethod::Get,
            path: "/user/login",
            request_formats: Vec::new(),
            accepts: vec![Accept::Json, Accept::Xml],
            rows: vec![
                Row::new(Scenario::Success, 200)
                    .query("username", "testuser")
                    .query("password", "password123")
                    .body(BodyRule::NonEmptyText),
                Row::new(Scenario::BadInput, 400)
                    .query("username", "invaliduser")
                    .query("password", "wrongpassword"),
                Row::simulated_error()
                    .query("username", "erroruser")
                    .query("password", "errorpassword"),
            ],
        },
        Endpoint {
            entity: EntityKind::User,
            method: HttpMethod::Get,
            path: "/user/logout",
            request_formats: Vec::new(),
            accepts: vec![Accept::Json],
            rows: vec![
                Row::new(Scenario::Success, 200).accepts(&[Accept::Any]),
                Row::simulated_error(),
            ],
        },
        Endpoint {
            entity: EntityKind::User,
            method: HttpMethod::Get,
            path: "/user/{{username}}",
            request_formats: Vec::new(),
            accepts: vec![Accept::Json, Accept::Xml],
            rows: vec![
                Row::new(Scenario::Success, 200)
                    .var("username", "user1")
                    .body(BodyRule::Entity {
                        reference: example_user(10),
                        present: &["id", "lastName", "email", "password", "phone", "userStatus"],
                        equal: &["username", "firstName"],
                    }),
                Row::new(Scenario::BadInput, 400).var("username", " "),
                Row::new(Scenario::NotFound, 404).var("username", "nonExistentUser"),
                Row::simulated_error().var("username", "user1"),
            ],
        },
        Endpoint {
            entity: EntityKind::User,
            method: HttpMethod::Put,
            path: "/user/{{username}}",
            request_formats: Format::ALL.to_vec(),
            accepts: vec![Accept::Json],
            rows: vec![
                Row::new(Scenario::Success, 200)
                    .var("username", "testUser")
                    .payload(updated_user()),
                Row::new(Scenario::BadInput, 400)
                    .var("username", "testUser")
                    .payload(bad_input()),
                Row::new(Scenario::NotFound, 404)
                    .var("username", "nonExistentUser123")
                    .payload(updated_user()),
                Row::simulated_error()
                    .var("username", "testUser")
                    .payload(updated_user()),
            ],
        },
        Endpoint {
            entity: EntityKind::User,
            method: HttpMethod::Delete,
            path: "/user/{{username}}",
            request_formats: Vec::new(),
            accepts: vec![Accept::Any],
            rows: vec![
                Row::new(Scenario::Success, 200).var("username", "userToDelete123"),
                Row::new(Scenario::BadInput, 400).var("username", "invalid!user@name"),
                Row::new(Scenario::NotFound, 404).var("username", "nonExistentUser987"),
                Row::simulated_error()
                    .var("username", "userForDefaultError")
                    .accepts(&[Accept::Json]),
            ],
        },
    ]
}
