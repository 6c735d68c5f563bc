mod fixture;
mod outcome;
mod types;

pub use fixture::{EntityFixture, FieldValue, Payload};
pub use outcome::{
    BodyExpectation, ExpectedOutcome, FORCE_ERROR_HEADER, FieldCheck, SIMULATED_ERROR_STATUSES,
    StatusExpectation, TestCase,
};
pub use types::{Accept, EntityKind, Format, Scenario};
