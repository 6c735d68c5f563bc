use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

// ─── Entity Kinds ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Pet,
    Order,
    User,
}

impl EntityKind {
    /// Canonical XML root element. `Pet` wins over the lowercase spelling
    /// some older fixtures used.
    pub fn root_tag(self) -> &'static str {
        match self {
            EntityKind::Pet => "Pet",
            EntityKind::Order => "order",
            EntityKind::User => "User",
        }
    }

    /// Element name for one item of a list field, e.g. `photoUrls` holds `photoUrl`s.
    pub fn item_tag(self, list_field: &str) -> Option<&'static str> {
        match (self, list_field) {
            (EntityKind::Pet, "photoUrls") => Some("photoUrl"),
            (EntityKind::Pet, "tags") => Some("tag"),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Pet => "pet",
            EntityKind::Order => "order",
            EntityKind::User => "user",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pet" => Ok(EntityKind::Pet),
            "order" | "store" => Ok(EntityKind::Order),
            "user" => Ok(EntityKind::User),
            other => Err(format!("unknown entity `{other}`")),
        }
    }
}

// ─── Wire Formats ─────────────────────────────────────────────────────────────

/// Request body encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Json,
    Xml,
    Form,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Json, Format::Xml, Format::Form];

    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "application/xml",
            Format::Form => "application/x-www-form-urlencoded",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Form => "form",
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "form" | "urlencoded" => Ok(Format::Form),
            other => Err(format!("unknown request format `{other}`")),
        }
    }
}

/// Response representation requested through the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accept {
    Json,
    Xml,
    /// `*/*`, for endpoints without a typed success body.
    Any,
}

impl Accept {
    pub fn header_value(self) -> &'static str {
        match self {
            Accept::Json => "application/json",
            Accept::Xml => "application/xml",
            Accept::Any => "*/*",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Accept::Json => "json",
            Accept::Xml => "xml",
            Accept::Any => "any",
        }
    }
}

impl Display for Accept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Accept {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Accept::Json),
            "xml" => Ok(Accept::Xml),
            "any" | "*/*" => Ok(Accept::Any),
            other => Err(format!("unknown accept type `{other}`")),
        }
    }
}

// ─── Scenarios ────────────────────────────────────────────────────────────────

/// The four scenarios every endpoint is checked against, plus not-found for
/// endpoints addressing an existing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Success,
    BadInput,
    NotFound,
    Validation,
    SimulatedError,
}

impl Scenario {
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Success => "success",
            Scenario::BadInput => "bad_input",
            Scenario::NotFound => "not_found",
            Scenario::Validation => "validation",
            Scenario::SimulatedError => "simulated_error",
        }
    }
}

impl Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "success" | "200" => Ok(Scenario::Success),
            "bad_input" | "400" => Ok(Scenario::BadInput),
            "not_found" | "404" => Ok(Scenario::NotFound),
            "validation" | "422" => Ok(Scenario::Validation),
            "simulated_error" | "default" => Ok(Scenario::SimulatedError),
            other => Err(format!("unknown scenario `{other}`")),
        }
    }
}
