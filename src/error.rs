//! Error taxonomy for the harness.
//!
//! Assertion failures are not errors: they travel as data inside a
//! [`CaseReport`](crate::testing::report::CaseReport). The types here cover
//! the three ways a case or a run can break down instead:
//!
//! - [`EncodeError`]: a fixture cannot be written in the requested format.
//!   Raised while the table is expanded, before any request leaves.
//! - [`DispatchError`]: the request never produced an HTTP response
//!   (connection refused, timeout, unreadable body).
//! - [`ConfigError`]: the run configuration is unusable.

use thiserror::Error;

use crate::domain::{EntityKind, Format};

/// A fixture shape the target format cannot carry without an explicit rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// XML list without an item tag rule for this entity
    #[error("no XML item tag rule for list field `{field}` of {entity}")]
    MissingItemTag { entity: EntityKind, field: String },

    /// List directly inside a list
    #[error("{format} cannot represent the nested list at `{field}`")]
    NestedList { format: Format, field: String },

    /// Name that is not a legal XML element name
    #[error("`{0}` is not a valid XML element name")]
    InvalidElementName(String),

    /// Character outside the XML 1.0 `Char` production
    #[error("field `{field}` contains U+{code:04X}, which XML 1.0 cannot carry")]
    InvalidXmlChar { field: String, code: u32 },

    /// Field name that collides with the form key syntax
    #[error("field name `{0}` contains a form path separator (`.`, `[` or `]`)")]
    AmbiguousFormKey(String),

    /// Two leaves flattened to the same form key
    #[error("form key `{0}` appears more than once")]
    DuplicateFormKey(String),

    /// Empty object has no form representation distinct from an empty string
    #[error("form cannot represent the empty object at `{0}`")]
    EmptyFormObject(String),

    /// Batch payloads only have a JSON form
    #[error("{format} cannot represent a batch of {count} entities")]
    BatchUnsupported { format: Format, count: usize },

    /// Form serializer failure
    #[error("form serialization failed: {0}")]
    Form(String),

    /// JSON serializer failure
    #[error("JSON serialization failed: {0}")]
    Json(String),
}

/// Network-level failure. Fatal for the case, never an expected outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("invalid request URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read response: {0}")]
    Read(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl DispatchError {
    /// Stable machine-readable name, used in reports and the history store.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::InvalidUrl { .. } => "INVALID_URL",
            DispatchError::InvalidHeader { .. } => "INVALID_HEADER",
            DispatchError::Timeout { .. } => "TIMEOUT",
            DispatchError::Connect(_) => "CONNECT_ERROR",
            DispatchError::Read(_) => "READ_ERROR",
            DispatchError::Request(_) => "REQUEST_ERROR",
        }
    }
}

/// Malformed harness configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base URL is required (set --base-url or PETSTORE_BASE_URL)")]
    MissingBaseUrl,

    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("timeout must be greater than 0 ms")]
    ZeroTimeout,

    #[error("concurrency must be greater than 0")]
    ZeroConcurrency,

    #[error("invalid variable `{0}`, expected key=value")]
    InvalidVariable(String),
}

/// Run history database failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create history directory `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode run report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown run `{0}`")]
    UnknownRun(String),
}

/// Umbrella error for everything that stops a run before or after the cases execute.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("fixture encoding failed for case `{case}`: {source}")]
    Encode {
        case: String,
        #[source]
        source: EncodeError,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("case worker crashed: {0}")]
    Worker(String),

    #[error("failed to write report `{path}`: {reason}")]
    Report { path: String, reason: String },
}
