use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuarryError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Unable to load resource {location}: {reason}")]
    ResourceLoad { location: String, reason: String },

    #[error("Document enriching failed for {location}: {reason}")]
    EnrichmentFailed { location: String, reason: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid date interval {interval}: {reason}")]
    InvalidInterval { interval: String, reason: String },

    #[error("Duplicate {kind} key: {key}")]
    DuplicateKey { kind: String, key: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unsupported {kind}: {name}")]
    UnsupportedVariant { kind: String, name: String },

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Search engine error: {0}")]
    SearchEngine(String),

    #[error("Update of index {index} failed with status {status}: {message}")]
    UpdateRejected {
        index: String,
        status: i64,
        message: String,
    },

    #[error("Invalid indexer parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, QuarryError>;

impl From<std::io::Error> for QuarryError {
    fn from(e: std::io::Error) -> Self {
        QuarryError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for QuarryError {
    fn from(e: serde_json::Error) -> Self {
        QuarryError::Json(e.to_string())
    }
}

impl QuarryError {
    pub fn resource_load(location: impl Into<String>, reason: impl ToString) -> Self {
        QuarryError::ResourceLoad {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn enrichment(location: impl Into<String>, reason: impl ToString) -> Self {
        QuarryError::EnrichmentFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unsupported(kind: &str, name: impl Into<String>) -> Self {
        QuarryError::UnsupportedVariant {
            kind: kind.to_string(),
            name: name.into(),
        }
    }

    /// Whether the error belongs to a single resource and must not stop a run.
    pub fn is_per_resource(&self) -> bool {
        matches!(
            self,
            QuarryError::ResourceNotFound(_)
                | QuarryError::ResourceLoad { .. }
                | QuarryError::EnrichmentFailed { .. }
        )
    }
}
