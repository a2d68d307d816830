use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Coarse classification of a [`LibraryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing required input
    Validation,
    /// Unknown key reference
    NotFound,
    /// Operation not legal in the entity's current state
    InvalidState,
    /// Member already holds the maximum number of checkouts
    LimitExceeded,
    /// No free copies of the requested book
    Unavailable,
    /// Records reference each other inconsistently
    Integrity,
    /// Reading or writing the data file failed
    Persistence,
    /// Configuration could not be read or is out of range
    Config,
}

/// Errors raised by the library stores, rule engine and persistence layer
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Malformed or missing required input
    #[error("Validation error: {0}")]
    Validation(String),
    /// A referenced book, member or checkout does not exist
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// Key that was not found
        key: String,
    },
    /// The operation is not legal in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// The member is at their checkout cap
    #[error("Member {member_id} has reached the maximum of {limit} checkouts")]
    LimitExceeded {
        /// Member that hit the cap
        member_id: String,
        /// The member's cap
        limit: u32,
    },
    /// Every copy of the book is on loan
    #[error("No copies of {isbn} are available")]
    Unavailable {
        /// Requested book
        isbn: String,
    },
    /// A record points at something that no longer exists
    #[error("Integrity error: {0}")]
    Integrity(String),
    /// Error occurred while saving state
    #[error("Persistence error: {0}")]
    PersistenceError(String),
    /// Error occurred while loading state
    #[error("Load error: {0}")]
    LoadError(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LibraryError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for the given record kind.
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Create an invalid-state error.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::PersistenceError(_) | Self::LoadError(_) | Self::Io(_) | Self::Json(_) => {
                ErrorKind::Persistence
            }
            Self::Config(_) | Self::Toml(_) => ErrorKind::Config,
        }
    }
}
