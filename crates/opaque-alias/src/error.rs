use thiserror::Error;

/// Error type for alias operations.
///
/// # Security Note
/// Display messages are intentionally generic so they can be shown to
/// clients. Use `{:?}` formatting to see the underlying cause in logs.
#[derive(Debug, Error)]
pub enum Error {
    /// A real route handed to the route aliaser was not absolute
    #[error("Invalid input")]
    InvalidFormat,

    /// Operation failed (intentionally vague)
    ///
    /// The OS entropy source refused to produce random bytes while
    /// minting a token.
    #[error("Operation failed")]
    OperationFailed(
        #[source]
        #[from]
        OperationError,
    ),
}

/// Configuration errors with specific variants
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Random segment length must be between {min} and {max} characters")]
    InvalidLength { min: usize, max: usize },

    #[error("String must not be empty")]
    EmptyString,

    #[error("Route `{0}` must start with '/'")]
    RouteNotAbsolute(String),

    #[error("Route `{0}` appears more than once in the catalog")]
    DuplicateRoute(String),

    #[error("Storage keys must be distinct")]
    DuplicateStorageKey,

    #[error("Invalid configuration document: {0}")]
    Parse(String),
}

/// Detailed operation errors for debugging (use {:?} to see these)
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Token generation failed: {0}")]
    Generation(String),
}

/// Errors raised by a persistence backend.
///
/// These never escape the mapping store: it logs them and keeps serving
/// from memory.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage key `{0}` is not allowed")]
    InvalidKey(String),

    #[error("storage write rejected: {0}")]
    WriteRejected(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
