/// Common error type for the access-control core
///
/// Every component in this crate reports failures through [`Error`]. The
/// variants follow the outcome taxonomy the HTTP layer maps onto status codes:
///
/// - `NotAuthenticated`: credentials did not verify
/// - `Denied`: bearer token missing, unknown, expired or lacking scope
/// - `QuotaExceeded`: resource creation blocked by the owner's quota
/// - `NotFound`: referenced user or resource is absent
/// - `Validation`: malformed input
/// - `Conflict`: uniqueness violation (duplicate email)
/// - `Storage`: the backing store failed
/// - `Internal`: anything else (e.g. password hashing failure)
///
/// `Denied` intentionally carries no detail: callers must not be able to tell
/// an unknown token from an insufficient scope.

use crate::auth::password::PasswordError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Credentials did not match a known user
    #[error("invalid credentials")]
    NotAuthenticated,

    /// Token authorization failed
    #[error("access denied")]
    Denied,

    /// User already holds `limit` resources
    #[error("resource quota exceeded ({current}/{limit})")]
    QuotaExceeded { limit: u32, current: u64 },

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Input failed validation
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Uniqueness constraint violated
    #[error("{0}")]
    Conflict(String),

    /// Backing store failure
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Builds a validation error for `field`
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error originated in the backing store
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

impl From<PasswordError> for Error {
    fn from(err: PasswordError) -> Self {
        Error::Internal(err.to_string())
    }
}
