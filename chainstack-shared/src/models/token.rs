/// Access token model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE access_tokens (
///     token VARCHAR(64) PRIMARY KEY,
///     expires TIMESTAMPTZ NOT NULL,
///     scope TEXT NOT NULL,
///     user_id BIGINT NOT NULL
/// );
/// ```
///
/// `token` holds the SHA-256 hex digest of the bearer string; the plaintext is
/// only ever returned to the client at issuance. `scope` is stored as
/// space-separated capability names.

use chrono::{DateTime, Utc};

use super::user::UserId;
use crate::auth::scope::Scope;

/// Persisted access token
///
/// Tokens are immutable after creation; they are read on every authorized
/// request and deleted in bulk once expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// SHA-256 hex digest of the bearer string
    pub token: String,

    /// Instant after which the token no longer authorizes
    pub expires_at: DateTime<Utc>,

    /// Capabilities granted by this token
    pub scope: Scope,

    /// Owning user
    pub user_id: UserId,
}

impl AccessToken {
    /// Whether the token is expired at `now`
    ///
    /// A token is valid only while `now < expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
