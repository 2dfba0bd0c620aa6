/// Resource model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE resources (
///     id BIGSERIAL PRIMARY KEY,
///     key VARCHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::user::UserId;

/// A resource owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Unguessable identifier (UUID v4)
    pub key: String,

    /// Creation time (UTC)
    pub created_at: DateTime<Utc>,

    /// Owning user, never exposed in responses
    #[serde(skip)]
    pub user_id: UserId,
}
