/// User model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(255) NOT NULL,
///     password VARCHAR(255) NOT NULL,
///     admin BOOLEAN NOT NULL DEFAULT FALSE,
///     quota INTEGER CHECK (quota >= 0)
/// );
/// CREATE UNIQUE INDEX users_email_lower_key ON users (lower(email));
/// ```
///
/// `quota` is NULL for users without a resource limit.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::quota::Quota;

/// User identifier
pub type UserId = i64;

/// Stored user record
///
/// Carries the Argon2id password hash, so it is deliberately not `Serialize`.
/// Convert to [`UserIdentity`] before handing a user to callers.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID
    pub id: UserId,

    /// Email address, stored trimmed and lowercased
    pub email: String,

    /// Argon2id password hash (PHC string)
    pub password_hash: String,

    /// Whether the user may administer other users
    pub is_admin: bool,

    /// Resource creation limit
    pub quota: Quota,
}

impl User {
    /// Returns the public identity of this user
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            email: self.email.clone(),
            is_admin: self.is_admin,
            quota: self.quota,
        }
    }
}

/// User identity with the password hash stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub email: String,
    #[serde(rename = "admin")]
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Quota::is_unlimited")]
    pub quota: Quota,
}

impl From<User> for UserIdentity {
    fn from(user: User) -> Self {
        UserIdentity {
            id: user.id,
            email: user.email,
            is_admin: user.is_admin,
            quota: user.quota,
        }
    }
}

/// Registration input, before validation and hashing
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    /// Email address
    #[validate(email(message = "is not a valid email"))]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 8, message = "password should be at least 8 characters"))]
    pub password: String,

    /// Grant administrative scope
    #[serde(default)]
    pub admin: bool,

    /// Resource limit (absent or null means unlimited)
    #[serde(default)]
    pub quota: Quota,
}

/// Insert payload handed to the user store
///
/// The email is already normalized and the password already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub quota: Quota,
}

/// Normalizes an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
