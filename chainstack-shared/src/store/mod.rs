/// Persistence capabilities
///
/// Each component depends only on the narrow trait it needs:
///
/// - [`UserStore`]: user records (credential lookup, administration, quota reads)
/// - [`TokenStore`]: access token insert, lookup and purge
/// - [`ResourceStore`]: per-owner resource records
///
/// [`Store`] bundles all three with a connectivity check. Two implementations
/// exist: [`postgres::PgStore`] for production and [`memory::MemoryStore`] for
/// tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{AccessToken, CreateUser, Resource, User, UserId};
use crate::quota::Quota;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Underlying driver error carried by [`crate::Error::Storage`]
pub use sqlx::Error as StorageError;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; a duplicate email (case-insensitive) is a `Conflict`
    async fn insert_user(&self, user: CreateUser) -> Result<User>;

    /// Looks up a user by already-normalized email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    /// All users ordered by id
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Returns `false` if the user does not exist
    async fn update_quota(&self, id: UserId, quota: Quota) -> Result<bool>;

    /// Deletes a user and, with them, their resources
    ///
    /// Returns `false` if the user does not exist.
    async fn delete_user(&self, id: UserId) -> Result<bool>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert_token(&self, token: AccessToken) -> Result<()>;

    /// Returns the token with digest `token` only if it is unexpired at `now`
    async fn find_active_token(&self, token: &str, now: DateTime<Utc>)
        -> Result<Option<AccessToken>>;

    /// Deletes every token with `expires_at <= now`, returning how many went
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn count_resources(&self, user_id: UserId) -> Result<u64>;

    async fn insert_resource(&self, resource: Resource) -> Result<Resource>;

    /// Owner's resources, oldest first
    async fn list_resources(&self, user_id: UserId) -> Result<Vec<Resource>>;

    /// Returns the resource only if `user_id` owns it
    async fn find_resource(&self, user_id: UserId, key: &str) -> Result<Option<Resource>>;

    /// Deletes the resource only if `user_id` owns it
    async fn delete_resource(&self, user_id: UserId, key: &str) -> Result<bool>;
}

/// Combined store
#[async_trait]
pub trait Store: UserStore + TokenStore + ResourceStore + Send + Sync {
    /// Check store connectivity
    async fn health_check(&self) -> Result<()>;
}
