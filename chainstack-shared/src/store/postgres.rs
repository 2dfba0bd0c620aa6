/// PostgreSQL store
///
/// Runtime-checked `sqlx` queries over a shared [`PgPool`]. Rows are decoded
/// into private row structs and converted into domain models here, so nothing
/// outside this module knows column names.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::debug;

use super::{ResourceStore, Store, TokenStore, UserStore};
use crate::auth::scope::Scope;
use crate::db::pool;
use crate::error::{Error, Result};
use crate::models::{AccessToken, CreateUser, Resource, User, UserId};
use crate::quota::Quota;

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password: String,
    admin: bool,
    quota: Option<i32>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password,
            is_admin: row.admin,
            quota: Quota::from_column(row.quota),
        }
    }
}

#[derive(Debug, FromRow)]
struct TokenRow {
    token: String,
    expires: DateTime<Utc>,
    scope: String,
    user_id: i64,
}

impl From<TokenRow> for AccessToken {
    fn from(row: TokenRow) -> Self {
        AccessToken {
            token: row.token,
            expires_at: row.expires,
            scope: Scope::parse(&row.scope),
            user_id: row.user_id,
        }
    }
}

#[derive(Debug, FromRow)]
struct ResourceRow {
    key: String,
    created_at: DateTime<Utc>,
    user_id: i64,
}

impl From<ResourceRow> for Resource {
    fn from(row: ResourceRow) -> Self {
        Resource {
            key: row.key,
            created_at: row.created_at,
            user_id: row.user_id,
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: CreateUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password, admin, quota)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password, admin, quota
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.quota.to_column())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict(format!("user '{}' already exists", user.email))
            }
            other => Error::Storage(other),
        })?;

        Ok(row.into())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password, admin, quota
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password, admin, quota FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password, admin, quota FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_quota(&self, id: UserId, quota: Quota) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET quota = $2 WHERE id = $1")
            .bind(id)
            .bind(quota.to_column())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn insert_token(&self, token: AccessToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO access_tokens (token, expires, scope, user_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.scope.to_stored())
        .bind(token.user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_active_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccessToken>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT token, expires, scope, user_id
            FROM access_tokens
            WHERE token = $1 AND expires > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE expires <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn count_resources(&self, user_id: UserId) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resources WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn insert_resource(&self, resource: Resource) -> Result<Resource> {
        let row = sqlx::query_as::<_, ResourceRow>(
            r#"
            INSERT INTO resources (key, created_at, user_id)
            VALUES ($1, $2, $3)
            RETURNING key, created_at, user_id
            "#,
        )
        .bind(&resource.key)
        .bind(resource.created_at)
        .bind(resource.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // Owner deleted between the quota check and the insert
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => Error::NotFound("user"),
            other => Error::Storage(other),
        })?;

        Ok(row.into())
    }

    async fn list_resources(&self, user_id: UserId) -> Result<Vec<Resource>> {
        let rows = sqlx::query_as::<_, ResourceRow>(
            r#"
            SELECT key, created_at, user_id
            FROM resources
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_resource(&self, user_id: UserId, key: &str) -> Result<Option<Resource>> {
        let row = sqlx::query_as::<_, ResourceRow>(
            "SELECT key, created_at, user_id FROM resources WHERE key = $1 AND user_id = $2",
        )
        .bind(key)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_resource(&self, user_id: UserId, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM resources WHERE key = $1 AND user_id = $2")
            .bind(key)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<()> {
        debug!("Checking store connectivity");
        pool::health_check(&self.pool).await?;
        Ok(())
    }
}
