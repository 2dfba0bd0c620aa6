/// User registration and administration
///
/// Used by the admin HTTP routes and the `create-user` operator binary.
/// Emails are trimmed and lowercased before storage; passwords are hashed with
/// Argon2id before they reach the store.
///
/// # Example
///
/// ```no_run
/// use chainstack_shared::accounts::AccountService;
/// use chainstack_shared::models::NewUser;
/// use chainstack_shared::quota::Quota;
/// use chainstack_shared::store::PgStore;
/// use std::sync::Arc;
///
/// # async fn example(store: Arc<PgStore>) -> chainstack_shared::Result<()> {
/// let accounts = AccountService::new(store);
///
/// let user = accounts
///     .create_user(NewUser {
///         email: "admin@email.com".to_string(),
///         password: "adminpassword".to_string(),
///         admin: true,
///         quota: Quota::Unlimited,
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{Error, Result};
use crate::models::user::normalize_email;
use crate::models::{CreateUser, NewUser, UserId, UserIdentity};
use crate::quota::Quota;
use crate::store::UserStore;

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Registers a user
    ///
    /// # Errors
    ///
    /// - `Validation` if the email is malformed or the password shorter than 8
    /// - `Conflict` if the email is already registered (case-insensitive)
    /// - `Internal` if hashing fails
    /// - `Storage` if the store fails
    pub async fn create_user(&self, new_user: NewUser) -> Result<UserIdentity> {
        let new_user = NewUser {
            email: new_user.email.trim().to_string(),
            ..new_user
        };
        new_user.validate().map_err(|e| {
            e.field_errors()
                .into_iter()
                .min_by(|a, b| a.0.cmp(&b.0))
                .map(|(field, errors)| {
                    let reason = match &*field {
                        "email" => format!("'{}' is not a valid email", new_user.email),
                        _ => errors
                            .first()
                            .and_then(|error| error.message.as_ref())
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "is invalid".to_string()),
                    };
                    Error::validation(field.to_string(), reason)
                })
                .unwrap_or_else(|| Error::validation("user", "is invalid"))
        })?;

        let password = new_user.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| Error::Internal(format!("password hashing task failed: {}", e)))??;

        let user = self
            .users
            .insert_user(CreateUser {
                email: normalize_email(&new_user.email),
                password_hash,
                is_admin: new_user.admin,
                quota: new_user.quota,
            })
            .await?;

        info!(user_id = user.id, admin = user.is_admin, quota = %user.quota, "User created");
        Ok(user.into())
    }

    /// All users ordered by id
    pub async fn list_users(&self) -> Result<Vec<UserIdentity>> {
        let users = self.users.list_users().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    pub async fn get_user(&self, id: UserId) -> Result<UserIdentity> {
        self.users
            .find_user(id)
            .await?
            .map(Into::into)
            .ok_or(Error::NotFound("user"))
    }

    /// Replaces a user's quota, returning the updated identity
    pub async fn update_quota(&self, id: UserId, quota: Quota) -> Result<UserIdentity> {
        if !self.users.update_quota(id, quota).await? {
            return Err(Error::NotFound("user"));
        }
        info!(user_id = id, quota = %quota, "User quota updated");
        self.get_user(id).await
    }

    /// Deletes a user together with their resources
    pub async fn delete_user(&self, id: UserId) -> Result<()> {
        if !self.users.delete_user(id).await? {
            return Err(Error::NotFound("user"));
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }
}
