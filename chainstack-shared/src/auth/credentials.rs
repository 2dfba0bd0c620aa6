/// Credential verification
///
/// Resolves an email and password to a [`UserIdentity`]. Lookups are
/// case-insensitive on the trimmed email. An unknown email still pays for a
/// full Argon2id verification against [`DUMMY_HASH`], so response timing does
/// not reveal which emails are registered.

use std::sync::Arc;

use tracing::debug;

use super::password::{verify_password, DUMMY_HASH};
use crate::error::{Error, Result};
use crate::models::user::normalize_email;
use crate::models::UserIdentity;
use crate::store::UserStore;

#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Verifies `password` for the user registered under `email`
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` if the user is unknown or the password is wrong
    /// - `Storage` if the lookup fails
    /// - `Internal` if the stored hash is unusable
    pub async fn verify(&self, email: &str, password: &str) -> Result<UserIdentity> {
        let email = normalize_email(email);
        let user = self.users.find_user_by_email(&email).await?;

        let hash = user
            .as_ref()
            .map_or_else(|| DUMMY_HASH.to_string(), |u| u.password_hash.clone());
        let password = password.to_string();

        // Argon2id with 64 MB memory cost must not block the runtime
        let matched = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| Error::Internal(format!("password verification task failed: {}", e)))??;

        match user {
            Some(user) if matched => Ok(user.into()),
            Some(user) => {
                debug!(user_id = user.id, "Password mismatch");
                Err(Error::NotAuthenticated)
            }
            None => {
                debug!("Unknown email");
                Err(Error::NotAuthenticated)
            }
        }
    }
}
