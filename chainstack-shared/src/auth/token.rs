/// Access token lifecycle
///
/// Tokens are 40-character base62 strings drawn from the thread-local CSPRNG.
/// Only the SHA-256 digest is persisted; the plaintext is handed to the client
/// once, at issuance.
///
/// # Example
///
/// ```no_run
/// use chainstack_shared::auth::scope::Scope;
/// use chainstack_shared::auth::token::{TokenManager, DEFAULT_TOKEN_TTL};
/// use chainstack_shared::clock::SystemClock;
/// use chainstack_shared::store::PgStore;
/// use std::sync::Arc;
///
/// # async fn example(store: Arc<PgStore>) -> chainstack_shared::Result<()> {
/// let tokens = TokenManager::new(store, Arc::new(SystemClock));
///
/// let issued = tokens.issue(1, Scope::for_role(false), DEFAULT_TOKEN_TTL).await?;
/// println!("Bearer {}", issued.token);
///
/// let removed = tokens.purge_expired().await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::scope::Scope;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{AccessToken, UserId};
use crate::store::TokenStore;

/// Lifetime of tokens issued by the token endpoint unless configured otherwise
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Length of the plaintext bearer string
pub const TOKEN_LENGTH: usize = 40;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Plaintext bearer string
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub scope: Scope,
}

#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    pub fn new(store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Issues a token for `user_id` expiring `ttl` from now
    ///
    /// # Errors
    ///
    /// - `Validation` if `ttl` is zero or too large to represent
    /// - `Storage` if persisting the token fails
    pub async fn issue(&self, user_id: UserId, scope: Scope, ttl: Duration) -> Result<IssuedToken> {
        if ttl.is_zero() {
            return Err(Error::validation("ttl", "must be positive"));
        }
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| Error::validation("ttl", "out of range"))?;
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::validation("ttl", "out of range"))?;

        let token = generate_token();
        self.store
            .insert_token(AccessToken {
                token: digest(&token),
                expires_at,
                scope: scope.clone(),
                user_id,
            })
            .await?;

        info!(user_id, scope = %scope, %expires_at, "Access token issued");

        Ok(IssuedToken {
            token,
            expires_at,
            scope,
        })
    }

    /// Deletes every token that has expired, returning how many were removed
    pub async fn purge_expired(&self) -> Result<u64> {
        let now = self.clock.now();
        let removed = self.store.delete_expired_tokens(now).await?;
        debug!(removed, "Expired tokens purged");
        Ok(removed)
    }
}

/// Generates a random bearer string
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();

    (0..TOKEN_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// SHA-256 hex digest under which a token is stored
pub fn digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether `token` has the shape of an issued bearer string
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.bytes().all(|b| b.is_ascii_alphanumeric())
}
