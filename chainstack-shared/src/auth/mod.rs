/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`credentials`]: email/password verification
/// - [`scope`]: capability sets
/// - [`token`]: opaque bearer token issuance and purge
/// - [`gate`]: bearer token authorization
///
/// # Example
///
/// ```no_run
/// use chainstack_shared::auth::{AuthorizationGate, CredentialVerifier, Scope, TokenManager};
/// use chainstack_shared::auth::{scope, token::DEFAULT_TOKEN_TTL};
/// use chainstack_shared::clock::SystemClock;
/// use chainstack_shared::store::PgStore;
/// use std::sync::Arc;
///
/// # async fn example(store: Arc<PgStore>) -> chainstack_shared::Result<()> {
/// let clock = Arc::new(SystemClock);
/// let credentials = CredentialVerifier::new(store.clone());
/// let tokens = TokenManager::new(store.clone(), clock.clone());
/// let gate = AuthorizationGate::new(store, clock);
///
/// let user = credentials.verify("admin@email.com", "adminpassword").await?;
/// let issued = tokens.issue(user.id, Scope::for_role(user.is_admin), DEFAULT_TOKEN_TTL).await?;
/// let grant = gate.authorize(Some(&issued.token), scope::USERS).await?;
/// assert_eq!(grant.user_id, user.id);
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod gate;
pub mod password;
pub mod scope;
pub mod token;

pub use credentials::CredentialVerifier;
pub use gate::{AuthorizationGate, TokenGrant};
pub use scope::Scope;
pub use token::{IssuedToken, TokenManager};
