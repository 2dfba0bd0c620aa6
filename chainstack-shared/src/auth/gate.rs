/// Bearer token authorization
///
/// A request is authorized for a capability when it presents a well-formed
/// token whose digest is stored, whose expiry lies strictly in the future and
/// whose scope contains the capability. Every other outcome is
/// [`Error::Denied`]; the reason is only visible in debug logs.
///
/// The gate does not check that the token's owner still exists. Operations
/// acting on the returned [`TokenGrant`] resolve the user themselves.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::scope::Scope;
use super::token::{digest, is_well_formed};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::UserId;
use crate::store::TokenStore;

/// Result of a successful authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub user_id: UserId,
    pub scope: Scope,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Denial {
    /// No token, or not shaped like one
    Unauthenticated,
    /// Never issued, purged or expired
    UnknownOrExpired,
    /// Valid token without the requested capability
    ScopeMismatch,
}

#[derive(Clone)]
pub struct AuthorizationGate {
    tokens: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl AuthorizationGate {
    pub fn new(tokens: Arc<dyn TokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self { tokens, clock }
    }

    /// Authorizes `token` for `capability`
    ///
    /// # Errors
    ///
    /// `Denied` for any authorization failure, `Storage` if the lookup fails.
    pub async fn authorize(&self, token: Option<&str>, capability: &str) -> Result<TokenGrant> {
        match self.evaluate(token, capability).await? {
            Ok(grant) => Ok(grant),
            Err(denial) => {
                debug!(?denial, capability, "Authorization denied");
                Err(Error::Denied)
            }
        }
    }

    async fn evaluate(
        &self,
        token: Option<&str>,
        capability: &str,
    ) -> Result<std::result::Result<TokenGrant, Denial>> {
        let token = match token.map(str::trim) {
            Some(t) if is_well_formed(t) => t,
            _ => return Ok(Err(Denial::Unauthenticated)),
        };

        let now = self.clock.now();
        let stored = match self.tokens.find_active_token(&digest(token), now).await? {
            Some(stored) => stored,
            None => return Ok(Err(Denial::UnknownOrExpired)),
        };

        if !stored.scope.contains(capability) {
            return Ok(Err(Denial::ScopeMismatch));
        }

        Ok(Ok(TokenGrant {
            user_id: stored.user_id,
            scope: stored.scope,
            expires_at: stored.expires_at,
        }))
    }
}

/// Extracts the token from an `Authorization` header value
///
/// Accepts `Bearer <token>` with a case-insensitive scheme.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
