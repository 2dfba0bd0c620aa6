/// Bearer token extractor
///
/// `Authorized<C>` runs the authorization gate for capability `C` before the
/// handler body executes. The resulting grant is a plain handler argument, so
/// the caller's user id is threaded explicitly into every downstream call.
///
/// ```no_run
/// use chainstack_api::extract::{Authorized, ManageResources};
///
/// async fn handler(auth: Authorized<ManageResources>) -> String {
///     format!("user {}", auth.user_id())
/// }
/// ```

use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chainstack_shared::auth::{gate::bearer_token, scope, TokenGrant};
use chainstack_shared::models::UserId;

use crate::{app::AppState, error::ApiError};

/// A capability a route requires
pub trait Capability: Send + Sync + 'static {
    const NAME: &'static str;
}

/// Manage one's own resources
pub struct ManageResources;

impl Capability for ManageResources {
    const NAME: &'static str = scope::RESOURCES;
}

/// Administer users
pub struct ManageUsers;

impl Capability for ManageUsers {
    const NAME: &'static str = scope::USERS;
}

/// Proof that the request carried a token granting `C`
#[derive(Debug, Clone)]
pub struct Authorized<C> {
    pub grant: TokenGrant,
    _capability: PhantomData<fn() -> C>,
}

impl<C> Authorized<C> {
    pub fn user_id(&self) -> UserId {
        self.grant.user_id
    }
}

#[async_trait]
impl<C: Capability> FromRequestParts<AppState> for Authorized<C> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        let grant = state.gate.authorize(token, C::NAME).await?;

        Ok(Self {
            grant,
            _capability: PhantomData,
        })
    }
}
