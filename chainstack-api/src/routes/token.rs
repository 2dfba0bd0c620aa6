/// Token endpoint (OAuth2 client credentials grant)
///
/// # Endpoint
///
/// ```text
/// POST /token
/// Content-Type: application/x-www-form-urlencoded
///
/// grant_type=client_credentials&client_id=admin@email.com&client_secret=adminpassword
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "q0J1...",
///   "token_type": "bearer",
///   "expires_in": 3600,
///   "scope": "resources,users"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: wrong grant type, missing client id or secret
/// - `401 Unauthorized`: invalid credentials
/// - `500 Internal Server Error`: server error

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use chainstack_shared::auth::Scope;
use serde::{Deserialize, Serialize};

/// The only supported grant
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Token request form
///
/// Every field is optional so that missing values produce the endpoint's own
/// error messages rather than a generic form rejection.
#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub grant_type: String,

    /// User email
    #[serde(default)]
    pub client_id: String,

    /// User password
    #[serde(default)]
    pub client_secret: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    /// Comma-separated capabilities
    pub scope: String,
}

pub async fn issue_token(
    State(state): State<AppState>,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let req = match form {
        Ok(Form(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable token request");
            TokenRequest::default()
        }
    };

    if req.grant_type != GRANT_TYPE_CLIENT_CREDENTIALS {
        return Err(ApiError::BadRequest(format!(
            "invalid grant type: '{}'",
            req.grant_type
        )));
    }

    let email = req.client_id.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("client_id is required".to_string()));
    }

    let password = req.client_secret.trim();
    if password.is_empty() {
        return Err(ApiError::BadRequest("client_secret is required".to_string()));
    }

    let user = state.credentials.verify(email, password).await?;

    let ttl = state.config.token_ttl();
    let issued = state
        .tokens
        .issue(user.id, Scope::for_role(user.is_admin), ttl)
        .await?;

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        expires_in: ttl.as_secs(),
        scope: issued.scope.to_display_list(),
    }))
}
