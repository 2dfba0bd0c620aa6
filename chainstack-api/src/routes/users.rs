/// User administration endpoints
///
/// All routes require a token with the `users` capability.
///
/// ```text
/// GET    /users            -> 200 [{"id": 1, "email": "...", "admin": true}]
/// POST   /users            -> 201 {"id": 2, "email": "...", "admin": false, "quota": 5}
/// GET    /users/:id        -> 200 {...}
/// PUT    /users/:id/quota  -> 200 {...}
/// DELETE /users/:id        -> 204
/// ```
///
/// `quota` is omitted from responses for unlimited users. Password hashes are
/// never returned.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Authorized, ManageUsers},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chainstack_shared::models::{NewUser, UserId, UserIdentity};
use chainstack_shared::quota::Quota;
use serde::Deserialize;

/// Quota update body; `null` or an absent field means unlimited
#[derive(Debug, Deserialize)]
pub struct UpdateQuotaRequest {
    #[serde(default)]
    pub quota: Quota,
}

fn parse_user_id(raw: &str) -> ApiResult<UserId> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("user not found".to_string()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value).map_err(|rejection| {
        ApiError::BadRequest(format!(
            "failed to parse request body as json: {}",
            rejection.body_text()
        ))
    })
}

pub async fn list_users(
    State(state): State<AppState>,
    _auth: Authorized<ManageUsers>,
) -> ApiResult<Json<Vec<UserIdentity>>> {
    Ok(Json(state.accounts.list_users().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    auth: Authorized<ManageUsers>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserIdentity>)> {
    let new_user = json_body(body)?;
    let user = state.accounts.create_user(new_user).await?;

    tracing::info!(admin_id = auth.user_id(), user_id = user.id, "User registered via API");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    _auth: Authorized<ManageUsers>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserIdentity>> {
    let id = parse_user_id(&id)?;
    Ok(Json(state.accounts.get_user(id).await?))
}

pub async fn update_quota(
    State(state): State<AppState>,
    _auth: Authorized<ManageUsers>,
    Path(id): Path<String>,
    body: Result<Json<UpdateQuotaRequest>, JsonRejection>,
) -> ApiResult<Json<UserIdentity>> {
    let id = parse_user_id(&id)?;
    let req = json_body(body)?;
    Ok(Json(state.accounts.update_quota(id, req.quota).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    _auth: Authorized<ManageUsers>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_user_id(&id)?;
    state.accounts.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
