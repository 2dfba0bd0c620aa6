/// Resource endpoints
///
/// All routes require a token with the `resources` capability and act only on
/// the caller's own resources. A key the caller does not own, and a caller
/// whose user record is gone, are both answered `403 access denied`.
///
/// ```text
/// GET    /resources        -> 200 [{"key": "...", "created_at": "..."}]
/// POST   /resources        -> 201 {"key": "...", "created_at": "..."}
/// GET    /resources/:key   -> 200 {"key": "...", "created_at": "..."}
/// DELETE /resources/:key   -> 204
/// ```
///
/// Creation fails with `403 resource quota exceeded` once the caller owns as
/// many resources as their quota allows.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Authorized, ManageResources},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chainstack_shared::models::Resource;

fn not_found_as_denied(err: chainstack_shared::Error) -> ApiError {
    match err {
        chainstack_shared::Error::NotFound(_) => ApiError::access_denied(),
        other => other.into(),
    }
}

pub async fn list_resources(
    State(state): State<AppState>,
    auth: Authorized<ManageResources>,
) -> ApiResult<Json<Vec<Resource>>> {
    let resources = state.resources.list(auth.user_id()).await?;
    Ok(Json(resources))
}

pub async fn create_resource(
    State(state): State<AppState>,
    auth: Authorized<ManageResources>,
) -> ApiResult<(StatusCode, Json<Resource>)> {
    let resource = state
        .resources
        .create(auth.user_id())
        .await
        .map_err(not_found_as_denied)?;

    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn get_resource(
    State(state): State<AppState>,
    auth: Authorized<ManageResources>,
    Path(key): Path<String>,
) -> ApiResult<Json<Resource>> {
    let resource = state
        .resources
        .get(auth.user_id(), &key)
        .await
        .map_err(not_found_as_denied)?;

    Ok(Json(resource))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    auth: Authorized<ManageResources>,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .resources
        .delete(auth.user_id(), &key)
        .await
        .map_err(not_found_as_denied)?;

    Ok(StatusCode::NO_CONTENT)
}
