use axum::{
    Json,
    extract::{Path, State},
};

use super::PERMISSIONS_TAG;
use crate::{
    AppState,
    error::{ApiError, ErrorBody},
    models::{Permission, PermissionInput},
    validate::ValidatedJson,
};

#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = PERMISSIONS_TAG,
    security(("api_key" = [])),
    responses((status = 200, description = "All permissions", body = [Permission]))
)]
pub async fn list_permissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    Ok(Json(state.repo.list_permissions().await?))
}

#[utoipa::path(
    get,
    path = "/api/permissions/{id}",
    tag = PERMISSIONS_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Found", body = Permission),
        (status = 404, description = "Permission not found", body = ErrorBody)
    )
)]
pub async fn get_permission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Permission>, ApiError> {
    Ok(Json(state.repo.get_permission(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/permissions",
    tag = PERMISSIONS_TAG,
    security(("api_key" = [])),
    request_body = PermissionInput,
    responses(
        (status = 200, description = "Created", body = Permission),
        (status = 400, description = "Permission already exists", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody)
    )
)]
pub async fn create_permission(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PermissionInput>,
) -> Result<Json<Permission>, ApiError> {
    let permission = state.repo.create_permission(payload).await?;
    tracing::info!(permission_id = permission.id, "permission created");
    Ok(Json(permission))
}

#[utoipa::path(
    put,
    path = "/api/permissions/{id}",
    tag = PERMISSIONS_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Permission ID")),
    request_body = PermissionInput,
    responses(
        (status = 200, description = "Updated", body = Permission),
        (status = 400, description = "Permission already exists", body = ErrorBody),
        (status = 404, description = "Permission not found", body = ErrorBody)
    )
)]
pub async fn update_permission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<PermissionInput>,
) -> Result<Json<Permission>, ApiError> {
    Ok(Json(state.repo.update_permission(id, payload).await?))
}
