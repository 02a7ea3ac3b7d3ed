use axum::{
    Json,
    extract::{Path, State},
};

use super::USER_ROLES_TAG;
use crate::{
    AppState,
    error::{ApiError, ErrorBody},
    models::{Permission, UserRole, UserRoleInput},
    validate::ValidatedJson,
};

/// list_user_roles
///
/// Returns every user role, ordered by id.
#[utoipa::path(
    get,
    path = "/api/user_roles",
    tag = USER_ROLES_TAG,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "All user roles", body = [UserRole]),
        (status = 403, description = "Missing or wrong API key", body = ErrorBody)
    )
)]
pub async fn list_user_roles(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserRole>>, ApiError> {
    Ok(Json(state.repo.list_user_roles().await?))
}

/// get_user_role
#[utoipa::path(
    get,
    path = "/api/user_roles/{id}",
    tag = USER_ROLES_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "User role ID")),
    responses(
        (status = 200, description = "Found", body = UserRole),
        (status = 404, description = "User role not found", body = ErrorBody)
    )
)]
pub async fn get_user_role(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserRole>, ApiError> {
    Ok(Json(state.repo.get_user_role(id).await?))
}

/// create_user_role
///
/// Inserts a role. A duplicate name is rejected with 400.
#[utoipa::path(
    post,
    path = "/api/user_roles",
    tag = USER_ROLES_TAG,
    security(("api_key" = [])),
    request_body = UserRoleInput,
    responses(
        (status = 200, description = "Created", body = UserRole),
        (status = 400, description = "User role already exists", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody)
    )
)]
pub async fn create_user_role(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserRoleInput>,
) -> Result<Json<UserRole>, ApiError> {
    let role = state.repo.create_user_role(payload).await?;
    tracing::info!(role_id = role.id, "user role created");
    Ok(Json(role))
}

/// update_user_role
///
/// Overwrites every field of an existing role.
#[utoipa::path(
    put,
    path = "/api/user_roles/{id}",
    tag = USER_ROLES_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "User role ID")),
    request_body = UserRoleInput,
    responses(
        (status = 200, description = "Updated", body = UserRole),
        (status = 400, description = "User role already exists", body = ErrorBody),
        (status = 404, description = "User role not found", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody)
    )
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UserRoleInput>,
) -> Result<Json<UserRole>, ApiError> {
    Ok(Json(state.repo.update_user_role(id, payload).await?))
}

/// list_role_permissions
///
/// Lists the permissions granted to a role.
#[utoipa::path(
    get,
    path = "/api/user_roles/{id}/permissions",
    tag = USER_ROLES_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "User role ID")),
    responses(
        (status = 200, description = "Granted permissions", body = [Permission]),
        (status = 404, description = "User role not found", body = ErrorBody)
    )
)]
pub async fn list_role_permissions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    Ok(Json(state.repo.list_role_permissions(id).await?))
}

/// grant_permission
///
/// Grants a permission to a role and returns the role's full grant list. Granting twice is a
/// no-op.
#[utoipa::path(
    put,
    path = "/api/user_roles/{id}/permissions/{permission_id}",
    tag = USER_ROLES_TAG,
    security(("api_key" = [])),
    params(
        ("id" = i32, Path, description = "User role ID"),
        ("permission_id" = i32, Path, description = "Permission ID")
    ),
    responses(
        (status = 200, description = "Granted permissions", body = [Permission]),
        (status = 404, description = "User role or permission not found", body = ErrorBody)
    )
)]
pub async fn grant_permission(
    State(state): State<AppState>,
    Path((id, permission_id)): Path<(i32, i32)>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    state.repo.grant_permission(id, permission_id).await?;
    Ok(Json(state.repo.list_role_permissions(id).await?))
}
