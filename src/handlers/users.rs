use axum::{
    Json,
    extract::{Path, State},
};

use super::USERS_TAG;
use crate::{
    AppState,
    error::{ApiError, ErrorBody},
    models::{NewUser, User, UserInput},
    password,
    validate::ValidatedJson,
};

/// Swaps the plain password for its Argon2 hash. Hashing is CPU-bound, so it runs off the
/// async workers.
async fn hashed(payload: UserInput) -> Result<NewUser, ApiError> {
    let plain = payload.password.clone();
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain)).await??;
    Ok(NewUser::from_input(payload, hash))
}

/// list_users
///
/// Every user, without password material.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = USERS_TAG,
    security(("api_key" = [])),
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.repo.list_users().await?))
}

/// get_user
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = USERS_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.repo.get_user(id).await?))
}

/// create_user
///
/// Registers a user. Duplicate username or email, and a `role_id` with no matching role, are
/// all rejected with 400.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = USERS_TAG,
    security(("api_key" = [])),
    request_body = UserInput,
    responses(
        (status = 200, description = "Created", body = User),
        (status = 400, description = "User already exists", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserInput>,
) -> Result<Json<User>, ApiError> {
    let user = state.repo.create_user(hashed(payload).await?).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok(Json(user))
}

/// update_user
///
/// Full replace: every column, the password included, is rewritten from the payload.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = USERS_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserInput,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 400, description = "User already exists", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UserInput>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.repo.update_user(id, hashed(payload).await?).await?))
}
