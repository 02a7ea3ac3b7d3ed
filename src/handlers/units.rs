use axum::{
    Json,
    extract::{Path, State},
};

use super::UNITS_TAG;
use crate::{
    AppState,
    error::{ApiError, ErrorBody},
    models::{Unit, UnitInput},
    validate::ValidatedJson,
};

#[utoipa::path(
    get,
    path = "/api/units",
    tag = UNITS_TAG,
    security(("api_key" = [])),
    responses((status = 200, description = "All measurement units", body = [Unit]))
)]
pub async fn list_units(State(state): State<AppState>) -> Result<Json<Vec<Unit>>, ApiError> {
    Ok(Json(state.repo.list_units().await?))
}

#[utoipa::path(
    get,
    path = "/api/units/{id}",
    tag = UNITS_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Unit ID")),
    responses(
        (status = 200, description = "Found", body = Unit),
        (status = 404, description = "Unit not found", body = ErrorBody)
    )
)]
pub async fn get_unit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Unit>, ApiError> {
    Ok(Json(state.repo.get_unit(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/units",
    tag = UNITS_TAG,
    security(("api_key" = [])),
    request_body = UnitInput,
    responses(
        (status = 200, description = "Created", body = Unit),
        (status = 400, description = "Unit already exists", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody)
    )
)]
pub async fn create_unit(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UnitInput>,
) -> Result<Json<Unit>, ApiError> {
    Ok(Json(state.repo.create_unit(payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/units/{id}",
    tag = UNITS_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Unit ID")),
    request_body = UnitInput,
    responses(
        (status = 200, description = "Updated", body = Unit),
        (status = 400, description = "Unit already exists", body = ErrorBody),
        (status = 404, description = "Unit not found", body = ErrorBody)
    )
)]
pub async fn update_unit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UnitInput>,
) -> Result<Json<Unit>, ApiError> {
    Ok(Json(state.repo.update_unit(id, payload).await?))
}
