use axum::{
    Json,
    extract::{Path, State},
};

use super::INGREDIENT_CATEGORIES_TAG;
use crate::{
    AppState,
    error::{ApiError, ErrorBody},
    models::{IngredientCategory, IngredientCategoryInput},
    validate::ValidatedJson,
};

#[utoipa::path(
    get,
    path = "/api/ingredient_categories",
    tag = INGREDIENT_CATEGORIES_TAG,
    security(("api_key" = [])),
    responses((status = 200, description = "All ingredient categories", body = [IngredientCategory]))
)]
pub async fn list_ingredient_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<IngredientCategory>>, ApiError> {
    Ok(Json(state.repo.list_ingredient_categories().await?))
}

#[utoipa::path(
    get,
    path = "/api/ingredient_categories/{id}",
    tag = INGREDIENT_CATEGORIES_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Ingredient category ID")),
    responses(
        (status = 200, description = "Found", body = IngredientCategory),
        (status = 404, description = "Ingredient category not found", body = ErrorBody)
    )
)]
pub async fn get_ingredient_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientCategory>, ApiError> {
    Ok(Json(state.repo.get_ingredient_category(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/ingredient_categories",
    tag = INGREDIENT_CATEGORIES_TAG,
    security(("api_key" = [])),
    request_body = IngredientCategoryInput,
    responses(
        (status = 200, description = "Created", body = IngredientCategory),
        (status = 400, description = "Ingredient category already exists", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody)
    )
)]
pub async fn create_ingredient_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<IngredientCategoryInput>,
) -> Result<Json<IngredientCategory>, ApiError> {
    Ok(Json(state.repo.create_ingredient_category(payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/ingredient_categories/{id}",
    tag = INGREDIENT_CATEGORIES_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Ingredient category ID")),
    request_body = IngredientCategoryInput,
    responses(
        (status = 200, description = "Updated", body = IngredientCategory),
        (status = 400, description = "Ingredient category already exists", body = ErrorBody),
        (status = 404, description = "Ingredient category not found", body = ErrorBody)
    )
)]
pub async fn update_ingredient_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<IngredientCategoryInput>,
) -> Result<Json<IngredientCategory>, ApiError> {
    Ok(Json(state.repo.update_ingredient_category(id, payload).await?))
}
