use axum::{
    Json,
    extract::{Path, State},
};

use super::INGREDIENTS_TAG;
use crate::{
    AppState,
    error::{ApiError, ErrorBody},
    models::{Ingredient, IngredientInput},
    validate::ValidatedJson,
};

/// list_ingredients
#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = INGREDIENTS_TAG,
    security(("api_key" = [])),
    responses((status = 200, description = "All ingredients", body = [Ingredient]))
)]
pub async fn list_ingredients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    Ok(Json(state.repo.list_ingredients().await?))
}

/// get_ingredient
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    tag = INGREDIENTS_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Found", body = Ingredient),
        (status = 404, description = "Ingredient not found", body = ErrorBody)
    )
)]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Ingredient>, ApiError> {
    Ok(Json(state.repo.get_ingredient(id).await?))
}

/// create_ingredient
///
/// `category_id` and `unit_id` are optional, but when present they must name existing rows;
/// otherwise the insert is rejected with 400.
#[utoipa::path(
    post,
    path = "/api/ingredients",
    tag = INGREDIENTS_TAG,
    security(("api_key" = [])),
    request_body = IngredientInput,
    responses(
        (status = 200, description = "Created", body = Ingredient),
        (status = 400, description = "Ingredient already exists", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody)
    )
)]
pub async fn create_ingredient(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<IngredientInput>,
) -> Result<Json<Ingredient>, ApiError> {
    let ingredient = state.repo.create_ingredient(payload).await?;
    tracing::info!(ingredient_id = ingredient.id, "ingredient created");
    Ok(Json(ingredient))
}

/// update_ingredient
#[utoipa::path(
    put,
    path = "/api/ingredients/{id}",
    tag = INGREDIENTS_TAG,
    security(("api_key" = [])),
    params(("id" = i32, Path, description = "Ingredient ID")),
    request_body = IngredientInput,
    responses(
        (status = 200, description = "Updated", body = Ingredient),
        (status = 400, description = "Ingredient already exists", body = ErrorBody),
        (status = 404, description = "Ingredient not found", body = ErrorBody),
        (status = 422, description = "Invalid fields", body = ErrorBody)
    )
)]
pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<IngredientInput>,
) -> Result<Json<Ingredient>, ApiError> {
    Ok(Json(state.repo.update_ingredient(id, payload).await?))
}
