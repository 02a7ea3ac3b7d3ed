use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{MethodRouter, get, put},
};

/// Registers a resource's collection routes on both `prefix` and `prefix/`, and its member
/// routes on `prefix/{id}`. Clients generated from the OpenAPI document use the trailing
/// slash form for collections.
fn resource(
    router: Router<AppState>,
    prefix: &str,
    collection: MethodRouter<AppState>,
    member: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(prefix, collection.clone())
        .route(&format!("{prefix}/"), collection)
        .route(&format!("{prefix}/{{id}}"), member)
}

/// API Router Module
///
/// Every CRUD resource under `/api`. Each resource supports list and create on the
/// collection, read and full replace on a member. There is no delete.
pub fn api_routes() -> Router<AppState> {
    use handlers::{ingredient_categories, ingredients, permissions, units, user_roles, users};

    let router = Router::new();

    let router = resource(
        router,
        "/api/user_roles",
        get(user_roles::list_user_roles).post(user_roles::create_user_role),
        get(user_roles::get_user_role).put(user_roles::update_user_role),
    );
    // Role to permission grants.
    let router = router
        .route(
            "/api/user_roles/{id}/permissions",
            get(user_roles::list_role_permissions),
        )
        .route(
            "/api/user_roles/{id}/permissions/{permission_id}",
            put(user_roles::grant_permission),
        );

    let router = resource(
        router,
        "/api/permissions",
        get(permissions::list_permissions).post(permissions::create_permission),
        get(permissions::get_permission).put(permissions::update_permission),
    );

    let router = resource(
        router,
        "/api/users",
        get(users::list_users).post(users::create_user),
        get(users::get_user).put(users::update_user),
    );

    let router = resource(
        router,
        "/api/units",
        get(units::list_units).post(units::create_unit),
        get(units::get_unit).put(units::update_unit),
    );

    let router = resource(
        router,
        "/api/ingredient_categories",
        get(ingredient_categories::list_ingredient_categories)
            .post(ingredient_categories::create_ingredient_category),
        get(ingredient_categories::get_ingredient_category)
            .put(ingredient_categories::update_ingredient_category),
    );

    resource(
        router,
        "/api/ingredients",
        get(ingredients::list_ingredients).post(ingredients::create_ingredient),
        get(ingredients::get_ingredient).put(ingredients::update_ingredient),
    )
}
