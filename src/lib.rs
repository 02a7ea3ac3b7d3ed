use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod validate;

// Routing split by access level (public, api-key gated).
pub mod routes;
use auth::{ApiKey, SecurityAddon};
use routes::{api, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, ErrorBody};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI document
/// served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::user_roles::list_user_roles, handlers::user_roles::get_user_role,
        handlers::user_roles::create_user_role, handlers::user_roles::update_user_role,
        handlers::user_roles::list_role_permissions, handlers::user_roles::grant_permission,
        handlers::permissions::list_permissions, handlers::permissions::get_permission,
        handlers::permissions::create_permission, handlers::permissions::update_permission,
        handlers::users::list_users, handlers::users::get_user,
        handlers::users::create_user, handlers::users::update_user,
        handlers::units::list_units, handlers::units::get_unit,
        handlers::units::create_unit, handlers::units::update_unit,
        handlers::ingredient_categories::list_ingredient_categories,
        handlers::ingredient_categories::get_ingredient_category,
        handlers::ingredient_categories::create_ingredient_category,
        handlers::ingredient_categories::update_ingredient_category,
        handlers::ingredients::list_ingredients, handlers::ingredients::get_ingredient,
        handlers::ingredients::create_ingredient, handlers::ingredients::update_ingredient,
    ),
    components(
        schemas(
            models::UserRole, models::UserRoleInput, models::Permission, models::PermissionInput,
            models::User, models::UserInput, models::Unit, models::UnitInput,
            models::IngredientCategory, models::IngredientCategoryInput,
            models::Ingredient, models::IngredientInput, error::ErrorBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "user_roles", description = "User roles and their permission grants"),
        (name = "permissions", description = "Permissions"),
        (name = "users", description = "User accounts"),
        (name = "units", description = "Measurement units"),
        (name = "ingredient_categories", description = "Ingredient categories"),
        (name = "ingredients", description = "Ingredients"),
    ),
    info(title = "Pantry API", description = "Recipes, pantry and access-control records")
)]
pub struct ApiDoc;

/// AppState
///
/// The shared, cheaply cloneable container handed to every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer, Postgres or in-memory.
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self { repo, config }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// api_key_middleware
///
/// Gate for the `/api` tree. The `ApiKey` extractor does the check; when it rejects, the
/// handler never runs and the client gets the 403 error body.
async fn api_key_middleware(_key: ApiKey, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing table, applies the API key gate and the observability layers, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // route_layer: unmatched paths still 404 instead of 403.
        .merge(api::api_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        )))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: tags every log line of a request with its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

/// shutdown_signal
///
/// Resolves on Ctrl-C, or on SIGTERM where the platform has it, so `axum::serve` can drain
/// in-flight requests.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
