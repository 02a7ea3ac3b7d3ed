use crate::AppState;
use axum::{Router, response::Redirect, routing::get};

/// Public Router Module
///
/// Endpoints reachable without the API key. The Swagger UI and the OpenAPI document are
/// merged separately in `create_router`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Sends browsers to the interactive docs.
        .route("/", get(|| async { Redirect::temporary("/docs") }))
        // GET /health
        // Liveness probe for load balancers and container healthchecks.
        .route("/health", get(|| async { "ok" }))
}
