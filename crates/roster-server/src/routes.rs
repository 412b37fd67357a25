// ABOUTME: Route definitions for the roster HTTP API.
// ABOUTME: Assembles the employee routes into one Axum Router with CORS, tracing, and shared state.

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
/// CORS is open to any origin without credentials.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/employees",
            get(api::employees::list_employees).post(api::employees::create_employee),
        )
        .route("/api/employees/search", get(api::employees::search_employees))
        .route(
            "/api/employees/{id}",
            get(api::employees::get_employee)
                .put(api::employees::update_employee)
                .delete(api::employees::delete_employee),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler. Returns 200 OK with the service name.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "healthy", "service": "Employee API" }))
}
