// ABOUTME: HTTP server for roster, exposing employee CRUD and search as a JSON API.
// ABOUTME: Uses Axum with a shared SQLite-backed store injected into every handler.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use config::{ConfigError, ConfigOverrides, RosterConfig};
pub use error::ApiError;
pub use routes::create_router;
