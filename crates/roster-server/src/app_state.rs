// ABOUTME: Shared application state for the roster HTTP server.
// ABOUTME: Holds the employee store behind an async mutex so handlers can share one connection.

use std::sync::Arc;

use roster_store::EmployeeStore;
use tokio::sync::Mutex;

/// Shared application state accessible by all Axum handlers.
/// The SQLite connection is not `Sync`, so it sits behind a tokio Mutex;
/// each handler holds the lock for its whole check-then-write sequence.
pub struct AppState {
    pub store: Mutex<EmployeeStore>,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create a new AppState around an already-opened store.
    pub fn new(store: EmployeeStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}
