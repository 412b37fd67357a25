// ABOUTME: Persistence layer for roster, storing employee records in a single SQLite file.
// ABOUTME: Provides schema setup, lookups, filtered search, and insert/update/delete operations.

pub mod sqlite;

pub use sqlite::{EmployeeStore, StoreError};
