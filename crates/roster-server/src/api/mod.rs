// ABOUTME: API module containing the HTTP handler functions for the roster REST API.
// ABOUTME: One handler per employee operation, grouped in a single sub-module.

pub mod employees;
