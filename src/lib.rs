//! Library crate for ultimate-ttt-back, exposing modules for binaries and integration tests.

/// Runtime configuration loading.
pub mod config;
/// Wire and HTTP data transfer objects.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum route trees.
pub mod routes;
/// Room operations, broadcasting and the WebSocket session loop.
pub mod services;
/// Shared in-memory state: connections, rooms and game rules.
pub mod state;
