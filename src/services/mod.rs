/// Outbound message encoding and room broadcasts.
pub mod broadcast;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Room membership and game operations.
pub mod room_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
