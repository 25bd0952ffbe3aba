/// Health check payload.
pub mod health;
/// Room snapshots.
pub mod room;
/// Field validators.
pub mod validation;
/// WebSocket protocol messages.
pub mod ws;
