/// Live connection registry.
pub mod connections;
/// Game rules.
pub mod game;
/// Identifier generation.
pub mod ids;
/// A single room.
pub mod room;
/// Room directory.
pub mod rooms;

use std::sync::Arc;

use crate::config::AppConfig;

use self::{
    connections::ConnectionRegistry,
    ids::{RandomHexTokens, TokenSource},
    rooms::RoomDirectory,
};

/// Shared handle passed to every route and service.
pub type SharedState = Arc<AppState>;

/// Central application state: live connections and open rooms.
pub struct AppState {
    config: AppConfig,
    connections: ConnectionRegistry,
    rooms: RoomDirectory,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_tokens(config, Arc::new(RandomHexTokens))
    }

    /// Same as [`AppState::new`] with a custom identifier source.
    pub fn with_tokens(config: AppConfig, tokens: Arc<dyn TokenSource>) -> SharedState {
        Arc::new(Self {
            config,
            connections: ConnectionRegistry::new(tokens.clone()),
            rooms: RoomDirectory::new(tokens),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of live WebSocket connections keyed by client id.
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    /// Directory of open rooms keyed by room id.
    pub fn rooms(&self) -> &RoomDirectory {
        &self.rooms
    }
}
