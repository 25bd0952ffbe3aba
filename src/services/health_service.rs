use tracing::debug;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness along with the current room and connection counts.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let rooms = state.rooms().len();
    let connections = state.connections().len();
    debug!(rooms, connections, "health check");
    HealthResponse::ok(rooms, connections)
}

#[cfg(test)]
mod tests {
    use axum::extract::ws::Message;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[tokio::test]
    async fn counts_rooms_and_connections() {
        let state = AppState::new(AppConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel::<Message>();
        state.connections().register(tx).unwrap();
        state.rooms().create().unwrap();

        let health = health_status(&state).await;

        assert_eq!(health.status, "ok");
        assert_eq!((health.rooms, health.connections), (1, 1));
    }
}
