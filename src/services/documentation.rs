use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Ultimate Tic-Tac-Toe backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::room_snapshot,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::RoomSnapshot,
            crate::dto::room::SubBoardSnapshot,
            crate::dto::room::PlayerNames,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::JoinRequest,
            crate::dto::ws::MoveRequest,
            crate::dto::ws::RoomRequest,
            crate::dto::ws::SetNickRequest,
            crate::dto::ws::ServerMessage,
            crate::dto::ws::JoinedMessage,
            crate::dto::ws::StateMessage,
            crate::dto::ws::LeftMessage,
            crate::dto::ws::ErrorMessage,
            crate::state::game::Mark,
            crate::state::room::Role,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Read-only room inspection"),
        (name = "game", description = "WebSocket protocol for game clients"),
    )
)]
pub struct ApiDoc;
