use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::{room::RoomSnapshot, validation::validate_room_id},
    error::AppError,
    services::room_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/rooms/{room_id}",
    tag = "rooms",
    params(("room_id" = String, Path, description = "Six lowercase hex characters")),
    responses(
        (status = 200, description = "Current room snapshot", body = RoomSnapshot),
        (status = 400, description = "Malformed room id"),
        (status = 404, description = "Room not found")
    )
)]
/// Return the snapshot members of the room currently see.
pub async fn room_snapshot(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSnapshot>, AppError> {
    validate_room_id(&room_id)
        .map_err(|_| AppError::BadRequest(format!("invalid room id `{room_id}`")))?;
    let snapshot = room_service::room_snapshot(&state, &room_id).await?;
    Ok(Json(snapshot))
}

/// Configure the room inspection routes.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/rooms/{room_id}", get(room_snapshot))
}
