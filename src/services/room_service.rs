use tracing::{info, warn};

use crate::{
    dto::{
        room::RoomSnapshot,
        ws::{JoinRequest, JoinedMessage, LeftMessage, MoveRequest, RoomRequest, ServerMessage, SetNickRequest},
    },
    error::ServiceError,
    services::broadcast::{broadcast_state, send_message},
    state::{SharedState, connections::ClientHandle},
};

/// Join (or create) a room, reply `joined` to the caller and broadcast the new state.
pub async fn join(
    state: &SharedState,
    client: &ClientHandle,
    request: JoinRequest,
) -> Result<(), ServiceError> {
    let JoinRequest {
        room_id,
        role,
        nick,
    } = request;
    let nick = nick
        .or_else(|| state.connections().nick(&client.id))
        .unwrap_or_else(|| state.config().default_nick(&client.id));

    // Only a successful join into another room makes the old one see a departure.
    let previous = state
        .connections()
        .room_of(&client.id)
        .filter(|current| room_id.as_deref() != Some(current.as_str()));

    let handle = state.rooms().resolve(room_id.as_deref())?;
    {
        let mut room = handle.lock().await;
        room.ensure_open()?;

        let outcome = room.join(client.clone(), role.unwrap_or_default(), nick);
        state
            .connections()
            .set_room(&client.id, Some(room.id().clone()));
        info!(
            client_id = %client.id,
            room_id = %room.id(),
            role = ?outcome.role,
            symbol = ?outcome.symbol,
            "client joined room"
        );

        let joined = ServerMessage::Joined(JoinedMessage {
            room_id: room.id().clone(),
            client_id: client.id.clone(),
            symbol: outcome.symbol,
            role: outcome.role,
            state: RoomSnapshot::from(&*room),
        });
        if send_message(&client.tx, &joined).is_err() {
            warn!(client_id = %client.id, "connection closed before join acknowledgement");
        }
        broadcast_state(&room);
    }

    // Room locks are never nested.
    if let Some(previous) = previous {
        depart(state, &client.id, &previous).await;
    }
    Ok(())
}

/// Apply a move and broadcast the result.
pub async fn play_move(
    state: &SharedState,
    client: &ClientHandle,
    request: MoveRequest,
) -> Result<(), ServiceError> {
    let handle = state.rooms().resolve(Some(&request.room_id))?;
    let mut room = handle.lock().await;
    room.ensure_open()?;

    let report = room.play(&client.id, request.board_index, request.cell_index)?;
    if let Some(owner) = report.board_settled {
        info!(
            room_id = %room.id(),
            board = request.board_index,
            owner = ?owner,
            "sub-board decided"
        );
    }
    if let Some(winner) = report.game_settled {
        info!(room_id = %room.id(), winner = ?winner, "game decided");
    }

    broadcast_state(&room);
    Ok(())
}

/// Start a fresh game in the room; only slot holders may do this.
pub async fn reset(
    state: &SharedState,
    client: &ClientHandle,
    request: RoomRequest,
) -> Result<(), ServiceError> {
    let handle = state.rooms().resolve(Some(&request.room_id))?;
    let mut room = handle.lock().await;
    room.ensure_open()?;

    room.reset(&client.id)?;
    info!(room_id = %room.id(), client_id = %client.id, "game reset");

    broadcast_state(&room);
    Ok(())
}

/// Leave the named room while keeping the connection open.
pub async fn leave(
    state: &SharedState,
    client: &ClientHandle,
    request: RoomRequest,
) -> Result<(), ServiceError> {
    let RoomRequest { room_id } = request;
    if state.connections().room_of(&client.id).as_deref() != Some(room_id.as_str()) {
        return Err(ServiceError::NotInRoom(room_id));
    }

    state.connections().set_room(&client.id, None);
    depart(state, &client.id, &room_id).await;

    if send_message(&client.tx, &ServerMessage::Left(LeftMessage { room_id })).is_err() {
        warn!(client_id = %client.id, "connection closed before leave acknowledgement");
    }
    Ok(())
}

/// Remember a nickname and refresh the display name in the current room.
pub async fn set_nick(
    state: &SharedState,
    client: &ClientHandle,
    request: SetNickRequest,
) -> Result<(), ServiceError> {
    let SetNickRequest { nick } = request;
    state.connections().set_nick(&client.id, nick.clone());

    let Some(room_id) = state.connections().room_of(&client.id) else {
        return Ok(());
    };
    let Some(handle) = state.rooms().get(&room_id) else {
        return Ok(());
    };
    let mut room = handle.lock().await;
    if !room.is_closed() && room.rename(&client.id, nick) {
        broadcast_state(&room);
    }
    Ok(())
}

/// Cleanup after the transport closed: same end state as an explicit leave.
pub async fn disconnect(state: &SharedState, client_id: &str) {
    if let Some(room_id) = state.connections().unregister(client_id) {
        depart(state, client_id, &room_id).await;
    }
}

/// Current snapshot of a room, for read-only HTTP access.
pub async fn room_snapshot(
    state: &SharedState,
    room_id: &str,
) -> Result<RoomSnapshot, ServiceError> {
    let handle = state.rooms().resolve(Some(room_id))?;
    let room = handle.lock().await;
    room.ensure_open()?;
    Ok(RoomSnapshot::from(&*room))
}

/// Remove a member from a room, broadcasting to whoever remains.
///
/// The last member out closes the room and drops it from the directory.
async fn depart(state: &SharedState, client_id: &str, room_id: &str) {
    let Some(handle) = state.rooms().get(room_id) else {
        return;
    };
    let mut room = handle.lock().await;
    if room.is_closed() || !room.leave(client_id) {
        return;
    }
    info!(client_id = %client_id, room_id = %room_id, "client left room");

    if room.is_empty() {
        room.close();
        state.rooms().remove(room_id, &handle);
        info!(room_id = %room_id, "room closed");
    } else {
        broadcast_state(&room);
    }
}
