use axum::extract::ws::Message;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    dto::{
        room::RoomSnapshot,
        ws::{ServerMessage, StateMessage},
    },
    state::room::Room,
};

/// The writer side of a connection has shut down.
#[derive(Debug, Error)]
#[error("connection closed")]
pub struct ConnectionClosed;

/// Serialize a server message into a text frame.
///
/// Serialization failures are bugs rather than transient errors, so they
/// are logged and swallowed.
fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(Message::Text(payload.into())),
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{message:?}` (permanent error, not retrying)");
            None
        }
    }
}

/// Serialize a payload and push it onto the provided WebSocket sender.
pub fn send_message(
    tx: &mpsc::UnboundedSender<Message>,
    message: &ServerMessage,
) -> Result<(), ConnectionClosed> {
    let Some(frame) = encode(message) else {
        return Ok(());
    };
    tx.send(frame).map_err(|_| ConnectionClosed)
}

/// Send the current snapshot of `room` to every member.
///
/// Members whose socket is already gone are skipped; their disconnect
/// cleanup removes them separately.
pub fn broadcast_state(room: &Room) {
    let message = ServerMessage::State(StateMessage {
        state: RoomSnapshot::from(room),
    });
    let Some(frame) = encode(&message) else {
        return;
    };
    for member in room.members() {
        if member.handle.tx.send(frame.clone()).is_err() {
            debug!(
                room_id = %room.id(),
                client_id = %member.handle.id,
                "skipping broadcast to closed connection"
            );
        }
    }
}
