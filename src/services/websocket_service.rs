use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    dto::ws::{ClientMessage, ServerMessage},
    error::ServiceError,
    services::{broadcast::send_message, room_service},
    state::{SharedState, connections::ClientHandle},
};

/// Handle the full lifecycle for an individual game client connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let client = match state.connections().register(outbound_tx.clone()) {
        Ok(client) => client,
        Err(err) => {
            warn!(error = %err, "refusing connection");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };
    info!(client_id = %client.id, "client connected");

    while let Some(message) = receiver.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    reply_error(&client, &ServiceError::Malformed);
                    continue;
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
                continue;
            }
            Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(frame)) => {
                info!(client_id = %client.id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Err(err) => {
                warn!(client_id = %client.id, error = %err, "websocket error");
                break;
            }
        };

        debug!(client_id = %client.id, payload = %text, "received client message");
        let result = match ClientMessage::from_json_str(&text) {
            Ok(message) => handle_message(&state, &client, message).await,
            Err(err) => {
                warn!(client_id = %client.id, error = %err, "failed to parse or validate client message");
                Err(err.into())
            }
        };
        if let Err(err) = result {
            reply_error(&client, &err);
        }
    }

    room_service::disconnect(&state, &client.id).await;
    info!(client_id = %client.id, "client disconnected");

    // Every sender clone must be gone for the writer task to stop.
    drop(client);
    finalize(writer_task, outbound_tx).await;
}

/// Route a parsed message to the matching room operation.
async fn handle_message(
    state: &SharedState,
    client: &ClientHandle,
    message: ClientMessage,
) -> Result<(), ServiceError> {
    let kind = message.kind();
    let result = match message {
        ClientMessage::Join(request) => room_service::join(state, client, request).await,
        ClientMessage::Move(request) => room_service::play_move(state, client, request).await,
        ClientMessage::Reset(request) => room_service::reset(state, client, request).await,
        ClientMessage::Leave(request) => room_service::leave(state, client, request).await,
        ClientMessage::SetNick(request) => room_service::set_nick(state, client, request).await,
        ClientMessage::Unknown => Err(ServiceError::Malformed),
    };
    if let Err(ref err) = result {
        warn!(client_id = %client.id, kind, error = %err, "message rejected");
    }
    result
}

/// Send a private `error` message to the offending connection.
fn reply_error(client: &ClientHandle, err: &ServiceError) {
    if send_message(&client.tx, &ServerMessage::error(err.to_string())).is_err() {
        debug!(client_id = %client.id, "connection closed before error reply");
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
