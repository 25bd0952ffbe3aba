//! Registry of live WebSocket connections.

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::state::ids::{CLIENT_ID_LEN, ClientId, IdExhausted, RoomId, TokenSource, insert_unique};

#[derive(Debug, Clone)]
/// Handle used to push messages to a connected client.
pub struct ClientHandle {
    /// Generated connection identifier.
    pub id: ClientId,
    /// Sender feeding the connection's writer task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Per-connection bookkeeping.
#[derive(Debug, Clone)]
pub struct ClientConnection {
    /// Handle shared with the rooms the connection joins.
    pub handle: ClientHandle,
    /// Nickname set through `set_nick`, reused by later joins.
    pub nick: Option<String>,
    /// Room the connection currently belongs to.
    pub room_id: Option<RoomId>,
}

/// Live connections keyed by their generated identifier.
pub struct ConnectionRegistry {
    connections: DashMap<ClientId, ClientConnection>,
    tokens: Arc<dyn TokenSource>,
}

impl ConnectionRegistry {
    /// Build an empty registry drawing identifiers from `tokens`.
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            connections: DashMap::new(),
            tokens,
        }
    }

    /// Track a new connection under a fresh, collision-checked identifier.
    pub fn register(&self, tx: mpsc::UnboundedSender<Message>) -> Result<ClientHandle, IdExhausted> {
        let id = insert_unique(
            &self.connections,
            self.tokens.as_ref(),
            CLIENT_ID_LEN,
            |id| ClientConnection {
                handle: ClientHandle {
                    id: id.to_string(),
                    tx: tx.clone(),
                },
                nick: None,
                room_id: None,
            },
        )?;
        Ok(ClientHandle { id, tx })
    }

    /// Forget a connection, returning the room it was still a member of.
    pub fn unregister(&self, id: &str) -> Option<RoomId> {
        self.connections
            .remove(id)
            .and_then(|(_, connection)| connection.room_id)
    }

    /// Room the connection currently belongs to.
    pub fn room_of(&self, id: &str) -> Option<RoomId> {
        self.connections
            .get(id)
            .and_then(|connection| connection.room_id.clone())
    }

    /// Record (or clear) the room membership of a connection.
    pub fn set_room(&self, id: &str, room_id: Option<RoomId>) {
        if let Some(mut connection) = self.connections.get_mut(id) {
            connection.room_id = room_id;
        }
    }

    /// Nickname previously chosen by the connection.
    pub fn nick(&self, id: &str) -> Option<String> {
        self.connections
            .get(id)
            .and_then(|connection| connection.nick.clone())
    }

    /// Remember the nickname a connection asked for.
    pub fn set_nick(&self, id: &str, nick: String) {
        if let Some(mut connection) = self.connections.get_mut(id) {
            connection.nick = Some(nick);
        }
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// True when nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
