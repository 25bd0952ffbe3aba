//! Directory of open rooms.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::state::{
    ids::{IdExhausted, ROOM_ID_LEN, RoomId, TokenSource, insert_unique},
    room::Room,
};

/// Shared handle to a room. The mutex is the room's critical section:
/// validation, mutation and the resulting broadcast all happen under it.
pub type RoomHandle = Arc<Mutex<Room>>;

/// Errors raised while resolving a room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// An identifier was supplied but no such room exists.
    #[error("room `{0}` not found")]
    NotFound(RoomId),
    /// A fresh room identifier could not be allocated.
    #[error(transparent)]
    Exhausted(#[from] IdExhausted),
}

/// Process-lifetime mapping from room identifier to room.
pub struct RoomDirectory {
    rooms: DashMap<RoomId, RoomHandle>,
    tokens: Arc<dyn TokenSource>,
}

impl RoomDirectory {
    /// Build an empty directory drawing identifiers from `tokens`.
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            rooms: DashMap::new(),
            tokens,
        }
    }

    /// Look up `room_id`, or create a fresh room when no identifier is given.
    pub fn resolve(&self, room_id: Option<&str>) -> Result<RoomHandle, DirectoryError> {
        match room_id {
            Some(room_id) => self
                .get(room_id)
                .ok_or_else(|| DirectoryError::NotFound(room_id.to_string())),
            None => self.create(),
        }
    }

    /// Existing room by identifier.
    pub fn get(&self, room_id: &str) -> Option<RoomHandle> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    /// Allocate a new room under a collision-checked identifier.
    pub fn create(&self) -> Result<RoomHandle, DirectoryError> {
        let room_id = insert_unique(&self.rooms, self.tokens.as_ref(), ROOM_ID_LEN, |id| {
            Arc::new(Mutex::new(Room::new(id.to_string())))
        })?;
        self.get(&room_id)
            .ok_or(DirectoryError::NotFound(room_id))
    }

    /// Drop `room_id` if it still maps to `handle`.
    pub fn remove(&self, room_id: &str, handle: &RoomHandle) -> bool {
        self.rooms
            .remove_if(room_id, |_, current| Arc::ptr_eq(current, handle))
            .is_some()
    }

    /// Number of open rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// True when no room is open.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ids::{RandomHexTokens, tests::ScriptedTokens};

    #[tokio::test]
    async fn resolve_without_id_creates_a_room() {
        let directory = RoomDirectory::new(Arc::new(RandomHexTokens));

        let handle = directory.resolve(None).unwrap();
        let room_id = handle.lock().await.id().clone();

        assert_eq!(room_id.len(), ROOM_ID_LEN);
        assert!(Arc::ptr_eq(&directory.resolve(Some(&room_id)).unwrap(), &handle));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn resolve_unknown_id_is_not_found() {
        let directory = RoomDirectory::new(Arc::new(RandomHexTokens));
        assert_eq!(
            directory.resolve(Some("abcdef")).unwrap_err(),
            DirectoryError::NotFound("abcdef".into())
        );
        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn room_id_collision_is_regenerated() {
        let tokens = ScriptedTokens::new(&["aaaaaa", "aaaaaa", "bbbbbb"]);
        let directory = RoomDirectory::new(Arc::new(tokens));

        let first = directory.create().unwrap();
        let second = directory.create().unwrap();

        assert_eq!(first.lock().await.id(), "aaaaaa");
        assert_eq!(second.lock().await.id(), "bbbbbb");
    }

    #[test]
    fn remove_only_drops_the_matching_handle() {
        let directory = RoomDirectory::new(Arc::new(RandomHexTokens));
        let handle = directory.create().unwrap();
        let stranger: RoomHandle = Arc::new(Mutex::new(Room::new("ffffff".into())));
        let room_id = handle.try_lock().unwrap().id().clone();

        assert!(!directory.remove(&room_id, &stranger));
        assert!(directory.remove(&room_id, &handle));
        assert!(directory.get(&room_id).is_none());
    }
}
