//! A room: its members, the two player slots and one game.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::{
    connections::ClientHandle,
    game::{GameState, Mark, MoveError, MoveReport},
    ids::{ClientId, RoomId},
};

/// Role a member holds inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Occupies (or asked for) a player slot.
    #[default]
    Player,
    /// Watches the game, cannot move or reset.
    Spectator,
}

/// Errors raised by room operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The room was emptied and removed while the request was in flight.
    #[error("room `{0}` not found")]
    Closed(RoomId),
    /// Moving requires a player slot.
    #[error("you are not a player in this room")]
    NotAPlayer,
    /// Resetting requires a player slot.
    #[error("only players can reset the game")]
    ResetForbidden,
    /// The game rules refused the move.
    #[error(transparent)]
    Move(#[from] MoveError),
}

/// A connected member of the room.
#[derive(Debug, Clone)]
pub struct Member {
    /// Outbound channel of the member's connection.
    pub handle: ClientHandle,
    /// Display name.
    pub nick: String,
    /// Player while holding a slot, spectator otherwise.
    pub role: Role,
}

/// The X and O player slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slots {
    x: Option<ClientId>,
    o: Option<ClientId>,
}

impl Slots {
    /// Client holding the slot for `mark`.
    pub fn holder(&self, mark: Mark) -> Option<&ClientId> {
        match mark {
            Mark::X => self.x.as_ref(),
            Mark::O => self.o.as_ref(),
        }
    }

    /// Symbol whose slot `client_id` occupies.
    pub fn symbol_of(&self, client_id: &str) -> Option<Mark> {
        [Mark::X, Mark::O]
            .into_iter()
            .find(|mark| self.holder(*mark).is_some_and(|holder| holder == client_id))
    }

    /// Claim the first open slot, X before O.
    fn claim(&mut self, client_id: &str) -> Option<Mark> {
        let (slot, mark) = if self.x.is_none() {
            (&mut self.x, Mark::X)
        } else if self.o.is_none() {
            (&mut self.o, Mark::O)
        } else {
            return None;
        };
        *slot = Some(client_id.to_string());
        Some(mark)
    }

    /// Free whichever slot `client_id` holds.
    fn vacate(&mut self, client_id: &str) -> Option<Mark> {
        let mark = self.symbol_of(client_id)?;
        match mark {
            Mark::X => self.x = None,
            Mark::O => self.o = None,
        }
        Some(mark)
    }
}

/// Result of a join: what the connection ended up as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Role after slot assignment (players are downgraded when both slots are taken).
    pub role: Role,
    /// Slot held by the connection, if any.
    pub symbol: Option<Mark>,
}

/// An isolated game session.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    members: IndexMap<ClientId, Member>,
    slots: Slots,
    game: GameState,
    closed: bool,
}

impl Room {
    /// Create an empty room with a fresh game.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: IndexMap::new(),
            slots: Slots::default(),
            game: GameState::new(),
            closed: false,
        }
    }

    /// Room identifier.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Current game state.
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Player slots.
    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    /// Members in join order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// Look up a member by connection id.
    pub fn member(&self, client_id: &str) -> Option<&Member> {
        self.members.get(client_id)
    }

    /// Number of members without a slot.
    pub fn spectator_count(&self) -> usize {
        self.members
            .values()
            .filter(|member| member.role == Role::Spectator)
            .count()
    }

    /// Display name of the player holding `mark`.
    pub fn player_name(&self, mark: Mark) -> Option<&str> {
        let holder = self.slots.holder(mark)?;
        self.members.get(holder).map(|member| member.nick.as_str())
    }

    /// True once the last member left.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True after the room was removed from the directory.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Mark the room as removed; later lookups through stale handles fail.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Fail with [`RoomError::Closed`] if the room was removed.
    pub fn ensure_open(&self) -> Result<(), RoomError> {
        if self.closed {
            return Err(RoomError::Closed(self.id.clone()));
        }
        Ok(())
    }

    /// Add (or refresh) a member and assign a slot when a player role is requested.
    ///
    /// Joining never fails: with both slots taken, a player is downgraded to
    /// spectator. A repeated join keeps the slot already held.
    pub fn join(&mut self, handle: ClientHandle, requested: Role, nick: String) -> JoinOutcome {
        let client_id = handle.id.clone();
        let symbol = match requested {
            Role::Player => self
                .slots
                .symbol_of(&client_id)
                .or_else(|| self.slots.claim(&client_id)),
            Role::Spectator => {
                self.slots.vacate(&client_id);
                None
            }
        };
        let role = if symbol.is_some() {
            Role::Player
        } else {
            Role::Spectator
        };

        self.members.insert(client_id, Member { handle, nick, role });
        JoinOutcome { role, symbol }
    }

    /// Remove a member, freeing its slot. Returns false if it was not a member.
    pub fn leave(&mut self, client_id: &str) -> bool {
        self.slots.vacate(client_id);
        self.members.shift_remove(client_id).is_some()
    }

    /// Change a member's display name. Returns false if it was not a member.
    pub fn rename(&mut self, client_id: &str, nick: String) -> bool {
        match self.members.get_mut(client_id) {
            Some(member) => {
                member.nick = nick;
                true
            }
            None => false,
        }
    }

    /// Play a move on behalf of `client_id`.
    pub fn play(
        &mut self,
        client_id: &str,
        board_index: i64,
        cell_index: i64,
    ) -> Result<MoveReport, RoomError> {
        if self.game.is_over() {
            return Err(MoveError::GameOver.into());
        }
        let mark = self.slots.symbol_of(client_id).ok_or(RoomError::NotAPlayer)?;
        Ok(self.game.apply_move(mark, board_index, cell_index)?)
    }

    /// Start a new game, keeping members and slots.
    pub fn reset(&mut self, client_id: &str) -> Result<(), RoomError> {
        if self.slots.symbol_of(client_id).is_none() {
            return Err(RoomError::ResetForbidden);
        }
        self.game = GameState::new();
        Ok(())
    }
}
