use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    game::{Mark, Outcome, SubBoard},
    room::Room,
};

/// Display names of the two player slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlayerNames {
    /// Nickname of the X player.
    #[serde(rename = "X")]
    pub x: Option<String>,
    /// Nickname of the O player.
    #[serde(rename = "O")]
    pub o: Option<String>,
}

/// One sub-board as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SubBoardSnapshot {
    /// Nine cells in row-major order.
    pub cells: Vec<Option<Mark>>,
    /// `null` while open, then `"X"`, `"O"` or `"DRAW"`.
    #[schema(value_type = Option<String>)]
    pub owner: Option<Outcome>,
}

impl From<&SubBoard> for SubBoardSnapshot {
    fn from(board: &SubBoard) -> Self {
        Self {
            cells: board.cells().to_vec(),
            owner: board.owner(),
        }
    }
}

/// Read-only projection of a room, built fresh for every broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Room identifier.
    pub room_id: String,
    /// Nine sub-boards in meta-board order.
    pub boards: Vec<SubBoardSnapshot>,
    /// Symbol expected to move next.
    pub current_player: Mark,
    /// `-1` when any undecided board may be played.
    pub next_allowed_board: i8,
    /// `null` while in progress, then `"X"`, `"O"` or `"DRAW"`.
    #[schema(value_type = Option<String>)]
    pub winner: Option<Outcome>,
    /// Slot holders' nicknames.
    pub players: PlayerNames,
    /// Members without a slot.
    pub spectator_count: usize,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        let game = room.game();
        Self {
            room_id: room.id().clone(),
            boards: game.boards().iter().map(SubBoardSnapshot::from).collect(),
            current_player: game.current_player(),
            next_allowed_board: game.next_board().as_wire(),
            winner: game.winner(),
            players: PlayerNames {
                x: room.player_name(Mark::X).map(str::to_owned),
                o: room.player_name(Mark::O).map(str::to_owned),
            },
            spectator_count: room.spectator_count(),
        }
    }
}
