//! Nested tic-tac-toe rules: nine sub-boards arranged on a 3x3 meta-board.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use utoipa::ToSchema;

/// Number of cells on a sub-board, and of sub-boards on the meta-board.
pub const BOARD_SIZE: usize = 9;

/// The eight winning lines of a 3x3 grid: rows, columns, diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Player symbol, also the name of the slot holding that player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Mark {
    /// First player, always opens the game.
    X,
    /// Second player.
    O,
}

impl Mark {
    /// The other symbol.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// Terminal result of a 3x3 grid, used for sub-board owners and the game winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A symbol completed a line.
    Won(Mark),
    /// The grid filled up (or every sub-board was decided) without a line.
    Drawn,
}

impl Outcome {
    /// The winning symbol, if the outcome is a win.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Outcome::Won(mark) => Some(mark),
            Outcome::Drawn => None,
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Won(mark) => mark.serialize(serializer),
            Outcome::Drawn => serializer.serialize_str("DRAW"),
        }
    }
}

/// Scan the eight lines of a 3x3 grid.
///
/// Returns the symbol owning a full line, `Drawn` when every square is set
/// without a line, and `None` while the grid is still open. Both sub-board
/// cells and meta-board owners are evaluated with this function.
pub fn evaluate_lines(squares: &[Option<Mark>; BOARD_SIZE]) -> Option<Outcome> {
    for [a, b, c] in LINES {
        if let Some(mark) = squares[a] {
            if squares[b] == Some(mark) && squares[c] == Some(mark) {
                return Some(Outcome::Won(mark));
            }
        }
    }
    if squares.iter().all(Option::is_some) {
        return Some(Outcome::Drawn);
    }
    None
}

/// Constraint on where the next move may be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NextBoard {
    /// Any undecided sub-board.
    #[default]
    Any,
    /// Only the sub-board with this index.
    Board(usize),
}

impl NextBoard {
    /// Wire encoding: `-1` for any board, otherwise the index.
    pub fn as_wire(self) -> i8 {
        match self {
            NextBoard::Any => -1,
            NextBoard::Board(index) => index as i8,
        }
    }
}

/// Reasons a move is refused. The game state is untouched when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// A winner (or a draw) has already been recorded.
    #[error("game already decided")]
    GameOver,
    /// The mover is not the player whose turn it is.
    #[error("not your turn")]
    NotYourTurn,
    /// Board index outside `0..9`.
    #[error("board {0} does not exist")]
    BoardOutOfRange(i64),
    /// The previous move forces play on another board.
    #[error("moves must be played on board {0}")]
    WrongBoard(usize),
    /// The target sub-board already has an owner.
    #[error("board {0} is already decided")]
    BoardDecided(usize),
    /// Cell index outside `0..9`.
    #[error("cell {0} does not exist")]
    CellOutOfRange(i64),
    /// The target cell already carries a symbol.
    #[error("cell {cell} of board {board} is already taken")]
    CellTaken {
        /// Sub-board index.
        board: usize,
        /// Cell index inside the sub-board.
        cell: usize,
    },
}

/// One of the nine inner boards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubBoard {
    cells: [Option<Mark>; BOARD_SIZE],
    owner: Option<Outcome>,
}

impl SubBoard {
    /// Cell contents in row-major order.
    pub fn cells(&self) -> &[Option<Mark>; BOARD_SIZE] {
        &self.cells
    }

    /// Terminal owner, `None` while the board is still open.
    pub fn owner(&self) -> Option<Outcome> {
        self.owner
    }

    /// True once the owner is set.
    pub fn is_decided(&self) -> bool {
        self.owner.is_some()
    }

    /// True when no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Write `mark` and settle the owner if the board just finished.
    fn place(&mut self, cell: usize, mark: Mark) -> Option<Outcome> {
        self.cells[cell] = Some(mark);
        let outcome = evaluate_lines(&self.cells)?;
        self.owner = Some(outcome);
        if let Outcome::Won(winner) = outcome {
            // Display only: the owner is authoritative. Existing marks stay put.
            for cell in self.cells.iter_mut().filter(|cell| cell.is_none()) {
                *cell = Some(winner);
            }
        }
        Some(outcome)
    }
}

/// What an accepted move changed, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// Owner the target sub-board acquired with this move.
    pub board_settled: Option<Outcome>,
    /// Game result reached with this move.
    pub game_settled: Option<Outcome>,
}

/// Full game state for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    boards: [SubBoard; BOARD_SIZE],
    current_player: Mark,
    next_board: NextBoard,
    winner: Option<Outcome>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            boards: Default::default(),
            current_player: Mark::X,
            next_board: NextBoard::Any,
            winner: None,
        }
    }
}

impl GameState {
    /// Fresh game: every board open, X to move, no constraint.
    pub fn new() -> Self {
        Self::default()
    }

    /// The nine sub-boards in meta-board order.
    pub fn boards(&self) -> &[SubBoard; BOARD_SIZE] {
        &self.boards
    }

    /// Symbol expected to move next.
    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    /// Where the next move must be played.
    pub fn next_board(&self) -> NextBoard {
        self.next_board
    }

    /// Final result, if any.
    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    /// True once no further move is accepted.
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Validate and apply a move by `mark`.
    ///
    /// Indices arrive as raw integers from the wire and are range-checked
    /// here, in the same order the rejections are reported to clients.
    pub fn apply_move(
        &mut self,
        mark: Mark,
        board_index: i64,
        cell_index: i64,
    ) -> Result<MoveReport, MoveError> {
        if self.winner.is_some() {
            return Err(MoveError::GameOver);
        }
        if mark != self.current_player {
            return Err(MoveError::NotYourTurn);
        }
        let board = checked_index(board_index).ok_or(MoveError::BoardOutOfRange(board_index))?;
        if let NextBoard::Board(forced) = self.next_board {
            if forced != board {
                return Err(MoveError::WrongBoard(forced));
            }
        }
        if self.boards[board].is_decided() {
            return Err(MoveError::BoardDecided(board));
        }
        let cell = checked_index(cell_index).ok_or(MoveError::CellOutOfRange(cell_index))?;
        if self.boards[board].cells[cell].is_some() {
            return Err(MoveError::CellTaken { board, cell });
        }

        let board_settled = self.boards[board].place(cell, mark);
        let game_settled = self.settle_game();
        if game_settled.is_some() {
            self.winner = game_settled;
        }

        let target = &self.boards[cell];
        self.next_board = if target.is_decided() || target.is_full() {
            NextBoard::Any
        } else {
            NextBoard::Board(cell)
        };

        // Toggled even on the final move; the winner gate blocks further play.
        self.current_player = self.current_player.opponent();

        Ok(MoveReport {
            board_settled,
            game_settled,
        })
    }

    /// Meta-level result computed from the sub-board owners.
    fn settle_game(&self) -> Option<Outcome> {
        let owners = self.boards.each_ref().map(|board| board.owner.and_then(Outcome::mark));
        match evaluate_lines(&owners) {
            Some(Outcome::Won(mark)) => Some(Outcome::Won(mark)),
            _ if self.boards.iter().all(SubBoard::is_decided) => Some(Outcome::Drawn),
            _ => None,
        }
    }
}

fn checked_index(index: i64) -> Option<usize> {
    usize::try_from(index).ok().filter(|index| *index < BOARD_SIZE)
}


#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn play(game: &mut GameState, board: i64, cell: i64) -> MoveReport {
        let mark = game.current_player();
        game.apply_move(mark, board, cell)
            .unwrap_or_else(|err| panic!("move ({board}, {cell}) rejected: {err}"))
    }

    /// Play the moves in order, alternating symbols starting from the current player.
    fn play_all(game: &mut GameState, moves: &[(i64, i64)]) {
        for &(board, cell) in moves {
            play(game, board, cell);
        }
    }

    #[test]
    fn evaluate_lines_detects_rows_columns_and_diagonals() {
        for line in LINES {
            let mut squares = [None; BOARD_SIZE];
            for index in line {
                squares[index] = Some(Mark::O);
            }
            assert_eq!(evaluate_lines(&squares), Some(Outcome::Won(Mark::O)));
        }
    }

    #[test]
    fn evaluate_lines_reports_full_grid_without_line_as_draw() {
        use Mark::{O, X};
        let squares = [
            Some(X),
            Some(O),
            Some(X),
            Some(X),
            Some(O),
            Some(O),
            Some(O),
            Some(X),
            Some(X),
        ];
        assert_eq!(evaluate_lines(&squares), Some(Outcome::Drawn));
        assert_eq!(evaluate_lines(&[None; BOARD_SIZE]), None);
    }

    #[test]
    fn new_game_starts_open_with_x_to_move() {
        let game = GameState::new();
        assert_eq!(game.current_player(), Mark::X);
        assert_eq!(game.next_board(), NextBoard::Any);
        assert_eq!(game.winner(), None);
        assert!(game.boards().iter().all(|board| !board.is_decided()));
    }

    #[test]
    fn cell_position_selects_next_board() {
        let mut game = GameState::new();
        play(&mut game, 4, 0);
        assert_eq!(game.next_board(), NextBoard::Board(0));
        assert_eq!(game.current_player(), Mark::O);
        assert_eq!(game.next_board().as_wire(), 0);
    }

    #[test]
    fn forced_board_is_enforced() {
        let mut game = GameState::new();
        play(&mut game, 4, 0);
        let err = game.apply_move(Mark::O, 5, 0).unwrap_err();
        assert_eq!(err, MoveError::WrongBoard(0));
        assert_eq!(game.current_player(), Mark::O);
    }

    #[test]
    fn rejections_leave_state_untouched() {
        let mut game = GameState::new();
        play(&mut game, 4, 4);
        let before = game.clone();

        assert_eq!(game.apply_move(Mark::X, 4, 0), Err(MoveError::NotYourTurn));
        assert_eq!(
            game.apply_move(Mark::O, 4, 4),
            Err(MoveError::CellTaken { board: 4, cell: 4 })
        );
        assert_eq!(game.apply_move(Mark::O, 9, 0), Err(MoveError::BoardOutOfRange(9)));
        assert_eq!(game.apply_move(Mark::O, -1, 0), Err(MoveError::BoardOutOfRange(-1)));
        assert_eq!(game.apply_move(Mark::O, 4, 12), Err(MoveError::CellOutOfRange(12)));
        assert_eq!(game, before);
    }

    /// X takes board 4 along the 0-4-8 diagonal while O holds cell 3.
    const DIAGONAL_ON_BOARD_FOUR: [(i64, i64); 7] =
        [(4, 0), (0, 4), (4, 4), (4, 3), (3, 2), (2, 4), (4, 8)];

    #[test]
    fn sub_board_win_sets_owner_and_fills_empty_cells() {
        let mut game = GameState::new();
        let (last, opening) = DIAGONAL_ON_BOARD_FOUR.split_last().unwrap();
        play_all(&mut game, opening);
        assert!(!game.boards()[4].is_decided());

        let report = play(&mut game, last.0, last.1);

        assert_eq!(report.board_settled, Some(Outcome::Won(Mark::X)));
        assert_eq!(report.game_settled, None);
        let board = &game.boards()[4];
        assert_eq!(board.owner(), Some(Outcome::Won(Mark::X)));
        assert_eq!(board.cells()[3], Some(Mark::O));
        assert_eq!(board.cells()[1], Some(Mark::X));
        assert_eq!(board.cells()[7], Some(Mark::X));
        assert!(board.is_full());
        assert_eq!(game.next_board(), NextBoard::Board(8));
    }

    #[test]
    fn decided_board_cannot_be_targeted_and_frees_the_constraint() {
        let mut game = GameState::new();
        play_all(&mut game, &DIAGONAL_ON_BOARD_FOUR);
        // O is forced to board 8; its cell 4 points at the decided board.
        play(&mut game, 8, 4);
        assert_eq!(game.next_board(), NextBoard::Any);
        assert_eq!(
            game.apply_move(Mark::X, 4, 2),
            Err(MoveError::BoardDecided(4))
        );
    }

    #[test]
    fn meta_line_decides_the_game_and_blocks_further_moves() {
        // Build the position directly: X owns boards 0 and 1, board 2 needs one move.
        let mut game = GameState::new();
        for board in [0, 1] {
            game.boards[board].owner = Some(Outcome::Won(Mark::X));
        }
        game.boards[2].cells[0] = Some(Mark::X);
        game.boards[2].cells[1] = Some(Mark::X);
        game.boards[2].cells[4] = Some(Mark::O);
        game.next_board = NextBoard::Board(2);

        let report = play(&mut game, 2, 2);

        assert_eq!(report.board_settled, Some(Outcome::Won(Mark::X)));
        assert_eq!(report.game_settled, Some(Outcome::Won(Mark::X)));
        assert_eq!(game.winner(), Some(Outcome::Won(Mark::X)));
        // Turn still toggles on the final move.
        assert_eq!(game.current_player(), Mark::O);
        assert_eq!(game.apply_move(Mark::O, 3, 3), Err(MoveError::GameOver));
    }

    #[test]
    fn full_game_ends_with_meta_row() {
        let mut game = GameState::new();
        let (last, opening) = fixtures::X_WINS_TOP_ROW.split_last().unwrap();
        play_all(&mut game, opening);
        assert_eq!(game.winner(), None);
        assert_eq!(game.next_board(), NextBoard::Board(2));

        let report = play(&mut game, last.0, last.1);

        assert_eq!(report.game_settled, Some(Outcome::Won(Mark::X)));
        assert_eq!(game.boards()[2].cells()[4], Some(Mark::O));
        assert!(game.boards()[2].is_full());
        assert_eq!(game.next_board(), NextBoard::Any);
        assert_eq!(game.apply_move(Mark::O, 7, 0), Err(MoveError::GameOver));
    }

    #[test]
    fn meta_board_without_line_after_all_boards_decided_is_a_draw() {
        use Mark::{O, X};
        let mut game = GameState::new();
        let owners = [
            Outcome::Won(X),
            Outcome::Won(O),
            Outcome::Won(X),
            Outcome::Won(X),
            Outcome::Won(O),
            Outcome::Drawn,
            Outcome::Won(O),
            Outcome::Won(X),
        ];
        for (board, owner) in owners.into_iter().enumerate() {
            game.boards[board].owner = Some(owner);
        }
        game.boards[8].cells = [Some(X), Some(O), Some(X), Some(X), Some(O), Some(O), Some(O), Some(X), None];
        game.next_board = NextBoard::Board(8);

        let report = play(&mut game, 8, 8);

        assert_eq!(report.board_settled, Some(Outcome::Drawn));
        assert_eq!(report.game_settled, Some(Outcome::Drawn));
        assert_eq!(game.next_board(), NextBoard::Any);
        assert_eq!(game.apply_move(Mark::O, 0, 0), Err(MoveError::GameOver));
    }

    /// Drive random legal and illegal moves and check the state invariants after each step.
    #[test]
    fn random_play_preserves_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..50 {
            let mut game = GameState::new();
            for _ in 0..400 {
                if game.is_over() {
                    break;
                }
                let before = game.clone();
                let mark = if rng.random_bool(0.9) {
                    game.current_player()
                } else {
                    game.current_player().opponent()
                };
                let board = rng.random_range(-1..10);
                let cell = rng.random_range(-1..10);

                match game.apply_move(mark, board, cell) {
                    Ok(_) => {
                        assert_eq!(game.current_player(), before.current_player().opponent());
                    }
                    Err(_) => {
                        assert_eq!(game, before);
                        continue;
                    }
                }

                for (old, new) in before.boards().iter().zip(game.boards()) {
                    // cells are write-once
                    for (old_cell, new_cell) in old.cells().iter().zip(new.cells()) {
                        if old_cell.is_some() {
                            assert_eq!(old_cell, new_cell);
                        }
                    }
                    // owners never revert or change
                    if old.owner().is_some() {
                        assert_eq!(old.owner(), new.owner());
                    }
                }

                if let NextBoard::Board(index) = game.next_board() {
                    assert!(!game.boards()[index].is_decided());
                }
            }
        }
    }

    #[test]
    fn outcome_serializes_as_wire_token() {
        assert_eq!(serde_json::to_string(&Outcome::Won(Mark::O)).unwrap(), "\"O\"");
        assert_eq!(serde_json::to_string(&Outcome::Drawn).unwrap(), "\"DRAW\"");
    }
}
