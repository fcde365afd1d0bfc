//! Chess rules engine and search core.
//!
//! [`GameState`] owns the board and is changed only through
//! [`GameState::apply`] and [`GameState::undo`]. [`GameState::legal_moves`]
//! filters the generator's pseudo-legal moves by playing each one and
//! checking the mover's king, and refreshes the checkmate/stalemate flags.
//! [`search`] picks moves with a depth-bounded alpha-beta negamax.

pub mod board;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod movegen;
pub mod search;

pub use board::{Board, CastlingRights, Color, Occupant, Piece, Square};
pub use error::ChessError;
pub use game::{GameState, GameStatus};
pub use movegen::{Move, MoveGenerator};
pub use search::{choose_move, choose_random_move, spawn_search, Search, SearchConfig};

/// A game in the standard starting position.
pub fn new_game() -> GameState {
    GameState::new()
}
