use crate::board::Piece;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid square `{0}`")]
    InvalidSquare(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid move notation `{0}`")]
    InvalidNotation(String),

    #[error("illegal move `{0}`")]
    IllegalMove(String),

    #[error("cannot promote to {0:?}")]
    InvalidPromotion(Piece),
}

pub type Result<T> = std::result::Result<T, ChessError>;
