use crate::board::{Color, Piece, Square};
use crate::game::GameState;

// Scores are in tenths of a pawn: one positional point is worth 0.1 pawn.

/// Larger than any material plus positional total.
pub const CHECKMATE: i32 = 10_000;
pub const STALEMATE: i32 = 0;

#[derive(Debug, Clone)]
pub struct Evaluator {
    // Piece values
    pub pawn_value: i32,
    pub knight_value: i32,
    pub bishop_value: i32,
    pub rook_value: i32,
    pub queen_value: i32,
    pub king_value: i32,

    // Positional bonuses, row 0 = rank 8. Pawns are read from white's side
    // and mirrored for black.
    pub pawn_position_bonus: [[i32; 8]; 8],
    pub knight_position_bonus: [[i32; 8]; 8],
    pub bishop_position_bonus: [[i32; 8]; 8],
    pub rook_position_bonus: [[i32; 8]; 8],
    pub queen_position_bonus: [[i32; 8]; 8],
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            pawn_value: 10,
            knight_value: 30,
            bishop_value: 30,
            rook_value: 50,
            queen_value: 100,
            king_value: 0,

            // Pawns gain as they advance, most in the centre
            pawn_position_bonus: [
                [9, 9, 9, 9, 9, 9, 9, 9],
                [8, 8, 8, 8, 8, 8, 8, 8],
                [5, 6, 6, 7, 7, 6, 6, 5],
                [2, 3, 3, 5, 5, 3, 3, 2],
                [1, 2, 3, 4, 4, 3, 2, 1],
                [1, 1, 2, 3, 3, 2, 1, 1],
                [1, 1, 1, 0, 0, 1, 1, 1],
                [0, 0, 0, 0, 0, 0, 0, 0],
            ],

            knight_position_bonus: [
                [1, 1, 1, 1, 1, 1, 1, 1],
                [1, 2, 2, 2, 2, 2, 2, 1],
                [1, 2, 3, 3, 3, 3, 2, 1],
                [1, 2, 3, 4, 4, 3, 2, 1],
                [1, 2, 3, 4, 4, 3, 2, 1],
                [1, 2, 3, 3, 3, 3, 2, 1],
                [1, 2, 2, 2, 2, 2, 2, 1],
                [1, 1, 1, 1, 1, 1, 1, 1],
            ],

            // Long diagonals
            bishop_position_bonus: [
                [4, 3, 2, 1, 1, 2, 3, 4],
                [3, 4, 3, 2, 2, 3, 4, 3],
                [2, 3, 4, 3, 3, 4, 3, 2],
                [1, 2, 3, 4, 4, 3, 2, 1],
                [1, 2, 3, 4, 4, 3, 2, 1],
                [2, 3, 4, 3, 3, 4, 3, 2],
                [3, 4, 3, 2, 2, 3, 4, 3],
                [4, 3, 2, 1, 1, 2, 3, 4],
            ],

            // Back ranks and seventh ranks
            rook_position_bonus: [
                [4, 3, 4, 4, 4, 4, 3, 4],
                [4, 4, 4, 4, 4, 4, 4, 4],
                [1, 1, 2, 3, 3, 2, 1, 1],
                [1, 2, 3, 4, 4, 3, 2, 1],
                [1, 2, 3, 4, 4, 3, 2, 1],
                [1, 1, 2, 3, 3, 2, 1, 1],
                [4, 4, 4, 4, 4, 4, 4, 4],
                [4, 3, 4, 4, 4, 4, 3, 4],
            ],

            queen_position_bonus: [
                [1, 1, 1, 1, 1, 1, 1, 1],
                [1, 2, 3, 3, 3, 1, 1, 1],
                [1, 4, 3, 3, 3, 4, 2, 1],
                [1, 2, 3, 3, 3, 2, 2, 1],
                [1, 2, 3, 3, 3, 2, 2, 1],
                [1, 4, 3, 3, 3, 4, 2, 1],
                [1, 2, 3, 3, 3, 1, 1, 1],
                [1, 1, 1, 1, 1, 1, 1, 1],
            ],
        }
    }

    /// Static score from white's point of view. Relies on the terminal flags
    /// computed by the most recent `legal_moves` call.
    pub fn evaluate(&self, state: &GameState) -> i32 {
        if state.is_checkmate() {
            // The side to move has been mated.
            return -state.side_to_move().sign() * CHECKMATE;
        }
        if state.is_stalemate() {
            return STALEMATE;
        }

        state
            .board()
            .pieces()
            .map(|(square, color, piece)| color.sign() * self.get_piece_value(piece, color, square))
            .sum()
    }

    fn get_piece_value(&self, piece: Piece, color: Color, square: Square) -> i32 {
        let (row, col) = (square.row, square.col);
        let base_value = match piece {
            Piece::Pawn => self.pawn_value,
            Piece::Knight => self.knight_value,
            Piece::Bishop => self.bishop_value,
            Piece::Rook => self.rook_value,
            Piece::Queen => self.queen_value,
            Piece::King => self.king_value,
        };

        let position_bonus = match piece {
            Piece::Pawn => match color {
                Color::White => self.pawn_position_bonus[row][col],
                Color::Black => self.pawn_position_bonus[7 - row][col],
            },
            Piece::Knight => self.knight_position_bonus[row][col],
            Piece::Bishop => self.bishop_position_bonus[row][col],
            Piece::Rook => self.rook_position_bonus[row][col],
            Piece::Queen => self.queen_position_bonus[row][col],
            Piece::King => 0,
        };

        base_value + position_bonus
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_position_is_balanced() {
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate(&GameState::new()), 0);
    }

    #[test]
    fn test_material_and_position() {
        let evaluator = Evaluator::new();
        // Lone white knight on d4: 3 pawns + 0.4 positional.
        let state = GameState::from_fen("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&state), 34);

        // Black pawn on e5 is worth the same as a white pawn on e4.
        let state = GameState::from_fen("4k3/8/8/4p3/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(evaluator.evaluate(&state), 0);
    }

    #[test]
    fn test_terminal_scores() {
        let evaluator = Evaluator::new();
        let mut mated = GameState::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        mated.legal_moves();
        assert_eq!(evaluator.evaluate(&mated), CHECKMATE);

        let mut stuck = GameState::from_fen("7k/8/6Q1/8/8/8/8/K7 b - - 0 1").unwrap();
        stuck.legal_moves();
        assert_eq!(evaluator.evaluate(&stuck), STALEMATE);
    }

    #[test]
    fn test_checkmate_outweighs_material() {
        let evaluator = Evaluator::new();
        let queens = GameState::from_fen("4k3/8/8/8/8/8/PPPPPPPP/QQQQKQQQ w - - 0 1").unwrap();
        assert!(evaluator.evaluate(&queens) < CHECKMATE);
    }
}
