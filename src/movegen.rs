use std::fmt;
use std::hash::{Hash, Hasher};

use crate::board::{Board, Color, Occupant, Piece, Square};

const ROOK_DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];
const BISHOP_DIRECTIONS: [(isize, isize); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];
const QUEEN_DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1), (1, -1), (1, 1), (-1, 1),
    (-1, 0), (0, -1), (1, 0), (0, 1),
];
const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (-2, -1), (-2, 1), (2, -1), (2, 1),
    (-1, 2), (1, 2), (-1, -2), (1, -2),
];
const KING_OFFSETS: [(isize, isize); 8] = [
    (-1, 0), (1, 0), (0, -1), (0, 1),
    (-1, -1), (-1, 1), (1, -1), (1, 1),
];

/// One ply, captured from the board as it stood before the move.
///
/// Equality only looks at the endpoints and the special-move flags; the
/// moved and captured pieces follow from those in any given position.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub color: Color,
    pub piece: Piece,
    pub captured_piece: Option<Piece>,
    pub is_promotion: bool,
    pub is_en_passant: bool,
    pub is_castle: bool,
}

impl Move {
    /// Snapshots whatever stands on `from` and `to`. Returns `None` when
    /// `from` is empty.
    pub fn from_board(board: &Board, from: Square, to: Square) -> Option<Self> {
        match board.get(from) {
            Occupant::Piece(color, piece) => Some(Self::new(board, from, to, color, piece)),
            Occupant::Empty => None,
        }
    }

    fn new(board: &Board, from: Square, to: Square, color: Color, piece: Piece) -> Self {
        Self {
            from,
            to,
            color,
            piece,
            captured_piece: board.get(to).piece(),
            is_promotion: piece == Piece::Pawn && to.row == color.promotion_row(),
            is_en_passant: false,
            is_castle: false,
        }
    }

    fn new_en_passant(from: Square, to: Square, color: Color) -> Self {
        Self {
            from,
            to,
            color,
            piece: Piece::Pawn,
            // The landing square is empty; the victim sits beside the mover.
            captured_piece: Some(Piece::Pawn),
            is_promotion: false,
            is_en_passant: true,
            is_castle: false,
        }
    }

    pub(crate) fn new_castle(from: Square, to: Square, color: Color) -> Self {
        Self {
            from,
            to,
            color,
            piece: Piece::King,
            captured_piece: None,
            is_promotion: false,
            is_en_passant: false,
            is_castle: true,
        }
    }

    /// Integer key combining both endpoints, e.g. e2e4 -> 6444.
    pub fn id(&self) -> u16 {
        (self.from.row * 1000 + self.from.col * 100 + self.to.row * 10 + self.to.col) as u16
    }

    pub fn piece_moved(&self) -> Occupant {
        Occupant::Piece(self.color, self.piece)
    }

    pub fn piece_captured(&self) -> Occupant {
        match self.captured_piece {
            Some(piece) => Occupant::Piece(self.color.opposite(), piece),
            None => Occupant::Empty,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }

    pub fn is_double_pawn_advance(&self) -> bool {
        self.piece == Piece::Pawn && self.from.row.abs_diff(self.to.row) == 2
    }

    /// Where the captured piece stood. Differs from `to` only for en passant.
    pub fn capture_square(&self) -> Square {
        if self.is_en_passant {
            Square::new(self.from.row, self.to.col)
        } else {
            self.to
        }
    }

    /// Rook relocation of a castle as (from, to).
    pub fn castle_rook_squares(&self) -> Option<(Square, Square)> {
        if !self.is_castle {
            return None;
        }
        let row = self.from.row;
        if self.to.col > self.from.col {
            Some((Square::new(row, 7), Square::new(row, 5)))
        } else {
            Some((Square::new(row, 0), Square::new(row, 3)))
        }
    }

    /// Coordinate text such as "e2e4".
    pub fn notation(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
            && self.is_promotion == other.is_promotion
            && self.is_en_passant == other.is_en_passant
            && self.is_castle == other.is_castle
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
        self.is_promotion.hash(state);
        self.is_en_passant.hash(state);
        self.is_castle.hash(state);
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Every move obeying piece movement rules for `side`, in board scan
    /// order. Castling is left to the game state, which knows the rights.
    pub fn generate_pseudo_legal(
        &self,
        board: &Board,
        side: Color,
        en_passant: Option<Square>,
    ) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);
        for (from, color, piece) in board.pieces() {
            if color != side {
                continue;
            }
            match piece {
                Piece::Pawn => self.pawn_moves(board, from, side, en_passant, &mut moves),
                Piece::Knight => self.step_moves(board, from, side, Piece::Knight, &KNIGHT_OFFSETS, &mut moves),
                Piece::Bishop => self.slide_moves(board, from, side, Piece::Bishop, &BISHOP_DIRECTIONS, &mut moves),
                Piece::Rook => self.slide_moves(board, from, side, Piece::Rook, &ROOK_DIRECTIONS, &mut moves),
                Piece::Queen => self.slide_moves(board, from, side, Piece::Queen, &QUEEN_DIRECTIONS, &mut moves),
                Piece::King => self.step_moves(board, from, side, Piece::King, &KING_OFFSETS, &mut moves),
            }
        }
        moves
    }

    fn pawn_moves(
        &self,
        board: &Board,
        from: Square,
        side: Color,
        en_passant: Option<Square>,
        moves: &mut Vec<Move>,
    ) {
        let dir = side.pawn_direction();

        // Advances
        if let Some(one) = from.offset(dir, 0) {
            if board.get(one).is_empty() {
                moves.push(Move::new(board, from, one, side, Piece::Pawn));
                if from.row == side.pawn_start_row() {
                    if let Some(two) = from.offset(2 * dir, 0) {
                        if board.get(two).is_empty() {
                            moves.push(Move::new(board, from, two, side, Piece::Pawn));
                        }
                    }
                }
            }
        }

        // Captures, left then right
        for d_col in [-1, 1] {
            let Some(to) = from.offset(dir, d_col) else {
                continue;
            };
            let target = board.get(to);
            if target.is_color(side.opposite()) {
                moves.push(Move::new(board, from, to, side, Piece::Pawn));
            } else if target.is_empty() && en_passant == Some(to) {
                let victim = Square::new(from.row, to.col);
                if board.get(victim).is(side.opposite(), Piece::Pawn) {
                    moves.push(Move::new_en_passant(from, to, side));
                }
            }
        }
    }

    fn slide_moves(
        &self,
        board: &Board,
        from: Square,
        side: Color,
        piece: Piece,
        directions: &[(isize, isize)],
        moves: &mut Vec<Move>,
    ) {
        for &(d_row, d_col) in directions {
            let mut current = from;
            while let Some(to) = current.offset(d_row, d_col) {
                let target = board.get(to);
                if target.is_color(side) {
                    break;
                }
                moves.push(Move::new(board, from, to, side, piece));
                if !target.is_empty() {
                    break;
                }
                current = to;
            }
        }
    }

    fn step_moves(
        &self,
        board: &Board,
        from: Square,
        side: Color,
        piece: Piece,
        offsets: &[(isize, isize)],
        moves: &mut Vec<Move>,
    ) {
        for &(d_row, d_col) in offsets {
            if let Some(to) = from.offset(d_row, d_col) {
                if !board.get(to).is_color(side) {
                    moves.push(Move::new(board, from, to, side, piece));
                }
            }
        }
    }

    /// Whether any piece of `attacker_color` attacks `square`.
    pub fn is_square_attacked(&self, board: &Board, square: Square, attacker_color: Color) -> bool {
        // Pawns attack one row ahead of themselves, so look one row behind.
        let back = -attacker_color.pawn_direction();
        for d_col in [-1, 1] {
            if let Some(from) = square.offset(back, d_col) {
                if board.get(from).is(attacker_color, Piece::Pawn) {
                    return true;
                }
            }
        }

        let hits = |offsets: &[(isize, isize)], piece: Piece| {
            offsets.iter().any(|&(d_row, d_col)| {
                square
                    .offset(d_row, d_col)
                    .is_some_and(|from| board.get(from).is(attacker_color, piece))
            })
        };
        if hits(&KNIGHT_OFFSETS, Piece::Knight) || hits(&KING_OFFSETS, Piece::King) {
            return true;
        }

        // Sliding attackers: the first piece met along each ray decides.
        let ray_hits = |directions: &[(isize, isize)], slider: Piece| {
            directions.iter().any(|&(d_row, d_col)| {
                let mut current = square;
                while let Some(next) = current.offset(d_row, d_col) {
                    match board.get(next) {
                        Occupant::Empty => current = next,
                        Occupant::Piece(color, piece) => {
                            return color == attacker_color
                                && (piece == slider || piece == Piece::Queen);
                        }
                    }
                }
                false
            })
        };
        ray_hits(&BISHOP_DIRECTIONS, Piece::Bishop) || ray_hits(&ROOK_DIRECTIONS, Piece::Rook)
    }
}
