use std::ops::{Deref, DerefMut};

use tracing::{debug, trace};

use crate::board::{Board, CastlingRights, Color, Occupant, Piece, Square};
use crate::error::{ChessError, Result};
use crate::movegen::{Move, MoveGenerator};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate(Color), // Color is the winner
    Stalemate,
}

/// The authoritative game record. Only `apply` and `undo` mutate it.
///
/// `checkmate` and `stalemate` are only meaningful right after
/// [`GameState::legal_moves`]; any apply or undo makes them stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    side_to_move: Color,
    move_log: Vec<Move>,
    white_king: Square,
    black_king: Square,
    castling_rights: CastlingRights,
    // One entry per ply plus the starting rights; the top is always current.
    castling_log: Vec<CastlingRights>,
    en_passant: Option<Square>,
    en_passant_log: Vec<Option<Square>>,
    checkmate: bool,
    stalemate: bool,
    first_mover: Color,
    initial_halfmove_clock: u32,
    initial_fullmove_number: u32,
    generator: MoveGenerator,
}

impl GameState {
    pub fn new() -> Self {
        Self::from_parts(
            Board::new(),
            (Square::new(7, 4), Square::new(0, 4)),
            Color::White,
            CastlingRights::ALL,
            None,
            (0, 1),
        )
    }

    fn locate_kings(board: &Board) -> Result<(Square, Square)> {
        let kings = |color: Color| -> Vec<Square> {
            board
                .pieces()
                .filter(|&(_, c, piece)| c == color && piece == Piece::King)
                .map(|(square, _, _)| square)
                .collect()
        };
        match (kings(Color::White).as_slice(), kings(Color::Black).as_slice()) {
            (&[white], &[black]) => Ok((white, black)),
            _ => Err(ChessError::InvalidFen(
                "each side needs exactly one king".to_string(),
            )),
        }
    }

    fn from_parts(
        board: Board,
        (white_king, black_king): (Square, Square),
        side_to_move: Color,
        castling_rights: CastlingRights,
        en_passant: Option<Square>,
        (halfmove_clock, fullmove_number): (u32, u32),
    ) -> Self {
        Self {
            white_king,
            black_king,
            board,
            side_to_move,
            move_log: Vec::new(),
            castling_rights,
            castling_log: vec![castling_rights],
            en_passant,
            en_passant_log: vec![en_passant],
            checkmate: false,
            stalemate: false,
            first_mover: side_to_move,
            initial_halfmove_clock: halfmove_clock,
            initial_fullmove_number: fullmove_number,
            generator: MoveGenerator::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 && fields.len() != 4 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, found {}",
                fields.len()
            )));
        }

        let board = Board::from_fen_placement(fields[0])?;
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(ChessError::InvalidFen(format!("bad side to move `{}`", other))),
        };
        let castling_rights: CastlingRights = fields[2].parse()?;
        let en_passant = match fields[3] {
            "-" => None,
            text => Some(
                text.parse::<Square>()
                    .map_err(|_| ChessError::InvalidFen(format!("bad en passant square `{}`", text)))?,
            ),
        };
        let counter = |index: usize, default: u32| -> Result<u32> {
            match fields.get(index) {
                Some(text) => text
                    .parse()
                    .map_err(|_| ChessError::InvalidFen(format!("bad move counter `{}`", text))),
                None => Ok(default),
            }
        };
        let halfmove_clock = counter(4, 0)?;
        let fullmove_number = counter(5, 1)?;

        let kings = Self::locate_kings(&board)?;
        Ok(Self::from_parts(
            board,
            kings,
            side_to_move,
            castling_rights,
            en_passant,
            (halfmove_clock, fullmove_number),
        ))
    }

    pub fn to_fen(&self) -> String {
        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let en_passant = self
            .en_passant
            .map(|square| square.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {} {} {}",
            self.board.fen_placement(),
            side,
            self.castling_rights,
            en_passant,
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }

    /// Plies since the last pawn move or capture.
    pub fn halfmove_clock(&self) -> u32 {
        let quiet = self
            .move_log
            .iter()
            .rev()
            .take_while(|mv| mv.piece != Piece::Pawn && !mv.is_capture())
            .count() as u32;
        if quiet as usize == self.move_log.len() {
            self.initial_halfmove_clock + quiet
        } else {
            quiet
        }
    }

    pub fn fullmove_number(&self) -> u32 {
        let offset = match self.first_mover {
            Color::White => 0,
            Color::Black => 1,
        };
        self.initial_fullmove_number + (self.move_log.len() as u32 + offset) / 2
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn white_to_move(&self) -> bool {
        self.side_to_move == Color::White
    }

    pub fn move_log(&self) -> &[Move] {
        &self.move_log
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.move_log.last()
    }

    pub fn king_square(&self, color: Color) -> Square {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    pub fn status(&self) -> GameStatus {
        if self.checkmate {
            GameStatus::Checkmate(self.side_to_move.opposite())
        } else if self.stalemate {
            GameStatus::Stalemate
        } else {
            GameStatus::Ongoing
        }
    }

    /// Plays `mv`, which must come from the latest [`GameState::legal_moves`].
    /// A promoting pawn becomes `promotion`, or a queen when none is given.
    pub fn apply(&mut self, mv: &Move, promotion: Option<Piece>) {
        trace!(mv = %mv, "apply");
        self.make(mv, promotion);
    }

    /// Takes back the last move; does nothing when no move has been played.
    pub fn undo(&mut self) {
        if let Some(mv) = self.unmake() {
            trace!(mv = %mv, "undo");
        }
    }

    fn make(&mut self, mv: &Move, promotion: Option<Piece>) {
        let color = mv.color;

        self.board.take(mv.from);
        let placed = if mv.is_promotion {
            promotion
                .filter(|piece| piece.is_promotion_target())
                .unwrap_or(Piece::Queen)
        } else {
            mv.piece
        };
        self.board.set(mv.to, Occupant::Piece(color, placed));

        if mv.is_en_passant {
            self.board.take(mv.capture_square());
        }
        if let Some((rook_from, rook_to)) = mv.castle_rook_squares() {
            let rook = self.board.take(rook_from);
            self.board.set(rook_to, rook);
        }

        if mv.piece == Piece::King {
            match color {
                Color::White => self.white_king = mv.to,
                Color::Black => self.black_king = mv.to,
            }
            self.castling_rights.revoke_all(color);
        }
        // A rook leaving home, or anything landing on a rook's home square.
        self.castling_rights.revoke_rook_home(mv.from);
        self.castling_rights.revoke_rook_home(mv.to);

        self.en_passant = if mv.is_double_pawn_advance() {
            Some(Square::new((mv.from.row + mv.to.row) / 2, mv.from.col))
        } else {
            None
        };

        self.move_log.push(*mv);
        self.castling_log.push(self.castling_rights);
        self.en_passant_log.push(self.en_passant);
        self.side_to_move = self.side_to_move.opposite();
    }

    fn unmake(&mut self) -> Option<Move> {
        let mv = self.move_log.pop()?;

        self.board.set(mv.from, mv.piece_moved());
        if mv.is_en_passant {
            self.board.take(mv.to);
            self.board.set(mv.capture_square(), mv.piece_captured());
        } else {
            self.board.set(mv.to, mv.piece_captured());
        }
        if let Some((rook_from, rook_to)) = mv.castle_rook_squares() {
            let rook = self.board.take(rook_to);
            self.board.set(rook_from, rook);
        }

        if mv.piece == Piece::King {
            match mv.color {
                Color::White => self.white_king = mv.from,
                Color::Black => self.black_king = mv.from,
            }
        }

        self.castling_log.pop();
        self.en_passant_log.pop();
        if let Some(rights) = self.castling_log.last() {
            self.castling_rights = *rights;
        }
        if let Some(target) = self.en_passant_log.last() {
            self.en_passant = *target;
        }

        self.side_to_move = self.side_to_move.opposite();
        self.checkmate = false;
        self.stalemate = false;
        Some(mv)
    }

    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        self.generator
            .generate_pseudo_legal(&self.board, self.side_to_move, self.en_passant)
    }

    /// Legal moves for the side to move. Also refreshes the checkmate and
    /// stalemate flags.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let mover = self.side_to_move;
        let moves = {
            let mut snapshot = Snapshot::take(self);
            let mut moves = snapshot.pseudo_legal_moves();
            moves.extend(snapshot.castle_moves());
            moves.retain(|mv| {
                snapshot.make(mv, None);
                let safe = !snapshot.is_king_attacked(mover);
                snapshot.unmake();
                safe
            });
            moves
        };

        if moves.is_empty() {
            if self.in_check() {
                self.checkmate = true;
                debug!(winner = ?mover.opposite(), "checkmate");
            } else {
                self.stalemate = true;
                debug!(side = ?mover, "stalemate");
            }
        } else {
            self.checkmate = false;
            self.stalemate = false;
        }
        moves
    }

    fn castle_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        let color = self.side_to_move;
        let row = color.back_rank();
        let king_from = Square::new(row, 4);
        if self.king_square(color) != king_from || self.in_check() {
            return moves;
        }

        let rook_home = |col: usize| self.board.get(Square::new(row, col)).is(color, Piece::Rook);
        let empty = |cols: &[usize]| cols.iter().all(|&col| self.board.get(Square::new(row, col)).is_empty());
        let safe = |cols: &[usize]| cols.iter().all(|&col| !self.square_attacked(Square::new(row, col)));

        if self.castling_rights.king_side(color) && rook_home(7) && empty(&[5, 6]) && safe(&[5, 6]) {
            moves.push(Move::new_castle(king_from, Square::new(row, 6), color));
        }
        // b-file must be empty but may be attacked.
        if self.castling_rights.queen_side(color) && rook_home(0) && empty(&[1, 2, 3]) && safe(&[3, 2]) {
            moves.push(Move::new_castle(king_from, Square::new(row, 2), color));
        }
        moves
    }

    pub fn in_check(&self) -> bool {
        self.is_king_attacked(self.side_to_move)
    }

    /// Whether the opponent of the side to move attacks `square`.
    pub fn square_attacked(&self, square: Square) -> bool {
        self.generator
            .is_square_attacked(&self.board, square, self.side_to_move.opposite())
    }

    /// Whether the king of `color` stands attacked, whoever is to move.
    pub fn is_king_attacked(&self, color: Color) -> bool {
        self.generator
            .is_square_attacked(&self.board, self.king_square(color), color.opposite())
    }

    /// Resolves coordinate text such as "e2e4" or "e7e8n" against the
    /// current legal moves.
    pub fn parse_move(&mut self, text: &str) -> Result<(Move, Option<Piece>)> {
        if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
            return Err(ChessError::InvalidNotation(text.to_string()));
        }
        let from: Square = text[0..2].parse()?;
        let to: Square = text[2..4].parse()?;
        let promotion = match text[4..].chars().next() {
            Some(letter) => {
                let piece = Piece::from_letter(letter)
                    .ok_or_else(|| ChessError::InvalidNotation(text.to_string()))?;
                if !piece.is_promotion_target() {
                    return Err(ChessError::InvalidPromotion(piece));
                }
                Some(piece)
            }
            None => None,
        };

        let mv = self
            .legal_moves()
            .into_iter()
            .find(|mv| mv.from == from && mv.to == to)
            .ok_or_else(|| ChessError::IllegalMove(text.to_string()))?;
        if promotion.is_some() && !mv.is_promotion {
            return Err(ChessError::IllegalMove(text.to_string()));
        }
        Ok((mv, promotion))
    }

    /// Parses and plays a move in coordinate notation.
    pub fn play(&mut self, text: &str) -> Result<Move> {
        let (mv, promotion) = self.parse_move(text)?;
        self.apply(&mv, promotion);
        Ok(mv)
    }

    /// Counts the leaves of the legal move tree `depth` plies deep.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for mv in &moves {
            self.make(mv, None);
            nodes += self.perft(depth - 1);
            self.unmake();
        }
        nodes
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new()
    }
}

/// Holds the en passant target and castling rights across a simulation
/// pass and puts them back when dropped.
struct Snapshot<'a> {
    state: &'a mut GameState,
    en_passant: Option<Square>,
    castling_rights: CastlingRights,
}

impl<'a> Snapshot<'a> {
    fn take(state: &'a mut GameState) -> Self {
        let en_passant = state.en_passant;
        let castling_rights = state.castling_rights;
        Self {
            state,
            en_passant,
            castling_rights,
        }
    }
}

impl Deref for Snapshot<'_> {
    type Target = GameState;

    fn deref(&self) -> &GameState {
        self.state
    }
}

impl DerefMut for Snapshot<'_> {
    fn deref_mut(&mut self) -> &mut GameState {
        self.state
    }
}

impl Drop for Snapshot<'_> {
    fn drop(&mut self) {
        self.state.en_passant = self.en_passant;
        self.state.castling_rights = self.castling_rights;
    }
}
