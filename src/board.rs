use std::fmt;
use std::str::FromStr;

use crate::error::{ChessError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// Kinds a pawn may become on the far rank.
    pub fn is_promotion_target(self) -> bool {
        !matches!(self, Piece::Pawn | Piece::King)
    }

    /// Lowercase letter used in FEN and move notation.
    pub fn letter(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    pub fn from_letter(letter: char) -> Option<Piece> {
        match letter.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn advance. White moves towards row 0.
    pub fn pawn_direction(&self) -> isize {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn pawn_start_row(&self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_row(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn back_rank(&self) -> usize {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// +1 for white, -1 for black; scores are from white's point of view.
    pub fn sign(&self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Occupant {
    #[default]
    Empty,
    Piece(Color, Piece),
}

impl Occupant {
    pub fn is_empty(&self) -> bool {
        matches!(self, Occupant::Empty)
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Occupant::Piece(color, _) => Some(*color),
            Occupant::Empty => None,
        }
    }

    pub fn piece(&self) -> Option<Piece> {
        match self {
            Occupant::Piece(_, piece) => Some(*piece),
            Occupant::Empty => None,
        }
    }

    pub fn is_color(&self, color: Color) -> bool {
        self.color() == Some(color)
    }

    pub fn is(&self, color: Color, piece: Piece) -> bool {
        *self == Occupant::Piece(color, piece)
    }

    /// FEN letter: uppercase for white, lowercase for black, '.' when empty.
    pub fn symbol(&self) -> char {
        match self {
            Occupant::Piece(Color::White, piece) => piece.letter().to_ascii_uppercase(),
            Occupant::Piece(Color::Black, piece) => piece.letter(),
            Occupant::Empty => '.',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Occupant> {
        let piece = Piece::from_letter(symbol)?;
        let color = if symbol.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Occupant::Piece(color, piece))
    }
}

/// Board coordinate. Row 0 is black's back rank (rank 8), column 0 is file a.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, d_row: isize, d_col: isize) -> Option<Square> {
        let row = self.row as isize + d_row;
        let col = self.col as isize + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square::new(row as usize, col as usize))
        } else {
            None
        }
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.col as u8) as char
    }

    pub fn rank_char(&self) -> char {
        (b'8' - self.row as u8) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let (file, rank) = (bytes[0], bytes[1]);
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        Ok(Square::new((b'8' - rank) as usize, (file - b'a') as usize))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_king_side: true,
        white_queen_side: true,
        black_king_side: true,
        black_queen_side: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_king_side: false,
        white_queen_side: false,
        black_king_side: false,
        black_queen_side: false,
    };

    pub fn king_side(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_side,
            Color::Black => self.black_king_side,
        }
    }

    pub fn queen_side(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queen_side,
            Color::Black => self.black_queen_side,
        }
    }

    pub fn revoke_all(&mut self, color: Color) {
        self.revoke_king_side(color);
        self.revoke_queen_side(color);
    }

    pub fn revoke_king_side(&mut self, color: Color) {
        match color {
            Color::White => self.white_king_side = false,
            Color::Black => self.black_king_side = false,
        }
    }

    pub fn revoke_queen_side(&mut self, color: Color) {
        match color {
            Color::White => self.white_queen_side = false,
            Color::Black => self.black_queen_side = false,
        }
    }

    /// Clears whichever right depends on a rook standing on `square`.
    pub fn revoke_rook_home(&mut self, square: Square) {
        for color in [Color::White, Color::Black] {
            if square.row != color.back_rank() {
                continue;
            }
            match square.col {
                0 => self.revoke_queen_side(color),
                7 => self.revoke_king_side(color),
                _ => {}
            }
        }
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        CastlingRights::ALL
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let flags = [
            (self.white_king_side, 'K'),
            (self.white_queen_side, 'Q'),
            (self.black_king_side, 'k'),
            (self.black_queen_side, 'q'),
        ];
        let text: String = flags.iter().filter(|(set, _)| *set).map(|(_, c)| *c).collect();
        if text.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", text)
        }
    }
}

impl FromStr for CastlingRights {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self> {
        let mut rights = CastlingRights::NONE;
        if s == "-" {
            return Ok(rights);
        }
        for c in s.chars() {
            match c {
                'K' => rights.white_king_side = true,
                'Q' => rights.white_queen_side = true,
                'k' => rights.black_king_side = true,
                'q' => rights.black_queen_side = true,
                _ => return Err(ChessError::InvalidFen(format!("bad castling field `{}`", s))),
            }
        }
        Ok(rights)
    }
}

const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Occupant; 8]; 8],
}

impl Board {
    /// Standard starting position.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for col in 0..8 {
            board.squares[0][col] = Occupant::Piece(Color::Black, BACK_RANK[col]);
            board.squares[1][col] = Occupant::Piece(Color::Black, Piece::Pawn);
            board.squares[6][col] = Occupant::Piece(Color::White, Piece::Pawn);
            board.squares[7][col] = Occupant::Piece(Color::White, BACK_RANK[col]);
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            squares: [[Occupant::Empty; 8]; 8],
        }
    }

    /// Panics when `square` lies off the board.
    pub fn get(&self, square: Square) -> Occupant {
        self.squares[square.row][square.col]
    }

    pub fn set(&mut self, square: Square, occupant: Occupant) {
        self.squares[square.row][square.col] = occupant;
    }

    /// Empties `square` and returns what stood there.
    pub fn take(&mut self, square: Square) -> Occupant {
        std::mem::take(&mut self.squares[square.row][square.col])
    }

    /// Occupied squares in row-major scan order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Color, Piece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, occupant)| match occupant {
                Occupant::Piece(color, piece) => Some((Square::new(row, col), *color, *piece)),
                Occupant::Empty => None,
            })
        })
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|&(_, c, piece)| c == color && piece == Piece::King)
            .map(|(square, _, _)| square)
    }

    /// Parses the piece-placement field of a FEN record.
    pub fn from_fen_placement(placement: &str) -> Result<Self> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, found {}",
                ranks.len()
            )));
        }

        let mut board = Board::empty();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else {
                    let occupant = Occupant::from_symbol(c).ok_or_else(|| {
                        ChessError::InvalidFen(format!("unknown piece `{}`", c))
                    })?;
                    if col >= 8 {
                        return Err(ChessError::InvalidFen(format!("rank `{}` is too wide", rank)));
                    }
                    board.squares[row][col] = occupant;
                    col += 1;
                }
            }
            if col != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank `{}` covers {} files",
                    rank, col
                )));
            }
        }
        Ok(board)
    }

    pub fn fen_placement(&self) -> String {
        let mut fen = String::new();
        for (row, cells) in self.squares.iter().enumerate() {
            let mut empty = 0;
            for occupant in cells {
                if occupant.is_empty() {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    fen.push_str(&empty.to_string());
                    empty = 0;
                }
                fen.push(occupant.symbol());
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if row < 7 {
                fen.push('/');
            }
        }
        fen
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (row, cells) in self.squares.iter().enumerate() {
            write!(f, "{} ", 8 - row)?;
            for (col, occupant) in cells.iter().enumerate() {
                write!(f, "{}", occupant.symbol())?;
                if col < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_notation() {
        let e2: Square = "e2".parse().unwrap();
        assert_eq!(e2, Square::new(6, 4));
        assert_eq!(Square::new(0, 0).to_string(), "a8");
        assert_eq!(Square::new(7, 7).to_string(), "h1");
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
    }

    #[test]
    fn test_offset_stays_on_board() {
        let corner = Square::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(0, -1), None);
        assert_eq!(corner.offset(1, 2), Some(Square::new(1, 2)));
        assert_eq!(Square::new(7, 7).offset(1, 0), None);
    }

    #[test]
    fn test_starting_layout() {
        let board = Board::new();
        assert_eq!(board.get(Square::new(7, 4)), Occupant::Piece(Color::White, Piece::King));
        assert_eq!(board.get(Square::new(0, 3)), Occupant::Piece(Color::Black, Piece::Queen));
        assert_eq!(board.find_king(Color::Black), Some(Square::new(0, 4)));
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(
            board.fen_placement(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_access_panics() {
        let board = Board::new();
        board.get(Square::new(8, 0));
    }

    #[test]
    fn test_placement_rejects_bad_input() {
        assert!(Board::from_fen_placement("8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen_placement("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen_placement("7x/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen_placement("pppppppp1/8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn test_castling_rights_text() {
        assert_eq!(CastlingRights::ALL.to_string(), "KQkq");
        assert_eq!(CastlingRights::NONE.to_string(), "-");
        let rights: CastlingRights = "Kq".parse().unwrap();
        assert!(rights.king_side(Color::White));
        assert!(!rights.queen_side(Color::White));
        assert!(rights.queen_side(Color::Black));
        assert!("KX".parse::<CastlingRights>().is_err());
    }

    #[test]
    fn test_revoke_rook_home() {
        let mut rights = CastlingRights::ALL;
        rights.revoke_rook_home(Square::new(7, 7));
        assert!(!rights.white_king_side);
        rights.revoke_rook_home(Square::new(0, 0));
        assert!(!rights.black_queen_side);
        rights.revoke_rook_home(Square::new(4, 0));
        assert!(rights.white_queen_side && rights.black_king_side);
    }
}
