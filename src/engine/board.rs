//! Mailbox chess position representation.
//!
//! `Board` stores piece placement as an 8×8 grid of optional pieces plus side
//! to move, castling rights, en-passant target, and the move clocks. It owns
//! FEN import/export and the raw relocation primitives; it performs no
//! legality checking of its own.
//!
//! A `Board` is a value: cloning one duplicates the whole grid, so mutating a
//! hypothetical successor position never touches the original. Move
//! generation leans on this copy-on-branch behavior heavily.

use std::fmt;

use crate::engine::piece::Piece;
use crate::engine::square::Square;
use crate::engine::types::{CastlingRights, ChessError, Color, PieceKind};

/// A complete chess position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    /// Piece grid, indexed `[rank - 1][file - 1]`.
    cells: [[Option<Piece>; 8]; 8],

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// The square passed over by the most recent double pawn push, if any.
    pub en_passant_target: Option<Square>,

    /// Half-move clock (reset on pawn moves and captures).
    pub halfmove_clock: u16,

    /// Full-move number (starts at 1, incremented after Black moves).
    pub fullmove_number: u16,
}

impl Board {
    /// FEN of the standard starting position.
    pub const STARTING_FEN: &'static str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// An empty board with no pieces.
    pub fn empty() -> Self {
        Board {
            cells: [[None; 8]; 8],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// The standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(Self::STARTING_FEN).expect("starting FEN is always valid")
    }

    // -----------------------------------------------------------------------
    // Cell access
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[(sq.rank() - 1) as usize][(sq.file() - 1) as usize]
    }

    /// Place a piece on the square it carries, overwriting any occupant.
    #[inline]
    pub fn put_piece(&mut self, piece: Piece) {
        let sq = piece.square;
        self.cells[(sq.rank() - 1) as usize][(sq.file() - 1) as usize] = Some(piece);
    }

    /// Clear a square (used for the en-passant victim, which is not on the
    /// capturing move's destination square).
    #[inline]
    pub fn remove_piece(&mut self, sq: Square) {
        self.cells[(sq.rank() - 1) as usize][(sq.file() - 1) as usize] = None;
    }

    #[inline]
    pub fn is_occupied(&self, sq: Square) -> bool {
        self.piece_at(sq).is_some()
    }

    /// All pieces of one color, rank 1 to 8, file a to h.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        Square::all()
            .filter_map(move |sq| self.piece_at(sq))
            .filter(move |piece| piece.color == color)
    }

    /// Find the king square for the given color.
    pub fn king_square(&self, color: Color) -> Result<Square, ChessError> {
        self.pieces(color)
            .find(|piece| piece.kind == PieceKind::King)
            .map(|piece| piece.square)
            .ok_or(ChessError::MissingKing(color))
    }

    // -----------------------------------------------------------------------
    // Move primitives
    // -----------------------------------------------------------------------

    /// Relocate a piece and advance the turn state.
    ///
    /// Performs no legality checking; the caller only invokes this on
    /// already-validated origin/destination pairs. The en-passant target is
    /// cleared unconditionally — move generation re-establishes it when the
    /// move was a double pawn push.
    pub fn apply_move(&mut self, from: Square, to: Square) {
        debug_assert!(self.is_occupied(from), "apply_move from an empty square");
        let Some(mut piece) = self.piece_at(from) else {
            return;
        };

        self.en_passant_target = None;

        let is_capture = self.is_occupied(to);
        if piece.kind == PieceKind::Pawn || is_capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.remove_piece(from);
        piece.square = to;
        self.put_piece(piece);

        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = !self.side_to_move;
    }

    /// Relocate a piece without touching clocks, side to move, or the
    /// en-passant target. Used solely to reposition the rook during castling
    /// within the same ply.
    pub fn apply_auxiliary_move(&mut self, from: Square, to: Square) {
        debug_assert!(
            self.is_occupied(from),
            "apply_auxiliary_move from an empty square"
        );
        let Some(mut piece) = self.piece_at(from) else {
            return;
        };
        self.remove_piece(from);
        piece.square = to;
        self.put_piece(piece);
    }

    // -----------------------------------------------------------------------
    // Disambiguation counts
    // -----------------------------------------------------------------------

    /// How many pieces of this kind and color stand on the given rank?
    pub fn count_on_rank(&self, kind: PieceKind, rank: u8, color: Color) -> usize {
        (1..=8u8)
            .filter_map(|file| self.piece_at(Square::at(rank, file)))
            .filter(|piece| piece.kind == kind && piece.color == color)
            .count()
    }

    /// How many pieces of this kind and color stand on the given file?
    pub fn count_on_file(&self, kind: PieceKind, file: u8, color: Color) -> usize {
        (1..=8u8)
            .filter_map(|rank| self.piece_at(Square::at(rank, file)))
            .filter(|piece| piece.kind == kind && piece.color == color)
            .count()
    }

    // -----------------------------------------------------------------------
    // Material
    // -----------------------------------------------------------------------

    /// Signed material balance: positive means White is ahead.
    pub fn material_balance(&self) -> i32 {
        Square::all()
            .filter_map(|sq| self.piece_at(sq))
            .map(|piece| piece.value())
            .sum()
    }

    /// Human-readable material summary.
    pub fn material_summary(&self) -> String {
        match self.material_balance() {
            0 => "equal material".to_string(),
            n if n > 0 => format!("White ahead by {n}"),
            n => format!("Black ahead by {}", -n),
        }
    }

    // -----------------------------------------------------------------------
    // FEN parsing
    // -----------------------------------------------------------------------

    /// Parse a FEN string.
    ///
    /// Accepts the full 6-field form and the short 4-field form (clocks
    /// omitted, defaulting to halfmove 0 / fullmove 1). Fails atomically with
    /// `InvalidFen` on any structural mismatch; no partially built position
    /// ever escapes.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 && fields.len() != 4 {
            return Err(ChessError::InvalidFen(format!(
                "expected 4 or 6 fields, got {}",
                fields.len()
            )));
        }

        let mut board = Board::empty();

        // ----- Field 1: piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (i, rank_text) in ranks.iter().enumerate() {
            let rank = 8 - i as u8; // FEN lists rank 8 first
            let mut file = 1u8;
            for ch in rank_text.chars() {
                if file > 8 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {rank}"
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty-square count '{ch}' in rank {rank}"
                        )));
                    }
                    file += digit as u8;
                } else if let Some((color, kind)) = PieceKind::from_fen_char(ch) {
                    board.put_piece(Piece::new(color, kind, Square::at(rank, file)));
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 9 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {rank} has {} squares instead of 8",
                    file - 1
                )));
            }
        }

        // ----- Field 2: side to move -----
        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        // ----- Field 3: castling availability -----
        board.castling_rights = CastlingRights::from_fen_field(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling field: '{}'", fields[2]))
        })?;

        // ----- Field 4: en passant target square -----
        if fields[3] != "-" {
            let target = Square::from_algebraic(fields[3]).map_err(|_| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            board.en_passant_target = Some(target);
        }

        // ----- Fields 5-6: clocks (defaulted in the short form) -----
        if fields.len() == 6 {
            board.halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
                ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
            })?;
            board.fullmove_number = fields[5].parse::<u16>().map_err(|_| {
                ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
            })?;
        }

        Ok(board)
    }

    /// Export the position as a FEN string. Round-trips exactly for any
    /// canonical (6-field) input.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        for rank in (1..=8u8).rev() {
            let mut empty_count = 0u8;
            for file in 1..=8u8 {
                match self.piece_at(Square::at(rank, file)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.fen_symbol());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 1 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        fen.push_str(&self.castling_rights.to_fen_field());

        fen.push(' ');
        match self.en_passant_target {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }

    // -----------------------------------------------------------------------
    // Display
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line text grid (rank 8 at top).
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (1..=8u8).rev() {
            s.push((b'0' + rank) as char);
            s.push(' ');
            for file in 1..=8u8 {
                let ch = match self.piece_at(Square::at(rank, file)) {
                    Some(piece) => piece.fen_symbol(),
                    None => '.',
                };
                s.push(ch);
                if file < 8 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    // ===================================================================
    // Starting position
    // ===================================================================

    #[test]
    fn starting_position_fen() {
        assert_eq!(Board::starting().to_fen(), Board::STARTING_FEN);
    }

    #[test]
    fn starting_position_state() {
        let board = Board::starting();
        assert_eq!(board.side_to_move, Color::White);
        assert_eq!(board.castling_rights, CastlingRights::ALL);
        assert_eq!(board.en_passant_target, None);
        assert_eq!(board.halfmove_clock, 0);
        assert_eq!(board.fullmove_number, 1);
    }

    #[test]
    fn starting_position_piece_counts() {
        let board = Board::starting();
        assert_eq!(board.pieces(Color::White).count(), 16);
        assert_eq!(board.pieces(Color::Black).count(), 16);
        for color in [Color::White, Color::Black] {
            assert_eq!(board.count_on_rank(PieceKind::Rook, color.home_rank(), color), 2);
            assert_eq!(
                board
                    .pieces(color)
                    .filter(|p| p.kind == PieceKind::Pawn)
                    .count(),
                8
            );
        }
    }

    #[test]
    fn piece_at_back_ranks() {
        let board = Board::starting();
        let white_king = board.piece_at(sq("e1")).unwrap();
        assert_eq!(white_king.kind, PieceKind::King);
        assert_eq!(white_king.color, Color::White);
        assert_eq!(white_king.square, sq("e1"));

        let black_queen = board.piece_at(sq("d8")).unwrap();
        assert_eq!(black_queen.kind, PieceKind::Queen);
        assert_eq!(black_queen.color, Color::Black);
    }

    #[test]
    fn middle_ranks_are_empty() {
        let board = Board::starting();
        for rank in 3..=6 {
            for file in 1..=8 {
                assert!(!board.is_occupied(Square::at(rank, file)));
            }
        }
    }

    #[test]
    fn king_square_lookup() {
        let board = Board::starting();
        assert_eq!(board.king_square(Color::White).unwrap(), sq("e1"));
        assert_eq!(board.king_square(Color::Black).unwrap(), sq("e8"));
    }

    #[test]
    fn king_square_missing_is_an_error() {
        let board = Board::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(matches!(
            board.king_square(Color::Black),
            Err(ChessError::MissingKing(Color::Black))
        ));
    }

    // ===================================================================
    // apply_move
    // ===================================================================

    #[test]
    fn apply_move_relocates_and_flips_side() {
        let mut board = Board::starting();
        board.apply_move(sq("e2"), sq("e4"));
        assert!(!board.is_occupied(sq("e2")));
        let pawn = board.piece_at(sq("e4")).unwrap();
        assert_eq!(pawn.kind, PieceKind::Pawn);
        assert_eq!(pawn.square, sq("e4"));
        assert_eq!(board.side_to_move, Color::Black);
    }

    #[test]
    fn apply_move_resets_halfmove_clock_on_pawn_moves() {
        let mut board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 7 10").unwrap();
        board.apply_move(sq("e2"), sq("e3"));
        assert_eq!(board.halfmove_clock, 0);
    }

    #[test]
    fn apply_move_resets_halfmove_clock_on_captures() {
        let mut board = Board::from_fen("4k3/8/8/3p4/8/8/8/3RK3 w - - 5 20").unwrap();
        board.apply_move(sq("d1"), sq("d5"));
        assert_eq!(board.halfmove_clock, 0);
        assert_eq!(board.piece_at(sq("d5")).unwrap().color, Color::White);
    }

    #[test]
    fn apply_move_increments_halfmove_clock_otherwise() {
        let mut board = Board::starting();
        board.apply_move(sq("g1"), sq("f3"));
        assert_eq!(board.halfmove_clock, 1);
    }

    #[test]
    fn apply_move_clears_en_passant_target() {
        let mut board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        board.apply_move(sq("g8"), sq("f6"));
        assert_eq!(board.en_passant_target, None);
    }

    #[test]
    fn apply_move_increments_fullmove_after_black() {
        let mut board = Board::starting();
        board.apply_move(sq("e2"), sq("e4"));
        assert_eq!(board.fullmove_number, 1);
        board.apply_move(sq("e7"), sq("e5"));
        assert_eq!(board.fullmove_number, 2);
    }

    #[test]
    fn apply_auxiliary_move_touches_nothing_else() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 3 15").unwrap();
        board.apply_auxiliary_move(sq("a1"), sq("d1"));
        assert!(!board.is_occupied(sq("a1")));
        assert_eq!(board.piece_at(sq("d1")).unwrap().kind, PieceKind::Rook);
        assert_eq!(board.side_to_move, Color::White);
        assert_eq!(board.halfmove_clock, 3);
        assert_eq!(board.fullmove_number, 15);
    }

    // ===================================================================
    // Copy-on-branch
    // ===================================================================

    #[test]
    fn clone_is_a_deep_copy() {
        let board = Board::starting();
        let mut copy = board.clone();
        copy.apply_move(sq("e2"), sq("e4"));
        assert!(board.is_occupied(sq("e2")));
        assert!(!copy.is_occupied(sq("e2")));
        assert_eq!(board.side_to_move, Color::White);
    }

    // ===================================================================
    // Disambiguation counts
    // ===================================================================

    #[test]
    fn count_on_rank_and_file() {
        // Rooks on a1 and h1 (rank 1) plus a rook on a8 (file a).
        let board = Board::from_fen("R3k3/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert_eq!(board.count_on_rank(PieceKind::Rook, 1, Color::White), 2);
        assert_eq!(board.count_on_file(PieceKind::Rook, 1, Color::White), 2);
        assert_eq!(board.count_on_file(PieceKind::Rook, 8, Color::White), 1);
        assert_eq!(board.count_on_rank(PieceKind::Rook, 1, Color::Black), 0);
    }

    // ===================================================================
    // Material
    // ===================================================================

    #[test]
    fn starting_material_is_equal() {
        let board = Board::starting();
        assert_eq!(board.material_balance(), 0);
        assert_eq!(board.material_summary(), "equal material");
    }

    #[test]
    fn material_after_losing_the_queen() {
        // Black queen missing.
        let board =
            Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
        assert_eq!(board.material_balance(), 9);
        assert_eq!(board.material_summary(), "White ahead by 9");
    }

    #[test]
    fn material_black_ahead() {
        let board =
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1").unwrap();
        assert_eq!(board.material_summary(), "Black ahead by 9");
    }

    // ===================================================================
    // FEN round-trips
    // ===================================================================

    #[test]
    fn fen_round_trip_corpus() {
        for fen in [
            Board::STARTING_FEN,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w Kq - 5 20",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
        ] {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(board.to_fen(), fen);
        }
    }

    #[test]
    fn short_fen_defaults_clocks() {
        let board = Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").unwrap();
        assert_eq!(board.halfmove_clock, 0);
        assert_eq!(board.fullmove_number, 1);
        assert_eq!(board.to_fen(), Board::STARTING_FEN);
    }

    // ===================================================================
    // FEN validation errors
    // ===================================================================

    fn assert_invalid(fen: &str) {
        assert!(
            matches!(Board::from_fen(fen), Err(ChessError::InvalidFen(_))),
            "expected InvalidFen for '{fen}'"
        );
    }

    #[test]
    fn fen_error_wrong_field_count() {
        assert_invalid("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0");
        assert_invalid("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
    }

    #[test]
    fn fen_error_wrong_rank_count() {
        assert_invalid("rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn fen_error_rank_sum_too_short() {
        assert_invalid("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn fen_error_rank_sum_too_long() {
        assert_invalid("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_invalid("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_invalid("rnbqkbnr/pppppppp/44p/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn fen_error_invalid_piece_char() {
        assert_invalid("xnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn fen_error_invalid_side_to_move() {
        assert_invalid("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1");
    }

    #[test]
    fn fen_error_invalid_castling_letter() {
        assert_invalid("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XYZ - 0 1");
    }

    #[test]
    fn fen_error_invalid_en_passant_square() {
        assert_invalid("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1");
    }

    #[test]
    fn fen_error_invalid_clocks() {
        assert_invalid("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - abc 1");
        assert_invalid("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 xyz");
    }

    // ===================================================================
    // Display
    // ===================================================================

    #[test]
    fn board_string_layout() {
        let s = Board::starting().board_string();
        assert!(s.starts_with("8 r n b q k b n r"));
        assert!(s.ends_with("a b c d e f g h"));
    }
}
