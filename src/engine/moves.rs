//! One ply of play.
//!
//! A `Move` records origin, destination, the moving piece, the special-move
//! flags, and (optionally) an owned snapshot of the position after the move.
//! Constructing a `Move` with a snapshot performs the full side effects of
//! the ply: piece relocation, castling-rights revocation for both sides, and
//! the rook relocation when the move is a castle. After annotation a `Move`
//! is immutable apart from the controlled promotion rewrite.

use std::fmt;

use crate::engine::board::Board;
use crate::engine::square::Square;
use crate::engine::types::{Color, PieceKind};

/// An immutable record of one ply.
#[derive(Clone, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub color: Color,
    pub piece_kind: PieceKind,
    pub capture: bool,
    pub en_passant: bool,
    pub castling: bool,
    pub promotion: Option<PieceKind>,
    pub check: bool,
    pub checkmate: bool,
    /// Extra notation token when several like pieces reach the destination.
    pub disambiguation: String,
    /// The position after the move. `None` for lightweight descriptors used
    /// only for counting (e.g. attack-square enumeration).
    pub board: Option<Board>,
}

impl Move {
    /// Build a move from an already-validated origin/destination pair.
    ///
    /// With `store_board`, the pre-move board is cloned, the move applied,
    /// and the castling side effects run against the snapshot. Without it,
    /// only the descriptor fields are filled in.
    pub fn new(
        from: Square,
        to: Square,
        color: Color,
        piece_kind: PieceKind,
        capture: bool,
        before: &Board,
        store_board: bool,
    ) -> Self {
        let mut mv = Move {
            from,
            to,
            color,
            piece_kind,
            capture,
            en_passant: false,
            castling: false,
            promotion: None,
            check: false,
            checkmate: false,
            disambiguation: String::new(),
            board: None,
        };

        if store_board {
            let mut board = before.clone();
            board.apply_move(from, to);
            mv.board = Some(board);
            mv.revoke_moved_side_rights();
            mv.revoke_opponent_rights();
        }
        mv.relocate_rook_if_castling();

        mv
    }

    /// The position after this move, when stored.
    pub fn resulting_board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    // -----------------------------------------------------------------------
    // Construction side effects
    // -----------------------------------------------------------------------

    /// A king or rook leaving its home square forfeits the matching rights.
    fn revoke_moved_side_rights(&mut self) {
        let Some(board) = &mut self.board else {
            return;
        };
        let home = self.color.home_rank();
        match self.piece_kind {
            PieceKind::King if self.from == Square::at(home, 5) => {
                board.castling_rights.revoke_all(self.color);
            }
            PieceKind::Rook if self.from == Square::at(home, 1) => {
                board.castling_rights.revoke_queenside(self.color);
            }
            PieceKind::Rook if self.from == Square::at(home, 8) => {
                board.castling_rights.revoke_kingside(self.color);
            }
            _ => {}
        }
    }

    /// Landing on an enemy rook's home corner revokes that side's right,
    /// whether or not a rook was actually captured there.
    fn revoke_opponent_rights(&mut self) {
        let Some(board) = &mut self.board else {
            return;
        };
        let enemy = !self.color;
        let home = enemy.home_rank();
        if self.to == Square::at(home, 1) {
            board.castling_rights.revoke_queenside(enemy);
        } else if self.to == Square::at(home, 8) {
            board.castling_rights.revoke_kingside(enemy);
        }
    }

    /// A king moving e1→g1 / e1→c1 (or the rank-8 pair for Black) is a
    /// castle: relocate the rook on the same ply.
    fn relocate_rook_if_castling(&mut self) {
        if self.piece_kind != PieceKind::King {
            return;
        }
        let home = self.color.home_rank();
        if self.from != Square::at(home, 5) {
            return;
        }
        let (rook_from, rook_to) = if self.to == Square::at(home, 7) {
            (Square::at(home, 8), Square::at(home, 6))
        } else if self.to == Square::at(home, 3) {
            (Square::at(home, 1), Square::at(home, 4))
        } else {
            return;
        };
        if let Some(board) = &mut self.board {
            board.apply_auxiliary_move(rook_from, rook_to);
        }
        self.castling = true;
    }

    // -----------------------------------------------------------------------
    // Promotion
    // -----------------------------------------------------------------------

    /// Rewrite the moved pawn's kind in the stored board and record the
    /// promotion for notation.
    pub fn set_promotion(&mut self, kind: PieceKind) {
        if let Some(board) = &mut self.board
            && let Some(mut piece) = board.piece_at(self.to)
        {
            piece.kind = kind;
            board.put_piece(piece);
        }
        self.promotion = Some(kind);
    }

    // -----------------------------------------------------------------------
    // Notation
    // -----------------------------------------------------------------------

    /// Is this a king move between one of the four fixed castling pairs?
    ///
    /// Notation decides castling from the origin/destination/kind pattern
    /// alone, independent of the `castling` flag.
    fn castling_notation(&self) -> Option<&'static str> {
        if self.piece_kind != PieceKind::King {
            return None;
        }
        let home = self.color.home_rank();
        if self.from != Square::at(home, 5) {
            return None;
        }
        if self.to == Square::at(home, 7) {
            Some("O-O")
        } else if self.to == Square::at(home, 3) {
            Some("O-O-O")
        } else {
            None
        }
    }

    /// Standard algebraic notation, including any check/checkmate suffix.
    pub fn notation(&self) -> String {
        let mut s = String::with_capacity(8);

        if let Some(castle) = self.castling_notation() {
            s.push_str(castle);
        } else {
            if self.piece_kind == PieceKind::Pawn {
                if self.capture {
                    s.push(self.from.file_letter());
                }
            } else {
                s.push(self.piece_kind.letter());
            }

            s.push_str(&self.disambiguation);

            if self.capture {
                s.push('x');
            }

            s.push_str(&self.to.to_algebraic());

            if self.en_passant {
                s.push_str("e.p.");
            }

            if let Some(kind) = self.promotion {
                s.push('=');
                s.push(kind.letter());
            }
        }

        if self.checkmate {
            s.push('#');
        } else if self.check {
            s.push('+');
        }

        s
    }

    /// Origin+destination pair for the drag-and-drop collaborator. Returns
    /// the empty string for non-queen promotions: the board UI auto-selects
    /// the queen, and minor promotions are only reachable through the
    /// explicit move list.
    pub fn coordinate_notation(&self) -> String {
        match self.promotion {
            Some(kind) if kind != PieceKind::Queen => String::new(),
            _ => format!("{}{}", self.from.to_algebraic(), self.to.to_algebraic()),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notation())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
