//! Move generation and attack detection.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves for every piece of the side to move.
//!   2. Filter: a move is legal only if the mover's own king is not attacked
//!      in the resulting position.
//!   3. Add castling (only meaningful on a filtered list).
//!   4. Annotate: disambiguation tokens, check/checkmate flags, and a
//!      lexicographic sort by notation.
//!
//! Stages 2-4 are individually switchable through [`MoveGen`] because the
//! generator is reused internally for cheaper partial computations — attack
//! enumeration needs neither filtering nor notation, and the recursive
//! checkmate probe needs no notation.

use std::collections::HashSet;

use crate::engine::board::Board;
use crate::engine::moves::Move;
use crate::engine::piece::Piece;
use crate::engine::square::Square;
use crate::engine::types::{ChessError, Color, PieceKind};

// =========================================================================
// Offset tables
// =========================================================================

/// Rook/queen/king directions as (delta_rank, delta_file) unit vectors.
const STRAIGHT_OFFSETS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Bishop/queen/king diagonal directions.
const DIAGONAL_OFFSETS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// All eight compass directions.
const COMPASS_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// The knight's eight "L" jumps, clockwise from one o'clock.
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

const WHITE_PAWN_CAPTURES: [(i8, i8); 2] = [(1, 1), (1, -1)];
const BLACK_PAWN_CAPTURES: [(i8, i8); 2] = [(-1, 1), (-1, -1)];

// =========================================================================
// Generation options
// =========================================================================

/// Which stages of the move-generation pipeline to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveGen {
    /// Discard moves that leave the mover's king attacked, and add castling.
    pub legality_filter: bool,
    /// Store the resulting board in each move. Forced on whenever the
    /// legality filter runs, since the filter inspects resulting positions.
    pub snapshots: bool,
    /// Annotate disambiguation and check/checkmate, then sort by notation.
    pub notation: bool,
}

impl MoveGen {
    /// The full pipeline — what callers present moves to a player with.
    pub const FULL: MoveGen = MoveGen {
        legality_filter: true,
        snapshots: true,
        notation: true,
    };

    /// Legal moves without notation; used by the recursive checkmate probe.
    pub const LEGAL_ONLY: MoveGen = MoveGen {
        legality_filter: true,
        snapshots: true,
        notation: false,
    };

    /// Raw pseudo-legal destinations; used for attack enumeration.
    pub const ATTACKS: MoveGen = MoveGen {
        legality_filter: false,
        snapshots: false,
        notation: false,
    };
}

// =========================================================================
// Public API
// =========================================================================

/// All legal moves for `color`, fully annotated and sorted by notation.
pub fn legal_moves(color: Color, board: &Board) -> Result<Vec<Move>, ChessError> {
    moves(color, board, MoveGen::FULL)
}

/// Core entry point: generate moves for `color` with the requested stages.
///
/// `color` is explicit rather than taken from the board because the
/// check/checkmate annotation recurses with the opposite color.
pub fn moves(color: Color, board: &Board, options: MoveGen) -> Result<Vec<Move>, ChessError> {
    let store = options.snapshots || options.legality_filter;

    let mut list: Vec<Move> = Vec::with_capacity(64);
    for piece in board.pieces(color) {
        match piece.kind {
            PieceKind::Pawn => {
                push_pawn_advances(&mut list, &piece, board, store);
                push_pawn_captures(&mut list, &piece, board, store);
                push_en_passant(&mut list, &piece, board, store);
            }
            PieceKind::Knight => push_jumps(&mut list, &piece, board, store),
            PieceKind::Bishop => {
                push_slides_and_captures(&mut list, &piece, &DIAGONAL_OFFSETS, 7, board, store)
            }
            PieceKind::Rook => {
                push_slides_and_captures(&mut list, &piece, &STRAIGHT_OFFSETS, 7, board, store)
            }
            PieceKind::Queen => {
                push_slides_and_captures(&mut list, &piece, &COMPASS_OFFSETS, 7, board, store)
            }
            PieceKind::King => {
                push_slides_and_captures(&mut list, &piece, &COMPASS_OFFSETS, 1, board, store)
            }
        }
    }

    if options.legality_filter {
        list = discard_self_check_moves(color, list)?;
        push_castling_moves(&mut list, color, board, store)?;
    }

    if options.notation {
        clarify_ambiguous_moves(&mut list, color, board);
        mark_checks_and_checkmates(&mut list, color)?;
        list.sort_by_cached_key(|mv| mv.notation());
    }

    Ok(list)
}

/// Destination squares (as packed keys) of every pseudo-legal move for
/// `color` — the squares this side could move a piece to next ply.
pub fn attacked_squares(color: Color, board: &Board) -> Result<HashSet<u8>, ChessError> {
    let list = moves(color, board, MoveGen::ATTACKS)?;
    Ok(list.into_iter().map(|mv| mv.to.key()).collect())
}

/// Select a move from a generated list by its 4-character coordinate string
/// (the form the drag-and-drop collaborator submits).
pub fn find_coordinate<'a>(list: &'a [Move], text: &str) -> Option<&'a Move> {
    list.iter().find(|mv| mv.coordinate_notation() == text)
}

// =========================================================================
// Attack detection
// =========================================================================

/// Is `square` attacked by any piece of `by`?
///
/// Walks outward from the square itself: the first occupant on each ray
/// blocks it for everything behind, exactly as sliding movement does, so a
/// king cannot step into a square that would only be safe while it shields
/// the ray itself.
pub fn square_is_attacked(by: Color, board: &Board, square: Square) -> bool {
    for &(dr, df) in &COMPASS_OFFSETS {
        let diagonal = dr != 0 && df != 0;
        for dist in 1i8..=7 {
            let Some(target) = square.offset(dr * dist, df * dist) else {
                break;
            };
            let Some(occupant) = board.piece_at(target) else {
                continue;
            };
            if occupant.color == by && ray_attacks(&occupant, dr, dist, diagonal) {
                return true;
            }
            break;
        }
    }

    for &(dr, df) in &KNIGHT_OFFSETS {
        if let Some(target) = square.offset(dr, df)
            && let Some(occupant) = board.piece_at(target)
            && occupant.color == by
            && occupant.kind == PieceKind::Knight
        {
            return true;
        }
    }

    en_passant_attack(by, board, square)
}

/// Can a piece standing at distance `dist` along direction `dr`/diagonal
/// attack back down the ray?
fn ray_attacks(attacker: &Piece, dr: i8, dist: i8, diagonal: bool) -> bool {
    match attacker.kind {
        PieceKind::Queen => true,
        PieceKind::Rook => !diagonal,
        PieceKind::Bishop => diagonal,
        PieceKind::King => dist == 1,
        PieceKind::Pawn => {
            // Pawns attack one square diagonally forward; walking the ray
            // outward from the attacked square, a White attacker sits one
            // rank below it.
            dist == 1
                && diagonal
                && match attacker.color {
                    Color::White => dr == -1,
                    Color::Black => dr == 1,
                }
        }
        PieceKind::Knight => false,
    }
}

/// The double-pushed pawn itself is attackable even though no move targets
/// its own square: the capture lands on the recorded target square one rank
/// behind it.
fn en_passant_attack(by: Color, board: &Board, square: Square) -> bool {
    let Some(target) = board.en_passant_target else {
        return false;
    };
    let victim_delta: i8 = match by {
        Color::White => -1,
        Color::Black => 1,
    };
    if target.offset(victim_delta, 0) != Some(square) {
        return false;
    }
    let Some(victim) = board.piece_at(square) else {
        return false;
    };
    if victim.color == by || victim.kind != PieceKind::Pawn {
        return false;
    }
    [(0, 1), (0, -1)].iter().any(|&(dr, df)| {
        square
            .offset(dr, df)
            .and_then(|sq| board.piece_at(sq))
            .is_some_and(|p| p.color == by && p.kind == PieceKind::Pawn)
    })
}

// =========================================================================
// Pseudo-legal generation (internal)
// =========================================================================

/// Sliding moves with captures for bishops, rooks, queens, and (with a reach
/// of 1) kings: walk each direction, stop at the edge, a friendly piece, or
/// after capturing an enemy piece.
fn push_slides_and_captures(
    list: &mut Vec<Move>,
    piece: &Piece,
    directions: &[(i8, i8)],
    reach: i8,
    board: &Board,
    store: bool,
) {
    for &(dr, df) in directions {
        for dist in 1..=reach {
            let Some(target) = piece.square.offset(dr * dist, df * dist) else {
                break;
            };
            match board.piece_at(target) {
                Some(other) if other.color == piece.color => break,
                Some(_) => {
                    list.push(Move::new(
                        piece.square,
                        target,
                        piece.color,
                        piece.kind,
                        true,
                        board,
                        store,
                    ));
                    break;
                }
                None => list.push(Move::new(
                    piece.square,
                    target,
                    piece.color,
                    piece.kind,
                    false,
                    board,
                    store,
                )),
            }
        }
    }
}

/// Pawn pushes: one square forward, two from the home rank. Any occupant —
/// friend or foe — stops the slide, so the double push needs no separate
/// intermediate-square check. A push onto the far rank fans out into the
/// four promotions.
fn push_pawn_advances(list: &mut Vec<Move>, piece: &Piece, board: &Board, store: bool) {
    let (dr, home_rank) = match piece.color {
        Color::White => (1, 2),
        Color::Black => (-1, 7),
    };
    let reach = if piece.on_rank(home_rank) { 2 } else { 1 };

    for dist in 1..=reach {
        let Some(target) = piece.square.offset(dr * dist, 0) else {
            break;
        };
        if board.is_occupied(target) {
            break;
        }
        let mut mv = Move::new(
            piece.square,
            target,
            piece.color,
            piece.kind,
            false,
            board,
            store,
        );
        if dist == 2 {
            // Record the square passed over so the opponent may capture
            // en passant next ply.
            if let Some(after) = &mut mv.board
                && let Some(passed) = piece.square.offset(dr, 0)
            {
                after.en_passant_target = Some(passed);
            }
        }
        push_with_promotions(list, mv);
    }
}

/// Pawn diagonal captures, only when an enemy piece occupies the target.
fn push_pawn_captures(list: &mut Vec<Move>, piece: &Piece, board: &Board, store: bool) {
    let directions: &[(i8, i8)] = match piece.color {
        Color::White => &WHITE_PAWN_CAPTURES,
        Color::Black => &BLACK_PAWN_CAPTURES,
    };
    for &(dr, df) in directions {
        let Some(target) = piece.square.offset(dr, df) else {
            continue;
        };
        if let Some(other) = board.piece_at(target)
            && other.color != piece.color
        {
            let mv = Move::new(
                piece.square,
                target,
                piece.color,
                piece.kind,
                true,
                board,
                store,
            );
            push_with_promotions(list, mv);
        }
    }
}

/// En passant: the board's recorded target square must match a diagonal
/// capture target, and the capturing pawn must stand on the rank adjacent to
/// it (5 for White, 4 for Black). The captured pawn is NOT on the
/// destination square — it sits one rank behind, same file.
fn push_en_passant(list: &mut Vec<Move>, piece: &Piece, board: &Board, store: bool) {
    let Some(target) = board.en_passant_target else {
        return;
    };
    let (directions, victim_delta, capture_rank): (&[(i8, i8)], i8, u8) = match piece.color {
        Color::White => (&WHITE_PAWN_CAPTURES, -1, 5),
        Color::Black => (&BLACK_PAWN_CAPTURES, 1, 4),
    };
    if !piece.on_rank(capture_rank) {
        return;
    }
    for &(dr, df) in directions {
        if piece.square.offset(dr, df) != Some(target) {
            continue;
        }
        let mut mv = Move::new(
            piece.square,
            target,
            piece.color,
            piece.kind,
            true,
            board,
            store,
        );
        mv.en_passant = true;
        if let Some(after) = &mut mv.board
            && let Some(victim) = target.offset(victim_delta, 0)
        {
            after.remove_piece(victim);
        }
        list.push(mv);
    }
}

/// Knight jumps: each offset is independently legal if the destination is
/// on-board and not friendly-occupied.
fn push_jumps(list: &mut Vec<Move>, piece: &Piece, board: &Board, store: bool) {
    for &(dr, df) in &KNIGHT_OFFSETS {
        let Some(target) = piece.square.offset(dr, df) else {
            continue;
        };
        match board.piece_at(target) {
            Some(other) if other.color == piece.color => {}
            occupant => list.push(Move::new(
                piece.square,
                target,
                piece.color,
                piece.kind,
                occupant.is_some(),
                board,
                store,
            )),
        }
    }
}

/// A pawn move landing on the far rank becomes one move per promotion kind.
fn push_with_promotions(list: &mut Vec<Move>, mv: Move) {
    let far_rank = match mv.color {
        Color::White => 8,
        Color::Black => 1,
    };
    if mv.piece_kind == PieceKind::Pawn && mv.to.rank() == far_rank {
        for kind in PieceKind::PROMOTION_CHOICES {
            let mut promoted = mv.clone();
            promoted.set_promotion(kind);
            list.push(promoted);
        }
    } else {
        list.push(mv);
    }
}

// =========================================================================
// King-safety filter
// =========================================================================

/// Keep only moves whose resulting position leaves the mover's king
/// unattacked.
fn discard_self_check_moves(color: Color, list: Vec<Move>) -> Result<Vec<Move>, ChessError> {
    let mut kept = Vec::with_capacity(list.len());
    for mv in list {
        let Some(after) = mv.resulting_board() else {
            continue;
        };
        let king = after.king_square(color)?;
        if !square_is_attacked(!color, after, king) {
            kept.push(mv);
        }
    }
    Ok(kept)
}

// =========================================================================
// Castling
// =========================================================================

struct CastlingRule {
    color: Color,
    kingside: bool,
    rook_from: (u8, u8),
    king_to: (u8, u8),
    /// King origin, transit, and destination — all must be safe.
    keep_unattacked: [(u8, u8); 3],
    /// Every square between king and rook — all must be empty.
    keep_empty: &'static [(u8, u8)],
}

const CASTLING_RULES: [CastlingRule; 4] = [
    CastlingRule {
        color: Color::White,
        kingside: true,
        rook_from: (1, 8),
        king_to: (1, 7),
        keep_unattacked: [(1, 5), (1, 6), (1, 7)],
        keep_empty: &[(1, 6), (1, 7)],
    },
    CastlingRule {
        color: Color::White,
        kingside: false,
        rook_from: (1, 1),
        king_to: (1, 3),
        keep_unattacked: [(1, 5), (1, 4), (1, 3)],
        keep_empty: &[(1, 4), (1, 3), (1, 2)],
    },
    CastlingRule {
        color: Color::Black,
        kingside: true,
        rook_from: (8, 8),
        king_to: (8, 7),
        keep_unattacked: [(8, 5), (8, 6), (8, 7)],
        keep_empty: &[(8, 6), (8, 7)],
    },
    CastlingRule {
        color: Color::Black,
        kingside: false,
        rook_from: (8, 1),
        king_to: (8, 3),
        keep_unattacked: [(8, 5), (8, 4), (8, 3)],
        keep_empty: &[(8, 4), (8, 3), (8, 2)],
    },
];

/// Add any available castling moves. The rook is verified still present at
/// its home corner when a right is otherwise exercisable — a granted right
/// with a missing rook means the position itself is corrupt, which is an
/// error, not a silently skipped move.
fn push_castling_moves(
    list: &mut Vec<Move>,
    color: Color,
    board: &Board,
    store: bool,
) -> Result<(), ChessError> {
    let king_from = board.king_square(color)?;
    let enemy = !color;

    for rule in &CASTLING_RULES {
        if rule.color != color {
            continue;
        }
        let granted = if rule.kingside {
            board.castling_rights.kingside(color)
        } else {
            board.castling_rights.queenside(color)
        };
        if !granted {
            continue;
        }
        if rule
            .keep_unattacked
            .iter()
            .any(|&(rank, file)| square_is_attacked(enemy, board, Square::at(rank, file)))
        {
            continue;
        }
        if rule
            .keep_empty
            .iter()
            .any(|&(rank, file)| board.is_occupied(Square::at(rank, file)))
        {
            continue;
        }

        let rook_home = Square::at(rule.rook_from.0, rule.rook_from.1);
        match board.piece_at(rook_home) {
            Some(piece) if piece.kind == PieceKind::Rook && piece.color == color => {}
            _ => return Err(ChessError::InvalidCastlingState(rook_home.to_algebraic())),
        }

        list.push(Move::new(
            king_from,
            Square::at(rule.king_to.0, rule.king_to.1),
            color,
            PieceKind::King,
            false,
            board,
            store,
        ));
    }

    Ok(())
}

// =========================================================================
// Annotation
// =========================================================================

/// For each kind that can occur in duplicate, find destination squares
/// reached by more than one such piece and attach a disambiguation token:
/// the full origin square when the mover shares both its rank and file with
/// a like piece, the file letter when it shares its rank, the rank digit
/// when it shares its file, and the file letter as the default tie-break
/// (knights converging from non-collinear origins).
fn clarify_ambiguous_moves(list: &mut [Move], color: Color, board: &Board) {
    for kind in PieceKind::PROMOTION_CHOICES {
        let mut reached: std::collections::HashMap<u8, u32> = std::collections::HashMap::new();
        for mv in list.iter() {
            if mv.piece_kind == kind {
                *reached.entry(mv.to.key()).or_insert(0) += 1;
            }
        }

        for mv in list.iter_mut() {
            if mv.piece_kind != kind {
                continue;
            }
            if reached.get(&mv.to.key()).copied().unwrap_or(0) < 2 {
                continue;
            }

            let on_rank = board.count_on_rank(kind, mv.from.rank(), color);
            let on_file = board.count_on_file(kind, mv.from.file(), color);

            mv.disambiguation = if on_rank > 1 && on_file > 1 {
                mv.from.to_algebraic()
            } else if on_rank > 1 {
                mv.from.file_letter().to_string()
            } else if on_file > 1 {
                mv.from.rank().to_string()
            } else {
                mv.from.file_letter().to_string()
            };
        }
    }
}

/// Mark moves that attack the enemy king; when the opponent then has no
/// legal reply, the move is checkmate. The recursive probe skips notation,
/// which is what terminates the recursion.
fn mark_checks_and_checkmates(list: &mut [Move], color: Color) -> Result<(), ChessError> {
    let enemy = !color;
    for mv in list.iter_mut() {
        let (check, checkmate) = {
            let Some(after) = mv.resulting_board() else {
                continue;
            };
            let enemy_king = after.king_square(enemy)?;
            if square_is_attacked(color, after, enemy_king) {
                let replies = moves(enemy, after, MoveGen::LEGAL_ONLY)?;
                (true, replies.is_empty())
            } else {
                (false, false)
            }
        };
        mv.check = check;
        mv.checkmate = checkmate;
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
