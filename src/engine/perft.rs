//! Perft — exhaustive move-generation verification.
//!
//! For each depth 1..=N, tallies the number of legal moves across the whole
//! tree plus how many were captures, en passants, castles, and promotions
//! (and, at the detailed level, checks and checkmates). The totals are
//! compared against published reference counts; any mismatch means a bug in
//! generation, application, or legality filtering.
//!
//! The walk is depth-first and drops each node's move list as soon as its
//! subtree completes, so memory stays bounded by depth × branching factor
//! rather than by total node count.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use serde::Serialize;

use crate::engine::board::Board;
use crate::engine::rulebook::{self, MoveGen};
use crate::engine::types::ChessError;

/// Tallies for one depth of the perft tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DepthTotals {
    pub depth: u32,
    pub nodes: u64,
    pub captures: u64,
    pub en_passants: u64,
    pub castles: u64,
    pub promotions: u64,
    /// Only tallied when checks are requested; the check/checkmate
    /// annotation costs a recursive generation per checking move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkmates: Option<u64>,
}

impl DepthTotals {
    fn new(depth: u32, count_checks: bool) -> Self {
        DepthTotals {
            depth,
            checks: count_checks.then_some(0),
            checkmates: count_checks.then_some(0),
            ..DepthTotals::default()
        }
    }
}

/// Run perft from `board` down to `depth`, returning one row per depth.
pub fn perft(board: &Board, depth: u32, count_checks: bool) -> Result<Vec<DepthTotals>, ChessError> {
    let mut totals: Vec<DepthTotals> = (1..=depth)
        .map(|d| DepthTotals::new(d, count_checks))
        .collect();
    if depth > 0 {
        walk(board, depth, count_checks, &mut totals, 0)?;
    }
    Ok(totals)
}

/// Leaf-node count at exactly `depth` — the classic perft number.
pub fn nodes(board: &Board, depth: u32) -> Result<u64, ChessError> {
    Ok(perft(board, depth, false)?
        .last()
        .map(|row| row.nodes)
        .unwrap_or(1))
}

fn walk(
    board: &Board,
    remaining: u32,
    count_checks: bool,
    totals: &mut [DepthTotals],
    level: usize,
) -> Result<(), ChessError> {
    let options = if count_checks {
        MoveGen::FULL
    } else {
        MoveGen::LEGAL_ONLY
    };
    let list = rulebook::moves(board.side_to_move, board, options)?;

    {
        let row = &mut totals[level];
        for mv in &list {
            row.nodes += 1;
            if mv.capture {
                row.captures += 1;
            }
            if mv.en_passant {
                row.en_passants += 1;
            }
            if mv.castling {
                row.castles += 1;
            }
            if mv.promotion.is_some() {
                row.promotions += 1;
            }
            if count_checks {
                if mv.check {
                    if let Some(checks) = &mut row.checks {
                        *checks += 1;
                    }
                }
                if mv.checkmate {
                    if let Some(checkmates) = &mut row.checkmates {
                        *checkmates += 1;
                    }
                }
            }
        }
    }

    if remaining > 1 {
        for mv in list {
            if let Some(child) = mv.resulting_board() {
                walk(child, remaining - 1, count_checks, totals, level + 1)?;
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_zero_yields_no_rows() {
        let board = Board::starting();
        assert!(perft(&board, 0, false).unwrap().is_empty());
        assert_eq!(nodes(&board, 0).unwrap(), 1);
    }

    #[test]
    fn starting_depth_two_counts() {
        let board = Board::starting();
        let report = perft(&board, 2, false).unwrap();
        assert_eq!(report[0].nodes, 20);
        assert_eq!(report[1].nodes, 400);
        assert_eq!(report[0].captures, 0);
        assert_eq!(report[1].captures, 0);
        assert_eq!(report[0].checks, None);
    }

    #[test]
    fn promotion_tally() {
        // A lone pawn one step from promotion: 4 promotions + 5 king moves,
        // two of which (queen and rook) give check.
        let board = Board::from_fen("7k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let report = perft(&board, 1, true).unwrap();
        assert_eq!(report[0].nodes, 9);
        assert_eq!(report[0].promotions, 4);
        assert_eq!(report[0].checks, Some(2));
        assert_eq!(report[0].checkmates, Some(0));
    }

    #[test]
    fn en_passant_tally() {
        let board =
            Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let report = perft(&board, 1, false).unwrap();
        assert_eq!(report[0].en_passants, 1);
    }

    #[test]
    fn castle_tally() {
        let board =
            Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let report = perft(&board, 1, false).unwrap();
        assert_eq!(report[0].castles, 2);
    }

    #[test]
    fn corrupt_position_surfaces_the_error() {
        // Kingside right granted, rook gone.
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w K - 0 1").unwrap();
        assert!(perft(&board, 1, false).is_err());
    }

    #[test]
    fn report_serializes_without_optional_columns() {
        let board = Board::starting();
        let report = perft(&board, 1, false).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"nodes\":20"));
        assert!(!json.contains("checks"));
    }

    #[test]
    fn report_serializes_check_columns_when_requested() {
        let board = Board::starting();
        let report = perft(&board, 1, true).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"checks\":0"));
    }
}
