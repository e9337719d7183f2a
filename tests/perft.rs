//! Perft — exhaustive move-generation correctness suite.
//!
//! Each test verifies that the number of leaf nodes at a given depth matches
//! known-correct values for standard positions. If perft is wrong at any
//! depth, there is a bug in move generation, move application, or legality
//! filtering. The deeper runs are `#[ignore]`d: correct but slow without
//! optimizations.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use chess_rules::engine::board::Board;
use chess_rules::engine::perft;

fn nodes(fen: &str, depth: u32) -> u64 {
    let board = Board::from_fen(fen).unwrap();
    perft::nodes(&board, depth).unwrap()
}

// =====================================================================
// Position 1 — starting position
// =====================================================================

#[test]
fn perft_start_depth_1() {
    assert_eq!(nodes(Board::STARTING_FEN, 1), 20);
}

#[test]
fn perft_start_depth_2() {
    assert_eq!(nodes(Board::STARTING_FEN, 2), 400);
}

#[test]
fn perft_start_depth_3() {
    assert_eq!(nodes(Board::STARTING_FEN, 3), 8_902);
}

#[test]
#[ignore = "slow without optimizations"]
fn perft_start_depth_4() {
    assert_eq!(nodes(Board::STARTING_FEN, 4), 197_281);
}

#[test]
fn perft_start_depth_3_details() {
    let board = Board::starting();
    let report = perft::perft(&board, 3, false).unwrap();
    assert_eq!(report[2].nodes, 8_902);
    assert_eq!(report[2].captures, 34);
    assert_eq!(report[2].en_passants, 0);
    assert_eq!(report[2].castles, 0);
    assert_eq!(report[2].promotions, 0);
}

#[test]
fn perft_start_depth_2_checks() {
    let board = Board::starting();
    let report = perft::perft(&board, 2, true).unwrap();
    assert_eq!(report[1].nodes, 400);
    assert_eq!(report[1].checks, Some(0));
    assert_eq!(report[1].checkmates, Some(0));
}

// =====================================================================
// Position 2 — "Kiwipete" (castling, en passant, pins, promotions)
// =====================================================================

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[test]
fn perft_kiwipete_depth_1() {
    assert_eq!(nodes(KIWIPETE, 1), 48);
}

#[test]
fn perft_kiwipete_depth_2() {
    assert_eq!(nodes(KIWIPETE, 2), 2_039);
}

#[test]
#[ignore = "slow without optimizations"]
fn perft_kiwipete_depth_3() {
    assert_eq!(nodes(KIWIPETE, 3), 97_862);
}

#[test]
fn perft_kiwipete_depth_2_details() {
    let board = Board::from_fen(KIWIPETE).unwrap();
    let report = perft::perft(&board, 2, false).unwrap();
    assert_eq!(report[0].captures, 8);
    assert_eq!(report[0].castles, 2);
    assert_eq!(report[1].captures, 351);
    assert_eq!(report[1].en_passants, 1);
    assert_eq!(report[1].castles, 91);
    assert_eq!(report[1].promotions, 0);
}

// =====================================================================
// Position 3 — rook endgame with en passant traps
// =====================================================================

const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

#[test]
fn perft_pos3_depth_1() {
    assert_eq!(nodes(POSITION_3, 1), 14);
}

#[test]
fn perft_pos3_depth_2() {
    assert_eq!(nodes(POSITION_3, 2), 191);
}

#[test]
fn perft_pos3_depth_3() {
    assert_eq!(nodes(POSITION_3, 3), 2_812);
}

#[test]
#[ignore = "slow without optimizations"]
fn perft_pos3_depth_4() {
    assert_eq!(nodes(POSITION_3, 4), 43_238);
}

#[test]
fn perft_pos3_depth_3_details() {
    let board = Board::from_fen(POSITION_3).unwrap();
    let report = perft::perft(&board, 3, false).unwrap();
    assert_eq!(report[2].captures, 209);
    assert_eq!(report[2].en_passants, 2);
}

// =====================================================================
// Position 4 — promotion-heavy middlegame
// =====================================================================

const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

#[test]
fn perft_pos4_depth_1() {
    assert_eq!(nodes(POSITION_4, 1), 6);
}

#[test]
fn perft_pos4_depth_2() {
    assert_eq!(nodes(POSITION_4, 2), 264);
}

#[test]
#[ignore = "slow without optimizations"]
fn perft_pos4_depth_3() {
    assert_eq!(nodes(POSITION_4, 3), 9_467);
}

// =====================================================================
// Position 5 — underpromotion tactics
// =====================================================================

const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

#[test]
fn perft_pos5_depth_1() {
    assert_eq!(nodes(POSITION_5, 1), 44);
}

#[test]
fn perft_pos5_depth_2() {
    assert_eq!(nodes(POSITION_5, 2), 1_486);
}

#[test]
#[ignore = "slow without optimizations"]
fn perft_pos5_depth_3() {
    assert_eq!(nodes(POSITION_5, 3), 62_379);
}
