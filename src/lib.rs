//! A from-scratch chess rules engine.
//!
//! Given a position, the engine produces the complete legal move list for
//! the side to move, applies any move (castling, en passant, and promotion
//! included) to produce the successor position, and classifies results as
//! check or checkmate. Positions are imported and exported as FEN; moves
//! carry standard algebraic notation with disambiguation. A recursive perft
//! verifier validates move generation against published reference counts.
//!
//! There is no search or evaluation here — front ends are expected to call
//! in with a position, render the legal move list, and advance the game by
//! keeping the board embedded in the chosen move.
//!
//! ```
//! use chess_rules::engine::{rulebook, Board, Color};
//!
//! let board = Board::starting();
//! let moves = rulebook::legal_moves(Color::White, &board)?;
//! assert_eq!(moves.len(), 20);
//!
//! // Advance by picking a move; its stored board is the next position.
//! let opening = rulebook::find_coordinate(&moves, "e2e4").unwrap();
//! let next = opening.resulting_board().unwrap();
//! assert_eq!(next.side_to_move, Color::Black);
//! # Ok::<(), chess_rules::engine::ChessError>(())
//! ```

pub mod config;
pub mod engine;
