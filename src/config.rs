use crate::engine::board::Board;

/// Perft runner configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct PerftConfig {
    /// Position to expand from.
    pub fen: String,
    /// Maximum depth to count to.
    pub depth: u32,
    /// Also tally checks and checkmates (much slower).
    pub count_checks: bool,
    /// Emit the report as JSON instead of a table.
    pub json: bool,
}

impl PerftConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        PerftConfig {
            fen: std::env::var("PERFT_FEN").unwrap_or_else(|_| Board::STARTING_FEN.to_string()),
            depth: std::env::var("PERFT_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            count_checks: std::env::var("PERFT_CHECKS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            json: false,
        }
    }
}

impl Default for PerftConfig {
    fn default() -> Self {
        PerftConfig {
            fen: Board::STARTING_FEN.to_string(),
            depth: 3,
            count_checks: false,
            json: false,
        }
    }
}
