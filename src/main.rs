use chess_rules::config::PerftConfig;
use chess_rules::engine::board::Board;
use chess_rules::engine::perft::{self, DepthTotals};

const USAGE: &str = "usage: chess-perft [--checks] [--json] [DEPTH] [FEN]";

fn main() {
    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_rules=info".into()),
        )
        .init();

    let mut config = PerftConfig::from_env();

    let mut positional: Vec<String> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--checks" => config.count_checks = true,
            "--json" => config.json = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return;
            }
            _ => positional.push(arg),
        }
    }

    if let Some(depth_arg) = positional.first() {
        match depth_arg.parse::<u32>() {
            Ok(depth) => config.depth = depth,
            Err(_) => {
                eprintln!("invalid depth '{depth_arg}'\n{USAGE}");
                std::process::exit(2);
            }
        }
    }
    // FEN contains spaces, so the remaining arguments are joined back up.
    if positional.len() > 1 {
        config.fen = positional[1..].join(" ");
    }

    let board = match Board::from_fen(&config.fen) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        depth = config.depth,
        checks = config.count_checks,
        "running perft on {}",
        config.fen
    );

    let start = std::time::Instant::now();
    let report = match perft::perft(&board, config.depth, config.count_checks) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if config.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("failed to serialize report: {err}");
                std::process::exit(1);
            }
        }
    } else {
        print_table(&report);
    }

    tracing::info!("perft finished in {} ms", elapsed.as_millis());
}

fn print_table(report: &[DepthTotals]) {
    println!(
        "{:>5} {:>12} {:>10} {:>11} {:>8} {:>10} {:>8} {:>10}",
        "depth", "nodes", "captures", "en passant", "castles", "promotions", "checks", "checkmates"
    );
    for row in report {
        println!(
            "{:>5} {:>12} {:>10} {:>11} {:>8} {:>10} {:>8} {:>10}",
            row.depth,
            row.nodes,
            row.captures,
            row.en_passants,
            row.castles,
            row.promotions,
            row.checks.map_or(String::new(), |n| n.to_string()),
            row.checkmates.map_or(String::new(), |n| n.to_string()),
        );
    }
}
