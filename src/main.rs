//! Placement Puzzle Solver
//!
//! Fits a set of puzzle pieces onto a rectangular board. Shapes come from
//! the built-in catalog; the search streams attempts and progress while it
//! runs and the best arrangement is printed at the end.

mod shapes;

use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use rustc_hash::FxHashMap;

use tiler::attempt::Attempt;
use tiler::board::{board_from_attempt, tag_letter, Board};
use tiler::piece::Piece;
use tiler::solver::{Progress, SearchConfig, Solver};

/// Fits puzzle pieces onto a rectangular board.
#[derive(Parser)]
#[command(name = "tiler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    args: SolveArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a board with the given pieces.
    Solve(SolveArgs),
    /// List the built-in shapes.
    Shapes,
}

#[derive(Args)]
struct SolveArgs {
    /// Board size as WIDTHxHEIGHT.
    #[arg(long, default_value = "4x4")]
    board: String,

    /// Comma-separated shape names; repeat a name for multiple copies.
    #[arg(long, default_value = "O4,O4,I4,I4")]
    pieces: String,

    /// Stop the search after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Print every attempt snapshot as it arrives.
    #[arg(long)]
    attempts: bool,

    /// Emit events and the final result as JSON lines on stdout.
    #[arg(long)]
    json: bool,

    /// Milliseconds between progress reports.
    #[arg(long, default_value_t = 100)]
    progress_interval: u64,

    /// Backtracks between cooperative yields; 0 disables yielding.
    #[arg(long, default_value_t = 50)]
    yield_every: u32,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let status = match cli.command {
        Some(Command::Solve(args)) => run_solve(args),
        Some(Command::Shapes) => run_shapes(),
        // default: solve
        None => run_solve(cli.args),
    };
    if let Err(message) = status {
        eprintln!("{message}");
        std::process::exit(2);
    }
}

/// Runs a search and consumes both event streams until it finishes.
fn run_solve(args: SolveArgs) -> Result<(), String> {
    let board = parse_board(&args.board)?;
    let pieces = parse_pieces(&args.pieces)?;
    let total = pieces.len();
    let config = SearchConfig {
        progress_interval: Duration::from_millis(args.progress_interval),
        yield_after_backtracks: args.yield_every,
        ..SearchConfig::default()
    };

    let mut solver = Solver::new(config);
    let events = solver
        .start(&board, pieces.clone())
        .map_err(|error| error.to_string())?;

    let deadline = args
        .timeout
        .map(|seconds| Instant::now() + Duration::from_secs(seconds));
    let mut deadline_hit = false;
    loop {
        if let Some(deadline) = deadline {
            if !deadline_hit && Instant::now() >= deadline {
                if !args.json {
                    eprintln!("timeout reached, stopping");
                }
                solver.stop();
                deadline_hit = true;
            }
        }
        while let Ok(sample) = events.progress.try_recv() {
            report_progress(&sample, total, args.json);
        }
        // The attempt stream must be drained even when it is not printed;
        // the search pauses once its buffer fills.
        match events.attempts.recv_timeout(Duration::from_millis(20)) {
            Ok(attempt) => {
                if args.attempts {
                    report_attempt(&attempt, args.json);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    while let Ok(sample) = events.progress.try_recv() {
        report_progress(&sample, total, args.json);
    }

    let result = solver
        .join()
        .ok_or_else(|| "the search returned no result".to_string())?;

    if args.json {
        if let Ok(line) = serde_json::to_string(&result) {
            println!("{line}");
        }
        return Ok(());
    }

    println!(
        "{} in {} ms: {} of {} pieces placed, {} attempts, {} backtracks",
        result.outcome,
        result.elapsed.as_millis(),
        result.pieces_placed(),
        total,
        result.attempts,
        result.backtracks
    );
    if let Some(best) = &result.best {
        match board_from_attempt(board.width(), board.height(), &pieces, best) {
            Some(arrangement) => {
                println!("{arrangement}");
                for (tag, placed) in best.placed_pieces.iter().enumerate() {
                    println!("  {} = {}", tag_letter(tag as u16), placed.piece_id);
                }
            }
            None => eprintln!("best attempt no longer replays onto the board"),
        }
    }
    Ok(())
}

/// Prints the catalog with a small picture of each template.
fn run_shapes() -> Result<(), String> {
    for shape in shapes::SHAPES {
        let piece = shape.piece(shape.name).map_err(|error| error.to_string())?;
        let turns = if shape.rotatable { "rotatable" } else { "fixed" };
        println!("{} ({} cells, {})", piece.id(), piece.size(), turns);
        for line in shapes::picture(&piece).lines() {
            println!("  {line}");
        }
        println!();
    }
    Ok(())
}

fn report_progress(sample: &Progress, total: usize, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(sample) {
            println!("{line}");
        }
    } else {
        eprintln!(
            "[{:>6} ms] {}/{} pieces placed, {} backtracks",
            sample.elapsed.as_millis(),
            sample.current_depth,
            total,
            sample.backtracks
        );
    }
}

fn report_attempt(attempt: &Attempt, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(attempt) {
            println!("{line}");
        }
    } else {
        println!(
            "attempt {:>6}: {} pieces placed",
            attempt.attempt_id,
            attempt.pieces_placed()
        );
    }
}

/// Parses a WIDTHxHEIGHT board size.
fn parse_board(size: &str) -> Result<Board, String> {
    let (width, height) = size
        .split_once('x')
        .or_else(|| size.split_once('X'))
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {size:?}"))?;
    let width = width
        .trim()
        .parse()
        .map_err(|_| format!("bad width in {size:?}"))?;
    let height = height
        .trim()
        .parse()
        .map_err(|_| format!("bad height in {size:?}"))?;
    Board::new(width, height).map_err(|error| error.to_string())
}

/// Builds pieces from a comma-separated list of catalog names. Repeated
/// names get distinct ids: O4-1, O4-2, ...
fn parse_pieces(list: &str) -> Result<Vec<Piece>, String> {
    let mut ordinals: FxHashMap<&str, u32> = FxHashMap::default();
    let mut pieces = Vec::new();
    for name in list.split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let shape = shapes::find(name)
            .ok_or_else(|| format!("unknown shape {name:?}, see 'tiler shapes'"))?;
        let ordinal = ordinals.entry(shape.name).or_insert(0);
        *ordinal += 1;
        let piece = shape
            .piece(format!("{}-{}", shape.name, ordinal))
            .map_err(|error| error.to_string())?;
        pieces.push(piece);
    }
    if pieces.is_empty() {
        return Err("no pieces given".to_string());
    }
    Ok(pieces)
}
