//! Backtracking placement search.
//!
//! The search walks the pieces in a fixed order (largest first) and, for
//! each piece, tries every orientation at every board position in row-major
//! order. Each successful placement is published as an [`Attempt`] snapshot
//! before the search descends; when a branch dead-ends the placement is
//! undone and the scan continues from the next candidate.
//!
//! The search runs on a worker thread owned by [`Solver`]. Hosts observe it
//! through two channels: a bounded one for attempt snapshots (a host that
//! keeps the receiver alive and stops draining it will pause the search
//! once the buffer fills) and an unbounded one for periodic [`Progress`]
//! samples taken by a separate reporter thread. Cancellation is a shared
//! flag the recursion polls at every node and before every candidate.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::attempt::{Attempt, PlacedPiece};
use crate::board::Board;
use crate::geometry::{Cell, Rotation};
use crate::piece::Piece;

/// A piece orientation the solver will try: the rotation and its cell image.
type Orientation = (Rotation, Vec<Cell>);

/// Pacing knobs for a search run.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// How often the reporter thread samples the running search.
    pub progress_interval: Duration,
    /// The worker yields its timeslice after this many backtracks; 0
    /// disables the yield.
    pub yield_after_backtracks: u32,
    /// Capacity of the attempt channel.
    pub attempt_buffer: usize,
}

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig {
            progress_interval: Duration::from_millis(100),
            yield_after_backtracks: 50,
            attempt_buffer: 256,
        }
    }
}

/// How a search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Every piece was placed.
    Solved,
    /// The whole space was searched without placing every piece.
    Exhausted,
    /// The stop flag was raised before the search could finish.
    Cancelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Solved => "solved",
            Outcome::Exhausted => "exhausted",
            Outcome::Cancelled => "cancelled",
        })
    }
}

/// Final report of a search run.
///
/// `best` is the snapshot with the most pieces placed, `None` when not a
/// single piece ever fit. All three outcomes carry whatever best the run
/// accumulated before it ended.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub outcome: Outcome,
    pub best: Option<Attempt>,
    /// Total placements tried, equal to the last attempt id issued.
    pub attempts: u64,
    /// Total placements undone.
    pub backtracks: u64,
    #[serde(rename = "elapsedMs", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl SearchResult {
    /// Pieces placed in the best snapshot, 0 when there is none.
    pub fn pieces_placed(&self) -> usize {
        self.best.as_ref().map_or(0, Attempt::pieces_placed)
    }
}

/// A periodic sample of a running search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Pieces placed in the best snapshot so far.
    pub current_depth: usize,
    pub backtracks: u64,
    /// Pieces the best snapshot has not placed.
    pub remaining_pieces: usize,
    #[serde(rename = "elapsedMs", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

/// Rejected search starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("a search is already running")]
    AlreadyRunning,
    #[error("no pieces to place")]
    NoPieces,
    #[error("duplicate piece id {0:?}")]
    DuplicatePieceId(String),
    #[error("{0} pieces exceed the supported maximum of 65535")]
    TooManyPieces(usize),
}

/// The event streams of a running search.
///
/// Dropping a receiver only stops delivery; the search keeps running and
/// its [`SearchResult`] stays authoritative.
#[derive(Debug)]
pub struct SearchEvents {
    pub attempts: Receiver<Attempt>,
    pub progress: Receiver<Progress>,
}

/// Counters the worker publishes and the reporter thread samples.
///
/// The samples are deliberately unsynchronized with the recursion; a
/// progress event may mix values from adjacent search steps.
#[derive(Debug, Default)]
struct Shared {
    stop: AtomicBool,
    best_placed: AtomicUsize,
    backtracks: AtomicU64,
}

/// Owns a search worker and its cancellation flag.
///
/// A `Solver` runs one search at a time but can be reused: once a run has
/// finished (or been stopped and joined), `start` accepts a new one.
pub struct Solver {
    config: SearchConfig,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<SearchResult>>,
}

impl Solver {
    pub fn new(config: SearchConfig) -> Solver {
        Solver {
            config,
            shared: Arc::new(Shared::default()),
            worker: None,
        }
    }

    /// Starts a search over a copy of `board` on a worker thread.
    ///
    /// Fails if a run is still in flight or the piece list is invalid. The
    /// returned [`SearchEvents`] is the only handle to the event streams;
    /// the run itself is collected with [`Solver::join`].
    pub fn start(&mut self, board: &Board, pieces: Vec<Piece>) -> Result<SearchEvents, StartError> {
        if self.is_running() {
            return Err(StartError::AlreadyRunning);
        }
        // Reap a finished run that was never joined.
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        validate(&pieces)?;

        let set = PieceSet::build(pieces);
        self.shared = Arc::new(Shared::default());
        let (attempt_tx, attempts) = mpsc::sync_channel(self.config.attempt_buffer);
        let (progress_tx, progress) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let started = Instant::now();

        spawn_reporter(
            Arc::clone(&self.shared),
            set.pieces.len(),
            self.config.progress_interval,
            started,
            progress_tx,
            done_rx,
        );

        let board = board.clone();
        let config = self.config;
        let shared = Arc::clone(&self.shared);
        self.worker = Some(thread::spawn(move || {
            // Held for the whole run; dropping it on return tells the
            // reporter to exit.
            let _done = done_tx;
            run_search(board, set, config, shared, Some(attempt_tx), started)
        }));
        Ok(SearchEvents { attempts, progress })
    }

    /// Raises the stop flag. The running search winds down at its next
    /// cancellation check; a finished or never-started solver ignores this.
    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    /// Waits for the worker and returns its result, or `None` when no run
    /// was started since the last join.
    pub fn join(&mut self) -> Option<SearchResult> {
        self.worker
            .take()
            .map(|worker| worker.join().expect("search worker panicked"))
    }
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::new(SearchConfig::default())
    }
}

impl Drop for Solver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs a search to completion on the calling thread, without event
/// streams. This is the convenience entry for hosts that only want the
/// final result.
pub fn solve(
    board: &Board,
    pieces: Vec<Piece>,
    config: &SearchConfig,
) -> Result<SearchResult, StartError> {
    validate(&pieces)?;
    let set = PieceSet::build(pieces);
    let shared = Arc::new(Shared::default());
    Ok(run_search(
        board.clone(),
        set,
        *config,
        shared,
        None,
        Instant::now(),
    ))
}

fn validate(pieces: &[Piece]) -> Result<(), StartError> {
    if pieces.is_empty() {
        return Err(StartError::NoPieces);
    }
    if pieces.len() > usize::from(u16::MAX) {
        return Err(StartError::TooManyPieces(pieces.len()));
    }
    let mut seen = FxHashSet::default();
    for piece in pieces {
        if !seen.insert(piece.id()) {
            return Err(StartError::DuplicatePieceId(piece.id().to_string()));
        }
    }
    Ok(())
}

fn spawn_reporter(
    shared: Arc<Shared>,
    total_pieces: usize,
    interval: Duration,
    started: Instant,
    progress_tx: Sender<Progress>,
    done_rx: Receiver<()>,
) {
    thread::spawn(move || loop {
        match done_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let best = shared.best_placed.load(Ordering::Relaxed);
                let sample = Progress {
                    current_depth: best,
                    backtracks: shared.backtracks.load(Ordering::Relaxed),
                    remaining_pieces: total_pieces - best,
                    elapsed: started.elapsed(),
                };
                if progress_tx.send(sample).is_err() {
                    // Nobody is listening any more.
                    return;
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
    });
}

/// The fixed inputs of a run: pieces in solving order plus their
/// precomputed orientations.
struct PieceSet {
    pieces: Vec<Piece>,
    /// Indexed like `pieces`; one entry per orientation the piece allows.
    orientations: Vec<Vec<Orientation>>,
    /// Cell count of the smallest piece. The sort is descending, so this
    /// bounds the pruning check at every depth.
    smallest_size: usize,
}

impl PieceSet {
    fn build(mut pieces: Vec<Piece>) -> PieceSet {
        // Stable: equal-size pieces keep their input order.
        pieces.sort_by_key(|piece| std::cmp::Reverse(piece.size()));
        let orientations = pieces
            .iter()
            .map(|piece| {
                piece
                    .rotations()
                    .iter()
                    .map(|&rotation| (rotation, piece.cells_at(rotation)))
                    .collect()
            })
            .collect();
        let smallest_size = pieces.last().map_or(0, Piece::size);
        PieceSet {
            pieces,
            orientations,
            smallest_size,
        }
    }
}

/// Mutable state of a run in progress.
struct Search {
    board: Board,
    placed: Vec<PlacedPiece>,
    attempts: u64,
    backtracks: u64,
    backtracks_since_yield: u32,
    best: Option<Attempt>,
    attempt_tx: Option<SyncSender<Attempt>>,
    shared: Arc<Shared>,
    config: SearchConfig,
}

fn run_search(
    board: Board,
    set: PieceSet,
    config: SearchConfig,
    shared: Arc<Shared>,
    attempt_tx: Option<SyncSender<Attempt>>,
    started: Instant,
) -> SearchResult {
    log::debug!(
        "search started: {} pieces on a {}x{} board",
        set.pieces.len(),
        board.width(),
        board.height()
    );
    let mut search = Search {
        board,
        placed: Vec::with_capacity(set.pieces.len()),
        attempts: 0,
        backtracks: 0,
        backtracks_since_yield: 0,
        best: None,
        attempt_tx,
        shared,
        config,
    };
    let outcome = search.descend(&set, 0);
    log::debug!(
        "search finished: {:?} after {} attempts and {} backtracks",
        outcome,
        search.attempts,
        search.backtracks
    );
    SearchResult {
        outcome,
        best: search.best,
        attempts: search.attempts,
        backtracks: search.backtracks,
        elapsed: started.elapsed(),
    }
}

impl Search {
    /// Places `set.pieces[depth..]`, one piece per recursion level.
    ///
    /// `Solved` and `Cancelled` unwind immediately, leaving the board as it
    /// stood; `Exhausted` means this subtree held no full placement and the
    /// caller's board is back to its pre-call state.
    fn descend(&mut self, set: &PieceSet, depth: usize) -> Outcome {
        if self.stop_requested() {
            return Outcome::Cancelled;
        }
        if depth == set.pieces.len() {
            return Outcome::Solved;
        }
        // A hole smaller than every remaining piece can never be filled.
        if self.board.smallest_empty_region() < set.smallest_size {
            return Outcome::Exhausted;
        }

        let piece = &set.pieces[depth];
        for (rotation, cells) in &set.orientations[depth] {
            for y in 0..self.board.height() as i32 {
                for x in 0..self.board.width() as i32 {
                    if self.stop_requested() {
                        return Outcome::Cancelled;
                    }
                    let anchor = (x, y);
                    if !self.board.can_place(cells, anchor) {
                        continue;
                    }
                    self.board.place(cells, anchor, depth as u16);
                    self.placed.push(PlacedPiece {
                        piece_id: piece.id().to_string(),
                        position: anchor,
                        rotation: *rotation,
                    });
                    self.record_attempt();
                    match self.descend(set, depth + 1) {
                        Outcome::Exhausted => {
                            self.board.remove(cells, anchor);
                            self.placed.pop();
                            self.note_backtrack();
                        }
                        done => return done,
                    }
                }
            }
        }
        Outcome::Exhausted
    }

    fn stop_requested(&self) -> bool {
        self.shared.stop.load(Ordering::Relaxed)
    }

    /// Snapshots the current placements, updates the best, and publishes
    /// the snapshot.
    fn record_attempt(&mut self) {
        self.attempts += 1;
        let attempt = Attempt {
            attempt_id: self.attempts,
            placed_pieces: self.placed.clone(),
        };
        if attempt.pieces_placed() > self.best.as_ref().map_or(0, Attempt::pieces_placed) {
            log::debug!(
                "new best: {} pieces placed at attempt {}",
                attempt.pieces_placed(),
                attempt.attempt_id
            );
            self.shared
                .best_placed
                .store(attempt.pieces_placed(), Ordering::Relaxed);
            self.best = Some(attempt.clone());
        }
        if let Some(tx) = &self.attempt_tx {
            // A closed channel means the host dropped its receiver; keep
            // searching, stop publishing.
            if tx.send(attempt).is_err() {
                self.attempt_tx = None;
            }
        }
    }

    fn note_backtrack(&mut self) {
        self.backtracks += 1;
        self.shared.backtracks.store(self.backtracks, Ordering::Relaxed);
        if self.config.yield_after_backtracks > 0 {
            self.backtracks_since_yield += 1;
            if self.backtracks_since_yield >= self.config.yield_after_backtracks {
                self.backtracks_since_yield = 0;
                thread::yield_now();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::board_from_attempt;

    fn piece(id: &str, cells: &[Cell], rotatable: bool) -> Piece {
        Piece::new(id, cells.to_vec(), rotatable).unwrap()
    }

    fn square(id: &str) -> Piece {
        piece(id, &[(0, 0), (1, 0), (0, 1), (1, 1)], false)
    }

    fn line4(id: &str) -> Piece {
        piece(id, &[(0, 0), (1, 0), (2, 0), (3, 0)], true)
    }

    /// Fourteen 5-cell bars on an 8x8 board: 70 cells can never fit into
    /// 64, and the space is far too large to exhaust in test time.
    fn endless_config() -> (Board, Vec<Piece>) {
        let board = Board::new(8, 8).unwrap();
        let pieces = (0..14)
            .map(|i| {
                piece(
                    &format!("bar-{i}"),
                    &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)],
                    true,
                )
            })
            .collect();
        (board, pieces)
    }

    #[test]
    fn test_square_and_line_solve_a_4x4_board() {
        let board = Board::new(4, 4).unwrap();
        let pieces = vec![square("block"), line4("line")];
        let result = solve(&board, pieces.clone(), &SearchConfig::default()).unwrap();

        assert_eq!(result.outcome, Outcome::Solved);
        assert_eq!(result.attempts, 2);
        assert_eq!(result.backtracks, 0);
        let best = result.best.unwrap();
        assert_eq!(best.pieces_placed(), 2);
        assert_eq!(best.placed_pieces[0].piece_id, "block");
        assert_eq!(best.placed_pieces[0].position, (0, 0));
        assert_eq!(best.placed_pieces[0].rotation, Rotation::R0);
        assert_eq!(best.placed_pieces[1].piece_id, "line");
        assert_eq!(best.placed_pieces[1].position, (0, 2));
        assert!(board_from_attempt(4, 4, &pieces, &best).is_some());
    }

    #[test]
    fn test_line_never_fits_a_2x2_board() {
        let board = Board::new(2, 2).unwrap();
        let result = solve(&board, vec![line4("line")], &SearchConfig::default()).unwrap();

        assert_eq!(result.outcome, Outcome::Exhausted);
        assert!(result.best.is_none());
        assert_eq!(result.pieces_placed(), 0);
        assert_eq!(result.attempts, 0);
        assert_eq!(result.backtracks, 0);
    }

    #[test]
    fn test_partial_best_survives_exhaustion() {
        // The square fits a 3x3 board in four positions; the line fits
        // nowhere. Each square placement is tried and undone, and the
        // earliest of the equally good snapshots is kept.
        let board = Board::new(3, 3).unwrap();
        let result = solve(
            &board,
            vec![square("square"), line4("line")],
            &SearchConfig::default(),
        )
        .unwrap();

        assert_eq!(result.outcome, Outcome::Exhausted);
        assert_eq!(result.attempts, 4);
        assert_eq!(result.backtracks, 4);
        let best = result.best.unwrap();
        assert_eq!(best.pieces_placed(), 1);
        assert_eq!(best.attempt_id, 1);
        assert_eq!(best.placed_pieces[0].position, (0, 0));
    }

    #[test]
    fn test_disabled_yield_still_counts_backtracks() {
        let board = Board::new(3, 3).unwrap();
        let config = SearchConfig {
            yield_after_backtracks: 0,
            ..SearchConfig::default()
        };
        let result = solve(&board, vec![square("square"), line4("line")], &config).unwrap();

        assert_eq!(result.outcome, Outcome::Exhausted);
        assert_eq!(result.attempts, 4);
        assert_eq!(result.backtracks, 4);
    }

    #[test]
    fn test_pieces_sorted_largest_first_with_stable_ties() {
        // Input order: single, domino, single. The domino must be placed
        // first, the singles keep their relative order.
        let board = Board::new(4, 1).unwrap();
        let pieces = vec![
            piece("first", &[(0, 0)], false),
            piece("wide", &[(0, 0), (1, 0)], false),
            piece("second", &[(0, 0)], false),
        ];
        let result = solve(&board, pieces, &SearchConfig::default()).unwrap();

        assert_eq!(result.outcome, Outcome::Solved);
        let best = result.best.as_ref().unwrap();
        let ids: Vec<&str> = best
            .placed_pieces
            .iter()
            .map(|placed| placed.piece_id.as_str())
            .collect();
        assert_eq!(ids, ["wide", "first", "second"]);
    }

    #[test]
    fn test_exact_tiling_fills_every_cell() {
        // Two corner trominoes and a domino tile a 4x2 board exactly.
        let board = Board::new(4, 2).unwrap();
        let pieces = vec![
            piece("corner-a", &[(0, 0), (1, 0), (0, 1)], true),
            piece("corner-b", &[(0, 0), (1, 0), (0, 1)], true),
            piece("bar", &[(0, 0), (1, 0)], true),
        ];
        let result = solve(&board, pieces.clone(), &SearchConfig::default()).unwrap();

        assert_eq!(result.outcome, Outcome::Solved);
        let best = result.best.unwrap();
        let replayed = board_from_attempt(4, 2, &pieces, &best).unwrap();
        // A full board reports its total cell count as the smallest region.
        assert_eq!(replayed.smallest_empty_region(), 8);
    }

    #[test]
    fn test_agrees_with_unpruned_reference_on_small_boards() {
        fn reference(board: &mut Board, pieces: &[Piece], depth: usize) -> bool {
            if depth == pieces.len() {
                return true;
            }
            let piece = &pieces[depth];
            for &rotation in piece.rotations() {
                let cells = piece.cells_at(rotation);
                for y in 0..board.height() as i32 {
                    for x in 0..board.width() as i32 {
                        if board.can_place(&cells, (x, y)) {
                            board.place(&cells, (x, y), depth as u16);
                            if reference(board, pieces, depth + 1) {
                                return true;
                            }
                            board.remove(&cells, (x, y));
                        }
                    }
                }
            }
            false
        }

        let configs: Vec<(usize, usize, Vec<Piece>)> = vec![
            (
                4,
                2,
                vec![
                    piece("a", &[(0, 0), (1, 0), (0, 1)], true),
                    piece("b", &[(0, 0), (1, 0), (0, 1)], true),
                    piece("c", &[(0, 0), (1, 0)], true),
                ],
            ),
            (3, 3, vec![square("a"), line4("b")]),
            (2, 2, vec![square("a")]),
            (
                2,
                3,
                vec![
                    piece("a", &[(0, 0), (1, 0), (2, 0)], true),
                    piece("b", &[(0, 0), (1, 0), (2, 0)], true),
                ],
            ),
        ];
        for (width, height, pieces) in configs {
            let board = Board::new(width, height).unwrap();
            let mut scratch = board.clone();
            let expected = reference(&mut scratch, &pieces, 0);
            let result = solve(&board, pieces, &SearchConfig::default()).unwrap();
            assert_eq!(
                result.outcome == Outcome::Solved,
                expected,
                "disagreement on the {width}x{height} board"
            );
        }
    }

    #[test]
    fn test_streams_every_attempt_in_order() {
        let board = Board::new(3, 3).unwrap();
        let pieces = vec![square("square"), line4("line")];
        let mut solver = Solver::default();
        let events = solver.start(&board, pieces).unwrap();

        let attempts: Vec<Attempt> = events.attempts.iter().collect();
        let result = solver.join().unwrap();

        let ids: Vec<u64> = attempts.iter().map(|attempt| attempt.attempt_id).collect();
        assert_eq!(ids, [1, 2, 3, 4]);
        assert!(attempts.iter().all(|attempt| attempt.pieces_placed() == 1));
        assert_eq!(result.outcome, Outcome::Exhausted);
        assert_eq!(result.attempts, 4);
        assert!(!solver.is_running());
    }

    #[test]
    fn test_running_best_is_monotonic() {
        let board = Board::new(4, 4).unwrap();
        let pieces = vec![
            square("block-a"),
            square("block-b"),
            line4("line-a"),
            line4("line-b"),
        ];
        let mut solver = Solver::default();
        let events = solver.start(&board, pieces).unwrap();

        let mut running_best = 0;
        let mut last_id = 0;
        for attempt in events.attempts.iter() {
            assert!(attempt.attempt_id > last_id);
            last_id = attempt.attempt_id;
            running_best = running_best.max(attempt.pieces_placed());
        }
        let result = solver.join().unwrap();
        assert_eq!(result.outcome, Outcome::Solved);
        assert_eq!(result.pieces_placed(), running_best);
        assert_eq!(result.attempts, last_id);
    }

    #[test]
    fn test_stop_cancels_and_the_solver_restarts() {
        let (board, pieces) = endless_config();
        let mut solver = Solver::default();
        let events = solver.start(&board, pieces.clone()).unwrap();
        assert!(solver.is_running());
        assert_eq!(
            solver.start(&board, pieces).unwrap_err(),
            StartError::AlreadyRunning
        );

        drop(events);
        solver.stop();
        let result = solver.join().unwrap();
        assert_eq!(result.outcome, Outcome::Cancelled);

        // The same instance accepts a fresh run afterwards.
        let board = Board::new(2, 2).unwrap();
        let events = solver.start(&board, vec![square("square")]).unwrap();
        let attempts: Vec<Attempt> = events.attempts.iter().collect();
        let result = solver.join().unwrap();
        assert_eq!(result.outcome, Outcome::Solved);
        assert_eq!(attempts.len(), 1);
        assert_eq!(result.pieces_placed(), 1);
    }

    #[test]
    fn test_attempts_drained_across_a_stop_replay_cleanly() {
        let (board, pieces) = endless_config();
        let mut solver = Solver::default();
        let events = solver.start(&board, pieces.clone()).unwrap();

        let mut seen = 0u64;
        for attempt in events.attempts.iter() {
            assert_eq!(attempt.attempt_id, seen + 1);
            board_from_attempt(8, 8, &pieces, &attempt)
                .expect("delivered attempt does not replay onto an empty board");
            seen += 1;
            if seen == 300 {
                solver.stop();
            }
            // Keep draining after the stop: the worker may be parked on the
            // full attempt channel and has to reach its next cancellation
            // check.
        }
        assert!(seen >= 300);
        let result = solver.join().unwrap();
        assert_eq!(result.outcome, Outcome::Cancelled);
        assert_eq!(result.attempts, seen);
    }

    #[test]
    fn test_progress_samples_the_running_search() {
        let (board, pieces) = endless_config();
        let total = pieces.len();
        let mut solver = Solver::new(SearchConfig {
            progress_interval: Duration::from_millis(2),
            ..SearchConfig::default()
        });
        let events = solver.start(&board, pieces).unwrap();

        let first = events
            .progress
            .recv_timeout(Duration::from_secs(10))
            .expect("no progress sample arrived");
        assert_eq!(first.current_depth + first.remaining_pieces, total);

        drop(events);
        solver.stop();
        let result = solver.join().unwrap();
        assert_eq!(result.outcome, Outcome::Cancelled);
        assert!(result.backtracks >= first.backtracks);
    }

    #[test]
    fn test_rejects_empty_and_duplicate_piece_lists() {
        let board = Board::new(2, 2).unwrap();
        assert_eq!(
            solve(&board, vec![], &SearchConfig::default()).unwrap_err(),
            StartError::NoPieces
        );

        let twins = vec![piece("twin", &[(0, 0)], true), piece("twin", &[(0, 0)], true)];
        assert_eq!(
            solve(&board, twins, &SearchConfig::default()).unwrap_err(),
            StartError::DuplicatePieceId("twin".to_string())
        );
    }

    #[test]
    fn test_rejects_more_pieces_than_tags() {
        let board = Board::new(2, 2).unwrap();
        let crowd: Vec<Piece> = (0..=u16::MAX as usize)
            .map(|i| piece(&format!("p-{i}"), &[(0, 0)], false))
            .collect();
        let count = crowd.len();
        assert_eq!(
            solve(&board, crowd, &SearchConfig::default()).unwrap_err(),
            StartError::TooManyPieces(count)
        );
    }

    #[test]
    fn test_progress_wire_shape() {
        let sample = Progress {
            current_depth: 3,
            backtracks: 120,
            remaining_pieces: 2,
            elapsed: Duration::from_millis(450),
        };
        assert_eq!(
            serde_json::to_value(&sample).unwrap(),
            serde_json::json!({
                "currentDepth": 3,
                "backtracks": 120,
                "remainingPieces": 2,
                "elapsedMs": 450,
            })
        );
    }

    #[test]
    fn test_result_wire_shape() {
        let result = SearchResult {
            outcome: Outcome::Exhausted,
            best: None,
            attempts: 12,
            backtracks: 12,
            elapsed: Duration::from_millis(3),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "outcome": "exhausted",
                "best": null,
                "attempts": 12,
                "backtracks": 12,
                "elapsedMs": 3,
            })
        );
    }
}
