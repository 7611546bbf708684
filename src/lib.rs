//! Placement Puzzle Solver Library
//!
//! Provides the board, pieces, and backtracking search for rectangular
//! placement puzzles, plus the event streams a host uses to watch a run.

pub mod attempt;
pub mod board;
pub mod geometry;
pub mod piece;
pub mod solver;
