//! Search snapshots.
//!
//! An [`Attempt`] is an immutable record of the board at the moment a piece
//! was placed: every placement currently on the board, in placement order.
//! Attempts are what the solver streams to its host while it works, so they
//! carry serialization-friendly piece ids rather than board tags.

use serde::{Deserialize, Serialize};

use crate::geometry::{Cell, Rotation};

/// One placed piece inside an attempt.
///
/// `position` is the board cell the piece's origin cell was translated to,
/// serialized as an `[x, y]` pair. `rotation` serializes as degrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedPiece {
    pub piece_id: String,
    pub position: Cell,
    pub rotation: Rotation,
}

/// A snapshot of the search, identified by a monotonically increasing id.
///
/// `attempt_id` counts placements since the search started, so ids order
/// the attempts by emission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub attempt_id: u64,
    pub placed_pieces: Vec<PlacedPiece>,
}

impl Attempt {
    /// Number of pieces on the board in this snapshot.
    pub fn pieces_placed(&self) -> usize {
        self.placed_pieces.len()
    }
}
