//! Puzzle pieces.
//!
//! A piece is a named set of cell offsets. The offsets are anchored at an
//! arbitrary origin cell; the solver translates them onto the board when it
//! tries a placement. Rotations never mutate a piece, they are applied on
//! the fly through [`Piece::cells_at`].

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::geometry::{Cell, Rotation};

/// A placeable piece: an id, a cell list, and a rotation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    id: String,
    cells: Vec<Cell>,
    rotatable: bool,
}

/// Rejected piece definitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PieceError {
    #[error("piece {id:?} has no cells")]
    EmptyCells { id: String },
    #[error("piece {id:?} lists cell {cell:?} twice")]
    DuplicateCell { id: String, cell: Cell },
}

impl Piece {
    /// Creates a piece from its cell offsets.
    ///
    /// The cell list must be non-empty and free of repeated offsets, so
    /// [`Piece::size`] is always the piece's true footprint. Offsets may be
    /// negative; only the translated positions at placement time need to
    /// land on the board.
    pub fn new(
        id: impl Into<String>,
        cells: Vec<Cell>,
        rotatable: bool,
    ) -> Result<Piece, PieceError> {
        let id = id.into();
        if cells.is_empty() {
            return Err(PieceError::EmptyCells { id });
        }
        let mut seen = FxHashSet::default();
        for &cell in &cells {
            if !seen.insert(cell) {
                return Err(PieceError::DuplicateCell { id, cell });
            }
        }
        Ok(Piece {
            id,
            cells,
            rotatable,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of cells the piece covers.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn rotatable(&self) -> bool {
        self.rotatable
    }

    /// The orientations the solver may try for this piece, in order.
    ///
    /// A non-rotatable piece only ever appears in its original orientation.
    pub fn rotations(&self) -> &'static [Rotation] {
        if self.rotatable {
            &Rotation::ALL
        } else {
            &[Rotation::R0]
        }
    }

    /// The piece's cells under the given orientation.
    pub fn cells_at(&self, rotation: Rotation) -> Vec<Cell> {
        self.cells.iter().map(|&cell| rotation.apply(cell)).collect()
    }

    /// The corners of the smallest rectangle covering the piece under the
    /// given orientation: `((min_x, min_y), (max_x, max_y))`, inclusive.
    pub fn bounding_box(&self, rotation: Rotation) -> (Cell, Cell) {
        let cells = self.cells_at(rotation);
        let min_x = cells.iter().map(|&(x, _)| x).min().unwrap();
        let min_y = cells.iter().map(|&(_, y)| y).min().unwrap();
        let max_x = cells.iter().map(|&(x, _)| x).max().unwrap();
        let max_y = cells.iter().map(|&(_, y)| y).max().unwrap();
        ((min_x, min_y), (max_x, max_y))
    }
}
