//! 2D rotation utilities.
//!
//! A piece on the board has 4 possible orientations (the rotation group of
//! a square): the identity plus three further quarter turns. Orientations
//! are applied as pure coordinate maps; cell lists are never stored
//! rotated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 2D integer coordinate: a cell offset within a piece, or an absolute
/// board position, depending on context.
pub type Cell = (i32, i32);

/// A quarter-turn orientation.
///
/// The coordinate maps are the standard rotation matrices:
/// - 0 degrees: (x, y) -> (x, y)
/// - 90 degrees: (x, y) -> (-y, x)
/// - 180 degrees: (x, y) -> (-x, -y)
/// - 270 degrees: (x, y) -> (y, -x)
///
/// Serializes as its degree value, one of 0, 90, 180, 270.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// All orientations, in the order the solver tries them.
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Applies this rotation to a single cell offset.
    #[inline]
    pub fn apply(self, (x, y): Cell) -> Cell {
        match self {
            Rotation::R0 => (x, y),
            Rotation::R90 => (-y, x),
            Rotation::R180 => (-x, -y),
            Rotation::R270 => (y, -x),
        }
    }

    /// This orientation as a degree value.
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> u16 {
        rotation.degrees()
    }
}

/// A degree value that is not a quarter turn.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid rotation {0}, expected one of 0, 90, 180, 270")]
pub struct InvalidRotation(pub u16);

impl TryFrom<u16> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u16) -> Result<Rotation, InvalidRotation> {
        match degrees {
            0 => Ok(Rotation::R0),
            90 => Ok(Rotation::R90),
            180 => Ok(Rotation::R180),
            270 => Ok(Rotation::R270),
            other => Err(InvalidRotation(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_leaves_cells_unchanged() {
        for cell in [(0, 0), (3, -2), (-1, 5)] {
            assert_eq!(Rotation::R0.apply(cell), cell);
        }
    }

    #[test]
    fn test_quarter_turn_maps() {
        let cell = (2, 1);
        assert_eq!(Rotation::R90.apply(cell), (-1, 2));
        assert_eq!(Rotation::R180.apply(cell), (-2, -1));
        assert_eq!(Rotation::R270.apply(cell), (1, -2));
    }

    #[test]
    fn test_four_quarter_turns_are_identity() {
        for cell in [(0, 0), (1, 0), (2, -3), (-4, 7)] {
            let mut rotated = cell;
            for _ in 0..4 {
                rotated = Rotation::R90.apply(rotated);
            }
            assert_eq!(rotated, cell, "Four quarter turns should return {cell:?}");
        }
    }

    #[test]
    fn test_each_rotation_composes_from_quarter_turns() {
        // R180 and R270 must equal repeated application of R90.
        let cell = (3, 2);
        let twice = Rotation::R90.apply(Rotation::R90.apply(cell));
        assert_eq!(Rotation::R180.apply(cell), twice);
        let thrice = Rotation::R90.apply(twice);
        assert_eq!(Rotation::R270.apply(cell), thrice);
    }

    #[test]
    fn test_degree_roundtrip() {
        for rotation in Rotation::ALL {
            assert_eq!(Rotation::try_from(rotation.degrees()), Ok(rotation));
        }
        assert_eq!(Rotation::try_from(45), Err(InvalidRotation(45)));
        assert_eq!(Rotation::try_from(360), Err(InvalidRotation(360)));
    }
}
