//! Built-in piece templates.
//!
//! Every standard polyomino up to size five, named by its conventional
//! letter plus its cell count. Cells are normalized so the minimum
//! coordinates sit at the origin. Shapes that a quarter turn maps onto
//! themselves are marked fixed; searching their rotations would only
//! revisit identical placements.

use tiler::geometry::{Cell, Rotation};
use tiler::piece::{Piece, PieceError};

/// A named piece template.
pub struct Shape {
    pub name: &'static str,
    pub cells: &'static [Cell],
    pub rotatable: bool,
}

impl Shape {
    /// Builds the piece for this template under the given id.
    pub fn piece(&self, id: impl Into<String>) -> Result<Piece, PieceError> {
        Piece::new(id, self.cells.to_vec(), self.rotatable)
    }
}

/// The template catalog: monomino through the twelve pentominoes.
pub const SHAPES: &[Shape] = &[
    Shape {
        name: "M1",
        cells: &[(0, 0)],
        rotatable: false,
    },
    Shape {
        name: "I2",
        cells: &[(0, 0), (1, 0)],
        rotatable: true,
    },
    Shape {
        name: "I3",
        cells: &[(0, 0), (1, 0), (2, 0)],
        rotatable: true,
    },
    Shape {
        name: "L3",
        cells: &[(0, 0), (1, 0), (0, 1)],
        rotatable: true,
    },
    Shape {
        name: "I4",
        cells: &[(0, 0), (1, 0), (2, 0), (3, 0)],
        rotatable: true,
    },
    Shape {
        name: "O4",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
        rotatable: false,
    },
    Shape {
        name: "T4",
        cells: &[(0, 0), (1, 0), (2, 0), (1, 1)],
        rotatable: true,
    },
    Shape {
        name: "S4",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1)],
        rotatable: true,
    },
    Shape {
        name: "Z4",
        cells: &[(0, 0), (1, 0), (1, 1), (2, 1)],
        rotatable: true,
    },
    Shape {
        name: "L4",
        cells: &[(0, 0), (0, 1), (0, 2), (1, 2)],
        rotatable: true,
    },
    Shape {
        name: "J4",
        cells: &[(1, 0), (1, 1), (0, 2), (1, 2)],
        rotatable: true,
    },
    Shape {
        name: "F5",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
        rotatable: true,
    },
    Shape {
        name: "I5",
        cells: &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)],
        rotatable: true,
    },
    Shape {
        name: "L5",
        cells: &[(0, 0), (0, 1), (0, 2), (0, 3), (1, 3)],
        rotatable: true,
    },
    Shape {
        name: "N5",
        cells: &[(1, 0), (1, 1), (0, 2), (1, 2), (0, 3)],
        rotatable: true,
    },
    Shape {
        name: "P5",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)],
        rotatable: true,
    },
    Shape {
        name: "T5",
        cells: &[(0, 0), (1, 0), (2, 0), (1, 1), (1, 2)],
        rotatable: true,
    },
    Shape {
        name: "U5",
        cells: &[(0, 0), (2, 0), (0, 1), (1, 1), (2, 1)],
        rotatable: true,
    },
    Shape {
        name: "V5",
        cells: &[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)],
        rotatable: true,
    },
    Shape {
        name: "W5",
        cells: &[(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)],
        rotatable: true,
    },
    Shape {
        name: "X5",
        cells: &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)],
        rotatable: false,
    },
    Shape {
        name: "Y5",
        cells: &[(1, 0), (0, 1), (1, 1), (1, 2), (1, 3)],
        rotatable: true,
    },
    Shape {
        name: "Z5",
        cells: &[(0, 0), (1, 0), (1, 1), (1, 2), (2, 2)],
        rotatable: true,
    },
];

/// Looks a template up by name, ignoring case.
pub fn find(name: &str) -> Option<&'static Shape> {
    SHAPES
        .iter()
        .find(|shape| shape.name.eq_ignore_ascii_case(name))
}

/// Draws a piece as a small ascii grid in its identity orientation.
pub fn picture(piece: &Piece) -> String {
    let ((min_x, min_y), (max_x, max_y)) = piece.bounding_box(Rotation::R0);
    let cells = piece.cells_at(Rotation::R0);
    let mut out = String::new();
    for y in min_y..=max_y {
        if y > min_y {
            out.push('\n');
        }
        for x in min_x..=max_x {
            out.push(if cells.contains(&(x, y)) { '#' } else { '.' });
        }
    }
    out
}
