//! The puzzle board.
//!
//! The board is a dense row-major grid. Each cell is either empty or holds
//! the tag of the piece covering it; tags are small integers assigned by
//! whoever places the pieces and mean nothing to the board itself.

use std::fmt;

use thiserror::Error;

use crate::attempt::Attempt;
use crate::geometry::Cell;
use crate::piece::Piece;

/// A rectangular grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Option<u16>>,
}

/// Rejected board definitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must have positive dimensions, got {width}x{height}")]
    ZeroSize { width: usize, height: usize },
}

impl Board {
    /// Creates an empty board.
    pub fn new(width: usize, height: usize) -> Result<Board, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::ZeroSize { width, height });
        }
        Ok(Board {
            width,
            height,
            cells: vec![None; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// The tag occupying the cell, if any. Panics if out of bounds.
    pub fn occupant(&self, x: usize, y: usize) -> Option<u16> {
        assert!(x < self.width && y < self.height);
        self.cells[self.index(x, y)]
    }

    /// Whether the given cells, translated by `anchor`, all land on empty
    /// board cells.
    pub fn can_place(&self, cells: &[Cell], anchor: Cell) -> bool {
        let (ax, ay) = anchor;
        cells.iter().all(|&(dx, dy)| {
            let x = ax + dx;
            let y = ay + dy;
            self.in_bounds(x, y) && self.cells[self.index(x as usize, y as usize)].is_none()
        })
    }

    /// Writes a piece onto the board. The placement must already have been
    /// checked with [`Board::can_place`].
    pub fn place(&mut self, cells: &[Cell], anchor: Cell, tag: u16) {
        debug_assert!(self.can_place(cells, anchor));
        let (ax, ay) = anchor;
        for &(dx, dy) in cells {
            let index = self.index((ax + dx) as usize, (ay + dy) as usize);
            self.cells[index] = Some(tag);
        }
    }

    /// Clears the given cells. They must all be occupied.
    pub fn remove(&mut self, cells: &[Cell], anchor: Cell) {
        let (ax, ay) = anchor;
        for &(dx, dy) in cells {
            let index = self.index((ax + dx) as usize, (ay + dy) as usize);
            debug_assert!(self.cells[index].is_some());
            self.cells[index] = None;
        }
    }

    /// Size of the smallest connected region of empty cells, where cells
    /// connect through their four edge neighbours.
    ///
    /// A full board has no empty regions; the total cell count is returned
    /// so that the result always compares greater-or-equal against any
    /// piece that could still fit.
    pub fn smallest_empty_region(&self) -> usize {
        let mut visited = vec![false; self.cells.len()];
        let mut stack = Vec::new();
        let mut smallest = usize::MAX;
        for start in 0..self.cells.len() {
            if visited[start] || self.cells[start].is_some() {
                continue;
            }
            visited[start] = true;
            stack.push(start);
            let mut size = 0;
            while let Some(index) = stack.pop() {
                size += 1;
                let x = (index % self.width) as i32;
                let y = (index / self.width) as i32;
                for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                    if !self.in_bounds(nx, ny) {
                        continue;
                    }
                    let neighbour = self.index(nx as usize, ny as usize);
                    if !visited[neighbour] && self.cells[neighbour].is_none() {
                        visited[neighbour] = true;
                        stack.push(neighbour);
                    }
                }
            }
            smallest = smallest.min(size);
        }
        if smallest == usize::MAX {
            self.cells.len()
        } else {
            smallest
        }
    }
}

/// Letter used to draw the given tag in [`Board`]'s `Display` output.
pub fn tag_letter(tag: u16) -> char {
    (b'A' + (tag % 26) as u8) as char
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.width {
                match self.occupant(x, y) {
                    Some(tag) => write!(f, "{}", tag_letter(tag))?,
                    None => write!(f, ".")?,
                }
            }
        }
        Ok(())
    }
}

/// Replays an attempt onto a fresh board.
///
/// Returns `None` if the attempt does not fit: a piece id that is not in
/// `pieces`, a placement that overlaps or leaves the board, or more
/// placements than the board can tag.
pub fn board_from_attempt(
    width: usize,
    height: usize,
    pieces: &[Piece],
    attempt: &Attempt,
) -> Option<Board> {
    let mut board = Board::new(width, height).ok()?;
    for (ordinal, placed) in attempt.placed_pieces.iter().enumerate() {
        let tag = u16::try_from(ordinal).ok()?;
        let piece = pieces.iter().find(|piece| piece.id() == placed.piece_id)?;
        let cells = piece.cells_at(placed.rotation);
        if !board.can_place(&cells, placed.position) {
            return None;
        }
        board.place(&cells, placed.position, tag);
    }
    Some(board)
}
