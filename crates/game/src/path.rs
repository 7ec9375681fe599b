use crate::errors::PathError;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Side length of one grid cell in pixels. All ranges, radii and speeds in the
/// simulation are expressed in this pixel space.
pub const CELL_PX: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u16,
    pub y: u16,
}

impl Cell {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Pixel coordinates of this cell's center.
    pub fn center(self) -> (f64, f64) {
        (
            self.x as f64 * CELL_PX + CELL_PX / 2.0,
            self.y as f64 * CELL_PX + CELL_PX / 2.0,
        )
    }

    fn is_orthogonal_neighbor(self, other: Cell) -> bool {
        let dx = (self.x as i32 - other.x as i32).abs();
        let dy = (self.y as i32 - other.y as i32).abs();
        dx + dy == 1
    }
}

/// The ordered walk every enemy follows, validated at construction.
#[derive(Clone, Debug)]
pub struct Path {
    cells: Vec<Cell>,
}

impl Path {
    /// Build a path from an ordered cell sequence, rejecting anything an enemy
    /// could not actually walk.
    pub fn new(cells: Vec<Cell>, width: u16, height: u16) -> Result<Self, PathError> {
        Self::validate(&cells, &cells, width, height)?;
        Ok(Self { cells })
    }

    /// Validate an ordered walk against the full set of marked cells.
    ///
    /// The editor lets players mark cells independently of the walk order, so
    /// beyond per-step contiguity we BFS from the walk's start over the marked
    /// set: every marked cell must be reachable, otherwise the drawing has a
    /// stray island and the match must not start.
    pub fn validate(
        sequence: &[Cell],
        marked: &[Cell],
        width: u16,
        height: u16,
    ) -> Result<(), PathError> {
        if sequence.len() < 2 {
            return Err(PathError::TooShort);
        }
        for &cell in sequence.iter().chain(marked.iter()) {
            if cell.x >= width || cell.y >= height {
                return Err(PathError::OutOfBounds { cell });
            }
        }
        for (i, pair) in sequence.windows(2).enumerate() {
            if !pair[0].is_orthogonal_neighbor(pair[1]) {
                return Err(PathError::Discontiguous { index: i });
            }
        }

        let marked_set: HashSet<Cell> = marked.iter().copied().collect();
        let mut visited: HashSet<Cell> = HashSet::new();
        let mut queue = VecDeque::new();
        let start = sequence[0];
        visited.insert(start);
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            let neighbors = [
                (cell.x.wrapping_add(1), cell.y),
                (cell.x.wrapping_sub(1), cell.y),
                (cell.x, cell.y.wrapping_add(1)),
                (cell.x, cell.y.wrapping_sub(1)),
            ];
            for (nx, ny) in neighbors {
                if nx >= width || ny >= height {
                    continue;
                }
                let next = Cell::new(nx, ny);
                if marked_set.contains(&next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        if let Some(&cell) = marked.iter().find(|c| !visited.contains(c)) {
            return Err(PathError::Disconnected { cell });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Pixel-space waypoint for the cell at `index`.
    pub fn waypoint(&self, index: usize) -> (f64, f64) {
        self.cells[index].center()
    }

    pub fn start(&self) -> Cell {
        self.cells[0]
    }

    pub fn end(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }
}
