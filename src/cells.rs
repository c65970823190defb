use std::convert::From;
use std::fmt;

use rand::Rng;

use crate::units::{ColumnIndex, RowIndex, Width};

/// One step across a shared cell wall.
///
/// "No direction" (the root of the maze tree, or an unvisited cell) is not a variant,
/// it is the `None` of an `Option<GridDirection>`.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum GridDirection {
    Left,
    Up,
    Right,
    Down,
}

impl GridDirection {
    pub const ALL: [GridDirection; 4] = [GridDirection::Left,
                                         GridDirection::Up,
                                         GridDirection::Right,
                                         GridDirection::Down];

    #[inline]
    pub fn opposite(self) -> GridDirection {
        match self {
            GridDirection::Left => GridDirection::Right,
            GridDirection::Up => GridDirection::Down,
            GridDirection::Right => GridDirection::Left,
            GridDirection::Down => GridDirection::Up,
        }
    }

    /// Uniformly random direction, ignoring any grid boundary.
    pub fn random<R: Rng>(rng: &mut R) -> GridDirection {
        GridDirection::ALL[rng.gen_range(0..GridDirection::ALL.len())]
    }

    /// The single glyph used when printing parent pointers.
    pub fn arrow(self) -> char {
        match self {
            GridDirection::Left => '<',
            GridDirection::Up => '^',
            GridDirection::Right => '>',
            GridDirection::Down => 'v',
        }
    }
}

/// How far along the generator a cell is.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellState {
    /// Not touched by the current walk nor part of the tree.
    Unvisited,
    /// On the random walk currently in progress, not yet committed.
    InPath,
    /// Part of the permanent spanning tree.
    InTree,
}

impl Default for CellState {
    fn default() -> CellState {
        CellState::Unvisited
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Default)]
pub struct Cell {
    pub state: CellState,
    /// Direction to step from this cell to reach its parent in the tree.
    pub parent: Option<GridDirection>,
}

impl Cell {
    #[inline]
    pub fn is_in_tree(&self) -> bool {
        self.state == CellState::InTree
    }

    /// Back to the freshly allocated state: unvisited with no parent.
    #[inline]
    pub fn reset(&mut self) {
        *self = Cell::default();
    }
}

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Point {
        Point { x, y }
    }

    #[inline]
    pub fn from_row_major_index(index: usize, width: Width) -> Point {
        let Width(w) = width;
        Point::new((index % w) as u32, (index / w) as u32)
    }

    #[inline]
    pub fn from_row_column_indices(col_index: ColumnIndex, row_index: RowIndex) -> Point {
        let (ColumnIndex(col), RowIndex(row)) = (col_index, row_index);
        Point::new(col as u32, row as u32)
    }

    /// The point one step away in `dir`.
    /// Returns None if that point is not representable (stepping left of x = 0 or above
    /// y = 0); the far grid boundaries are the grid's business.
    pub fn offset(self, dir: GridDirection) -> Option<Point> {
        let Point { x, y } = self;
        match dir {
            GridDirection::Left => x.checked_sub(1).map(|x| Point::new(x, y)),
            GridDirection::Up => y.checked_sub(1).map(|y| Point::new(x, y)),
            GridDirection::Right => x.checked_add(1).map(|x| Point::new(x, y)),
            GridDirection::Down => y.checked_add(1).map(|y| Point::new(x, y)),
        }
    }

    /// Direction of the single step from `self` to an adjacent `other`, None if the two
    /// points are not 4-neighbours.
    pub fn direction_to(self, other: Point) -> Option<GridDirection> {
        GridDirection::ALL.iter()
                          .cloned()
                          .find(|&dir| self.offset(dir) == Some(other))
    }
}

impl From<(u32, u32)> for Point {
    fn from(x_y_pair: (u32, u32)) -> Point {
        Point::new(x_y_pair.0, x_y_pair.1)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
