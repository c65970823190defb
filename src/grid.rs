use std::fmt;
use std::rc::Rc;

use rand::Rng;
use smallvec::SmallVec;

use crate::cells::{Cell, GridDirection, Point};
use crate::errors::*;
use crate::grid_displays::GridDisplay;
use crate::grid_iterators::{CellIter, RowIter};
use crate::units::{Height, Width};

pub type PointSmallVec = SmallVec<[Point; 4]>;

/// A rectangular grid of cells. Each cell may point at one adjacent parent cell; once a
/// generator has run, those pointers form a spanning tree rooted at `(0, 0)`, and the tree
/// edges are the open passages of the maze.
#[derive(Clone)]
pub struct Grid {
    width: Width,
    height: Height,
    cells: Vec<Cell>,
    grid_display: Option<Rc<dyn GridDisplay>>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid :: width: {:?}, height: {:?}, links: {}",
               self.width, self.height, self.links_count())
    }
}

impl Grid {
    /// Allocates `width * height` unvisited cells.
    /// Either side being zero, or more cells than a `u32` coordinate can address, is a
    /// configuration error.
    pub fn new(width: Width, height: Height) -> Result<Grid> {
        let (Width(w), Height(h)) = (width, height);
        let cells_count = w.checked_mul(h)
                           .filter(|&n| w > 0 && h > 0 && n <= u32::MAX as usize)
                           .ok_or(ErrorKind::InvalidGridDimensions(w, h))?;

        Ok(Grid {
            width,
            height,
            cells: vec![Cell::default(); cells_count],
            grid_display: None,
        })
    }

    #[inline]
    pub fn set_grid_display(&mut self, grid_display: Option<Rc<dyn GridDisplay>>) {
        self.grid_display = grid_display;
    }

    #[inline]
    pub fn grid_display(&self) -> &Option<Rc<dyn GridDisplay>> {
        &self.grid_display
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// The designated root of the maze tree.
    #[inline]
    pub fn root(&self) -> Point {
        Point::new(0, 0)
    }

    /// The cell diagonally opposite the root, where the solution path starts.
    #[inline]
    pub fn far_corner(&self) -> Point {
        Point::new((self.width.0 - 1) as u32, (self.height.0 - 1) as u32)
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Every cell back to unvisited with no parent.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }

    /// Panics if `coord` is outside the grid: no algorithm here should ever ask for one.
    #[inline]
    pub fn cell_at(&self, coord: Point) -> &Cell {
        match self.grid_coordinate_to_index(coord) {
            Some(index) => &self.cells[index],
            None => self.out_of_bounds(coord),
        }
    }

    /// Panics if `coord` is outside the grid.
    #[inline]
    pub fn cell_at_mut(&mut self, coord: Point) -> &mut Cell {
        match self.grid_coordinate_to_index(coord) {
            Some(index) => &mut self.cells[index],
            None => self.out_of_bounds(coord),
        }
    }

    fn out_of_bounds(&self, coord: Point) -> ! {
        panic!("OutOfBounds: {} is outside the {}x{} grid",
               coord, self.width.0, self.height.0)
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Point) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: Point) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Point {
        let index = rng.gen_range(0..self.size());
        Point::from_row_major_index(index, self.width)
    }

    pub fn neighbour_at_direction(&self, coord: Point, direction: GridDirection) -> Option<Point> {
        coord.offset(direction)
             .filter(|&neighbour_coord| self.is_valid_coordinate(neighbour_coord))
    }

    /// Cells to the left, above, right and below, whether or not a passage joins them.
    pub fn neighbours(&self, coord: Point) -> PointSmallVec {
        GridDirection::ALL.iter()
                          .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
                          .collect()
    }

    /// The cell this cell's parent pointer leads to, if it has a parent.
    pub fn parent_of(&self, coord: Point) -> Option<Point> {
        self.cell_at(coord)
            .parent
            .and_then(|dir| self.neighbour_at_direction(coord, dir))
    }

    /// Are two cells joined by a tree edge, in either orientation?
    pub fn is_linked(&self, a: Point, b: Point) -> bool {
        if !self.is_valid_coordinate(a) || !self.is_valid_coordinate(b) {
            return false;
        }
        self.parent_of(a) == Some(b) || self.parent_of(b) == Some(a)
    }

    pub fn is_neighbour_linked(&self, coord: Point, direction: GridDirection) -> bool {
        self.neighbour_at_direction(coord, direction)
            .map_or(false, |neighbour_coord| self.is_linked(coord, neighbour_coord))
    }

    /// Cells joined to `coord` by a passage: its parent plus its children.
    pub fn links(&self, coord: Point) -> PointSmallVec {
        self.neighbours(coord)
            .into_iter()
            .filter(|&neighbour| self.is_linked(coord, neighbour))
            .collect()
    }

    /// Number of tree edges (passages).
    pub fn links_count(&self) -> usize {
        self.iter_links().count()
    }

    #[inline]
    pub fn iter(&self) -> CellIter {
        CellIter::new(self.width, self.height)
    }

    #[inline]
    pub fn iter_row(&self) -> RowIter {
        RowIter::new(self.width, self.height)
    }

    /// Every tree edge as a `(child, parent)` pair, children in row-major order.
    pub fn iter_links<'a>(&'a self) -> impl Iterator<Item = (Point, Point)> + 'a {
        self.iter()
            .filter_map(move |child| self.parent_of(child).map(|parent| (child, parent)))
    }
}
