use std::fmt;

use crate::cells::Point;
use crate::units::{ColumnIndex, Height, RowIndex, Width};

/// Every cell coordinate of a rectangular grid in row-major order.
#[derive(Copy, Clone)]
pub struct CellIter {
    width: Width,
    current_cell_number: usize,
    cells_count: usize,
}

impl CellIter {
    pub fn new(width: Width, height: Height) -> CellIter {
        CellIter {
            width,
            current_cell_number: 0,
            cells_count: width.0 * height.0,
        }
    }
}

impl fmt::Debug for CellIter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "CellIter :: current_cell_number: {:?}, cells_count: {:?}",
               self.current_cell_number,
               self.cells_count)
    }
}

impl ExactSizeIterator for CellIter {} // default impl using size_hint()
impl Iterator for CellIter {
    type Item = Point;
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let coord = Point::from_row_major_index(self.current_cell_number, self.width);
            self.current_cell_number += 1;
            Some(coord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.cells_count - self.current_cell_number;
        let upper_bound = lower_bound;
        (lower_bound, Some(upper_bound))
    }
}

/// One `Vec` of coordinates per grid row, top row first.
#[derive(Debug, Copy, Clone)]
pub struct RowIter {
    width: Width,
    height: Height,
    current_index: usize,
}

impl RowIter {
    pub fn new(width: Width, height: Height) -> RowIter {
        RowIter {
            width,
            height,
            current_index: 0,
        }
    }
}

impl ExactSizeIterator for RowIter {}
impl Iterator for RowIter {
    type Item = Vec<Point>;
    fn next(&mut self) -> Option<Self::Item> {
        let Height(rows_count) = self.height;
        if self.current_index < rows_count {
            let Width(length) = self.width;
            let row = RowIndex(self.current_index);
            let coords = (0..length)
                .map(|i: usize| Point::from_row_column_indices(ColumnIndex(i), row))
                .collect();
            self.current_index += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower_bound = self.height.0 - self.current_index;
        (lower_bound, Some(lower_bound))
    }
}
