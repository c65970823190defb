use std::fmt;

use crate::cells::{GridDirection, Point};
use crate::grid::Grid;
use crate::units::Width;
use crate::utils::{self, FnvHashSet};

pub trait GridDisplay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required.
    fn render_cell_body(&self, _: Point) -> String {
        String::from("   ")
    }
}

/// Shows each cell's parent pointer as an arrow; the root stays blank.
#[derive(Debug)]
pub struct ParentArrowsDisplay {
    width: Width,
    parents: Vec<Option<GridDirection>>,
}
impl ParentArrowsDisplay {
    /// Snapshot of the grid's parent pointers as they are now.
    pub fn new(grid: &Grid) -> ParentArrowsDisplay {
        ParentArrowsDisplay {
            width: grid.width(),
            parents: grid.cells().iter().map(|cell| cell.parent).collect(),
        }
    }
}
impl GridDisplay for ParentArrowsDisplay {
    fn render_cell_body(&self, coord: Point) -> String {
        let index = coord.y as usize * self.width.0 + coord.x as usize;
        match self.parents.get(index) {
            Some(Some(dir)) => format!(" {} ", dir.arrow()),
            _ => String::from("   "),
        }
    }
}

#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<Point>,
}
impl PathDisplay {
    pub fn new(path: &[Point]) -> Self {
        let mut on_path_coordinates = utils::fnv_hashset(path.len());
        on_path_coordinates.extend(path.iter().cloned());
        PathDisplay { on_path_coordinates }
    }
}
impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: Point) -> String {
        if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

/// Box-drawing glyph for a wall junction, indexed by the walls meeting there:
/// left = 1, up = 2, right = 4, down = 8.
const JUNCTIONS: [&str; 16] = [" ", "╴", "╵", "┘", "╶", "─", "└", "┴",
                               "╷", "┐", "│", "┤", "┌", "┬", "├", "┼"];

/// Is there a wall on the `dir` side of `coord`? The grid boundary is always walled.
fn walled(grid: &Grid, coord: Point, dir: GridDirection) -> bool {
    !grid.is_neighbour_linked(coord, dir)
}

/// Walls meeting at the lattice vertex `(vx, vy)`, the top left corner of cell `(vx, vy)`.
fn junction_walls(grid: &Grid, vx: u32, vy: u32) -> usize {
    let (columns, rows) = (grid.width().0 as u32, grid.height().0 as u32);
    let left = vx > 0 && (vy == rows || walled(grid, Point::new(vx - 1, vy), GridDirection::Up));
    let up = vy > 0 && (vx == columns || walled(grid, Point::new(vx, vy - 1), GridDirection::Left));
    let right = vx < columns && (vy == rows || walled(grid, Point::new(vx, vy), GridDirection::Up));
    let down = vy < rows && (vx == columns || walled(grid, Point::new(vx, vy), GridDirection::Left));

    left as usize | (up as usize) << 1 | (right as usize) << 2 | (down as usize) << 3
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (columns, rows) = (self.width().0 as u32, self.height().0 as u32);

        for vy in 0..=rows {
            // Wall line along the top of row `vy`, or the bottom edge of the grid.
            let mut wall_line = String::new();
            for vx in 0..=columns {
                let walls = junction_walls(self, vx, vy);
                wall_line.push_str(JUNCTIONS[walls]);
                if vx < columns {
                    wall_line.push_str(if walls & 4 != 0 { "───" } else { "   " });
                }
            }
            writeln!(f, "{}", wall_line)?;

            if vy == rows {
                break;
            }

            let mut body_line = String::new();
            for vx in 0..=columns {
                let walls = junction_walls(self, vx, vy);
                body_line.push_str(if walls & 8 != 0 { "│" } else { " " });
                if vx < columns {
                    let coord = Point::new(vx, vy);
                    match *self.grid_display() {
                        Some(ref displayer) => body_line.push_str(&displayer.render_cell_body(coord)),
                        None => body_line.push_str("   "),
                    }
                }
            }
            writeln!(f, "{}", body_line)?;
        }
        Ok(())
    }
}
