use error_chain::bail;
use image::{Rgb, RgbImage};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::cells::{GridDirection, Point};
use crate::errors::*;
use crate::grid::Grid;
use crate::units::CellPixels;

const WHITE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const PINK: Rgb<u8> = Rgb([0xff, 100, 100]);

pub const DEFAULT_CELL_PIXELS: CellPixels = CellPixels(6);

/// Blank space around the maze, in cells.
const MARGIN_CELLS: u32 = 2;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    cell_side_pixels: CellPixels,
    show_path: bool,
    output_stem: Option<PathBuf>,
}

impl RenderOptions {
    pub fn cell_side_pixels(&self) -> CellPixels {
        self.cell_side_pixels
    }

    pub fn show_path(&self) -> bool {
        self.show_path
    }

    pub fn output_stem(&self) -> Option<&Path> {
        self.output_stem.as_ref().map(|p| p.as_path())
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl Default for RenderOptionsBuilder {
    fn default() -> Self {
        RenderOptionsBuilder::new()
    }
}

impl RenderOptionsBuilder {
    pub fn new() -> RenderOptionsBuilder {
        RenderOptionsBuilder {
            options: RenderOptions {
                cell_side_pixels: DEFAULT_CELL_PIXELS,
                show_path: false,
                output_stem: None,
            },
        }
    }

    pub fn cell_side_pixels_length(mut self, pixels: u32) -> Self {
        self.options.cell_side_pixels = CellPixels(pixels);
        self
    }

    /// Also produce the solution image when saving.
    pub fn show_path(mut self, show_path: bool) -> Self {
        self.options.show_path = show_path;
        self
    }

    /// Output paths are `<stem>_<W>x<H>.png` and `<stem>_<W>x<H>_solution.png`.
    pub fn output_stem<P: Into<PathBuf>>(mut self, stem: Option<P>) -> Self {
        self.options.output_stem = stem.map(Into::into);
        self
    }

    pub fn build(self) -> RenderOptions {
        self.options
    }
}

/// Pixel layout of one maze on its canvas.
#[derive(Debug, Copy, Clone)]
struct Layout {
    cell: u32,
    offset: u32,
    maze_width: u32,
    maze_height: u32,
}

impl Layout {
    fn new(grid: &Grid, cell_pixels: CellPixels) -> Result<Layout> {
        let CellPixels(cell) = cell_pixels;
        if cell < 2 {
            bail!(ErrorKind::InvalidCellSize(cell));
        }

        let maze_width = grid.width().0 as u64 * cell as u64 + 1;
        let maze_height = grid.height().0 as u64 * cell as u64 + 1;
        let margin = 2 * MARGIN_CELLS as u64 * cell as u64;
        let (canvas_width, canvas_height) = (maze_width + margin, maze_height + margin);
        if canvas_width > u32::MAX as u64 || canvas_height > u32::MAX as u64 {
            bail!(ErrorKind::ImageTooLarge(canvas_width, canvas_height));
        }

        Ok(Layout {
            cell,
            offset: MARGIN_CELLS * cell,
            maze_width: maze_width as u32,
            maze_height: maze_height as u32,
        })
    }

    fn canvas(&self) -> RgbImage {
        RgbImage::from_pixel(self.maze_width + 2 * self.offset,
                             self.maze_height + 2 * self.offset,
                             WHITE)
    }

    /// The wall on the `dir` side of a cell, without its corner pixels.
    fn wall(&self, coord: Point, dir: GridDirection) -> ((u32, u32), (u32, u32)) {
        let c = self.cell;
        let (x1, y1) = (coord.x * c, coord.y * c);
        let (x2, y2) = (x1 + c, y1 + c);
        match dir {
            GridDirection::Left => ((x1, y1 + 1), (x1, y2 - 1)),
            GridDirection::Up => ((x1 + 1, y1), (x2 - 1, y1)),
            GridDirection::Right => ((x2, y1 + 1), (x2, y2 - 1)),
            GridDirection::Down => ((x1 + 1, y2), (x2 - 1, y2)),
        }
    }

    fn centre(&self, coord: Point) -> (u32, u32) {
        let c = self.cell;
        ((coord.x + 1) * c - c / 2, (coord.y + 1) * c - c / 2)
    }

    /// Draw an axis-aligned segment given in maze coordinates, endpoints included.
    fn draw(&self, image: &mut RgbImage, a: (u32, u32), b: (u32, u32), colour: Rgb<u8>) {
        let (x_min, x_max) = (a.0.min(b.0), a.0.max(b.0));
        let (y_min, y_max) = (a.1.min(b.1), a.1.max(b.1));
        debug_assert!(x_min == x_max || y_min == y_max, "diagonal segment {:?} {:?}", a, b);

        for y in y_min..=y_max {
            for x in x_min..=x_max {
                if x < self.maze_width && y < self.maze_height {
                    image.put_pixel(x + self.offset, y + self.offset, colour);
                }
            }
        }
    }
}

fn draw_maze(grid: &Grid, layout: &Layout, image: &mut RgbImage) {
    let (right, bottom) = (layout.maze_width - 1, layout.maze_height - 1);
    for row in 0..=grid.height().0 as u32 {
        let y = row * layout.cell;
        layout.draw(image, (0, y), (right, y), BLACK);
    }
    for column in 0..=grid.width().0 as u32 {
        let x = column * layout.cell;
        layout.draw(image, (x, 0), (x, bottom), BLACK);
    }

    let (start, end) = layout.wall(grid.root(), GridDirection::Up);
    layout.draw(image, start, end, WHITE);
    let (start, end) = layout.wall(grid.far_corner(), GridDirection::Down);
    layout.draw(image, start, end, WHITE);

    for coord in grid.iter() {
        if let Some(dir) = grid.cell_at(coord).parent {
            let (start, end) = layout.wall(coord, dir);
            layout.draw(image, start, end, WHITE);
        }
    }
}

/// Hue sweep colour for the nth step along a solution path.
pub fn path_step_colour(step: usize) -> Rgb<u8> {
    hsv_to_rgb((step % 256) as f64 * 360.0 / 256.0, 1.0, 1.0)
}

pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> Rgb<u8> {
    let chroma = value * saturation;
    let sector = (hue / 60.0).rem_euclid(6.0);
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let to_byte = |c: f64| ((c + m) * 255.0).round() as u8;
    Rgb([to_byte(r), to_byte(g), to_byte(b)])
}

fn draw_solution(grid: &Grid, layout: &Layout, image: &mut RgbImage) {
    let mut step = 0;
    let (root_x, root_y) = layout.centre(grid.root());
    layout.draw(image, (root_x, root_y), (root_x, 0), path_step_colour(step));

    let mut cursor = grid.far_corner();
    for _ in 0..grid.size() {
        if cursor == grid.root() {
            break;
        }
        let parent = match grid.parent_of(cursor) {
            Some(parent) => parent,
            None => break,
        };
        step += 1;
        layout.draw(image, layout.centre(cursor), layout.centre(parent), path_step_colour(step));
        cursor = parent;
    }

    let (exit_x, exit_y) = layout.centre(grid.far_corner());
    layout.draw(image, (exit_x, exit_y), (exit_x, layout.maze_height - 1), PINK);
}

/// The maze on a white canvas: walls in black with the entry above the root and the exit
/// below the far corner.
pub fn render_maze(grid: &Grid, options: &RenderOptions) -> Result<RgbImage> {
    let layout = Layout::new(grid, options.cell_side_pixels)?;
    let mut image = layout.canvas();
    draw_maze(grid, &layout, &mut image);
    Ok(image)
}

/// The maze with the route from the exit back to the entry traced through the cell centres.
pub fn render_solution(grid: &Grid, options: &RenderOptions) -> Result<RgbImage> {
    let layout = Layout::new(grid, options.cell_side_pixels)?;
    let mut image = layout.canvas();
    draw_maze(grid, &layout, &mut image);
    draw_solution(grid, &layout, &mut image);
    Ok(image)
}

fn output_path(stem: &Path, grid: &Grid, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(format!("_{}x{}{}.png", grid.width().0, grid.height().0, suffix));
    PathBuf::from(name)
}

/// Write the maze image, and the solution image when `show_path` is set, returning the
/// paths written. Nothing is written without an output stem.
pub fn save_maze_images(grid: &Grid, options: &RenderOptions) -> Result<Vec<PathBuf>> {
    let stem = match options.output_stem() {
        Some(stem) => stem,
        None => return Ok(vec![]),
    };

    let mut written = vec![];

    let maze_path = output_path(stem, grid, "");
    render_maze(grid, options)?
        .save(&maze_path)
        .chain_err(|| format!("Failed to write maze image {}", maze_path.display()))?;
    debug!("wrote {}", maze_path.display());
    written.push(maze_path);

    if options.show_path {
        let solution_path = output_path(stem, grid, "_solution");
        render_solution(grid, options)?
            .save(&solution_path)
            .chain_err(|| format!("Failed to write solution image {}", solution_path.display()))?;
        debug!("wrote {}", solution_path.display());
        written.push(solution_path);
    }

    Ok(written)
}
