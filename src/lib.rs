//! **mazes** generates perfect mazes on rectangular grids with loop-erased random walks,
//! reshapes them by switching tree edges, and renders them as text or PNG images.

pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod grid_iterators;
pub mod pathing;
pub mod renderers;
pub mod rng;
pub mod switching;
pub mod units;
pub mod utils;
