//! Reshape a finished maze one edge at a time while keeping it a spanning tree.
//!
//! A switch takes two adjacent cells `p` and `q` that are not joined by a passage, opens a
//! passage between them and closes exactly one other, so the maze stays perfect.

use bit_set::BitSet;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::cells::{GridDirection, Point};
use crate::grid::Grid;

/// Failed pair picks tolerated around one cell before moving to a fresh random cell.
const REPICK_AFTER_ATTEMPTS: usize = 4;

/// The edge a switch adds: `to` is re-parented onto `from`.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct SwitchPair {
    pub from: Point,
    pub to: Point,
}

impl SwitchPair {
    pub fn new(from: Point, to: Point) -> SwitchPair {
        SwitchPair { from, to }
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum SwitchRejection {
    OutOfBounds,
    NotAdjacent,
    /// The pair is already a tree edge, in one orientation or the other.
    AlreadyLinked,
    /// Applying the switch would give the root a parent.
    RootRewire,
    /// `to` is an ancestor of `from`: re-parenting it would close a cycle.
    AncestorConflict,
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct ShuffleStats {
    pub switches: usize,
}

/// Only a grid at least 2 cells wide and 2 high has adjacent cells outside the tree.
pub fn has_switch_candidates(grid: &Grid) -> bool {
    grid.width().0 > 1 && grid.height().0 > 1
}

/// Is `ancestor` somewhere up the parent chain of `descendant`?
pub fn is_ancestor(grid: &Grid, ancestor: Point, descendant: Point) -> bool {
    let mut cursor = descendant;
    for _ in 0..grid.size() {
        match grid.parent_of(cursor) {
            Some(parent) if parent == ancestor => return true,
            Some(parent) => cursor = parent,
            None => return false,
        }
    }
    false
}

/// Checks a pair can be switched in, returning the direction `to` must point to reach `from`.
pub fn check_switch_pair(grid: &Grid, pair: SwitchPair) -> Result<GridDirection, SwitchRejection> {
    let SwitchPair { from: p, to: q } = pair;
    if !grid.is_valid_coordinate(p) || !grid.is_valid_coordinate(q) {
        return Err(SwitchRejection::OutOfBounds);
    }
    let towards_p = q.direction_to(p).ok_or(SwitchRejection::NotAdjacent)?;
    if grid.is_linked(p, q) {
        return Err(SwitchRejection::AlreadyLinked);
    }
    if q == grid.root() {
        return Err(SwitchRejection::RootRewire);
    }
    if is_ancestor(grid, q, p) {
        return Err(SwitchRejection::AncestorConflict);
    }
    Ok(towards_p)
}

/// Pick a random adjacent pair not joined by a tree edge, searching around `from` first.
/// None if the grid has no such pair at all.
pub fn select_switch_pair<R: Rng>(grid: &Grid, from: Point, rng: &mut R) -> Option<SwitchPair> {
    if !has_switch_candidates(grid) {
        return None;
    }

    let mut p = if grid.is_valid_coordinate(from) { from } else { grid.random_cell(rng) };
    let mut attempts = 0;
    loop {
        if attempts == REPICK_AFTER_ATTEMPTS {
            p = grid.random_cell(rng);
            attempts = 0;
        }
        attempts += 1;

        let dir = GridDirection::random(rng);
        if let Some(q) = grid.neighbour_at_direction(p, dir) {
            if !grid.is_linked(p, q) {
                return Some(SwitchPair::new(p, q));
            }
        }
    }
}

/// Switch the edge `(pair.from, pair.to)` into the tree.
///
/// The chain of ancestors above `to` is followed up to the first cell also above `from`
/// (their meeting point). That segment has its parent pointers reversed and `to` is then
/// pointed at `from`, so the segment hangs off `from` instead. The one edge removed is the
/// one between the top of the segment and the meeting point.
///
/// On rejection the grid is left untouched.
pub fn switch_with_pair(grid: &mut Grid, pair: SwitchPair) -> Result<SwitchPair, SwitchRejection> {
    let towards_from = check_switch_pair(grid, pair)?;
    let width = grid.width().0;
    let index = |coord: Point| coord.y as usize * width + coord.x as usize;

    let mut above_from = BitSet::with_capacity(grid.size());
    let mut cursor = Some(pair.from);
    while let Some(coord) = cursor {
        if !above_from.insert(index(coord)) {
            break;
        }
        cursor = grid.parent_of(coord);
    }

    let mut segment = vec![];
    let mut cursor = Some(pair.to);
    while let Some(coord) = cursor {
        if above_from.contains(index(coord)) {
            break;
        }
        segment.push(coord);
        cursor = grid.parent_of(coord);
    }

    debug_assert!(!segment.contains(&grid.root()), "switch segment reached the root from {}", pair.to);

    // Each segment cell used to be the parent of the one before it; now it becomes the child.
    let reversed: Vec<(Point, GridDirection)> = segment
        .windows(2)
        .filter_map(|w| grid.cell_at(w[0]).parent.map(|dir| (w[1], dir.opposite())))
        .collect();
    for (coord, dir) in reversed {
        grid.cell_at_mut(coord).parent = Some(dir);
    }
    grid.cell_at_mut(pair.to).parent = Some(towards_from);

    trace!("switched {} onto {}, reversing {} cells", pair.to, pair.from, segment.len());
    Ok(pair)
}

/// One random switch anywhere in the maze.
pub fn switch_path<R: Rng>(grid: &mut Grid, rng: &mut R) -> Option<SwitchPair> {
    let from = grid.random_cell(rng);
    switch_path_from(grid, from, rng)
}

/// One random switch, looking for a pair around `from` first. Rejected pairs are replaced by
/// a fresh random pick until one applies. None if the grid has no switchable pair.
pub fn switch_path_from<R: Rng>(grid: &mut Grid, from: Point, rng: &mut R) -> Option<SwitchPair> {
    let mut pair = select_switch_pair(grid, from, rng)?;
    loop {
        match switch_with_pair(grid, pair) {
            Ok(applied) => return Some(applied),
            Err(rejection) => {
                trace!("switch {:?} rejected: {:?}", pair, rejection);
                let restart = grid.random_cell(rng);
                pair = select_switch_pair(grid, restart, rng)?;
            }
        }
    }
}

/// Apply one switch starting from every cell, visiting the cells in random order.
/// The result no longer carries the shape of the order the maze was generated in.
pub fn random_shuffle<R: Rng>(grid: &mut Grid, rng: &mut R) -> ShuffleStats {
    let mut stats = ShuffleStats::default();
    if !has_switch_candidates(grid) {
        debug!("{}x{} maze has no edges to switch", grid.width().0, grid.height().0);
        return stats;
    }

    let mut starts: Vec<Point> = grid.iter().collect();
    starts.shuffle(rng);
    let total = starts.len();

    for (done, start) in starts.into_iter().enumerate() {
        if switch_path_from(grid, start, rng).is_some() {
            stats.switches += 1;
        }
        trace!("random shuffling... {}%", (done + 1) * 100 / total);
    }

    debug!("shuffled {}x{} maze with {} switches", grid.width().0, grid.height().0, stats.switches);
    stats
}
