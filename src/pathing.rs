use smallvec::SmallVec;

use crate::cells::{CellState, Point};
use crate::grid::Grid;
use crate::utils::{self, FnvHashMap, FnvHashSet};

/// Why a grid's parent pointers are not a spanning tree rooted at the grid root.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum TreeDefect {
    /// The cell is unvisited or still on an unfinished walk.
    NotInTree(Point),
    /// The designated root points somewhere.
    RootHasParent,
    /// A cell other than the root has no parent.
    ExtraRoot(Point),
    /// The cell's parent pointer leads off the grid.
    ParentOutOfBounds(Point),
    /// Following parents from this cell never reaches the root.
    Cycle(Point),
}

/// Check the grid is a single spanning tree: every cell in the tree, exactly one root, all
/// parents in bounds, and every parent chain reaching the root in at most `size - 1` steps.
pub fn verify_spanning_tree(grid: &Grid) -> Result<(), TreeDefect> {
    let root = grid.root();
    let cells_count = grid.size();

    for coord in grid.iter() {
        let cell = grid.cell_at(coord);
        if cell.state != CellState::InTree {
            return Err(TreeDefect::NotInTree(coord));
        }
        match cell.parent {
            None if coord != root => return Err(TreeDefect::ExtraRoot(coord)),
            Some(_) if coord == root => return Err(TreeDefect::RootHasParent),
            Some(_) if grid.parent_of(coord).is_none() => {
                return Err(TreeDefect::ParentOutOfBounds(coord))
            }
            _ => {}
        }
    }

    // Depth of each cell below the root, filled in chain by chain so no cell is walked twice.
    let index = |coord: Point| coord.y as usize * grid.width().0 + coord.x as usize;
    let mut depths: Vec<Option<usize>> = vec![None; cells_count];
    depths[index(root)] = Some(0);

    for coord in grid.iter() {
        let mut chain = vec![];
        let mut cursor = coord;
        let base_depth = loop {
            if let Some(depth) = depths[index(cursor)] {
                break depth;
            }
            if chain.len() >= cells_count {
                return Err(TreeDefect::Cycle(coord));
            }
            chain.push(index(cursor));
            cursor = match grid.parent_of(cursor) {
                Some(parent) => parent,
                None => return Err(TreeDefect::ExtraRoot(cursor)),
            };
        };
        for (steps, &chain_index) in chain.iter().rev().enumerate() {
            depths[chain_index] = Some(base_depth + steps + 1);
        }
    }

    Ok(())
}

/// Every cell from `from` up to and including the root, following parent pointers.
/// None if `from` is off the grid or its chain never reaches the root.
pub fn path_to_root(grid: &Grid, from: Point) -> Option<Vec<Point>> {
    if !grid.is_valid_coordinate(from) {
        return None;
    }
    let root = grid.root();
    let mut path = vec![from];
    let mut cursor = from;
    while cursor != root {
        if path.len() > grid.size() {
            return None;
        }
        cursor = grid.parent_of(cursor)?;
        path.push(cursor);
    }
    Some(path)
}

/// The tree edges as unordered point pairs, smaller point first.
pub fn tree_edges(grid: &Grid) -> FnvHashSet<(Point, Point)> {
    let mut edges = utils::fnv_hashset(grid.size());
    edges.extend(grid.iter_links().map(|(a, b)| if a < b { (a, b) } else { (b, a) }));
    edges
}

#[derive(Debug, Clone)]
pub struct Distances {
    start_coordinate: Point,
    distances: FnvHashMap<Point, u32>,
    max_distance: u32,
}

impl Distances {
    /// Steps along maze passages from `start` to every cell reachable from it.
    /// None if `start` is not on the grid.
    pub fn new(grid: &Grid, start_coordinate: Point) -> Option<Distances> {

        if !grid.is_valid_coordinate(start_coordinate) {
            return None;
        }

        let mut max = 0;
        let mut distances = utils::fnv_hashmap(grid.size());
        distances.insert(start_coordinate, 0);

        // Every link is one step, so the first time a cell is reached is by a shortest route
        // and the distances map doubles as the visited set.
        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {

            let mut new_frontier = vec![];
            for cell_coord in &frontier {
                let distance_to_cell = distances[cell_coord];
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                for link_coordinate in grid.links(*cell_coord) {
                    if !distances.contains_key(&link_coordinate) {
                        distances.insert(link_coordinate, distance_to_cell + 1);
                        new_frontier.push(link_coordinate);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_coordinate,
            distances,
            max_distance: max,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Point {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, coord: Point) -> Option<u32> {
        self.distances.get(&coord).cloned()
    }

    pub fn furthest_points_on_grid(&self) -> SmallVec<[Point; 8]> {
        let furthest_distance = self.max();
        self.distances
            .iter()
            .filter(|&(_, distance)| *distance == furthest_distance)
            .map(|(coord, _)| *coord)
            .collect()
    }
}

/// Walk downhill through the distances from `end_point` back to the start.
/// Returns the path start first, or None if `end_point` cannot be reached.
pub fn shortest_path(grid: &Grid, distances_from_start: &Distances, end_point: Point) -> Option<Vec<Point>> {

    let mut current_distance = distances_from_start.distance_from_start_to(end_point)?;
    let mut path = vec![end_point];
    let start = distances_from_start.start();
    let mut current_coord = end_point;

    while current_coord != start {

        let closest_to_start = grid.links(current_coord)
            .into_iter()
            .filter_map(|coord| distances_from_start.distance_from_start_to(coord).map(|d| (coord, d)))
            .min_by_key(|&(_, distance)| distance);

        match closest_to_start {
            Some((closer_coord, closer_distance)) if closer_distance < current_distance => {
                current_coord = closer_coord;
                current_distance = closer_distance;
                path.push(current_coord);
            }
            // No linked neighbour gets any closer: the distances do not belong to this grid.
            _ => return None,
        }
    }

    path.reverse();
    Some(path)
}
