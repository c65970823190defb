use rand::Rng;
use rand::seq::SliceRandom;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::cells::{CellState, GridDirection, Point};
use crate::grid::Grid;

/// Counters describing one run of the generator.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct GenerationStats {
    /// Random walks started, one per cell that was not yet in the tree.
    pub walks: usize,
    /// Single cell steps taken over all walks.
    pub steps: usize,
    /// Times a walk crossed its own trail and the loop was cut out.
    pub loops_erased: usize,
}

type Step = (GridDirection, Point);

/// Grow a spanning tree over the whole grid with loop-erased random walks (Wilson's algorithm).
///
/// The root `(0, 0)` is the first member of the tree. Every other cell, visited in row-major
/// order, starts a random walk unless it has already joined the tree. The walk wanders until
/// it steps onto a tree cell, cutting out any loop it makes along the way. Once it hits the
/// tree the walked path is reversed so every cell on it points towards the tree, and the
/// whole path joins the tree.
///
/// Any previous content of the grid is discarded first.
pub fn loop_erased_walk<R: Rng>(grid: &mut Grid, rng: &mut R) -> GenerationStats {
    grid.reset();

    let root = grid.root();
    {
        let root_cell = grid.cell_at_mut(root);
        root_cell.state = CellState::InTree;
        root_cell.parent = None;
    }

    let mut stats = GenerationStats::default();

    // A single cell is already a complete tree. There is nowhere to walk to.
    if grid.size() > 1 {
        for start in grid.iter() {
            if grid.cell_at(start).is_in_tree() {
                continue;
            }
            stats.walks += 1;
            walk_to_tree(grid, start, rng, &mut stats);
        }
    }

    debug!("generated {}x{} maze: {} walks, {} steps, {} loops erased",
           grid.width().0, grid.height().0, stats.walks, stats.steps, stats.loops_erased);
    stats
}

/// Replace the grid's content with a fixed comb shaped spanning tree: the first column
/// hangs off the root going down and every other cell points left along its row.
///
/// The result is a valid maze with no randomness at all; `switching::random_shuffle` turns
/// it into a random one without ever walking from an empty grid.
pub fn comb_tree(grid: &mut Grid) {
    for coord in grid.iter() {
        let cell = grid.cell_at_mut(coord);
        cell.state = CellState::InTree;
        cell.parent = match (coord.x, coord.y) {
            (0, 0) => None,
            (0, _) => Some(GridDirection::Up),
            _ => Some(GridDirection::Left),
        };
    }
    debug!("laid a comb tree over {}x{} grid", grid.width().0, grid.height().0);
}

fn walk_to_tree<R: Rng>(grid: &mut Grid, start: Point, rng: &mut R, stats: &mut GenerationStats) {
    grid.cell_at_mut(start).state = CellState::InPath;

    let mut current = start;
    let mut previous_dir: Option<GridDirection> = None;
    let mut walk_steps = 0;

    loop {
        let (dir, next) = random_next_step(grid, current, previous_dir, rng);
        walk_steps += 1;

        match grid.cell_at(next).state {
            CellState::InTree => {
                join_path_to_tree(grid, current, dir);
                break;
            }
            CellState::InPath => {
                erase_loop(grid, current, next);
                stats.loops_erased += 1;
                current = next;
                previous_dir = Some(dir);
            }
            CellState::Unvisited => {
                let next_cell = grid.cell_at_mut(next);
                next_cell.parent = Some(dir.opposite());
                next_cell.state = CellState::InPath;
                current = next;
                previous_dir = Some(dir);
            }
        }
    }

    stats.steps += walk_steps;
    trace!("walk from {} joined the tree after {} steps", start, walk_steps);
}

/// Pick the next step of a walk uniformly from the in-bounds directions, excluding the
/// step straight back where the walk came from.
///
/// At the dead end of a one cell wide corridor stepping back is the only move; it is
/// allowed and the walk then erases the one cell loop it made.
fn random_next_step<R: Rng>(grid: &Grid,
                            current: Point,
                            previous_dir: Option<GridDirection>,
                            rng: &mut R)
                            -> Step {
    let in_bounds: SmallVec<[Step; 4]> = GridDirection::ALL
        .iter()
        .filter_map(|&dir| grid.neighbour_at_direction(current, dir).map(|p| (dir, p)))
        .collect();

    let reversal = previous_dir.map(GridDirection::opposite);
    let forward: SmallVec<[Step; 4]> = in_bounds.iter()
                                                .cloned()
                                                .filter(|&(dir, _)| Some(dir) != reversal)
                                                .collect();

    let admissible = if forward.is_empty() { &in_bounds } else { &forward };
    match admissible.choose(rng) {
        Some(&step) => step,
        None => panic!("direction starvation: no cell to walk to from {}", current),
    }
}

/// Walk back along the unfinished path from `from` resetting every cell until `to`, the cell
/// where the walk crossed its own trail. `to` itself stays on the path.
fn erase_loop(grid: &mut Grid, from: Point, to: Point) {
    let mut cursor = from;
    while cursor != to {
        let previous = grid.parent_of(cursor);
        grid.cell_at_mut(cursor).reset();
        cursor = match previous {
            Some(p) => p,
            None => panic!("loop erasure from {} ran off the path before reaching {}", from, to),
        };
    }
}

/// The walk has reached the tree by stepping `towards_tree` from `from`. Reverse the path
/// back to its start so each cell points at the cell it used to be pointed at by, and
/// commit the whole path to the tree.
fn join_path_to_tree(grid: &mut Grid, from: Point, towards_tree: GridDirection) {
    let mut cursor = from;
    let mut towards = towards_tree;

    loop {
        let old_parent = grid.cell_at(cursor)
                             .parent
                             .and_then(|dir| grid.neighbour_at_direction(cursor, dir).map(|p| (dir, p)));
        {
            let cell = grid.cell_at_mut(cursor);
            cell.parent = Some(towards);
            cell.state = CellState::InTree;
        }
        match old_parent {
            Some((dir, previous)) => {
                towards = dir.opposite();
                cursor = previous;
            }
            // The walk's start cell has no parent of its own.
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};

    use super::*;
    use crate::pathing::verify_spanning_tree;
    use crate::rng::seeded_rng;
    use crate::units::{Height, Width};

    fn grid(w: usize, h: usize) -> Grid {
        Grid::new(Width(w), Height(h)).expect("valid grid dimensions")
    }

    fn generated(w: usize, h: usize, seed: u64) -> Grid {
        let mut g = grid(w, h);
        let mut rng = seeded_rng(Some(seed));
        let _ = loop_erased_walk(&mut g, &mut rng);
        g
    }

    fn parents(g: &Grid) -> Vec<Option<GridDirection>> {
        g.cells().iter().map(|cell| cell.parent).collect()
    }

    #[test]
    fn single_cell_maze_is_just_the_root() {
        let mut g = grid(1, 1);
        let mut rng = seeded_rng(Some(1));
        let stats = loop_erased_walk(&mut g, &mut rng);

        assert_eq!(stats, GenerationStats::default());
        let root = g.cell_at(g.root());
        assert_eq!(root.state, CellState::InTree);
        assert_eq!(root.parent, None);
        assert_eq!(g.links_count(), 0);
        assert_eq!(verify_spanning_tree(&g), Ok(()));
    }

    #[test]
    fn spanning_tree_over_assorted_shapes() {
        let shapes = [(2, 1), (1, 2), (1, 7), (9, 1), (2, 2), (3, 5), (8, 8), (20, 13)];
        for (seed, &(w, h)) in shapes.iter().enumerate() {
            let g = generated(w, h, seed as u64);
            assert_eq!(verify_spanning_tree(&g), Ok(()), "{}x{} grid", w, h);
            assert_eq!(g.links_count(), w * h - 1);
        }
    }

    #[test]
    fn every_cell_joins_the_tree() {
        let g = generated(12, 9, 99);
        for coord in g.iter() {
            assert_eq!(g.cell_at(coord).state, CellState::InTree, "cell {}", coord);
            if coord == g.root() {
                assert_eq!(g.cell_at(coord).parent, None);
            } else {
                assert!(g.cell_at(coord).parent.is_some());
            }
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generated(15, 11, 2024);
        let b = generated(15, 11, 2024);
        assert_eq!(parents(&a), parents(&b));
    }

    #[test]
    fn two_by_two_seed_42_is_reproducible() {
        let a = generated(2, 2, 42);
        let b = generated(2, 2, 42);
        assert_eq!(parents(&a), parents(&b));
        assert_eq!(parents(&a),
                   vec![None, Some(GridDirection::Left), Some(GridDirection::Up), Some(GridDirection::Left)]);
        assert_eq!(verify_spanning_tree(&a), Ok(()));
        assert_eq!(a.links_count(), 3);
        // Exactly one of the four possible 2x2 edges is left closed.
        let closed = [(Point::new(0, 0), Point::new(1, 0)),
                      (Point::new(0, 0), Point::new(0, 1)),
                      (Point::new(1, 0), Point::new(1, 1)),
                      (Point::new(0, 1), Point::new(1, 1))]
            .iter()
            .filter(|&&(p, q)| !a.is_linked(p, q))
            .count();
        assert_eq!(closed, 1);
    }

    #[test]
    fn different_seeds_give_different_mazes() {
        let a = generated(10, 10, 1);
        let b = generated(10, 10, 2);
        assert_ne!(parents(&a), parents(&b));
    }

    #[test]
    fn regenerating_discards_the_old_maze() {
        let mut g = grid(6, 6);
        let mut rng = seeded_rng(Some(5));
        let _ = loop_erased_walk(&mut g, &mut rng);
        let _ = loop_erased_walk(&mut g, &mut rng);
        assert_eq!(verify_spanning_tree(&g), Ok(()));

        let mut fresh = grid(6, 6);
        let mut rng = seeded_rng(Some(5));
        let first_stats = loop_erased_walk(&mut fresh, &mut rng);
        assert!(first_stats.walks > 0);
        assert!(first_stats.steps >= first_stats.walks);
    }

    #[test]
    fn corridors_and_narrow_grids_finish_quickly() {
        for seed in 0..64 {
            for n in 4..13 {
                for &(w, h) in &[(1, n), (n, 1)] {
                    let mut g = grid(w, h);
                    let stats = loop_erased_walk(&mut g, &mut seeded_rng(Some(seed)));
                    assert!(stats.steps <= 20 * n * n, "{}x{} seed {} took {} steps", w, h, seed, stats.steps);
                    assert_eq!(verify_spanning_tree(&g), Ok(()));
                }
            }
            for &(w, h) in &[(2, 30), (30, 2)] {
                let mut g = grid(w, h);
                let stats = loop_erased_walk(&mut g, &mut seeded_rng(Some(seed)));
                assert!(stats.steps <= 50_000, "{}x{} seed {} took {} steps", w, h, seed, stats.steps);
                assert_eq!(verify_spanning_tree(&g), Ok(()));
            }
        }
    }

    #[test]
    fn stepping_back_out_of_a_dead_end_keeps_heading_out() {
        // 1x4 corridor: the walk started at (0,1), went down to the dead end at (0,3) and was
        // forced back onto (0,2). After the loop is erased it must not turn round again.
        let mut g = grid(1, 4);
        g.cell_at_mut(Point::new(0, 0)).state = CellState::InTree;
        g.cell_at_mut(Point::new(0, 1)).state = CellState::InPath;
        for &y in &[2, 3] {
            let cell = g.cell_at_mut(Point::new(0, y));
            cell.state = CellState::InPath;
            cell.parent = Some(GridDirection::Up);
        }
        erase_loop(&mut g, Point::new(0, 3), Point::new(0, 2));

        let mut rng = seeded_rng(Some(15));
        for _ in 0..50 {
            let (dir, next) = random_next_step(&g, Point::new(0, 2), Some(GridDirection::Up), &mut rng);
            assert_eq!(dir, GridDirection::Up);
            assert_eq!(next, Point::new(0, 1));
        }
    }

    #[test]
    fn comb_tree_is_a_spanning_tree() {
        let mut g = grid(4, 3);
        comb_tree(&mut g);
        assert_eq!(verify_spanning_tree(&g), Ok(()));
        assert_eq!(g.cell_at(Point::new(0, 0)).parent, None);
        assert_eq!(g.cell_at(Point::new(0, 2)).parent, Some(GridDirection::Up));
        assert_eq!(g.cell_at(Point::new(3, 1)).parent, Some(GridDirection::Left));
        assert!(!g.is_linked(Point::new(1, 0), Point::new(1, 1)));

        for &(w, h) in &[(1, 1), (1, 5), (5, 1)] {
            let mut g = grid(w, h);
            comb_tree(&mut g);
            assert_eq!(verify_spanning_tree(&g), Ok(()));
        }
    }

    #[test]
    fn comb_tree_overwrites_a_generated_maze() {
        let mut g = generated(6, 6, 7);
        comb_tree(&mut g);
        let mut fresh = grid(6, 6);
        comb_tree(&mut fresh);
        assert_eq!(parents(&g), parents(&fresh));
    }

    #[test]
    fn next_step_never_reverses_when_there_is_a_choice() {
        let g = grid(5, 5);
        let mut rng = seeded_rng(Some(11));
        let centre = Point::new(2, 2);
        for _ in 0..500 {
            let (dir, next) = random_next_step(&g, centre, Some(GridDirection::Right), &mut rng);
            assert_ne!(dir, GridDirection::Left);
            assert_eq!(centre.offset(dir), Some(next));
        }
    }

    #[test]
    fn next_step_stays_in_bounds() {
        let g = grid(3, 3);
        let mut rng = seeded_rng(Some(12));
        for _ in 0..500 {
            let (dir, next) = random_next_step(&g, Point::new(0, 0), None, &mut rng);
            assert!(dir == GridDirection::Right || dir == GridDirection::Down);
            assert!(g.is_valid_coordinate(next));
        }
    }

    #[test]
    fn corridor_dead_end_allows_stepping_back() {
        let g = grid(1, 3);
        let mut rng = seeded_rng(Some(13));
        let bottom = Point::new(0, 2);
        let (dir, next) = random_next_step(&g, bottom, Some(GridDirection::Down), &mut rng);
        assert_eq!(dir, GridDirection::Up);
        assert_eq!(next, Point::new(0, 1));
    }

    #[test]
    #[should_panic(expected = "direction starvation")]
    fn isolated_cell_starves() {
        let g = grid(1, 1);
        let mut rng = seeded_rng(Some(14));
        let _ = random_next_step(&g, Point::new(0, 0), None, &mut rng);
    }

    // Each erased cell gets exactly one reset before the walk moves to its parent. A
    // fallthrough that reset and moved once per direction would skip cells and leave
    // stray InPath entries behind.
    #[test]
    fn loop_erasure_resets_exactly_the_loop() {
        let mut g = grid(3, 3);
        let set = |g: &mut Grid, x, y, parent| {
            let cell = g.cell_at_mut(Point::new(x, y));
            cell.state = CellState::InPath;
            cell.parent = parent;
        };
        set(&mut g, 0, 1, None);
        set(&mut g, 1, 1, Some(GridDirection::Left));
        set(&mut g, 1, 2, Some(GridDirection::Up));
        set(&mut g, 0, 2, Some(GridDirection::Right));

        erase_loop(&mut g, Point::new(0, 2), Point::new(0, 1));

        let start = g.cell_at(Point::new(0, 1));
        assert_eq!(start.state, CellState::InPath);
        assert_eq!(start.parent, None);
        for &(x, y) in &[(1, 1), (1, 2), (0, 2)] {
            let cell = g.cell_at(Point::new(x, y));
            assert_eq!(cell.state, CellState::Unvisited);
            assert_eq!(cell.parent, None);
        }
    }

    #[test]
    fn loop_erasure_stops_mid_path() {
        let mut g = grid(3, 1);
        let set = |g: &mut Grid, x, parent| {
            let cell = g.cell_at_mut(Point::new(x, 0));
            cell.state = CellState::InPath;
            cell.parent = parent;
        };
        set(&mut g, 0, None);
        set(&mut g, 1, Some(GridDirection::Left));
        set(&mut g, 2, Some(GridDirection::Left));

        erase_loop(&mut g, Point::new(2, 0), Point::new(1, 0));

        assert_eq!(g.cell_at(Point::new(0, 0)).state, CellState::InPath);
        assert_eq!(g.cell_at(Point::new(1, 0)).state, CellState::InPath);
        assert_eq!(g.cell_at(Point::new(1, 0)).parent, Some(GridDirection::Left));
        assert_eq!(g.cell_at(Point::new(2, 0)).state, CellState::Unvisited);
    }

    #[test]
    fn joining_the_tree_reverses_the_path() {
        let mut g = grid(3, 2);
        {
            let root = g.cell_at_mut(Point::new(0, 0));
            root.state = CellState::InTree;
        }
        {
            let tree_cell = g.cell_at_mut(Point::new(1, 0));
            tree_cell.state = CellState::InTree;
            tree_cell.parent = Some(GridDirection::Left);
        }
        let set = |g: &mut Grid, x, y, parent| {
            let cell = g.cell_at_mut(Point::new(x, y));
            cell.state = CellState::InPath;
            cell.parent = parent;
        };
        // walk: (2,0) -> (2,1) -> (1,1), then steps up onto (1,0)
        set(&mut g, 2, 0, None);
        set(&mut g, 2, 1, Some(GridDirection::Up));
        set(&mut g, 1, 1, Some(GridDirection::Right));

        join_path_to_tree(&mut g, Point::new(1, 1), GridDirection::Up);

        assert_eq!(g.cell_at(Point::new(1, 1)).parent, Some(GridDirection::Up));
        assert_eq!(g.cell_at(Point::new(2, 1)).parent, Some(GridDirection::Left));
        assert_eq!(g.cell_at(Point::new(2, 0)).parent, Some(GridDirection::Down));
        for &(x, y) in &[(1, 1), (2, 1), (2, 0)] {
            assert_eq!(g.cell_at(Point::new(x, y)).state, CellState::InTree);
        }
        // (0,1) was never touched
        assert_eq!(g.cell_at(Point::new(0, 1)).state, CellState::Unvisited);
    }

    #[test]
    fn quickcheck_generated_mazes_are_spanning_trees() {
        fn prop(w: u8, h: u8, seed: u64) -> TestResult {
            let (w, h) = (w as usize % 12 + 1, h as usize % 12 + 1);
            let g = generated(w, h, seed);
            let all_in_tree = g.cells().iter().all(|cell| cell.is_in_tree());
            TestResult::from_bool(all_in_tree && verify_spanning_tree(&g).is_ok())
        }
        quickcheck(prop as fn(u8, u8, u64) -> TestResult);
    }
}
