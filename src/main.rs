use docopt::Docopt;
use serde_derive::Deserialize;
use mazes::{
    generators,
    grid::Grid,
    grid_displays::{ParentArrowsDisplay, PathDisplay},
    pathing,
    renderers,
    rng,
    switching,
    units::{Height, Width},
};
use std::{io, rc::Rc};
use tracing::{debug, info_span, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Maze

Generate a perfect maze, either with loop-erased random walks or by shuffling a comb tree.

Usage:
    maze <width> <height> [<seed>] [--engine=<engine>] [--shuffle] [--text] [--image-out=<stem>] [--cell-pixels=<n>] [--solution]
    maze -h | --help

Options:
    -h --help            Show this screen.
    --engine=<engine>    walk grows the maze with loop-erased random walks, comb shuffles a fixed comb shaped tree [default: walk].
    --shuffle            Switch one tree edge from every cell, in random order, after generating.
    --text               Print the maze as text with each cell's parent direction.
    --image-out=<stem>   Write <stem>_<width>x<height>.png. Always PNG format.
    --cell-pixels=<n>    Pixel length of one cell wall in an image [default: 6].
    --solution           Also show the route from the exit to the entry, as text and as <stem>_<width>x<height>_solution.png.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    arg_width: usize,
    arg_height: usize,
    arg_seed: Option<u64>,
    flag_engine: Engine,
    flag_shuffle: bool,
    flag_text: bool,
    flag_image_out: String,
    flag_cell_pixels: u32,
    flag_solution: bool,
}

#[derive(Debug, Deserialize, Copy, Clone, Eq, PartialEq)]
enum Engine {
    Walk,
    Comb,
}

mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazes::errors::Error, ::mazes::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: MazeArgs = match Docopt::new(USAGE).and_then(|d| d.deserialize()) {
        Ok(args) => args,
        Err(docopt::Error::Help) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Err(docopt::Error::WithProgramUsage(cause, usage)) => {
            debug!("bad arguments: {}", cause);
            println!("{}", usage);
            return Ok(());
        }
        Err(docopt::Error::Deserialize(reason)) => {
            debug!("bad arguments: {}", reason);
            println!("{}", USAGE);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut maze_grid = Grid::new(Width(args.arg_width), Height(args.arg_height))?;
    let mut rng = rng::seeded_rng(args.arg_seed);

    println!("start");
    {
        let _span = info_span!("generate", width = args.arg_width, height = args.arg_height).entered();
        match args.flag_engine {
            Engine::Walk => {
                generators::loop_erased_walk(&mut maze_grid, &mut rng);
            }
            Engine::Comb => {
                generators::comb_tree(&mut maze_grid);
                switching::random_shuffle(&mut maze_grid, &mut rng);
            }
        }
    }
    if args.flag_shuffle {
        let _span = info_span!("shuffle").entered();
        switching::random_shuffle(&mut maze_grid, &mut rng);
    }
    println!("done");

    if let Err(defect) = pathing::verify_spanning_tree(&maze_grid) {
        warn!("maze is not a spanning tree: {:?}", defect);
    }

    if args.flag_text {
        set_maze_griddisplay(&mut maze_grid, args.flag_solution);
        println!("{}", maze_grid);
    }

    if !args.flag_image_out.is_empty() {
        let render_options = renderers::RenderOptionsBuilder::new()
            .cell_side_pixels_length(args.flag_cell_pixels)
            .show_path(args.flag_solution)
            .output_stem(Some(args.flag_image_out.as_str()))
            .build();
        for path in renderers::save_maze_images(&maze_grid, &render_options)? {
            debug!("saved {}", path.display());
        }
    }

    Ok(())
}

/// Arrows towards each cell's parent, or the route from the far corner back to the root.
fn set_maze_griddisplay(maze_grid: &mut Grid, show_solution: bool) {
    if show_solution {
        let path = pathing::path_to_root(maze_grid, maze_grid.far_corner()).unwrap_or_default();
        maze_grid.set_grid_display(Some(Rc::new(PathDisplay::new(&path))));
    } else {
        let arrows = ParentArrowsDisplay::new(maze_grid);
        maze_grid.set_grid_display(Some(Rc::new(arrows)));
    }
}
