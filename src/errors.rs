// Create the Error, ErrorKind, ResultExt, and Result types.
// Other modules `use crate::errors::*;` to get at everything `error_chain!` creates.
use error_chain::error_chain;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
        Image(::image::ImageError);
    }

    errors {
        InvalidGridDimensions(width: usize, height: usize) {
            description("invalid grid dimensions")
            display("invalid grid dimensions {}x{}: both sides must be at least 1 and the cell count must fit a u32 coordinate", width, height)
        }
        InvalidCellSize(pixels: u32) {
            description("invalid cell pixel size")
            display("invalid cell pixel size {}: a cell needs at least 2 pixels per side", pixels)
        }
        ImageTooLarge(width: u64, height: u64) {
            description("maze image too large")
            display("maze image of {}x{} pixels does not fit u32 image dimensions", width, height)
        }
    }
}
