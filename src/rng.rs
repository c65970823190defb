use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

/// The pseudorandom source every algorithm in the crate is driven by.
/// It is always passed in explicitly; nothing reads a process-wide generator.
pub type MazeRng = XorShiftRng;

/// A fast, non-cryptographic rng. With a seed the whole random sequence, and so every
/// generated maze, is reproducible; without one it is seeded from the OS.
pub fn seeded_rng(seed: Option<u64>) -> MazeRng {
    match seed {
        Some(state) => XorShiftRng::seed_from_u64(state),
        None => XorShiftRng::from_entropy(),
    }
}
