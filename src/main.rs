//! # Nether Island Entry Point
//!
//! Calls into the library's `run()` function to load the models and start the simulation.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    nether_island::run();
}
