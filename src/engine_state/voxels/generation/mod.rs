//! # Island Generation
//!
//! Everything that decides what goes where before the simulation starts.
//!
//! * **terrain**: layered radial terrain and the soul sand ring
//! * **plan**: last-write-wins staging of grid cells
//! * **structures**: fixed architectural stamping routines
//! * **island**: the full island layout built from the pieces above

pub mod island;
pub mod plan;
pub mod structures;
pub mod terrain;
