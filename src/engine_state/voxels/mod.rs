//! # Voxel World
//!
//! This module contains the world model: what can be placed, where it was placed and
//! the registries the simulation reads back every tick.
//!
//! ## Architecture
//!
//! * **Block**: block and creature kinds plus placed instances
//! * **World**: the placement engine and owner of all instances
//! * **Registry**: walkable volumes and hazards derived from placements
//! * **Generation**: terrain, structure stamping and the island layout
//!
//! ## Data Flow
//!
//! 1. The island layout stamps cells into a structure plan
//! 2. The plan is committed to the world, one placement per cell
//! 3. Each placement is classified into the solid or hazard registry or the creature list
//! 4. The simulation reads the registries and animates instance state

pub mod aabb;
pub mod block;
pub mod generation;
pub mod registry;
pub mod world;
