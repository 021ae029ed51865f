//! # Liquid Physics Engine
//!
//! The physics collaborator behind the liquid simulation: a small trait that
//! the rest of the workspace steps and queries, plus a CPU particle solver that
//! implements it.

pub mod constants;
pub mod engine;
pub mod particle;
pub mod solver;

pub use constants::*;
pub use engine::*;
pub use particle::*;
pub use solver::*;
