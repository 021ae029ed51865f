//! # Liquid Simulation
//!
//! Owns the physics world and the two input adapters that feed it: device
//! tilt drives gravity, touches emit new particles.

pub mod error;
pub mod gravity;
pub mod motion;
pub mod params;
pub mod touch;
pub mod world;

pub use error::*;
pub use gravity::*;
pub use motion::*;
pub use params::*;
pub use touch::*;
pub use world::*;
