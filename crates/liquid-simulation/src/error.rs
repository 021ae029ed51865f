//! Simulation error types

use liquid_physics::PhysicsError;
use thiserror::Error;

/// Errors raised by the world store
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The physics engine could not allocate a world. Fatal.
    #[error("world creation failed: {0}")]
    WorldCreation(#[source] PhysicsError),

    /// The world has already been destroyed
    #[error("world has been destroyed")]
    WorldDestroyed,

    /// Any other engine failure
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Errors raised by a motion sensor source
#[derive(Error, Debug)]
pub enum SensorError {
    /// No accelerometer on this device, or it refused to start
    #[error("motion sensor unavailable: {0}")]
    Unavailable(String),

    /// The sampling thread could not be spawned
    #[error("failed to spawn sensor thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result type for world store operations
pub type Result<T> = std::result::Result<T, SimulationError>;
