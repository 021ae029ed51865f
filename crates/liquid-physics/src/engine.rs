//! The physics engine seam
//!
//! The simulation never reaches into solver state directly. It creates a
//! world, asks for particle systems and boundaries, steps, and reads positions
//! back through this trait.

use glam::Vec2;
use thiserror::Error;

use crate::particle::{ParticleSnapshot, ParticleSystemDef, ParticleSystemHandle};

/// Errors reported by a physics engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// The engine could not allocate a world
    #[error("failed to create physics world: {0}")]
    WorldAllocation(String),

    /// Particle radius must be positive and finite
    #[error("invalid particle radius {0}, must be positive and finite")]
    InvalidRadius(f32),

    /// The handle does not name a particle system in this world
    #[error("unknown particle system {0:?}")]
    UnknownSystem(ParticleSystemHandle),
}

/// Opaque stepping/query service for a 2D particle world.
///
/// Emissions beyond a system's particle limit are dropped by the engine and
/// are not reported as errors.
pub trait PhysicsEngine {
    /// Allocate a world with the given gravity.
    fn create_world(gravity: Vec2) -> Result<Self, PhysicsError>
    where
        Self: Sized;

    fn gravity(&self) -> Vec2;

    /// Overwrite the world gravity. Takes effect on the next step.
    fn set_gravity(&mut self, gravity: Vec2);

    fn create_particle_system(
        &mut self,
        def: &ParticleSystemDef,
    ) -> Result<ParticleSystemHandle, PhysicsError>;

    /// Cap the number of particles a system may hold.
    fn set_particle_limit(
        &mut self,
        system: ParticleSystemHandle,
        max_particles: usize,
    ) -> Result<(), PhysicsError>;

    /// Spawn a rectangular cluster of particles centred at `position`.
    ///
    /// Returns how many particles were actually created.
    fn create_particle_box(
        &mut self,
        system: ParticleSystemHandle,
        position: Vec2,
        size: Vec2,
    ) -> Result<usize, PhysicsError>;

    /// Add four static edges spanning `origin` to `origin + size`.
    fn create_edge_box(&mut self, origin: Vec2, size: Vec2);

    fn step(&mut self, time_step: f32, velocity_iterations: u32, position_iterations: u32);

    /// Current particle positions. The slice borrows the engine, so it cannot
    /// be held across a `step` or an emission.
    fn particle_positions(
        &self,
        system: ParticleSystemHandle,
    ) -> Result<ParticleSnapshot<'_>, PhysicsError>;

    fn particle_count(&self, system: ParticleSystemHandle) -> Result<usize, PhysicsError> {
        Ok(self.particle_positions(system)?.len())
    }
}
