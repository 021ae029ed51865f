//! Particle world store
//!
//! Single owner of the physics world. Gravity writes go through
//! [`SharedGravity`] so they can come from any thread; everything else needs
//! `&mut self` and therefore runs on the frame loop.

use glam::Vec2;
use liquid_physics::{ParticleSnapshot, ParticleSystemDef, ParticleSystemHandle, PhysicsEngine};

use crate::error::{Result, SimulationError};
use crate::gravity::SharedGravity;

/// Request to spawn a rectangular cluster of particles, in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionRequest {
    /// Centre of the cluster
    pub position: Vec2,
    pub size: Vec2,
}

pub struct WorldStore<E: PhysicsEngine> {
    engine: Option<E>,
    gravity: SharedGravity,
}

impl<E: PhysicsEngine> WorldStore<E> {
    /// Allocate the world. Failure here is unrecoverable for the app.
    pub fn create(gravity: Vec2) -> Result<Self> {
        let engine = E::create_world(gravity).map_err(SimulationError::WorldCreation)?;
        log::info!("✓ Physics world created (gravity {gravity})");
        Ok(Self {
            engine: Some(engine),
            gravity: SharedGravity::new(gravity),
        })
    }

    /// Handle for writers on other threads (the motion adapter)
    pub fn gravity_handle(&self) -> SharedGravity {
        self.gravity.clone()
    }

    pub fn set_gravity(&self, gravity: Vec2) {
        self.gravity.store(gravity);
    }

    pub fn is_alive(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Result<&E> {
        self.engine.as_ref().ok_or(SimulationError::WorldDestroyed)
    }

    fn engine_mut(&mut self) -> Result<&mut E> {
        self.engine.as_mut().ok_or(SimulationError::WorldDestroyed)
    }

    pub fn create_particle_system(
        &mut self,
        def: &ParticleSystemDef,
    ) -> Result<ParticleSystemHandle> {
        Ok(self.engine_mut()?.create_particle_system(def)?)
    }

    pub fn set_particle_limit(
        &mut self,
        system: ParticleSystemHandle,
        max_particles: usize,
    ) -> Result<()> {
        Ok(self.engine_mut()?.set_particle_limit(system, max_particles)?)
    }

    /// Spawn a particle box. Returns how many particles were created; zero once
    /// the system is full, which is not an error.
    pub fn emit(&mut self, system: ParticleSystemHandle, request: EmissionRequest) -> Result<usize> {
        Ok(self
            .engine_mut()?
            .create_particle_box(system, request.position, request.size)?)
    }

    /// Fence the simulation with a static rectangle of edges.
    pub fn add_edge_boundary(&mut self, origin: Vec2, size: Vec2) -> Result<()> {
        self.engine_mut()?.create_edge_box(origin, size);
        log::debug!("Edge boundary added at {origin} with size {size}");
        Ok(())
    }

    /// Advance the simulation using the most recently written gravity.
    pub fn step(
        &mut self,
        dt: f32,
        velocity_iterations: u32,
        position_iterations: u32,
    ) -> Result<()> {
        let gravity = self.gravity.load();
        let engine = self.engine_mut()?;
        if engine.gravity() != gravity {
            engine.set_gravity(gravity);
        }
        engine.step(dt, velocity_iterations, position_iterations);
        Ok(())
    }

    pub fn snapshot_positions(&self, system: ParticleSystemHandle) -> Result<ParticleSnapshot<'_>> {
        Ok(self.engine()?.particle_positions(system)?)
    }

    /// Release the world and every particle system in it.
    ///
    /// Returns `false` if there was nothing left to destroy.
    pub fn destroy(&mut self) -> bool {
        match self.engine.take() {
            Some(engine) => {
                drop(engine);
                log::info!("Physics world destroyed");
                true
            }
            None => false,
        }
    }
}

impl<E: PhysicsEngine> Drop for WorldStore<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquid_physics::CpuWorld;

    use crate::params::SimulationConfig;

    fn store() -> (WorldStore<CpuWorld>, ParticleSystemHandle) {
        let config = SimulationConfig::default();
        let mut world = WorldStore::<CpuWorld>::create(config.initial_gravity()).unwrap();
        let system = world
            .create_particle_system(&config.particle_system_def())
            .unwrap();
        world
            .set_particle_limit(system, config.max_particles)
            .unwrap();
        (world, system)
    }

    #[test]
    fn test_gravity_last_write_wins() {
        let (mut world, system) = store();
        world
            .emit(
                system,
                EmissionRequest {
                    position: Vec2::splat(5.0),
                    size: Vec2::splat(0.01),
                },
            )
            .unwrap();

        world.set_gravity(Vec2::new(0.0, 50.0));
        world.set_gravity(Vec2::new(20.0, 0.0));
        world.step(1.0 / 60.0, 8, 3).unwrap();

        assert_eq!(world.engine().unwrap().gravity(), Vec2::new(20.0, 0.0));
        let position = world.snapshot_positions(system).unwrap().positions()[0];
        assert!(position.x > 5.0);
        assert_eq!(position.y, 5.0);
    }

    #[test]
    fn test_gravity_handle_writes_reach_step() {
        let (mut world, _) = store();
        let handle = world.gravity_handle();
        handle.store(Vec2::new(-3.0, 1.0));
        world.step(1.0 / 60.0, 8, 3).unwrap();
        assert_eq!(world.engine().unwrap().gravity(), Vec2::new(-3.0, 1.0));
    }

    #[test]
    fn test_emission_cap() {
        let config = SimulationConfig {
            max_particles: 100,
            ..Default::default()
        };
        let mut world = WorldStore::<CpuWorld>::create(config.initial_gravity()).unwrap();
        let system = world
            .create_particle_system(&config.particle_system_def())
            .unwrap();
        world.set_particle_limit(system, config.max_particles).unwrap();

        let request = EmissionRequest {
            position: Vec2::splat(10.0),
            size: config.emission_box_size(),
        };
        let mut total = 0;
        for _ in 0..5 {
            total += world.emit(system, request).unwrap();
        }

        assert_eq!(total, 100);
        assert_eq!(world.snapshot_positions(system).unwrap().len(), 100);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (mut world, system) = store();
        assert!(world.is_alive());
        assert!(world.destroy());
        assert!(!world.destroy());
        assert!(!world.is_alive());

        assert!(matches!(
            world.step(1.0 / 60.0, 8, 3),
            Err(SimulationError::WorldDestroyed)
        ));
        assert!(matches!(
            world.snapshot_positions(system),
            Err(SimulationError::WorldDestroyed)
        ));
    }

    #[test]
    fn test_invalid_radius_surfaces_as_physics_error() {
        let mut world = WorldStore::<CpuWorld>::create(Vec2::ZERO).unwrap();
        let def = ParticleSystemDef {
            radius: 0.0,
            damping_strength: 0.0,
            gravity_scale: 1.0,
            density: 1.0,
        };
        assert!(matches!(
            world.create_particle_system(&def),
            Err(SimulationError::Physics(_))
        ));
    }

    #[test]
    fn test_world_creation_failure() {
        let result = WorldStore::<CpuWorld>::create(Vec2::new(f32::NAN, 0.0));
        assert!(matches!(result, Err(SimulationError::WorldCreation(_))));
    }

    #[test]
    fn test_snapshot_after_emit_and_step() {
        let config = SimulationConfig::default();
        let (mut world, system) = store();
        let centre = Vec2::new(10.0, 10.0);
        world
            .emit(
                system,
                EmissionRequest {
                    position: centre,
                    size: config.pixels_to_meters(Vec2::splat(50.0)),
                },
            )
            .unwrap();
        let before = world.snapshot_positions(system).unwrap().mean_position().unwrap();
        world
            .step(
                1.0 / 60.0,
                config.velocity_iterations,
                config.position_iterations,
            )
            .unwrap();
        let snapshot = world.snapshot_positions(system).unwrap();
        assert!(!snapshot.is_empty());
        assert!(snapshot.mean_position().unwrap().y < before.y);
    }
}
