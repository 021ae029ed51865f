//! Frame orchestration
//!
//! One tick per display refresh: step the world, copy positions into the
//! vertex buffer, draw. Ticks take `&mut self` and arrive one at a time from
//! the event loop, so they never overlap.

use std::time::{Duration, Instant};

use glam::Vec2;
use liquid_physics::{ParticleSystemHandle, PhysicsEngine};
use liquid_renderer::{FrameBuffers, FrameStatus, GpuBackend, RenderError, Renderer};
use liquid_simulation::{SharedGravity, SimulationConfig, SimulationError, TouchEmitter, WorldStore};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Waiting for the first refresh
    Idle,
    Running { last_tick: Instant },
    /// World destroyed; no further ticks
    Stopped,
}

pub struct FrameOrchestrator<E: PhysicsEngine, B: GpuBackend> {
    config: SimulationConfig,
    world: WorldStore<E>,
    system: ParticleSystemHandle,
    buffers: FrameBuffers<B::Buffer>,
    renderer: Renderer<B>,
    touch: TouchEmitter,
    state: FrameState,
    last_time_step: f32,
    last_frame_time: Duration,
}

impl<E: PhysicsEngine, B: GpuBackend> FrameOrchestrator<E, B> {
    /// Build the world, fence it to the viewport, and allocate frame buffers.
    pub fn new(config: SimulationConfig, backend: B, viewport: Vec2) -> Result<Self, FrameError> {
        let mut world = WorldStore::<E>::create(config.initial_gravity())?;
        let system = world.create_particle_system(&config.particle_system_def())?;
        world.set_particle_limit(system, config.max_particles)?;
        world.add_edge_boundary(Vec2::ZERO, config.pixels_to_meters(viewport))?;

        let mut renderer = Renderer::new(backend);
        let buffers = FrameBuffers::new(renderer.backend_mut(), &config, viewport);
        let touch = TouchEmitter::new(&config, viewport.y);

        Ok(Self {
            config,
            world,
            system,
            buffers,
            renderer,
            touch,
            state: FrameState::Idle,
            last_time_step: 0.0,
            last_frame_time: Duration::ZERO,
        })
    }

    /// Writer handle for the motion adapter
    pub fn gravity_handle(&self) -> SharedGravity {
        self.world.gravity_handle()
    }

    /// Emit one particle box per touch point (screen pixels).
    ///
    /// Returns how many particles were created in total.
    pub fn touches_began<I>(&mut self, touches: I) -> Result<usize, FrameError>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut created = 0;
        for request in self.touch.touches_began(touches) {
            created += self.world.emit(self.system, request)?;
        }
        Ok(created)
    }

    pub fn tick(&mut self, now: Instant) -> Result<FrameStatus, FrameError> {
        let elapsed = match self.state {
            FrameState::Idle => Duration::from_secs_f32(self.config.nominal_time_step),
            FrameState::Running { last_tick } => now.saturating_duration_since(last_tick),
            FrameState::Stopped => return Err(SimulationError::WorldDestroyed.into()),
        };
        self.state = FrameState::Running { last_tick: now };
        self.last_frame_time = elapsed;
        self.last_time_step = elapsed.as_secs_f32().min(self.config.max_time_step);

        self.world.step(
            self.last_time_step,
            self.config.velocity_iterations,
            self.config.position_iterations,
        )?;

        let snapshot = self.world.snapshot_positions(self.system)?;
        self.buffers
            .refresh_vertex_buffer(self.renderer.backend_mut(), snapshot);

        Ok(self.renderer.render_frame(&self.buffers)?)
    }

    /// Tear down the world. Later calls do nothing.
    pub fn shutdown(&mut self) -> bool {
        self.state = FrameState::Stopped;
        self.world.destroy()
    }

    #[cfg(test)]
    pub fn state(&self) -> FrameState {
        self.state
    }

    #[cfg(test)]
    pub fn world(&self) -> &WorldStore<E> {
        &self.world
    }

    #[cfg(test)]
    pub fn particle_system(&self) -> ParticleSystemHandle {
        self.system
    }

    #[cfg(test)]
    pub fn particle_count(&self) -> u32 {
        self.buffers.vertex_count()
    }

    pub fn renderer(&self) -> &Renderer<B> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<B> {
        &mut self.renderer
    }

    /// Simulation step used by the last tick, after clamping
    pub fn last_time_step(&self) -> f32 {
        self.last_time_step
    }

    /// Wall-clock time between the last two ticks
    pub fn last_frame_time(&self) -> Duration {
        self.last_frame_time
    }
}
