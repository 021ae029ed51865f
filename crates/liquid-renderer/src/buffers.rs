//! GPU buffer manager
//!
//! The vertex buffer is allocated once at the particle limit and each frame
//! writes a variable-length prefix. It only grows if a snapshot ever exceeds
//! that capacity. The uniform buffer is written once, since the viewport does
//! not change.

use glam::Vec2;
use liquid_physics::ParticleSnapshot;
use liquid_simulation::SimulationConfig;

use crate::backend::{BufferRole, GpuBackend};
use crate::uniforms::Uniforms;

/// Bytes per particle in the vertex buffer
pub const POSITION_SIZE: usize = std::mem::size_of::<Vec2>();

pub struct FrameBuffers<B> {
    vertex_buffer: B,
    vertex_capacity: usize,
    vertex_count: u32,
    uniform_buffer: B,
    uniforms: Uniforms,
}

impl<B> FrameBuffers<B> {
    /// Allocate both buffers and upload the uniforms.
    ///
    /// The ratio comes from the same config that built the particle system.
    pub fn new<G>(backend: &mut G, config: &SimulationConfig, viewport: Vec2) -> Self
    where
        G: GpuBackend<Buffer = B>,
    {
        let uniforms = Uniforms::new(viewport, config.ptm_ratio, config.point_size);
        let uniform_buffer = backend.create_buffer(
            "Uniform Buffer",
            BufferRole::Uniform,
            std::mem::size_of::<Uniforms>() as u64,
        );
        backend.write_buffer(&uniform_buffer, bytemuck::bytes_of(&uniforms));

        let vertex_capacity = config.max_particles.max(1);
        let vertex_buffer = backend.create_buffer(
            "Particle Vertex Buffer",
            BufferRole::Vertex,
            (vertex_capacity * POSITION_SIZE) as u64,
        );

        log::info!(
            "✓ Frame buffers allocated ({} particles, viewport {}x{})",
            vertex_capacity,
            viewport.x,
            viewport.y
        );

        Self {
            vertex_buffer,
            vertex_capacity,
            vertex_count: 0,
            uniform_buffer,
            uniforms,
        }
    }

    /// Copy the snapshot into the vertex buffer and record its count.
    ///
    /// Must run after every step and before the next draw; the copy is taken
    /// before control returns to the physics engine.
    pub fn refresh_vertex_buffer<G>(&mut self, backend: &mut G, snapshot: ParticleSnapshot<'_>)
    where
        G: GpuBackend<Buffer = B>,
    {
        let positions = snapshot.positions();
        if positions.len() > self.vertex_capacity {
            let capacity = positions.len().next_power_of_two();
            log::debug!(
                "Growing vertex buffer from {} to {} particles",
                self.vertex_capacity,
                capacity
            );
            self.vertex_buffer = backend.create_buffer(
                "Particle Vertex Buffer",
                BufferRole::Vertex,
                (capacity * POSITION_SIZE) as u64,
            );
            self.vertex_capacity = capacity;
        }

        backend.write_buffer(&self.vertex_buffer, bytemuck::cast_slice(positions));
        self.vertex_count = snapshot.count();
    }

    pub fn vertex_buffer(&self) -> &B {
        &self.vertex_buffer
    }

    pub fn uniform_buffer(&self) -> &B {
        &self.uniform_buffer
    }

    /// Particles written by the last refresh; the draw uses exactly this many.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertex_capacity
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }
}
