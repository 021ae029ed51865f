//! Per-frame point sprite rendering

use catppuccin::PALETTE;

use crate::backend::{GpuBackend, PointDraw};
use crate::buffers::FrameBuffers;
use crate::error::RenderError;

/// Outcome of one render attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented { particle_count: u32 },
    /// No surface was available; the next tick tries again
    Skipped,
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Catppuccin Mocha base, in linear space for an sRGB surface
pub fn background_color() -> wgpu::Color {
    let rgb = PALETTE.mocha.colors.base.rgb;
    wgpu::Color {
        r: srgb_to_linear(rgb.r),
        g: srgb_to_linear(rgb.g),
        b: srgb_to_linear(rgb.b),
        a: 1.0,
    }
}

pub struct Renderer<B: GpuBackend> {
    backend: B,
    clear_color: wgpu::Color,
    frames_presented: u64,
    frames_skipped: u64,
}

impl<B: GpuBackend> Renderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clear_color: background_color(),
            frames_presented: 0,
            frames_skipped: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Draw the particles currently in `buffers`.
    ///
    /// The draw count is the count the buffers were last refreshed with, so
    /// the two can never disagree.
    pub fn render_frame(
        &mut self,
        buffers: &FrameBuffers<B::Buffer>,
    ) -> Result<FrameStatus, RenderError> {
        let Some(target) = self.backend.acquire_target()? else {
            self.frames_skipped += 1;
            log::debug!("No drawable surface, skipping frame");
            return Ok(FrameStatus::Skipped);
        };

        let particle_count = buffers.vertex_count();
        self.backend.draw_points(
            target,
            PointDraw {
                vertices: buffers.vertex_buffer(),
                uniforms: buffers.uniform_buffer(),
                count: particle_count,
                clear_color: self.clear_color,
            },
        );
        self.frames_presented += 1;
        Ok(FrameStatus::Presented { particle_count })
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessBackend;
    use glam::Vec2;
    use liquid_physics::ParticleSnapshot;
    use liquid_simulation::SimulationConfig;

    #[test]
    fn test_background_is_opaque_and_dark() {
        let color = background_color();
        assert_eq!(color.a, 1.0);
        assert!(color.r < 0.05 && color.g < 0.05 && color.b < 0.05);
    }

    #[test]
    fn test_draw_uses_refreshed_count() {
        let mut renderer = Renderer::new(HeadlessBackend::new());
        let mut buffers = FrameBuffers::new(
            renderer.backend_mut(),
            &SimulationConfig::default(),
            Vec2::new(320.0, 480.0),
        );
        let positions = [Vec2::ONE; 7];
        buffers.refresh_vertex_buffer(renderer.backend_mut(), ParticleSnapshot::new(&positions));

        let status = renderer.render_frame(&buffers).unwrap();

        assert_eq!(status, FrameStatus::Presented { particle_count: 7 });
        let draw = &renderer.backend().draws()[0];
        assert_eq!(draw.count, 7);
        assert_eq!(draw.vertex_bytes, 7 * crate::buffers::POSITION_SIZE);
    }

    #[test]
    fn test_missing_surface_skips_silently() {
        let mut renderer = Renderer::new(HeadlessBackend::new());
        let buffers = FrameBuffers::new(
            renderer.backend_mut(),
            &SimulationConfig::default(),
            Vec2::new(320.0, 480.0),
        );
        renderer.backend_mut().withhold_surfaces(1);

        assert_eq!(renderer.render_frame(&buffers).unwrap(), FrameStatus::Skipped);
        assert!(renderer.backend().draws().is_empty());
        assert_eq!(
            renderer.render_frame(&buffers).unwrap(),
            FrameStatus::Presented { particle_count: 0 }
        );
        assert_eq!(renderer.frames_skipped(), 1);
        assert_eq!(renderer.frames_presented(), 1);
    }
}
