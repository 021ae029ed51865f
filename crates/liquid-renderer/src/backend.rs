//! The GPU backend seam
//!
//! Buffer allocation, uploads, surface acquisition and the point draw are all
//! the frame loop needs from a GPU API. `WgpuBackend` presents to a window;
//! `HeadlessBackend` keeps everything in memory.

use crate::error::RenderError;

/// What a buffer will be bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    /// Per-instance particle positions
    Vertex,
    Uniform,
}

/// One frame's draw: `count` point sprites read from the front of `vertices`
pub struct PointDraw<'a, B> {
    pub vertices: &'a B,
    pub uniforms: &'a B,
    pub count: u32,
    pub clear_color: wgpu::Color,
}

pub trait GpuBackend {
    type Buffer;
    /// A presentable surface for one frame
    type Target;

    /// Allocate a CPU-writable buffer of `size` bytes.
    fn create_buffer(&mut self, label: &'static str, role: BufferRole, size: u64) -> Self::Buffer;

    /// Copy `data` to the start of `buffer`.
    fn write_buffer(&mut self, buffer: &Self::Buffer, data: &[u8]);

    /// Next presentable surface, or `None` if none is available right now.
    fn acquire_target(&mut self) -> Result<Option<Self::Target>, RenderError>;

    /// Clear, draw, submit and schedule presentation.
    fn draw_points(&mut self, target: Self::Target, draw: PointDraw<'_, Self::Buffer>);
}
