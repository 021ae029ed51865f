//! In-memory GPU backend
//!
//! Keeps buffer contents on the CPU and records every draw instead of
//! presenting it. Used for off-screen runs and for checking what a frame
//! would have sent to the GPU.

use crate::backend::{BufferRole, GpuBackend, PointDraw};
use crate::error::RenderError;

/// Handle to a buffer owned by a [`HeadlessBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessBuffer(usize);

#[derive(Debug, Clone)]
pub struct HeadlessAllocation {
    pub label: &'static str,
    pub role: BufferRole,
    pub data: Vec<u8>,
    /// Number of uploads to this buffer
    pub writes: usize,
    /// Length of the most recent upload, in bytes
    pub last_write_len: usize,
}

/// One recorded draw call
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub frame: u64,
    pub vertex_buffer: HeadlessBuffer,
    pub uniform_buffer: HeadlessBuffer,
    /// Bytes written by the last vertex upload before this draw
    pub vertex_bytes: usize,
    pub count: u32,
    pub clear_color: wgpu::Color,
}

#[derive(Debug, Clone, Copy)]
pub struct HeadlessTarget {
    frame: u64,
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    buffers: Vec<HeadlessAllocation>,
    draws: Vec<DrawRecord>,
    frames_acquired: u64,
    /// Number of upcoming acquisitions that find no surface
    unavailable_frames: u32,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, handle: &HeadlessBuffer) -> &HeadlessAllocation {
        &self.buffers[handle.0]
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Make the next `frames` acquisitions fail the way an exhausted swap
    /// chain does.
    pub fn withhold_surfaces(&mut self, frames: u32) {
        self.unavailable_frames = frames;
    }
}

impl GpuBackend for HeadlessBackend {
    type Buffer = HeadlessBuffer;
    type Target = HeadlessTarget;

    fn create_buffer(&mut self, label: &'static str, role: BufferRole, size: u64) -> HeadlessBuffer {
        self.buffers.push(HeadlessAllocation {
            label,
            role,
            data: vec![0; size as usize],
            writes: 0,
            last_write_len: 0,
        });
        HeadlessBuffer(self.buffers.len() - 1)
    }

    fn write_buffer(&mut self, buffer: &HeadlessBuffer, data: &[u8]) {
        let allocation = &mut self.buffers[buffer.0];
        assert!(
            data.len() <= allocation.data.len(),
            "write of {} bytes overruns {} ({} bytes)",
            data.len(),
            allocation.label,
            allocation.data.len()
        );
        allocation.data[..data.len()].copy_from_slice(data);
        allocation.writes += 1;
        allocation.last_write_len = data.len();
    }

    fn acquire_target(&mut self) -> Result<Option<HeadlessTarget>, RenderError> {
        if self.unavailable_frames > 0 {
            self.unavailable_frames -= 1;
            return Ok(None);
        }
        self.frames_acquired += 1;
        Ok(Some(HeadlessTarget {
            frame: self.frames_acquired,
        }))
    }

    fn draw_points(&mut self, target: HeadlessTarget, draw: PointDraw<'_, HeadlessBuffer>) {
        let vertex_bytes = self.buffers[draw.vertices.0].last_write_len;
        self.draws.push(DrawRecord {
            frame: target.frame,
            vertex_buffer: *draw.vertices,
            uniform_buffer: *draw.uniforms,
            vertex_bytes,
            count: draw.count,
            clear_color: draw.clear_color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withheld_surfaces() {
        let mut backend = HeadlessBackend::new();
        backend.withhold_surfaces(2);
        assert!(backend.acquire_target().unwrap().is_none());
        assert!(backend.acquire_target().unwrap().is_none());
        assert!(backend.acquire_target().unwrap().is_some());
    }

    #[test]
    #[should_panic(expected = "overruns")]
    fn test_overrun_write_panics() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer("Small", BufferRole::Vertex, 4);
        backend.write_buffer(&buffer, &[0; 8]);
    }
}
