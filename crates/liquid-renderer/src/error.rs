//! Renderer error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// No GPU adapter can present to the surface
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(String),

    #[error("failed to acquire GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The surface reports no usable texture format
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    /// Shader or pipeline validation failed. Rendering stays disabled.
    #[error("pipeline compilation failed: {0}")]
    PipelineCompilation(String),

    #[error("GPU out of memory")]
    OutOfMemory,
}
