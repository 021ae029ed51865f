//! # Liquid Renderer
//!
//! Turns particle positions into point sprites: uniform and vertex buffer
//! management, the GPU backend seam, and the per-frame draw.

pub mod backend;
pub mod buffers;
pub mod error;
pub mod headless;
pub mod renderer;
pub mod uniforms;
pub mod wgpu_backend;

pub use backend::*;
pub use buffers::*;
pub use error::*;
pub use headless::*;
pub use renderer::*;
pub use uniforms::*;
pub use wgpu_backend::*;
