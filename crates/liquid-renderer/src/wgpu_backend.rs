//! wgpu backend presenting to a window surface

use crate::backend::{BufferRole, GpuBackend, PointDraw};
use crate::buffers::POSITION_SIZE;
use crate::error::RenderError;

/// Vertices per sprite quad (two triangles)
const QUAD_VERTICES: u32 = 6;

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl WgpuBackend {
    /// Acquire a device for `surface`, configure it, and compile the particle
    /// pipeline. Any failure here is fatal for rendering.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| RenderError::NoAdapter(err.to_string()))?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(RenderError::UnsupportedSurface)?;

        // Fifo paces presentation to the display refresh
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (render_pipeline, bind_group_layout) =
            Self::build_pipeline(&device, surface_format).await?;
        log::info!("✓ Particle pipeline compiled");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            bind_group_layout,
        })
    }

    async fn build_pipeline(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<(wgpu::RenderPipeline, wgpu::BindGroupLayout), RenderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particle.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[
                // Uniforms - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("particle_vertex"),
                // One position per instance; the quad corner comes from vertex_index
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: POSITION_SIZE as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("basic_fragment"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(RenderError::PipelineCompilation(err.to_string()));
        }

        Ok((render_pipeline, bind_group_layout))
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

/// What a failed surface acquisition means for the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceOutcome {
    /// Swap chain no longer matches the window; reconfigure, then skip
    Reconfigure,
    Skip,
    Fatal,
}

fn surface_outcome(err: &wgpu::SurfaceError) -> SurfaceOutcome {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceOutcome::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => SurfaceOutcome::Fatal,
        _ => SurfaceOutcome::Skip,
    }
}

impl GpuBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type Target = wgpu::SurfaceTexture;

    fn create_buffer(&mut self, label: &'static str, role: BufferRole, size: u64) -> wgpu::Buffer {
        let usage = match role {
            BufferRole::Vertex => wgpu::BufferUsages::VERTEX,
            BufferRole::Uniform => wgpu::BufferUsages::UNIFORM,
        };
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write_buffer(&mut self, buffer: &wgpu::Buffer, data: &[u8]) {
        if !data.is_empty() {
            self.queue.write_buffer(buffer, 0, data);
        }
    }

    fn acquire_target(&mut self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        let err = match self.surface.get_current_texture() {
            Ok(frame) => return Ok(Some(frame)),
            Err(err) => err,
        };
        match surface_outcome(&err) {
            SurfaceOutcome::Reconfigure => {
                log::debug!("Surface {err}, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            SurfaceOutcome::Skip => {
                log::debug!("Surface unavailable: {err}");
                Ok(None)
            }
            SurfaceOutcome::Fatal => Err(RenderError::OutOfMemory),
        }
    }

    fn draw_points(&mut self, target: wgpu::SurfaceTexture, draw: PointDraw<'_, wgpu::Buffer>) {
        let view = target
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: draw.uniforms.as_entire_binding(),
            }],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(draw.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Empty buffer slices are invalid, so an empty world only clears
            if draw.count > 0 {
                let used = draw.count as wgpu::BufferAddress * POSITION_SIZE as wgpu::BufferAddress;
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &bind_group, &[]);
                render_pass.set_vertex_buffer(0, draw.vertices.slice(..used));
                render_pass.draw(0..QUAD_VERTICES, 0..draw.count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        target.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_error_policy() {
        assert_eq!(
            surface_outcome(&wgpu::SurfaceError::Lost),
            SurfaceOutcome::Reconfigure
        );
        assert_eq!(
            surface_outcome(&wgpu::SurfaceError::Outdated),
            SurfaceOutcome::Reconfigure
        );
        assert_eq!(surface_outcome(&wgpu::SurfaceError::Timeout), SurfaceOutcome::Skip);
        assert_eq!(surface_outcome(&wgpu::SurfaceError::Other), SurfaceOutcome::Skip);
        assert_eq!(
            surface_outcome(&wgpu::SurfaceError::OutOfMemory),
            SurfaceOutcome::Fatal
        );
    }
}
