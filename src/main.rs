//! Liquid Metal
//!
//! A 2D particle fluid that pours toward wherever the device is tilted.
//! Touches (or left clicks) pour more liquid in; arrow keys stand in for
//! the accelerometer on desktops.

mod frame;
mod stats;
mod tilt;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use frame::FrameOrchestrator;
use glam::Vec2;
use liquid_physics::CpuWorld;
use liquid_renderer::{FrameStatus, WgpuBackend};
use liquid_simulation::{channel_source, MotionAdapter, SimulationConfig};
use stats::FrameStats;
use tilt::KeyboardTilt;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const WINDOW_WIDTH: u32 = 480;
const WINDOW_HEIGHT: u32 = 800;
const STATS_INTERVAL: Duration = Duration::from_secs(5);

struct App {
    config: SimulationConfig,
    window: Option<Arc<Window>>,
    orchestrator: Option<FrameOrchestrator<CpuWorld, WgpuBackend>>,
    tilt: Option<KeyboardTilt>,
    motion: Option<MotionAdapter>,
    cursor_position: Option<Vec2>,
    stats: FrameStats,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            window: None,
            orchestrator: None,
            tilt: None,
            motion: None,
            cursor_position: None,
            stats: FrameStats::new(Instant::now(), STATS_INTERVAL),
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Liquid Metal")
            .with_inner_size(winit::dpi::PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("failed to create window")?,
        );
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let backend = pollster::block_on(WgpuBackend::new(
            &instance,
            surface,
            size.width,
            size.height,
        ))?;

        let viewport = Vec2::new(size.width as f32, size.height as f32);
        let orchestrator = FrameOrchestrator::new(self.config, backend, viewport)?;
        log::info!(
            "✓ World ready: {}x{} px, up to {} particles",
            size.width,
            size.height,
            self.config.max_particles
        );

        let (sender, source) = channel_source();
        self.motion = Some(MotionAdapter::spawn(
            source,
            orchestrator.gravity_handle(),
            self.config.gravity_magnitude,
        ));
        self.tilt = Some(KeyboardTilt::new(sender));
        self.orchestrator = Some(orchestrator);
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn pour_at(&mut self, event_loop: &ActiveEventLoop, position: Vec2) {
        let Some(orchestrator) = &mut self.orchestrator else {
            return;
        };
        match orchestrator.touches_began([position]) {
            Ok(created) => log::debug!("Poured {created} particles at {position}"),
            Err(err) => self.fail(event_loop, err.into()),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(orchestrator)) = (&self.window, &mut self.orchestrator) else {
            return;
        };

        let now = Instant::now();
        match orchestrator.tick(now) {
            Ok(FrameStatus::Presented { particle_count }) => {
                self.stats.record(orchestrator.last_frame_time());
                window.set_title(&format!(
                    "Liquid Metal - {:.0} FPS ({:.2}ms) - {} particles",
                    self.stats.fps(),
                    self.stats.average_ms(),
                    particle_count
                ));
                if self.stats.should_report(now) {
                    log::info!(
                        "{:.1} FPS ({:.2}ms), step {:.2}ms, {} particles, {} frames skipped",
                        self.stats.fps(),
                        self.stats.average_ms(),
                        orchestrator.last_time_step() * 1000.0,
                        particle_count,
                        orchestrator.renderer().frames_skipped()
                    );
                }
            }
            Ok(FrameStatus::Skipped) => {}
            Err(err) => self.fail(event_loop, err.into()),
        }
    }

    fn shutdown(&mut self) {
        if let Some(orchestrator) = &mut self.orchestrator {
            orchestrator.shutdown();
        }
        // Dropping the sender ends the sensor stream
        self.tilt = None;
        if let Some(motion) = self.motion.take() {
            if motion.join().is_err() {
                log::warn!("Motion sensor thread panicked");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(tilt) = &mut self.tilt {
                    tilt.handle_key(code, state == ElementState::Pressed);
                }
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(orchestrator) = &mut self.orchestrator {
                    orchestrator
                        .renderer_mut()
                        .backend_mut()
                        .resize(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::Touch(Touch {
                phase: TouchPhase::Started,
                location,
                ..
            }) => {
                self.pour_at(event_loop, Vec2::new(location.x as f32, location.y as f32));
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = Some(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(position) = self.cursor_position {
                    self.pour_at(event_loop, position);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting liquid simulation...");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(SimulationConfig::default());
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
