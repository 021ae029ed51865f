//! Motion-to-gravity adapter
//!
//! Samples an accelerometer on its own thread and republishes the tilt as
//! world gravity. There is no back-pressure: each sample overwrites the last.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use glam::Vec2;

use crate::error::SensorError;
use crate::gravity::SharedGravity;

/// Raw 3-axis acceleration in units of g
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Acceleration {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Project onto the screen plane and scale to world gravity
    pub fn to_gravity(self, magnitude: f32) -> Vec2 {
        Vec2::new(self.x as f32 * magnitude, self.y as f32 * magnitude)
    }
}

/// Asynchronous accelerometer stream
pub trait AccelerometerSource: Send + 'static {
    /// Begin sampling. An error means tilt input is unavailable.
    fn start(&mut self) -> Result<(), SensorError>;

    /// Block until the next sample arrives. `None` ends the stream.
    fn next_sample(&mut self) -> Option<Acceleration>;
}

/// Accelerometer fed through a channel, e.g. by a platform callback or a
/// keyboard tilt emulator.
pub struct ChannelSource {
    receiver: Receiver<Acceleration>,
}

/// Create a connected sender and source pair.
pub fn channel_source() -> (Sender<Acceleration>, ChannelSource) {
    let (sender, receiver) = mpsc::channel();
    (sender, ChannelSource { receiver })
}

impl AccelerometerSource for ChannelSource {
    fn start(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn next_sample(&mut self) -> Option<Acceleration> {
        self.receiver.recv().ok()
    }
}

pub struct MotionAdapter {
    worker: Option<JoinHandle<()>>,
}

impl MotionAdapter {
    /// Start sampling `source` on a dedicated thread.
    ///
    /// If the sensor cannot start, a warning is logged and gravity keeps its
    /// current value for the rest of the run.
    pub fn spawn<S: AccelerometerSource>(
        mut source: S,
        gravity: SharedGravity,
        magnitude: f32,
    ) -> Self {
        if let Err(err) = source.start() {
            log::warn!("{err}; gravity will not follow device tilt");
            return Self { worker: None };
        }

        let spawned = thread::Builder::new()
            .name("motion-sensor".into())
            .spawn(move || {
                while let Some(sample) = source.next_sample() {
                    gravity.store(sample.to_gravity(magnitude));
                }
                log::debug!("Motion sensor stream ended");
            });

        match spawned {
            Ok(worker) => {
                log::info!("✓ Motion sensor started");
                Self {
                    worker: Some(worker),
                }
            }
            Err(err) => {
                log::warn!("{}; gravity will not follow device tilt", SensorError::from(err));
                Self { worker: None }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    /// Wait for the sensor stream to end.
    pub fn join(mut self) -> thread::Result<()> {
        match self.worker.take() {
            Some(worker) => worker.join(),
            None => Ok(()),
        }
    }
}
