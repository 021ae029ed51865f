//! Touch-to-emitter adapter
//!
//! Screen coordinates have their origin at the top left; the world has its
//! origin at the bottom left and is measured in metres.

use glam::Vec2;

use crate::params::SimulationConfig;
use crate::world::EmissionRequest;

#[derive(Debug, Clone, Copy)]
pub struct TouchEmitter {
    ptm_ratio: f32,
    screen_height: f32,
    box_size: Vec2,
}

impl TouchEmitter {
    pub fn new(config: &SimulationConfig, screen_height: f32) -> Self {
        Self {
            ptm_ratio: config.ptm_ratio,
            screen_height,
            box_size: config.emission_box_size(),
        }
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            screen.x / self.ptm_ratio,
            (self.screen_height - screen.y) / self.ptm_ratio,
        )
    }

    /// One emission per touch point. Repeated touches are not debounced.
    pub fn touches_began<I>(&self, touches: I) -> Vec<EmissionRequest>
    where
        I: IntoIterator<Item = Vec2>,
    {
        touches
            .into_iter()
            .map(|touch| self.touch_began(touch))
            .collect()
    }

    pub fn touch_began(&self, touch: Vec2) -> EmissionRequest {
        EmissionRequest {
            position: self.screen_to_world(touch),
            size: self.box_size,
        }
    }
}
