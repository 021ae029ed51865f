//! Simulation configuration
//!
//! One immutable value threaded into the world store, the GPU buffers and the
//! input adapters, so the pixel-to-metre ratio used to render always matches
//! the one used to build the particle system.

use glam::Vec2;
use liquid_physics::{ParticleSystemDef, STANDARD_GRAVITY};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Magnitude applied to raw accelerometer readings (m/s² per g)
    pub gravity_magnitude: f32,
    /// Screen pixels per simulation metre
    pub ptm_ratio: f32,
    /// Particle radius in pixels
    pub particle_radius_pixels: f32,
    pub damping_strength: f32,
    pub gravity_scale: f32,
    pub density: f32,
    /// Particles beyond this count are dropped on emission
    pub max_particles: usize,
    /// Side length of the square emitted per touch, in pixels
    pub emission_box_pixels: f32,
    /// Rendered sprite size in pixels
    pub point_size: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Upper bound on a single step, in seconds
    pub max_time_step: f32,
    /// Step used for the first tick, before any refresh interval is known
    pub nominal_time_step: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity_magnitude: STANDARD_GRAVITY,
            ptm_ratio: 32.0,
            particle_radius_pixels: 9.0,
            damping_strength: 0.2,
            gravity_scale: 1.0,
            density: 1.2,
            max_particles: 1500,
            emission_box_pixels: 100.0,
            point_size: 18.0, // particle diameter in pixels
            velocity_iterations: 8,
            position_iterations: 3,
            max_time_step: 1.0 / 30.0,
            nominal_time_step: 1.0 / 60.0,
        }
    }
}

impl SimulationConfig {
    /// Gravity before the first tilt sample arrives: straight down
    pub fn initial_gravity(&self) -> Vec2 {
        Vec2::new(0.0, -self.gravity_magnitude)
    }

    pub fn particle_system_def(&self) -> ParticleSystemDef {
        ParticleSystemDef {
            radius: self.particle_radius_pixels / self.ptm_ratio,
            damping_strength: self.damping_strength,
            gravity_scale: self.gravity_scale,
            density: self.density,
        }
    }

    /// Emission box size in metres
    pub fn emission_box_size(&self) -> Vec2 {
        Vec2::splat(self.emission_box_pixels / self.ptm_ratio)
    }

    pub fn pixels_to_meters(&self, pixels: Vec2) -> Vec2 {
        pixels / self.ptm_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_radius_in_meters() {
        let config = SimulationConfig::default();
        assert_eq!(config.particle_system_def().radius, 9.0 / 32.0);
    }

    #[test]
    fn test_initial_gravity_points_down() {
        let config = SimulationConfig::default();
        assert_eq!(config.initial_gravity(), Vec2::new(0.0, -9.80665));
    }

    #[test]
    fn test_emission_box_scaled_by_ratio() {
        let config = SimulationConfig {
            emission_box_pixels: 64.0,
            ..Default::default()
        };
        assert_eq!(config.emission_box_size(), Vec2::splat(2.0));
    }
}
