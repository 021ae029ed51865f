//! Physical constants for the liquid simulation
//!
//! Everything here is in world units (metres, seconds). Conversion to screen
//! pixels belongs to the simulation config, not to the engine.

/// Standard gravity (m/s²)
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Lattice spacing of emitted particles as a fraction of the particle diameter
pub const PARTICLE_STRIDE: f32 = 0.75;

/// Pressure impulse strength between particles closer than their rest spacing
pub const PRESSURE_STRENGTH: f32 = 0.05;

/// Share of the approaching relative velocity removed per contact
pub const CONTACT_DAMPING: f32 = 0.5;

/// Share of the overlap removed per position iteration
pub const SEPARATION_RELAXATION: f32 = 0.5;

/// Velocity kept along an edge normal after contact (0 = fully inelastic)
pub const EDGE_RESTITUTION: f32 = 0.0;

/// Softening to prevent division by zero for coincident particles
pub const SOFTENING: f32 = 1.0e-6;
