//! Particle system definitions and read-only views

use glam::Vec2;

/// Physical parameters shared by every particle of one system.
/// Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSystemDef {
    /// Particle radius in metres
    pub radius: f32,
    /// Linear velocity damping (1/s)
    pub damping_strength: f32,
    /// Multiplier applied to world gravity
    pub gravity_scale: f32,
    /// Particle density (kg/m²)
    pub density: f32,
}

impl ParticleSystemDef {
    pub fn diameter(&self) -> f32 {
        self.radius * 2.0
    }

    /// Spacing of the emission lattice, which is also the rest distance
    /// between neighbouring particles.
    pub fn stride(&self) -> f32 {
        self.diameter() * crate::constants::PARTICLE_STRIDE
    }
}

/// Opaque identifier of a particle system inside one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleSystemHandle(u32);

impl ParticleSystemHandle {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Borrowed view of a system's particle positions.
///
/// Valid until the engine is mutated again; the borrow enforces that.
#[derive(Debug, Clone, Copy)]
pub struct ParticleSnapshot<'a> {
    positions: &'a [Vec2],
}

impl<'a> ParticleSnapshot<'a> {
    pub fn new(positions: &'a [Vec2]) -> Self {
        Self { positions }
    }

    pub fn positions(&self) -> &'a [Vec2] {
        self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Particle count as handed to a draw call
    pub fn count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn mean_position(&self) -> Option<Vec2> {
        if self.positions.is_empty() {
            return None;
        }
        let sum: Vec2 = self.positions.iter().copied().sum();
        Some(sum / self.positions.len() as f32)
    }
}

/// Live state of one particle system (struct-of-arrays)
#[derive(Debug, Clone)]
pub(crate) struct ParticleSystem {
    pub def: ParticleSystemDef,
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
    /// Positions at the start of the current step, used for edge crossing tests
    pub previous: Vec<Vec2>,
    pub max_count: Option<usize>,
}

impl ParticleSystem {
    pub fn new(def: ParticleSystemDef) -> Self {
        Self {
            def,
            positions: Vec::new(),
            velocities: Vec::new(),
            previous: Vec::new(),
            max_count: None,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Room left under the particle limit
    pub fn remaining_capacity(&self) -> usize {
        match self.max_count {
            Some(max) => max.saturating_sub(self.len()),
            None => usize::MAX,
        }
    }

    pub fn push(&mut self, position: Vec2) {
        self.positions.push(position);
        self.velocities.push(Vec2::ZERO);
        self.previous.push(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_mean() {
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(2.0, 4.0)];
        let snapshot = ParticleSnapshot::new(&positions);
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.mean_position(), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_empty_snapshot_has_no_mean() {
        let snapshot = ParticleSnapshot::new(&[]);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.mean_position(), None);
    }

    #[test]
    fn test_remaining_capacity() {
        let def = ParticleSystemDef {
            radius: 0.1,
            damping_strength: 0.0,
            gravity_scale: 1.0,
            density: 1.0,
        };
        let mut system = ParticleSystem::new(def);
        assert_eq!(system.remaining_capacity(), usize::MAX);

        system.max_count = Some(2);
        system.push(Vec2::ZERO);
        assert_eq!(system.remaining_capacity(), 1);
        system.push(Vec2::ONE);
        system.push(Vec2::ONE);
        assert_eq!(system.remaining_capacity(), 0);
    }
}
