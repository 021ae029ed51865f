//! CPU particle solver
//!
//! A deliberately small liquid model: gravity and damping, pairwise pressure
//! impulses between particles closer than their rest spacing, overlap
//! relaxation, and collision against static edges. Neighbours are found with a
//! uniform grid whose cell size is the rest spacing.

use std::collections::HashMap;

use glam::Vec2;

use crate::constants::*;
use crate::engine::{PhysicsEngine, PhysicsError};
use crate::particle::{ParticleSnapshot, ParticleSystem, ParticleSystemDef, ParticleSystemHandle};

/// Largest lattice index on either side of a box centre
const MAX_LATTICE_HALF_EXTENT: i32 = i32::MAX / 2 - 1;

/// Static line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSegment {
    pub start: Vec2,
    pub end: Vec2,
}

impl EdgeSegment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    fn closest_point(&self, point: Vec2) -> Vec2 {
        let edge = self.end - self.start;
        let length_squared = edge.length_squared();
        if length_squared <= SOFTENING {
            return self.start;
        }
        let t = ((point - self.start).dot(edge) / length_squared).clamp(0.0, 1.0);
        self.start + edge * t
    }

    /// Signed area test: positive on the left of start→end.
    fn side(&self, point: Vec2) -> f32 {
        (self.end - self.start).perp_dot(point - self.start)
    }

    /// Unit normal pointing towards the side `point` lies on.
    fn normal_towards(&self, point: Vec2) -> Vec2 {
        let normal = (self.end - self.start).perp().normalize_or_zero();
        if self.side(point) >= 0.0 {
            normal
        } else {
            -normal
        }
    }
}

/// Pair of particles closer than their rest spacing
#[derive(Debug, Clone, Copy)]
struct Contact {
    a: usize,
    b: usize,
}

/// Physics world stepped on the CPU
pub struct CpuWorld {
    gravity: Vec2,
    systems: Vec<ParticleSystem>,
    edges: Vec<EdgeSegment>,
    contacts: Vec<Contact>,
    grid: HashMap<(i32, i32), Vec<usize>>,
}

impl CpuWorld {
    pub fn edges(&self) -> &[EdgeSegment] {
        &self.edges
    }

    pub fn particle_velocities(
        &self,
        system: ParticleSystemHandle,
    ) -> Result<&[Vec2], PhysicsError> {
        Ok(&self.system(system)?.velocities)
    }

    fn system(&self, handle: ParticleSystemHandle) -> Result<&ParticleSystem, PhysicsError> {
        self.systems
            .get(handle.index())
            .ok_or(PhysicsError::UnknownSystem(handle))
    }

    fn system_mut(
        &mut self,
        handle: ParticleSystemHandle,
    ) -> Result<&mut ParticleSystem, PhysicsError> {
        self.systems
            .get_mut(handle.index())
            .ok_or(PhysicsError::UnknownSystem(handle))
    }

    fn step_system(
        system: &mut ParticleSystem,
        edges: &[EdgeSegment],
        contacts: &mut Vec<Contact>,
        grid: &mut HashMap<(i32, i32), Vec<usize>>,
        gravity: Vec2,
        dt: f32,
        velocity_iterations: u32,
        position_iterations: u32,
    ) {
        if system.positions.is_empty() {
            return;
        }

        let def = system.def;
        let rest = def.stride();
        let acceleration = gravity * def.gravity_scale;
        let damping = 1.0 / (1.0 + dt * def.damping_strength.max(0.0));

        for velocity in system.velocities.iter_mut() {
            *velocity = (*velocity + acceleration * dt) * damping;
        }

        // Velocity phase: pressure and contact damping
        find_contacts(&system.positions, rest, grid, contacts);
        if velocity_iterations > 0 {
            let pressure = PRESSURE_STRENGTH * rest / (dt * velocity_iterations as f32);
            for _ in 0..velocity_iterations {
                for contact in contacts.iter() {
                    let delta = system.positions[contact.b] - system.positions[contact.a];
                    let distance = delta.length();
                    if distance >= rest {
                        continue;
                    }
                    let normal = if distance > SOFTENING {
                        delta / distance
                    } else {
                        Vec2::X
                    };
                    let weight = 1.0 - distance / rest;
                    let approach = (system.velocities[contact.b] - system.velocities[contact.a])
                        .dot(normal)
                        .min(0.0);
                    let impulse = pressure * weight - approach * CONTACT_DAMPING;
                    let half = normal * (impulse * 0.5);
                    system.velocities[contact.a] -= half;
                    system.velocities[contact.b] += half;
                }
            }
        }

        system.previous.copy_from_slice(&system.positions);
        for (position, velocity) in system.positions.iter_mut().zip(&system.velocities) {
            *position += *velocity * dt;
        }

        // Position phase: relax overlaps, then keep particles off the edges
        find_contacts(&system.positions, rest, grid, contacts);
        for _ in 0..position_iterations {
            for contact in contacts.iter() {
                let delta = system.positions[contact.b] - system.positions[contact.a];
                let distance = delta.length();
                if distance >= rest || distance <= SOFTENING {
                    continue;
                }
                let correction = delta / distance * ((rest - distance) * SEPARATION_RELAXATION * 0.5);
                system.positions[contact.a] -= correction;
                system.positions[contact.b] += correction;
            }

            for i in 0..system.positions.len() {
                for edge in edges {
                    resolve_edge(
                        edge,
                        system.previous[i],
                        &mut system.positions[i],
                        &mut system.velocities[i],
                        def.radius,
                    );
                }
            }
        }
    }
}

fn grid_cell(position: Vec2, cell_size: f32) -> (i32, i32) {
    (
        (position.x / cell_size).floor() as i32,
        (position.y / cell_size).floor() as i32,
    )
}

/// Collect every pair closer than `rest`, each pair once.
fn find_contacts(
    positions: &[Vec2],
    rest: f32,
    grid: &mut HashMap<(i32, i32), Vec<usize>>,
    contacts: &mut Vec<Contact>,
) {
    contacts.clear();
    for bucket in grid.values_mut() {
        bucket.clear();
    }
    for (index, position) in positions.iter().enumerate() {
        grid.entry(grid_cell(*position, rest)).or_default().push(index);
    }

    let rest_squared = rest * rest;
    for (a, position) in positions.iter().enumerate() {
        let (cx, cy) = grid_cell(*position, rest);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &b in bucket {
                    if b <= a {
                        continue;
                    }
                    if position.distance_squared(positions[b]) < rest_squared {
                        contacts.push(Contact { a, b });
                    }
                }
            }
        }
    }

    grid.retain(|_, bucket| !bucket.is_empty());
}

/// Push a particle back to the side of `edge` it started the step on and
/// keep it at least `radius` away from the segment.
fn resolve_edge(
    edge: &EdgeSegment,
    previous: Vec2,
    position: &mut Vec2,
    velocity: &mut Vec2,
    radius: f32,
) {
    let side_before = edge.side(previous);
    let side_after = edge.side(*position);

    if side_before * side_after < 0.0 {
        // Moved through the line this step; only a hit if the crossing lies on the segment
        let t = side_before / (side_before - side_after);
        let crossing = previous + (*position - previous) * t;
        let edge_vector = edge.end - edge.start;
        let s = (crossing - edge.start).dot(edge_vector) / edge_vector.length_squared().max(SOFTENING);
        if (0.0..=1.0).contains(&s) {
            let normal = edge.normal_towards(previous);
            let signed_distance = (*position - edge.start).dot(normal);
            *position += normal * (radius - signed_distance);
            remove_inbound_velocity(velocity, normal);
            return;
        }
    }

    let closest = edge.closest_point(*position);
    let offset = *position - closest;
    let distance = offset.length();
    if distance >= radius {
        return;
    }
    let normal = if distance > SOFTENING {
        offset / distance
    } else {
        edge.normal_towards(previous)
    };
    *position = closest + normal * radius;
    remove_inbound_velocity(velocity, normal);
}

fn remove_inbound_velocity(velocity: &mut Vec2, normal: Vec2) {
    let normal_speed = velocity.dot(normal);
    if normal_speed < 0.0 {
        *velocity -= normal * normal_speed * (1.0 + EDGE_RESTITUTION);
    }
}

impl PhysicsEngine for CpuWorld {
    fn create_world(gravity: Vec2) -> Result<Self, PhysicsError> {
        if !gravity.is_finite() {
            return Err(PhysicsError::WorldAllocation(format!(
                "gravity {gravity} is not finite"
            )));
        }
        log::debug!("Creating CPU physics world with gravity {gravity}");
        Ok(Self {
            gravity,
            systems: Vec::new(),
            edges: Vec::new(),
            contacts: Vec::new(),
            grid: HashMap::new(),
        })
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn create_particle_system(
        &mut self,
        def: &ParticleSystemDef,
    ) -> Result<ParticleSystemHandle, PhysicsError> {
        if !(def.radius.is_finite() && def.radius > 0.0) {
            return Err(PhysicsError::InvalidRadius(def.radius));
        }
        let handle = ParticleSystemHandle::from_raw(self.systems.len() as u32);
        self.systems.push(ParticleSystem::new(*def));
        log::debug!("Created particle system {:?} with radius {}", handle, def.radius);
        Ok(handle)
    }

    fn set_particle_limit(
        &mut self,
        system: ParticleSystemHandle,
        max_particles: usize,
    ) -> Result<(), PhysicsError> {
        self.system_mut(system)?.max_count = Some(max_particles);
        Ok(())
    }

    fn create_particle_box(
        &mut self,
        system: ParticleSystemHandle,
        position: Vec2,
        size: Vec2,
    ) -> Result<usize, PhysicsError> {
        let system = self.system_mut(system)?;
        let stride = system.def.stride();
        let half = size.abs() * 0.5;
        // Float casts saturate; the clamp keeps `2 * n + 1` in range for huge boxes
        let columns = ((half.x / stride).floor() as i32).min(MAX_LATTICE_HALF_EXTENT);
        let rows = ((half.y / stride).floor() as i32).min(MAX_LATTICE_HALF_EXTENT);

        // Lattice is aligned on the box centre, so even a tiny box yields one particle
        let mut created = 0;
        'fill: for row in -rows..=rows {
            for column in -columns..=columns {
                if system.remaining_capacity() == 0 {
                    break 'fill;
                }
                system.push(position + Vec2::new(column as f32, row as f32) * stride);
                created += 1;
            }
        }

        let requested = (2 * rows as usize + 1).saturating_mul(2 * columns as usize + 1);
        if created < requested {
            log::trace!(
                "Particle limit reached: created {} of {} particles",
                created,
                requested
            );
        }
        Ok(created)
    }

    fn create_edge_box(&mut self, origin: Vec2, size: Vec2) {
        let min = origin.min(origin + size);
        let max = origin.max(origin + size);
        let corners = [
            Vec2::new(min.x, min.y),
            Vec2::new(max.x, min.y),
            Vec2::new(max.x, max.y),
            Vec2::new(min.x, max.y),
        ];
        for i in 0..corners.len() {
            self.edges
                .push(EdgeSegment::new(corners[i], corners[(i + 1) % corners.len()]));
        }
    }

    fn step(&mut self, time_step: f32, velocity_iterations: u32, position_iterations: u32) {
        if time_step <= 0.0 || !time_step.is_finite() {
            return;
        }
        for system in self.systems.iter_mut() {
            Self::step_system(
                system,
                &self.edges,
                &mut self.contacts,
                &mut self.grid,
                self.gravity,
                time_step,
                velocity_iterations,
                position_iterations,
            );
        }
    }

    fn particle_positions(
        &self,
        system: ParticleSystemHandle,
    ) -> Result<ParticleSnapshot<'_>, PhysicsError> {
        Ok(ParticleSnapshot::new(&self.system(system)?.positions))
    }
}
