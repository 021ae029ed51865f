//! Gravity shared between the sensor thread and the frame loop
//!
//! Both components are packed into one `AtomicU64`, so a reader sees either
//! the old vector or the new one, never a mix. Later writes simply replace
//! earlier ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::Vec2;

#[derive(Clone, Debug)]
pub struct SharedGravity {
    bits: Arc<AtomicU64>,
}

fn pack(gravity: Vec2) -> u64 {
    (gravity.x.to_bits() as u64) | ((gravity.y.to_bits() as u64) << 32)
}

fn unpack(bits: u64) -> Vec2 {
    Vec2::new(
        f32::from_bits(bits as u32),
        f32::from_bits((bits >> 32) as u32),
    )
}

impl SharedGravity {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(pack(gravity))),
        }
    }

    pub fn store(&self, gravity: Vec2) {
        self.bits.store(pack(gravity), Ordering::Release);
    }

    pub fn load(&self) -> Vec2 {
        unpack(self.bits.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_pack_preserves_components() {
        let gravity = SharedGravity::new(Vec2::new(-1.5, 9.80665));
        assert_eq!(gravity.load(), Vec2::new(-1.5, 9.80665));
    }

    #[test]
    fn test_last_write_wins() {
        let gravity = SharedGravity::new(Vec2::ZERO);
        gravity.store(Vec2::new(1.0, 2.0));
        gravity.store(Vec2::new(3.0, 4.0));
        assert_eq!(gravity.load(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_reads_are_never_torn() {
        let gravity = SharedGravity::new(Vec2::new(1.0, 1.0));
        let writer = gravity.clone();
        let handle = thread::spawn(move || {
            for i in 0..10_000 {
                let v = i as f32;
                writer.store(Vec2::new(v, -v));
            }
        });

        for _ in 0..10_000 {
            let g = gravity.load();
            // Every stored vector has y == -x except the initial (1, 1)
            assert!(g.y == -g.x || g == Vec2::new(1.0, 1.0));
        }
        handle.join().unwrap();
    }
}
