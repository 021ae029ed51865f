//! Arrow-key tilt for machines without an accelerometer
//!
//! Held arrow keys pick a direction; each change is sent as a unit
//! accelerometer sample to the motion adapter's channel.

use std::sync::mpsc::Sender;

use glam::Vec2;
use liquid_simulation::Acceleration;
use winit::keyboard::KeyCode;

pub struct KeyboardTilt {
    sender: Sender<Acceleration>,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl KeyboardTilt {
    pub fn new(sender: Sender<Acceleration>) -> Self {
        Self {
            sender,
            left: false,
            right: false,
            up: false,
            down: false,
        }
    }

    /// Returns true if the key controls tilt.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let held = match key {
            KeyCode::ArrowLeft => &mut self.left,
            KeyCode::ArrowRight => &mut self.right,
            KeyCode::ArrowUp => &mut self.up,
            KeyCode::ArrowDown => &mut self.down,
            _ => return false,
        };
        if *held == pressed {
            return true;
        }
        *held = pressed;

        if self.sender.send(self.sample()).is_err() {
            log::debug!("Motion sensor stopped, tilt ignored");
        }
        true
    }

    /// Current reading in g; straight down when no key is held
    pub fn sample(&self) -> Acceleration {
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;
        let direction = Vec2::new(axis(self.right, self.left), axis(self.up, self.down));
        let direction = if direction == Vec2::ZERO {
            Vec2::NEG_Y
        } else {
            direction.normalize()
        };
        Acceleration::new(direction.x as f64, direction.y as f64, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquid_simulation::{channel_source, AccelerometerSource};

    #[test]
    fn test_rest_points_down() {
        let (sender, _source) = channel_source();
        let tilt = KeyboardTilt::new(sender);
        assert_eq!(tilt.sample(), Acceleration::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_arrow_keys_send_samples() {
        let (sender, mut source) = channel_source();
        let mut tilt = KeyboardTilt::new(sender);

        assert!(tilt.handle_key(KeyCode::ArrowRight, true));
        assert_eq!(source.next_sample(), Some(Acceleration::new(1.0, 0.0, 0.0)));

        assert!(tilt.handle_key(KeyCode::ArrowUp, true));
        let diagonal = source.next_sample().unwrap();
        assert!((diagonal.x - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((diagonal.y - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);

        assert!(tilt.handle_key(KeyCode::ArrowRight, false));
        assert!(tilt.handle_key(KeyCode::ArrowUp, false));
        source.next_sample();
        assert_eq!(source.next_sample(), Some(Acceleration::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_other_keys_ignored() {
        let (sender, _source) = channel_source();
        let mut tilt = KeyboardTilt::new(sender);
        assert!(!tilt.handle_key(KeyCode::KeyA, true));
    }

    #[test]
    fn test_key_repeat_sends_nothing() {
        let (sender, source) = channel_source();
        let mut tilt = KeyboardTilt::new(sender);
        tilt.handle_key(KeyCode::ArrowLeft, true);
        tilt.handle_key(KeyCode::ArrowLeft, true);
        drop(tilt);

        let mut source = source;
        assert!(source.next_sample().is_some());
        assert!(source.next_sample().is_none());
    }
}
