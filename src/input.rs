//! Viewer input context.
//!
//! Holds everything the frame loop needs between events: which movement keys
//! are held, whether the pointer is captured, the Blinn-Phong switch and the
//! frame clock.

use std::collections::HashSet;
use std::time::Instant;

use winit::keyboard::KeyCode;

use crate::camera::Movement;

#[derive(Debug)]
pub struct InputState {
    held: HashSet<Movement>,
    captured: bool,
    first_mouse: bool,
    pub blinn: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            captured: false,
            first_mouse: true,
            blinn: false,
        }
    }

    pub fn movement_for(key: KeyCode) -> Option<Movement> {
        match key {
            KeyCode::KeyW => Some(Movement::Forward),
            KeyCode::KeyS => Some(Movement::Backward),
            KeyCode::KeyA => Some(Movement::Left),
            KeyCode::KeyD => Some(Movement::Right),
            _ => None,
        }
    }

    /// Records a press or release. Returns false for keys that do not move the camera.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let Some(movement) = Self::movement_for(key) else {
            return false;
        };
        if pressed {
            self.held.insert(movement);
        } else {
            self.held.remove(&movement);
        }
        true
    }

    /// Movement directions to integrate this frame, in a fixed order.
    pub fn held_movements(&self) -> impl Iterator<Item = Movement> + '_ {
        [
            Movement::Forward,
            Movement::Backward,
            Movement::Left,
            Movement::Right,
        ]
        .into_iter()
        .filter(|m| self.held.contains(m))
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Turns a raw pointer motion into a look delta `(x, y)`.
    ///
    /// Motion is ignored while the pointer is not captured, and the first
    /// sample after a capture is swallowed since it often carries the jump
    /// into the window. The y offset is reversed since device y grows downwards.
    pub fn mouse_motion(&mut self, dx: f64, dy: f64) -> (f32, f32) {
        if !self.captured {
            return (0.0, 0.0);
        }
        if self.first_mouse {
            self.first_mouse = false;
            return (0.0, 0.0);
        }
        (dx as f32, -dy as f32)
    }

    /// Capturing or releasing the pointer re-arms the first-sample anchor.
    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
        self.first_mouse = true;
    }

    pub fn toggle_blinn(&mut self) -> bool {
        self.blinn = !self.blinn;
        self.blinn
    }
}

/// Seconds-based frame timer.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_frame: 0.0,
        }
    }

    pub fn tick(&mut self) -> f32 {
        let now = self.start.elapsed().as_secs_f32();
        self.tick_at(now)
    }

    /// Returns `current_frame - last_frame` and advances the anchor.
    pub fn tick_at(&mut self, current_frame: f32) -> f32 {
        let delta_time = current_frame - self.last_frame;
        self.last_frame = current_frame;
        delta_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_motion_after_capture_yields_zero_delta() {
        let mut input = InputState::new();
        input.set_captured(true);
        assert_eq!(input.mouse_motion(-340.0, 95.0), (0.0, 0.0));
        assert_eq!(input.mouse_motion(10.0, 5.0), (10.0, -5.0));
    }

    #[test]
    fn motion_is_ignored_until_captured() {
        let mut input = InputState::new();
        assert_eq!(input.mouse_motion(12.0, 3.0), (0.0, 0.0));

        input.set_captured(true);
        input.mouse_motion(1.0, 1.0);
        assert_eq!(input.mouse_motion(12.0, 3.0), (12.0, -3.0));

        input.set_captured(false);
        assert_eq!(input.mouse_motion(12.0, 3.0), (0.0, 0.0));
    }

    #[test]
    fn recapture_reanchors_on_next_sample() {
        let mut input = InputState::new();
        input.set_captured(true);
        input.mouse_motion(4.0, 4.0);
        assert_eq!(input.mouse_motion(20.0, -10.0), (20.0, 10.0));

        input.set_captured(true);
        assert_eq!(input.mouse_motion(-4000.0, 7000.0), (0.0, 0.0));
        assert_eq!(input.mouse_motion(1.0, 2.0), (1.0, -2.0));
    }

    #[test]
    fn movement_keys_are_tracked() {
        let mut input = InputState::new();
        assert!(input.set_key(KeyCode::KeyW, true));
        assert!(input.set_key(KeyCode::KeyD, true));
        assert!(!input.set_key(KeyCode::KeyB, true));

        let held: Vec<_> = input.held_movements().collect();
        assert_eq!(held, vec![Movement::Forward, Movement::Right]);

        input.set_key(KeyCode::KeyW, false);
        let held: Vec<_> = input.held_movements().collect();
        assert_eq!(held, vec![Movement::Right]);

        input.release_all();
        assert_eq!(input.held_movements().count(), 0);
    }

    #[test]
    fn blinn_toggles() {
        let mut input = InputState::new();
        assert!(!input.blinn);
        assert!(input.toggle_blinn());
        assert!(!input.toggle_blinn());
    }

    #[test]
    fn delta_time_is_non_negative_for_increasing_timestamps() {
        let mut clock = FrameClock::new();
        let mut previous = 0.0;
        for t in [0.016, 0.033, 0.05, 0.2, 0.2, 1.5] {
            let dt = clock.tick_at(t);
            assert!(dt >= 0.0);
            assert!((dt - (t - previous)).abs() < 1e-6);
            previous = t;
        }
    }

    #[test]
    fn wall_clock_ticks_forward() {
        let mut clock = FrameClock::new();
        assert!(clock.tick() >= 0.0);
        assert!(clock.tick() >= 0.0);
    }
}
