//! Pointer bookkeeping for the orbit controls
//!
//! One pointer drags (rotate); two pointers pinch (dolly). Pointers beyond the
//! second are ignored until one of the tracked ones lifts.

use glam::Vec2;

/// What a pointer move asks of the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitGesture {
    /// Untracked pointer or no change
    None,
    /// Single-pointer drag in pixels
    Rotate(Vec2),
    /// Two-pointer pinch: distance scale to apply (below 1 moves closer)
    Dolly(f32),
}

#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    /// (pointer id, last position), at most two
    active: Vec<(i32, Vec2)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked pointers
    pub fn count(&self) -> usize {
        self.active.len()
    }

    /// Start tracking `id`. Returns false when the pointer is ignored.
    pub fn down(&mut self, id: i32, pos: Vec2) -> bool {
        if let Some(entry) = self.active.iter_mut().find(|(p, _)| *p == id) {
            entry.1 = pos;
            return true;
        }
        if self.active.len() >= 2 {
            return false;
        }
        self.active.push((id, pos));
        true
    }

    /// Record a move of `id` and translate it into a camera gesture
    pub fn moved(&mut self, id: i32, pos: Vec2) -> OrbitGesture {
        let Some(index) = self.active.iter().position(|(p, _)| *p == id) else {
            return OrbitGesture::None;
        };

        match self.active.len() {
            1 => {
                let delta = pos - self.active[index].1;
                self.active[index].1 = pos;
                if delta == Vec2::ZERO {
                    OrbitGesture::None
                } else {
                    OrbitGesture::Rotate(delta)
                }
            }
            _ => {
                let before = self.active[0].1.distance(self.active[1].1);
                self.active[index].1 = pos;
                let after = self.active[0].1.distance(self.active[1].1);
                if before > 0.0 && after > 0.0 && before != after {
                    // Fingers apart → camera closer
                    OrbitGesture::Dolly(before / after)
                } else {
                    OrbitGesture::None
                }
            }
        }
    }

    /// Stop tracking `id` (lift or cancel)
    pub fn up(&mut self, id: i32) {
        self.active.retain(|(p, _)| *p != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pointer_drags() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.down(1, Vec2::new(100.0, 50.0)));
        assert_eq!(
            tracker.moved(1, Vec2::new(103.0, 48.0)),
            OrbitGesture::Rotate(Vec2::new(3.0, -2.0))
        );
        assert_eq!(tracker.moved(1, Vec2::new(103.0, 48.0)), OrbitGesture::None);
    }

    #[test]
    fn test_second_finger_does_not_hijack_the_drag() {
        let mut tracker = PointerTracker::new();
        tracker.down(1, Vec2::new(100.0, 0.0));
        tracker.down(2, Vec2::new(400.0, 0.0));

        // A 1 px move of the first finger is a tiny pinch, never a 299 px rotation
        match tracker.moved(1, Vec2::new(101.0, 0.0)) {
            OrbitGesture::Dolly(scale) => assert!((scale - 300.0 / 299.0).abs() < 1e-6),
            other => panic!("expected a dolly, got {:?}", other),
        }
    }

    #[test]
    fn test_pinch_apart_moves_closer() {
        let mut tracker = PointerTracker::new();
        tracker.down(7, Vec2::new(0.0, 0.0));
        tracker.down(9, Vec2::new(100.0, 0.0));
        assert_eq!(tracker.moved(9, Vec2::new(200.0, 0.0)), OrbitGesture::Dolly(0.5));
    }

    #[test]
    fn test_lifting_one_finger_keeps_the_other() {
        let mut tracker = PointerTracker::new();
        tracker.down(1, Vec2::new(0.0, 0.0));
        tracker.down(2, Vec2::new(50.0, 0.0));
        tracker.up(2);
        assert_eq!(tracker.count(), 1);
        assert_eq!(
            tracker.moved(1, Vec2::new(5.0, 0.0)),
            OrbitGesture::Rotate(Vec2::new(5.0, 0.0))
        );
    }

    #[test]
    fn test_extra_and_unknown_pointers_ignored() {
        let mut tracker = PointerTracker::new();
        tracker.down(1, Vec2::ZERO);
        tracker.down(2, Vec2::X);
        assert!(!tracker.down(3, Vec2::Y));
        assert_eq!(tracker.count(), 2);
        assert_eq!(tracker.moved(3, Vec2::new(9.0, 9.0)), OrbitGesture::None);
        tracker.up(3);
        assert_eq!(tracker.count(), 2);
    }
}
