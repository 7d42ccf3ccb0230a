//! Flow path through the planet centers
//!
//! A polyline with equal parameter length per segment. Open paths run from the
//! first to the last planet; closed paths add a segment back to the first.

use glam::Vec3;

/// A point on the path together with its local frame
#[derive(Debug, Clone, Copy)]
pub struct PathSample {
    /// Point on the straight segment
    pub base: Vec3,
    /// Unit direction of travel
    pub dir: Vec3,
    /// Unit normal in the plane of the planets
    pub up: Vec3,
    /// Segment index
    pub segment: usize,
    /// Position within the segment, [0, 1)
    pub local: f32,
    /// True on the segment that returns to the first planet
    pub closing: bool,
}

#[derive(Debug, Clone)]
pub struct FlowPath {
    points: Vec<Vec3>,
    closed: bool,
}

impl FlowPath {
    pub fn new(points: &[Vec3], closed: bool) -> Self {
        Self {
            points: points.to_vec(),
            closed,
        }
    }

    /// Replace the control points (planets moved) without reallocating
    pub fn set_points(&mut self, points: &[Vec3]) {
        self.points.clear();
        self.points.extend_from_slice(points);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn segment_count(&self) -> usize {
        match self.points.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// Sample at `u` in [0, 1); values outside are clamped
    pub fn sample(&self, u: f32) -> Option<PathSample> {
        let segments = self.segment_count();
        if segments == 0 {
            return None;
        }

        let scaled = u.clamp(0.0, 1.0) * segments as f32;
        let segment = (scaled.floor() as usize).min(segments - 1);
        let local = (scaled - segment as f32).clamp(0.0, 1.0);

        let a = self.points[segment];
        let b = self.points[(segment + 1) % self.points.len()];
        let dir = (b - a).normalize_or(Vec3::X);
        let up = Vec3::Z.cross(dir).normalize_or(Vec3::Y);

        Some(PathSample {
            base: a.lerp(b, local),
            dir,
            up,
            segment,
            local,
            closing: self.closed && segment == segments - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Vec<Vec3> {
        (0..5).map(|i| Vec3::new(i as f32 * 1.5 - 3.0, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_segment_counts() {
        assert_eq!(FlowPath::new(&line(), false).segment_count(), 4);
        assert_eq!(FlowPath::new(&line(), true).segment_count(), 5);
        assert_eq!(FlowPath::new(&line()[..1], false).segment_count(), 0);
        assert!(FlowPath::new(&[], true).sample(0.5).is_none());
    }

    #[test]
    fn test_open_line_sampling() {
        let path = FlowPath::new(&line(), false);
        let start = path.sample(0.0).unwrap();
        assert_eq!(start.base, Vec3::new(-3.0, 0.0, 0.0));
        assert_eq!(start.segment, 0);

        let mid = path.sample(0.5).unwrap();
        assert!(mid.base.distance(Vec3::ZERO) < 1e-5);

        let s = path.sample(0.125).unwrap();
        assert!((s.local - 0.5).abs() < 1e-5);
        assert!(s.base.distance(Vec3::new(-2.25, 0.0, 0.0)) < 1e-5);
        assert!(!s.closing);
    }

    #[test]
    fn test_frame_along_x_points_up() {
        let path = FlowPath::new(&line(), false);
        let s = path.sample(0.3).unwrap();
        assert!(s.dir.distance(Vec3::X) < 1e-5);
        assert!(s.up.distance(Vec3::Y) < 1e-5);
    }

    #[test]
    fn test_closed_path_returns_to_start() {
        let path = FlowPath::new(&line(), true);
        let s = path.sample(0.999).unwrap();
        assert!(s.closing);
        assert_eq!(s.segment, 4);
        assert!(s.base.distance(Vec3::new(-3.0, 0.0, 0.0)) < 0.05);
        assert!(s.dir.distance(-Vec3::X) < 1e-5);
    }

    #[test]
    fn test_coincident_points_have_a_frame() {
        let path = FlowPath::new(&[Vec3::ONE, Vec3::ONE], false);
        let s = path.sample(0.5).unwrap();
        assert!(s.dir.is_normalized());
        assert!(s.up.is_normalized());
    }
}
