//! 2D signed distance functions
//!
//! Used to rasterize the speech-bubble label image. Negative inside, positive
//! outside, in pixels.

use glam::Vec2;

/// Signed distance to an axis-aligned rounded rectangle given by its min corner and size
pub fn sd_rounded_rect(p: Vec2, min: Vec2, size: Vec2, radius: f32) -> f32 {
    let half = size * 0.5;
    let center = min + half;
    let r = radius.min(half.x).min(half.y).max(0.0);
    let q = (p - center).abs() - half + Vec2::splat(r);
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0) - r
}

/// Signed distance to a line segment (unsigned, zero thickness)
#[inline]
pub fn sd_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let pa = p - a;
    let ba = b - a;
    let h = (pa.dot(ba) / ba.length_squared().max(f32::EPSILON)).clamp(0.0, 1.0);
    (pa - ba * h).length()
}

/// Signed distance to a triangle
pub fn sd_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> f32 {
    let d = sd_segment(p, a, b).min(sd_segment(p, b, c)).min(sd_segment(p, c, a));

    // Inside when on the same side of all three edges
    let cross = |u: Vec2, v: Vec2, w: Vec2| (v - u).perp_dot(w - u);
    let s1 = cross(a, b, p);
    let s2 = cross(b, c, p);
    let s3 = cross(c, a, p);
    let inside = (s1 >= 0.0 && s2 >= 0.0 && s3 >= 0.0) || (s1 <= 0.0 && s2 <= 0.0 && s3 <= 0.0);

    if inside { -d } else { d }
}

/// Speech bubble: rounded body with a downward pointer
#[derive(Debug, Clone, Copy)]
pub struct BubbleShape {
    pub body_min: Vec2,
    pub body_size: Vec2,
    pub corner_radius: f32,
    /// Pointer triangle corners
    pub pointer: [Vec2; 3],
}

/// Union of bubble body and pointer
pub fn sd_bubble(p: Vec2, shape: &BubbleShape) -> f32 {
    let body = sd_rounded_rect(p, shape.body_min, shape.body_size, shape.corner_radius);
    let [a, b, c] = shape.pointer;
    body.min(sd_triangle(p, a, b, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_rect_sign() {
        let min = Vec2::new(0.0, 0.0);
        let size = Vec2::new(100.0, 50.0);
        assert!(sd_rounded_rect(Vec2::new(50.0, 25.0), min, size, 10.0) < 0.0);
        assert!(sd_rounded_rect(Vec2::new(150.0, 25.0), min, size, 10.0) > 0.0);
        // Edge midpoint lies on the boundary
        assert!(sd_rounded_rect(Vec2::new(50.0, 0.0), min, size, 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_rounded_corner_is_cut() {
        let min = Vec2::ZERO;
        let size = Vec2::new(100.0, 50.0);
        // Exact corner lies outside the rounded shape
        assert!(sd_rounded_rect(Vec2::ZERO, min, size, 10.0) > 0.0);
        assert!(sd_rounded_rect(Vec2::ZERO, min, size, 0.0).abs() < 1e-4);
    }

    #[test]
    fn test_triangle_sign() {
        let a = Vec2::new(90.0, 75.0);
        let b = Vec2::new(100.0, 95.0);
        let c = Vec2::new(110.0, 75.0);
        assert!(sd_triangle(Vec2::new(100.0, 80.0), a, b, c) < 0.0);
        assert!(sd_triangle(Vec2::new(100.0, 99.0), a, b, c) > 0.0);
        assert!((sd_triangle(Vec2::new(100.0, 70.0), a, b, c) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_segment_distance() {
        let d = sd_segment(Vec2::new(5.0, 3.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-5);
        let end = sd_segment(Vec2::new(13.0, 4.0), Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert!((end - 5.0).abs() < 1e-5);
    }
}
