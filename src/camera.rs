//! Perspective camera with damped orbit controls
//!
//! Pointer drags and wheel notches queue up rotation/zoom; every frame a
//! `damping_factor` share of the queued motion is applied and the rest decays,
//! which gives the controls their gliding feel.

use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

use crate::consts::*;

/// Minimum angle between the view direction and the poles
const POLAR_EPSILON: f32 = 1e-3;
/// Camera distance limits
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 100.0;
/// Radians of rotation per pixel of drag, per pixel of canvas height
const ROTATE_SPEED: f32 = TAU;
/// Dolly scale per wheel notch
const ZOOM_STEP: f32 = 0.95;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    /// Distance from target
    pub distance: f32,
    /// Angle around the Y axis (0 = camera on +Z)
    pub azimuth: f32,
    /// Angle from +Y (π/2 = level with the target)
    pub polar: f32,

    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    /// Fraction of pending motion applied per frame (0 disables damping)
    pub damping_factor: f32,

    // Pending motion
    azimuth_delta: f32,
    polar_delta: f32,
    zoom_scale: f32,
}

impl OrbitCamera {
    /// Camera at (0, 0, `CAMERA_DISTANCE`) looking at the origin
    pub fn new(aspect: f32, damping_factor: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            distance: CAMERA_DISTANCE,
            azimuth: 0.0,
            polar: PI / 2.0,
            fov_y: CAMERA_FOV_DEG.to_radians(),
            aspect: sanitize_aspect(aspect),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            damping_factor: damping_factor.clamp(0.0, 1.0),
            azimuth_delta: 0.0,
            polar_delta: 0.0,
            zoom_scale: 1.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Queue a drag of `dx, dy` pixels on a canvas `height` pixels tall
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        self.azimuth_delta -= ROTATE_SPEED * dx / height;
        self.polar_delta -= ROTATE_SPEED * dy / height;
    }

    /// Queue a zoom; positive `notches` move the camera closer
    pub fn zoom(&mut self, notches: f32) {
        self.dolly(ZOOM_STEP.powf(notches));
    }

    /// Queue a distance scale (below 1 moves closer), e.g. from a pinch
    pub fn dolly(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.zoom_scale *= scale;
        }
    }

    /// Apply queued motion. Returns true while the camera is still moving.
    pub fn update(&mut self) -> bool {
        let factor = if self.damping_factor > 0.0 {
            self.damping_factor
        } else {
            1.0
        };

        self.azimuth = (self.azimuth + self.azimuth_delta * factor) % TAU;
        self.polar = (self.polar + self.polar_delta * factor)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let scale = 1.0 + (self.zoom_scale - 1.0) * factor;
        self.distance = (self.distance * scale).clamp(MIN_DISTANCE, MAX_DISTANCE);

        let keep = 1.0 - factor;
        self.azimuth_delta *= keep;
        self.polar_delta *= keep;
        self.zoom_scale = 1.0 + (self.zoom_scale - 1.0) * keep;

        let moving = self.azimuth_delta.abs() > 1e-5
            || self.polar_delta.abs() > 1e-5
            || (self.zoom_scale - 1.0).abs() > 1e-5;
        if !moving {
            self.azimuth_delta = 0.0;
            self.polar_delta = 0.0;
            self.zoom_scale = 1.0;
        }
        moving
    }

    /// World-space eye position
    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.distance
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Right-handed perspective with 0..1 depth
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_position() {
        let cam = OrbitCamera::new(16.0 / 9.0, 0.05);
        assert!(cam.position().distance(Vec3::new(0.0, 0.0, 5.0)) < 1e-5);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let cam = OrbitCamera::new(1.5, 0.05);
        let clip = cam.view_proj() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_damped_rotation_glides_and_settles() {
        let mut cam = OrbitCamera::new(1.0, 0.05);
        cam.rotate(100.0, 0.0, 800.0);
        assert!(cam.update());
        let after_one = cam.azimuth;
        assert!(after_one < 0.0);

        for _ in 0..600 {
            cam.update();
        }
        let total = -TAU * 100.0 / 800.0;
        assert!((cam.azimuth - total).abs() < 1e-3);
        assert!(!cam.update());
    }

    #[test]
    fn test_no_damping_applies_instantly() {
        let mut cam = OrbitCamera::new(1.0, 0.0);
        cam.zoom(1.0);
        assert!(!cam.update());
        assert!((cam.distance - CAMERA_DISTANCE * ZOOM_STEP).abs() < 1e-5);
    }

    #[test]
    fn test_dolly_scales_distance() {
        let mut cam = OrbitCamera::new(1.0, 0.0);
        cam.dolly(0.5);
        cam.dolly(f32::NAN);
        cam.dolly(0.0);
        cam.update();
        assert!((cam.distance - CAMERA_DISTANCE * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_polar_and_distance_clamped() {
        let mut cam = OrbitCamera::new(1.0, 0.0);
        cam.rotate(0.0, 1.0e6, 100.0);
        cam.zoom(-500.0);
        cam.update();
        assert!(cam.polar >= POLAR_EPSILON);
        assert_eq!(cam.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_bad_aspect_falls_back() {
        let mut cam = OrbitCamera::new(f32::NAN, 0.05);
        assert_eq!(cam.aspect, 1.0);
        cam.set_aspect(0, 10);
        assert_eq!(cam.aspect, 1.0);
        cam.set_aspect(200, 100);
        assert_eq!(cam.aspect, 2.0);
    }
}
