//! Planet Flow - glowing planets linked by a fiery energy stream
//!
//! Core modules:
//! - `scene`: Scene bootstrap and per-frame update (planets, starfield, labels, lights)
//! - `sim`: Time-driven animation (energy flow particles, flow path, 2D distance fields)
//! - `camera`: Perspective camera with damped orbit controls
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser glue (label text rasterization)
//! - `settings`: Variant/quality configuration

pub mod camera;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use camera::OrbitCamera;
pub use error::{RenderError, SceneError};
pub use scene::Scene;
pub use settings::{QualityPreset, Settings, Variant};

/// Scene configuration constants
pub mod consts {
    /// Largest frame delta accepted by the update (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal frame delta, used for the first frame
    pub const NOMINAL_DT: f32 = 1.0 / 60.0;

    /// Background color (deep space blue)
    pub const BACKGROUND: u32 = 0x000510;

    /// Camera defaults
    pub const CAMERA_FOV_DEG: f32 = 75.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1000.0;
    pub const CAMERA_DISTANCE: f32 = 5.0;

    /// Planet defaults
    pub const PLANET_COUNT: usize = 5;
    pub const PLANET_SPACING: f32 = 1.5;
    pub const PLANET_RADIUS: f32 = 0.4;
    pub const PLANET_SEGMENTS: u32 = 32;
    /// Spin about X and Y (0.005 rad per frame at 60 fps)
    pub const PLANET_SPIN_RATE: f32 = 0.3;

    /// Line-to-circle transition
    pub const CIRCLE_RADIUS: f32 = 2.0;
    pub const TRANSITION_START: f32 = 9.0;
    pub const TRANSITION_DURATION: f32 = 3.0;
    pub const LOOP_ANGULAR_SPEED: f32 = 0.25;

    /// Labels
    pub const LABEL_FADE_RATE: f32 = 1.0; // 0.02 every 20 ms
    pub const LABEL_SCALE: [f32; 2] = [0.8, 0.5];
}

/// Convert a packed 0xRRGGBB color to linear-ish RGB floats in [0, 1]
#[inline]
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Same as [`hex_to_rgb`] with an explicit alpha
#[inline]
pub fn hex_to_rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let [r, g, b] = hex_to_rgb(hex);
    [r, g, b, alpha]
}

/// Hermite smoothstep on [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fractional part that is always in [0, 1)
#[inline]
pub fn fract(x: f32) -> f32 {
    let f = x - x.floor();
    if f >= 1.0 { 0.0 } else { f }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(hex_to_rgb(0x000000), [0.0, 0.0, 0.0]);
        let [r, g, b] = hex_to_rgb(0x0066ff);
        assert_eq!(r, 0.0);
        assert!((g - 0.4).abs() < 0.001);
        assert_eq!(b, 1.0);
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[test]
    fn test_fract_range() {
        assert_eq!(fract(1.25), 0.25);
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert!(fract(-1e-9) < 1.0);
    }
}
