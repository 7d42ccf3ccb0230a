//! Light rig per variant
//!
//! The rig is plain data; the renderer packs it into its globals uniform.

use glam::Vec3;

use crate::hex_to_rgb;
use crate::settings::Variant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Light shines from this position towards the origin
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Distance at which the light reaches zero
    pub range: f32,
    pub position: Vec3,
}

impl PointLight {
    /// Finite-range falloff: `(1 - d/range)^2`, zero beyond the range
    pub fn attenuation(&self, point: Vec3) -> f32 {
        if self.range <= 0.0 {
            return 1.0;
        }
        let d = self.position.distance(point);
        let f = (1.0 - d / self.range).max(0.0);
        f * f
    }
}

/// All lights in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub points: [PointLight; 2],
}

impl LightRig {
    pub fn for_variant(variant: Variant) -> Self {
        let (key, fill) = match variant {
            Variant::Azure => (0x0088ff, 0x0055ff),
            Variant::Ember => (0xff7a1a, 0xff3300),
            Variant::Orbit => (0x00ccff, 0x7a44ff),
        };

        Self {
            ambient: AmbientLight {
                color: hex_to_rgb(0x202030),
            },
            directional: DirectionalLight {
                color: hex_to_rgb(0xffffff),
                intensity: 1.0,
                position: Vec3::new(1.0, 1.0, 1.0),
            },
            points: [
                PointLight {
                    color: hex_to_rgb(key),
                    intensity: 1.5,
                    range: 100.0,
                    position: Vec3::new(3.0, 2.0, 3.0),
                },
                PointLight {
                    color: hex_to_rgb(fill),
                    intensity: 1.0,
                    range: 100.0,
                    position: Vec3::new(-3.0, -1.0, 2.0),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_share_ambient_and_key_direction() {
        let azure = LightRig::for_variant(Variant::Azure);
        let ember = LightRig::for_variant(Variant::Ember);
        assert_eq!(azure.ambient, ember.ambient);
        assert_eq!(azure.directional, ember.directional);
        assert_ne!(azure.points[0].color, ember.points[0].color);
        assert_eq!(azure.points[0].position, ember.points[0].position);
    }

    #[test]
    fn test_attenuation_falls_off_to_zero() {
        let rig = LightRig::for_variant(Variant::Azure);
        let light = rig.points[0];
        assert!((light.attenuation(light.position) - 1.0).abs() < 1e-6);
        let far = light.position + Vec3::new(200.0, 0.0, 0.0);
        assert_eq!(light.attenuation(far), 0.0);
        let mid = light.position + Vec3::new(50.0, 0.0, 0.0);
        assert!((light.attenuation(mid) - 0.25).abs() < 1e-4);
    }
}
