//! Starfield background: two static point layers scattered through a cube.

use glam::Vec3;
use rand::Rng;

use crate::hex_to_rgba;

/// Parameters for one layer of stars
#[derive(Debug, Clone, Copy)]
pub struct StarLayerSpec {
    pub count: usize,
    /// Side length of the cube the stars are scattered in
    pub extent: f32,
    pub color: u32,
    /// World-space point size
    pub size: f32,
    pub opacity: f32,
}

/// White background stars
pub const WHITE_STARS: StarLayerSpec = StarLayerSpec {
    count: 2000,
    extent: 100.0,
    color: 0xffffff,
    size: 0.15,
    opacity: 0.8,
};

/// Blue-tinted stars, a little closer in
pub const BLUE_STARS: StarLayerSpec = StarLayerSpec {
    count: 500,
    extent: 80.0,
    color: 0x5588ff,
    size: 0.12,
    opacity: 0.7,
};

/// A generated layer
#[derive(Debug, Clone)]
pub struct StarLayer {
    pub positions: Vec<Vec3>,
    pub color: [f32; 4],
    pub size: f32,
}

impl StarLayer {
    pub fn generate<R: Rng>(spec: &StarLayerSpec, scale: f32, rng: &mut R) -> Self {
        let count = (spec.count as f32 * scale.clamp(0.0, 1.0)).round() as usize;
        let positions = (0..count)
            .map(|_| {
                Vec3::new(
                    (rng.random::<f32>() - 0.5) * spec.extent,
                    (rng.random::<f32>() - 0.5) * spec.extent,
                    (rng.random::<f32>() - 0.5) * spec.extent,
                )
            })
            .collect();

        Self {
            positions,
            color: hex_to_rgba(spec.color, spec.opacity),
            size: spec.size,
        }
    }
}

/// Both star layers
#[derive(Debug, Clone)]
pub struct Starfield {
    pub layers: Vec<StarLayer>,
}

impl Starfield {
    /// Generate the white and blue layers, thinned by `scale`
    pub fn generate<R: Rng>(scale: f32, rng: &mut R) -> Self {
        Self {
            layers: vec![
                StarLayer::generate(&WHITE_STARS, scale, rng),
                StarLayer::generate(&BLUE_STARS, scale, rng),
            ],
        }
    }

    pub fn star_count(&self) -> usize {
        self.layers.iter().map(|l| l.positions.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_full_starfield_counts() {
        let mut rng = Pcg32::seed_from_u64(3);
        let field = Starfield::generate(1.0, &mut rng);
        assert_eq!(field.layers[0].positions.len(), 2000);
        assert_eq!(field.layers[1].positions.len(), 500);
        assert_eq!(field.star_count(), 2500);
    }

    #[test]
    fn test_stars_stay_inside_their_cube() {
        let mut rng = Pcg32::seed_from_u64(11);
        let field = Starfield::generate(1.0, &mut rng);
        let half_white = WHITE_STARS.extent / 2.0;
        let half_blue = BLUE_STARS.extent / 2.0;
        assert!(field.layers[0].positions.iter().all(|p| p.abs().max_element() <= half_white));
        assert!(field.layers[1].positions.iter().all(|p| p.abs().max_element() <= half_blue));
    }

    #[test]
    fn test_scale_thins_layers() {
        let mut rng = Pcg32::seed_from_u64(5);
        let field = Starfield::generate(0.5, &mut rng);
        assert_eq!(field.star_count(), 1250);
        assert!((field.layers[1].color[3] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_sky() {
        let a = Starfield::generate(1.0, &mut Pcg32::seed_from_u64(9));
        let b = Starfield::generate(1.0, &mut Pcg32::seed_from_u64(9));
        assert_eq!(a.layers[0].positions, b.layers[0].positions);
    }
}
