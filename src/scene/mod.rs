//! Scene bootstrap and per-frame update
//!
//! The scene owns every piece of mutable state. The platform layer calls
//! [`Scene::update`] once per frame and hands the result to the renderer.

pub mod labels;
pub mod lights;
pub mod planets;
pub mod starfield;

pub use labels::{Label, LabelSpec, LabelState, labels_for_variant};
pub use lights::{AmbientLight, DirectionalLight, LightRig, PointLight};
pub use planets::{LayoutPhase, Planet, PlanetLayout, PlanetMaterial};
pub use starfield::{StarLayer, Starfield};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::error::SceneError;
use crate::hex_to_rgb;
use crate::settings::{Settings, Variant};
use crate::sim::EnergyFlow;

/// Static description of a variant
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub variant: Variant,
    pub background: [f32; 3],
    pub lights: LightRig,
    pub material: PlanetMaterial,
    pub labels: Vec<LabelSpec>,
    /// Line closes into a rotating ring
    pub transition: bool,
}

impl SceneConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            background: hex_to_rgb(BACKGROUND),
            lights: LightRig::for_variant(variant),
            material: PlanetMaterial::default(),
            labels: labels_for_variant(variant),
            transition: variant.has_transition(),
        }
    }
}

/// Counts for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStats {
    pub planets: usize,
    pub stars: usize,
    pub particles: usize,
    pub labels: usize,
    pub labels_shown: usize,
}

/// The whole animated scene
pub struct Scene {
    pub config: SceneConfig,
    pub seed: u64,
    pub planets: Vec<Planet>,
    pub layout: PlanetLayout,
    pub starfield: Starfield,
    pub labels: Vec<Label>,
    pub flow: EnergyFlow,
    /// Scene time in seconds
    pub elapsed: f32,
}

impl Scene {
    /// Build the scene. `seed` is used when the settings do not pin one.
    pub fn new(settings: &Settings, seed: u64) -> Result<Self, SceneError> {
        let seed = settings.seed.unwrap_or(seed);
        let config = SceneConfig::for_variant(settings.variant);
        let mut rng = Pcg32::seed_from_u64(seed);

        let starfield = Starfield::generate(settings.quality.star_scale(), &mut rng);
        let planets = planets::create_planetary_system(&mut rng);
        let layout = PlanetLayout::new(config.transition);

        let labels = if settings.show_labels {
            config
                .labels
                .iter()
                .cloned()
                .map(|spec| Label::new(spec, planets.len()))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        let points: Vec<_> = planets.iter().map(|p| p.position).collect();
        let flow = EnergyFlow::new(
            settings.quality.particle_count(),
            &points,
            config.transition,
            &mut rng,
        );

        let mut scene = Self {
            config,
            seed,
            planets,
            layout,
            starfield,
            labels,
            flow,
            elapsed: 0.0,
        };
        scene.update(0.0);

        log::info!(
            "Scene '{}' built with seed {}: {:?}",
            scene.config.variant.as_str(),
            seed,
            scene.stats()
        );

        Ok(scene)
    }

    /// Advance everything by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.elapsed += dt;

        self.layout.update(self.elapsed, dt);
        self.layout.apply(&mut self.planets);
        for planet in &mut self.planets {
            planet.spin(dt);
        }

        for label in &mut self.labels {
            if let Some(target) = self.planets.get(label.spec.target) {
                label.update(self.elapsed, target.position);
            }
        }

        let points: Vec<_> = self.planets.iter().map(|p| p.position).collect();
        self.flow.update(self.elapsed, &points, self.layout.blend());
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            planets: self.planets.len(),
            stars: self.starfield.star_count(),
            particles: self.flow.len(),
            labels: self.labels.len(),
            labels_shown: self.labels.iter().filter(|l| l.is_shown()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::QualityPreset;

    fn settings(variant: Variant) -> Settings {
        Settings {
            quality: QualityPreset::Low,
            ..Settings::for_variant(variant)
        }
    }

    #[test]
    fn test_scene_bootstrap() {
        let scene = Scene::new(&settings(Variant::Azure), 1).unwrap();
        let stats = scene.stats();
        assert_eq!(stats.planets, PLANET_COUNT);
        assert_eq!(stats.particles, QualityPreset::Low.particle_count());
        assert_eq!(stats.stars, 1250);
        assert_eq!(stats.labels, 2);
        assert_eq!(stats.labels_shown, 0);
        assert_eq!(scene.config.background, hex_to_rgb(0x000510));
    }

    #[test]
    fn test_pinned_seed_wins() {
        let mut s = settings(Variant::Ember);
        s.seed = Some(77);
        let a = Scene::new(&s, 1).unwrap();
        let b = Scene::new(&s, 2).unwrap();
        assert_eq!(a.seed, 77);
        assert_eq!(a.flow.positions, b.flow.positions);
    }

    #[test]
    fn test_labels_can_be_disabled() {
        let mut s = settings(Variant::Azure);
        s.show_labels = false;
        let scene = Scene::new(&s, 3).unwrap();
        assert!(scene.labels.is_empty());
    }

    #[test]
    fn test_buffer_lengths_constant_across_frames() {
        let mut scene = Scene::new(&settings(Variant::Orbit), 5).unwrap();
        let n = scene.flow.len();
        for _ in 0..900 {
            scene.update(1.0 / 60.0);
        }
        assert_eq!(scene.flow.positions.len(), n);
        assert_eq!(scene.flow.colors.len(), n);
        assert_eq!(scene.flow.sizes.len(), n);
        assert_eq!(scene.planets.len(), PLANET_COUNT);
    }

    #[test]
    fn test_labels_appear_on_schedule() {
        let mut scene = Scene::new(&settings(Variant::Azure), 9).unwrap();
        for _ in 0..(6 * 60) {
            scene.update(1.0 / 60.0);
        }
        assert_eq!(scene.stats().labels_shown, 1);
        for _ in 0..(2 * 60) {
            scene.update(1.0 / 60.0);
        }
        assert_eq!(scene.stats().labels_shown, 2);
    }

    #[test]
    fn test_orbit_variant_closes_ring_and_labels_follow() {
        let mut scene = Scene::new(&settings(Variant::Orbit), 4).unwrap();
        let end = TRANSITION_START + TRANSITION_DURATION + 1.0;
        while scene.elapsed < end {
            scene.update(0.05);
        }
        assert!(scene.layout.is_closed());
        for p in &scene.planets {
            assert!((p.position.truncate().length() - CIRCLE_RADIUS).abs() < 1e-3);
        }
        let label = &scene.labels[0];
        let target = scene.planets[0].position;
        assert!(((label.position - target).y - 1.0).abs() < 1e-5);
        assert_eq!(label.position.x, target.x);
    }

    #[test]
    fn test_line_variants_keep_line() {
        for variant in [Variant::Azure, Variant::Ember] {
            let mut scene = Scene::new(&settings(variant), 4).unwrap();
            for _ in 0..400 {
                scene.update(0.05);
            }
            assert_eq!(scene.layout.phase, LayoutPhase::Line);
            assert!(scene.planets.iter().all(|p| p.position.y == 0.0));
        }
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut scene = Scene::new(&settings(Variant::Azure), 1).unwrap();
        scene.update(5.0);
        assert!((scene.elapsed - MAX_FRAME_DT).abs() < 1e-6);
    }
}
