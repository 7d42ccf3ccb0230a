//! Speech-bubble labels attached above planets
//!
//! Labels appear after a delay and fade in. Everything is a function of scene
//! time, so there are no timers to cancel.

use glam::Vec3;

use crate::consts::LABEL_FADE_RATE;
use crate::error::SceneError;
use crate::settings::Variant;

/// What to show, where and when
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub text: String,
    /// Index of the planet the label hangs above
    pub target: usize,
    /// Height above the planet center
    pub y_offset: f32,
    /// Seconds of scene time before the label appears
    pub delay: f32,
}

impl LabelSpec {
    pub fn new(text: &str, target: usize, y_offset: f32, delay: f32) -> Self {
        Self {
            text: text.to_string(),
            target,
            y_offset,
            delay,
        }
    }
}

/// Label text per variant
pub fn labels_for_variant(variant: Variant) -> Vec<LabelSpec> {
    match variant {
        Variant::Azure | Variant::Orbit => vec![
            LabelSpec::new("SKU", 0, 1.0, 5.0),
            LabelSpec::new("Köpbar produkt", 4, 1.0, 7.0),
        ],
        Variant::Ember => vec![
            LabelSpec::new("Råvara", 0, 1.0, 5.0),
            LabelSpec::new("Färdig vara", 4, 1.0, 7.0),
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelState {
    /// Not yet shown
    Pending,
    /// Opacity ramping up
    FadingIn,
    /// Fully opaque
    Visible,
}

/// A scheduled label
#[derive(Debug, Clone)]
pub struct Label {
    pub spec: LabelSpec,
    pub state: LabelState,
    pub opacity: f32,
    /// World position of the sprite center
    pub position: Vec3,
}

impl Label {
    /// Create a label, checking the target against the planet count
    pub fn new(spec: LabelSpec, planet_count: usize) -> Result<Self, SceneError> {
        if spec.target >= planet_count {
            return Err(SceneError::LabelTarget {
                text: spec.text,
                target: spec.target,
                count: planet_count,
            });
        }
        Ok(Self {
            spec,
            state: LabelState::Pending,
            opacity: 0.0,
            position: Vec3::ZERO,
        })
    }

    pub fn is_shown(&self) -> bool {
        self.state != LabelState::Pending
    }

    /// Advance to scene time `elapsed` and follow the target planet
    pub fn update(&mut self, elapsed: f32, target_position: Vec3) {
        self.position = target_position + Vec3::new(0.0, self.spec.y_offset, 0.0);

        let shown_for = elapsed - self.spec.delay;
        if shown_for < 0.0 {
            self.state = LabelState::Pending;
            self.opacity = 0.0;
            return;
        }

        if self.state == LabelState::Pending {
            log::info!("Showing label '{}'", self.spec.text);
        }

        self.opacity = (shown_for * LABEL_FADE_RATE).min(1.0);
        self.state = if self.opacity >= 1.0 {
            LabelState::Visible
        } else {
            LabelState::FadingIn
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_target_rejected() {
        let spec = LabelSpec::new("nowhere", 9, 1.0, 0.0);
        let err = Label::new(spec, 5).unwrap_err();
        assert!(matches!(err, SceneError::LabelTarget { target: 9, count: 5, .. }));
    }

    #[test]
    fn test_fade_in_timeline() {
        let mut label = Label::new(LabelSpec::new("SKU", 0, 1.0, 5.0), 5).unwrap();
        let target = Vec3::new(-3.0, 0.0, 0.0);

        label.update(4.9, target);
        assert_eq!(label.state, LabelState::Pending);
        assert_eq!(label.opacity, 0.0);

        label.update(5.5, target);
        assert_eq!(label.state, LabelState::FadingIn);
        assert!((label.opacity - 0.5).abs() < 1e-5);

        label.update(6.5, target);
        assert_eq!(label.state, LabelState::Visible);
        assert_eq!(label.opacity, 1.0);
    }

    #[test]
    fn test_label_follows_planet() {
        let mut label = Label::new(LabelSpec::new("SKU", 0, 1.0, 0.0), 5).unwrap();
        label.update(1.0, Vec3::new(-3.0, 0.0, 0.0));
        assert_eq!(label.position, Vec3::new(-3.0, 1.0, 0.0));
        label.update(2.0, Vec3::new(-1.0, 1.5, 0.0));
        assert_eq!(label.position, Vec3::new(-1.0, 2.5, 0.0));
    }

    #[test]
    fn test_variant_labels_target_end_planets() {
        for variant in Variant::all() {
            let specs = labels_for_variant(variant);
            assert_eq!(specs.len(), 2);
            assert_eq!(specs[0].target, 0);
            assert_eq!(specs[1].target, 4);
            assert!(specs[0].delay < specs[1].delay);
        }
    }
}
