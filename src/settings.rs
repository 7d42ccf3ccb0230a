//! Scene settings and preferences
//!
//! Persisted in LocalStorage; URL query parameters override stored values.

use serde::{Deserialize, Serialize};

/// Scene variant. All three share the same scene and animation code and
/// differ in light colors, label text and the line-to-circle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Blue lights, planets stay in a line
    #[default]
    Azure,
    /// Orange/red lights, planets stay in a line
    Ember,
    /// Cyan/violet lights, line closes into a rotating ring
    Orbit,
}

impl Variant {
    pub fn all() -> [Variant; 3] {
        [Variant::Azure, Variant::Ember, Variant::Orbit]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Azure => "Azure",
            Variant::Ember => "Ember",
            Variant::Orbit => "Orbit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "azure" | "blue" => Some(Variant::Azure),
            "ember" | "fire" => Some(Variant::Ember),
            "orbit" | "circle" | "loop" => Some(Variant::Orbit),
            _ => None,
        }
    }

    /// Whether the planets leave the line and close into a rotating ring
    pub fn has_transition(&self) -> bool {
        matches!(self, Variant::Orbit)
    }
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Energy flow particle count for this preset
    pub fn particle_count(&self) -> usize {
        match self {
            QualityPreset::Low => 600,
            QualityPreset::Medium => 1500,
            QualityPreset::High => 3000,
        }
    }

    /// Fraction of the full starfield to generate
    pub fn star_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.0,
        }
    }

    /// Whether to request a multisampled surface
    pub fn antialias(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Scene settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Scene variant
    pub variant: Variant,
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Fixed RNG seed (random per page load when absent)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Show speech-bubble labels
    pub show_labels: bool,
    /// Orbit control damping (fraction of the pending motion applied per frame)
    pub damping_factor: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            variant: Variant::Azure,
            quality: QualityPreset::Medium,
            seed: None,
            show_labels: true,
            damping_factor: 0.05,
        }
    }
}

impl Settings {
    /// Create settings for a variant (other fields default)
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Apply `key=value` pairs from a URL query string (leading `?` optional)
    pub fn apply_query(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "variant" => match Variant::from_str(value) {
                    Some(v) => self.variant = v,
                    None => log::warn!("Unknown variant '{}'", value),
                },
                "quality" => match QualityPreset::from_str(value) {
                    Some(q) => self.quality = q,
                    None => log::warn!("Unknown quality '{}'", value),
                },
                "seed" => match value.parse::<u64>() {
                    Ok(seed) => self.seed = Some(seed),
                    Err(_) => log::warn!("Invalid seed '{}'", value),
                },
                "labels" => match value {
                    "on" | "1" | "true" => self.show_labels = true,
                    "off" | "0" | "false" => self.show_labels = false,
                    _ => log::warn!("Invalid labels value '{}'", value),
                },
                "damping" => match value.parse::<f32>() {
                    Ok(d) if (0.0..=1.0).contains(&d) => self.damping_factor = d,
                    _ => log::warn!("Invalid damping '{}'", value),
                },
                _ => log::warn!("Ignoring unknown setting '{}'", key),
            }
        }
    }

    /// Default settings overridden by a query string
    pub fn from_query(query: &str) -> Self {
        Self::default().with_query(query)
    }

    /// Copy with a query string applied; `self` (the stored settings) is untouched
    pub fn with_query(&self, query: &str) -> Self {
        let mut settings = self.clone();
        settings.apply_query(query);
        settings
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "planet_flow_settings";

    /// Settings as persisted in LocalStorage, without query overrides (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load_stored() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        storage
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten())
            .and_then(|json| serde_json::from_str::<Settings>(&json).ok())
            .unwrap_or_else(|| {
                log::info!("Using default settings");
                Self::default()
            })
    }

    /// Stored settings overridden by the page's query string (WASM only).
    ///
    /// The result is a per-page view; persist the stored settings, not this.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        Self::load_stored().with_query(&search)
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_stored() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_aliases() {
        assert_eq!(Variant::from_str("Ember"), Some(Variant::Ember));
        assert_eq!(Variant::from_str("fire"), Some(Variant::Ember));
        assert_eq!(Variant::from_str(" LOOP "), Some(Variant::Orbit));
        assert_eq!(Variant::from_str("blue"), Some(Variant::Azure));
        assert_eq!(Variant::from_str("plaid"), None);
        for v in Variant::all() {
            assert_eq!(Variant::from_str(v.as_str()), Some(v));
        }
    }

    #[test]
    fn test_only_orbit_transitions() {
        assert!(!Variant::Azure.has_transition());
        assert!(!Variant::Ember.has_transition());
        assert!(Variant::Orbit.has_transition());
    }

    #[test]
    fn test_query_overrides() {
        let s = Settings::from_query("?variant=orbit&quality=high&seed=42&labels=off");
        assert_eq!(s.variant, Variant::Orbit);
        assert_eq!(s.quality, QualityPreset::High);
        assert_eq!(s.seed, Some(42));
        assert!(!s.show_labels);
    }

    #[test]
    fn test_query_view_leaves_stored_settings_alone() {
        let stored = Settings::for_variant(Variant::Ember);
        let view = stored.with_query("?seed=42&labels=off&variant=orbit");

        assert_eq!(view.seed, Some(42));
        assert_eq!(view.variant, Variant::Orbit);
        assert!(!view.show_labels);

        assert_eq!(stored.seed, None);
        assert_eq!(stored.variant, Variant::Ember);
        assert!(stored.show_labels);
        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains(r#""seed":null"#));
    }

    #[test]
    fn test_query_ignores_garbage() {
        let s = Settings::from_query("variant=nope&seed=abc&damping=7&&foo=bar&quality");
        let d = Settings::default();
        assert_eq!(s.variant, d.variant);
        assert_eq!(s.quality, d.quality);
        assert_eq!(s.seed, None);
        assert_eq!(s.damping_factor, d.damping_factor);
    }

    #[test]
    fn test_settings_json_roundtrip_keeps_seed_optional() {
        let json = r#"{"variant":"Ember","quality":"Low","show_labels":true,"damping_factor":0.1}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.variant, Variant::Ember);
        assert_eq!(s.seed, None);
    }

    #[test]
    fn test_particle_counts_grow_with_quality() {
        assert!(QualityPreset::Low.particle_count() < QualityPreset::Medium.particle_count());
        assert!(QualityPreset::Medium.particle_count() < QualityPreset::High.particle_count());
    }
}
