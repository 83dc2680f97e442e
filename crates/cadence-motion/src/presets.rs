//! Named animation presets.
//!
//! The sixteen built-ins cover entrance, emphasis and exit patterns. Targets
//! are expressed as toggles so a preset is plain data and works with any
//! trigger type. Extra presets can be registered in code or loaded from TOML:
//!
//! ```toml
//! [presets.popIn.scale]
//! initial = 0.6
//! target = { on = 1.0, off = 0.6 }
//! type = "spring"
//! config = { type = "spring", damping = 14.0, stiffness = 260.0 }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use super::error::{MotionError, MotionResult};
use super::merge::merge_overrides;
use super::spec::{AnimationConfig, AnimationSpec, SpringConfig};
use super::types::AnimatableProperty::{self, Opacity, Rotate, Scale, TranslateX, TranslateY};

/// Built-in preset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    FadeIn,
    SlideInUp,
    SlideInDown,
    SlideInLeft,
    SlideInRight,
    ZoomIn,
    BounceIn,
    Shake,
    Pulse,
    Jiggle,
    FadeOut,
    SlideOutUp,
    SlideOutDown,
    SlideOutLeft,
    SlideOutRight,
    ZoomOut,
}

impl Preset {
    pub const ALL: [Preset; 16] = [
        Self::FadeIn,
        Self::SlideInUp,
        Self::SlideInDown,
        Self::SlideInLeft,
        Self::SlideInRight,
        Self::ZoomIn,
        Self::BounceIn,
        Self::Shake,
        Self::Pulse,
        Self::Jiggle,
        Self::FadeOut,
        Self::SlideOutUp,
        Self::SlideOutDown,
        Self::SlideOutLeft,
        Self::SlideOutRight,
        Self::ZoomOut,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::FadeIn => "fadeIn",
            Self::SlideInUp => "slideInUp",
            Self::SlideInDown => "slideInDown",
            Self::SlideInLeft => "slideInLeft",
            Self::SlideInRight => "slideInRight",
            Self::ZoomIn => "zoomIn",
            Self::BounceIn => "bounceIn",
            Self::Shake => "shake",
            Self::Pulse => "pulse",
            Self::Jiggle => "jiggle",
            Self::FadeOut => "fadeOut",
            Self::SlideOutUp => "slideOutUp",
            Self::SlideOutDown => "slideOutDown",
            Self::SlideOutLeft => "slideOutLeft",
            Self::SlideOutRight => "slideOutRight",
            Self::ZoomOut => "zoomOut",
        }
    }

    pub fn spec<T>(self) -> AnimationSpec<T> {
        match self {
            Self::FadeIn => AnimationSpec::new().with(Opacity, toggle(0.0, 1.0, 300.0)),
            Self::SlideInUp => slide_in(TranslateY, 50.0),
            Self::SlideInDown => slide_in(TranslateY, -50.0),
            Self::SlideInLeft => slide_in(TranslateX, -50.0),
            Self::SlideInRight => slide_in(TranslateX, 50.0),
            Self::ZoomIn => AnimationSpec::new()
                .with(Opacity, toggle(0.0, 1.0, 300.0))
                .with(Scale, toggle(0.8, 1.0, 300.0)),
            Self::BounceIn => AnimationSpec::new().with(
                Scale,
                AnimationConfig::new()
                    .with_initial(0.5)
                    .with_toggle(1.0, 0.5)
                    .with_spring(SpringConfig::new(12.0, 200.0)),
            ),
            Self::Shake => AnimationSpec::new().with(
                TranslateX,
                AnimationConfig::new()
                    .with_initial(0.0)
                    .with_sequence([0.0, -8.0, 8.0, -4.0, 4.0, 0.0])
                    .with_duration(50.0),
            ),
            Self::Pulse => AnimationSpec::new().with(
                Scale,
                AnimationConfig::new()
                    .with_initial(1.0)
                    .with_sequence([1.0, 1.05, 1.0])
                    .with_duration(400.0)
                    .with_repeat(-1, false),
            ),
            Self::Jiggle => AnimationSpec::new().with(
                Rotate,
                AnimationConfig::new()
                    .with_initial(0.0)
                    .with_sequence([0.0, -3.0, 3.0, -2.0, 2.0, 0.0])
                    .with_duration(80.0),
            ),
            Self::FadeOut => AnimationSpec::new().with(Opacity, toggle(1.0, 0.0, 300.0)),
            Self::SlideOutUp => slide_out(TranslateY, -50.0),
            Self::SlideOutDown => slide_out(TranslateY, 50.0),
            Self::SlideOutLeft => slide_out(TranslateX, -50.0),
            Self::SlideOutRight => slide_out(TranslateX, 50.0),
            Self::ZoomOut => AnimationSpec::new()
                .with(Opacity, toggle(1.0, 0.0, 300.0))
                .with(Scale, toggle(1.0, 0.8, 300.0)),
        }
    }
}

/// Rests at `rest`, moves to `active` while the trigger is truthy.
fn toggle<T>(rest: f64, active: f64, duration_ms: f64) -> AnimationConfig<T> {
    AnimationConfig::new()
        .with_initial(rest)
        .with_toggle(active, rest)
        .with_duration(duration_ms)
}

fn slide_in<T>(axis: AnimatableProperty, offset: f64) -> AnimationSpec<T> {
    AnimationSpec::new()
        .with(Opacity, toggle(0.0, 1.0, 400.0))
        .with(axis, toggle(offset, 0.0, 400.0))
}

fn slide_out<T>(axis: AnimatableProperty, offset: f64) -> AnimationSpec<T> {
    AnimationSpec::new()
        .with(Opacity, toggle(1.0, 0.0, 400.0))
        .with(axis, toggle(0.0, offset, 400.0))
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown preset '{s}'"))
    }
}

#[derive(Deserialize)]
#[serde(bound = "")]
struct PresetDocument<T> {
    #[serde(default)]
    presets: BTreeMap<String, BTreeMap<String, AnimationConfig<T>>>,
}

/// Name → spec lookup table used by the preset facade.
#[derive(Debug, Clone)]
pub struct PresetCatalog<T> {
    presets: BTreeMap<String, AnimationSpec<T>>,
}

impl<T> Default for PresetCatalog<T> {
    fn default() -> Self {
        Self {
            presets: BTreeMap::new(),
        }
    }
}

impl<T> PresetCatalog<T> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog holding the sixteen built-in presets.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for preset in Preset::ALL {
            catalog.register(preset.name(), preset.spec());
        }
        catalog
    }

    /// Add or replace a preset.
    pub fn register(&mut self, name: impl Into<String>, spec: AnimationSpec<T>) {
        self.presets.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&AnimationSpec<T>> {
        self.presets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Look up `name` and merge `overrides` over it.
    pub fn resolve(&self, name: &str, overrides: Option<&AnimationSpec<T>>) -> MotionResult<AnimationSpec<T>>
    where
        T: Clone,
    {
        let base = self.get(name).ok_or_else(|| MotionError::UnknownPreset {
            name: name.to_string(),
            available: self.names().map(str::to_string).collect(),
        })?;
        Ok(match overrides {
            Some(overrides) => merge_overrides(base, overrides),
            None => base.clone(),
        })
    }

    /// Register every preset in a TOML document, returning how many were added.
    ///
    /// The document is parsed in full before anything is registered.
    pub fn extend_from_toml(&mut self, source: &str) -> MotionResult<usize> {
        let document: PresetDocument<T> = toml::from_str(source)?;

        let mut parsed = Vec::with_capacity(document.presets.len());
        for (name, properties) in document.presets {
            let mut spec = AnimationSpec::new();
            for (key, config) in properties {
                let property = key.parse::<AnimatableProperty>().map_err(|message| MotionError::InvalidPreset {
                    name: name.clone(),
                    message,
                })?;
                spec.insert(property, Some(config));
            }
            parsed.push((name, spec));
        }

        let count = parsed.len();
        for (name, spec) in parsed {
            debug!(preset = %name, properties = spec.len(), "registered preset");
            self.register(name, spec);
        }
        Ok(count)
    }
}
