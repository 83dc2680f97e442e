//! Declarative animation specifications.
//!
//! An [`AnimationSpec`] maps each [`AnimatableProperty`] to an optional
//! [`AnimationConfig`]. Every config field is optional so the same type doubles
//! as a partial override (presets, `enter`/`exit` direction overrides).
//!
//! ```
//! use cadence_motion::spec::{AnimationConfig, AnimationSpec};
//! use cadence_motion::types::AnimatableProperty;
//!
//! let spec: AnimationSpec<bool> = AnimationSpec::new()
//!     .with(
//!         AnimatableProperty::Opacity,
//!         AnimationConfig::new().with_initial(0.0).with_toggle(1.0, 0.0),
//!     )
//!     .with(
//!         AnimatableProperty::TranslateY,
//!         AnimationConfig::new().with_initial(50.0).with_toggle(0.0, 50.0).with_duration(400.0),
//!     );
//! assert_eq!(spec.len(), 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::easing::EasingFunction;
use super::types::AnimatableProperty;

/// A value whose changes start animation cycles.
///
/// Truthiness selects `enter`/`exit` overrides and toggle targets; numeric
/// coercion supplies the target when a config has none.
pub trait Trigger: Clone + PartialEq + fmt::Debug + 'static {
    fn is_truthy(&self) -> bool;

    /// Numeric coercion, `None` when the value has no numeric reading.
    fn as_number(&self) -> Option<f64>;
}

impl Trigger for bool {
    fn is_truthy(&self) -> bool {
        *self
    }

    fn as_number(&self) -> Option<f64> {
        Some(if *self { 1.0 } else { 0.0 })
    }
}

macro_rules! impl_trigger_int {
    ($($ty:ty),*) => {
        $(
            impl Trigger for $ty {
                fn is_truthy(&self) -> bool {
                    *self != 0
                }

                fn as_number(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

impl_trigger_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_trigger_float {
    ($($ty:ty),*) => {
        $(
            impl Trigger for $ty {
                fn is_truthy(&self) -> bool {
                    *self != 0.0 && !self.is_nan()
                }

                fn as_number(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

impl_trigger_float!(f32, f64);

fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse().ok()
}

impl Trigger for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }

    fn as_number(&self) -> Option<f64> {
        parse_numeric(self)
    }
}

impl Trigger for &'static str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }

    fn as_number(&self) -> Option<f64> {
        parse_numeric(self)
    }
}

/// `None` behaves like an unset value: falsy, coercing to zero.
impl<T: Trigger> Trigger for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(|value| value.is_truthy())
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Some(value) => value.as_number(),
            None => Some(0.0),
        }
    }
}

/// Function deriving a target from the trigger value.
pub type DeriveFn<T> = Arc<dyn Fn(&T) -> f64 + Send + Sync>;

/// Where a property animates to.
#[derive(Serialize, Deserialize)]
#[serde(untagged, bound = "")]
pub enum Target<T> {
    Constant(f64),
    /// `on` while the trigger is truthy, `off` otherwise.
    Toggle { on: f64, off: f64 },
    #[serde(skip)]
    Derived(DeriveFn<T>),
}

impl<T> Target<T> {
    pub fn derived(f: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        Self::Derived(Arc::new(f))
    }

    pub fn resolve(&self, trigger: &T) -> f64
    where
        T: Trigger,
    {
        match self {
            Self::Constant(value) => *value,
            Self::Toggle { on, off } => {
                if trigger.is_truthy() {
                    *on
                } else {
                    *off
                }
            }
            Self::Derived(f) => f(trigger),
        }
    }
}

impl<T> Clone for Target<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(*value),
            Self::Toggle { on, off } => Self::Toggle { on: *on, off: *off },
            Self::Derived(f) => Self::Derived(Arc::clone(f)),
        }
    }
}

impl<T> PartialEq for Target<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (Self::Toggle { on: a, off: b }, Self::Toggle { on: c, off: d }) => a == c && b == d,
            (Self::Derived(a), Self::Derived(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T> fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Toggle { on, off } => f
                .debug_struct("Toggle")
                .field("on", on)
                .field("off", off)
                .finish(),
            Self::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

impl<T> From<f64> for Target<T> {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

/// Primitive used for the non-sequence path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    #[default]
    Timing,
    Spring,
}

/// Spring physics parameters. Unset fields take the engine defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpringConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overshoot_clamping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_displacement_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_speed_threshold: Option<f64>,
}

/// Spring parameters with every default filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSpring {
    pub damping: f64,
    pub stiffness: f64,
    pub mass: f64,
    pub overshoot_clamping: bool,
    pub rest_displacement_threshold: f64,
    pub rest_speed_threshold: f64,
}

impl SpringConfig {
    pub fn new(damping: f64, stiffness: f64) -> Self {
        Self {
            damping: Some(damping),
            stiffness: Some(stiffness),
            ..Self::default()
        }
    }

    /// Describe the first parameter the integrator cannot run with, if any.
    pub fn invalid_reason(&self) -> Option<&'static str> {
        let spring = self.resolved();
        if !(spring.mass.is_finite() && spring.mass > 0.0) {
            Some("mass must be positive and finite")
        } else if !(spring.stiffness.is_finite() && spring.stiffness > 0.0) {
            Some("stiffness must be positive and finite")
        } else if !(spring.damping.is_finite() && spring.damping >= 0.0) {
            Some("damping must be non-negative and finite")
        } else if !(spring.rest_displacement_threshold.is_finite() && spring.rest_displacement_threshold >= 0.0)
            || !(spring.rest_speed_threshold.is_finite() && spring.rest_speed_threshold >= 0.0)
        {
            Some("rest thresholds must be non-negative and finite")
        } else {
            None
        }
    }

    pub fn resolved(&self) -> ResolvedSpring {
        ResolvedSpring {
            damping: self.damping.unwrap_or(10.0),
            stiffness: self.stiffness.unwrap_or(100.0),
            mass: self.mass.unwrap_or(1.0),
            overshoot_clamping: self.overshoot_clamping.unwrap_or(false),
            rest_displacement_threshold: self.rest_displacement_threshold.unwrap_or(0.01),
            rest_speed_threshold: self.rest_speed_threshold.unwrap_or(2.0),
        }
    }
}

/// Timing curve parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingFunction>,
}

/// Physics or timing parameters attached to a config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MotionParams {
    Spring(SpringConfig),
    Timing(TimingConfig),
}

impl MotionParams {
    pub fn spring(&self) -> Option<&SpringConfig> {
        match self {
            Self::Spring(config) => Some(config),
            Self::Timing(_) => None,
        }
    }

    pub fn timing(&self) -> Option<&TimingConfig> {
        match self {
            Self::Timing(config) => Some(config),
            Self::Spring(_) => None,
        }
    }
}

/// Explicit keyframe inside a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
}

/// One step of a sequence: a bare value or an explicit keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Frame {
    Value(f64),
    Keyframe(Keyframe),
}

impl Frame {
    pub fn value(&self) -> f64 {
        match self {
            Self::Value(value) => *value,
            Self::Keyframe(keyframe) => keyframe.value,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Value(_) => None,
            Self::Keyframe(keyframe) => keyframe.duration,
        }
    }

    pub fn delay(&self) -> Option<f64> {
        match self {
            Self::Value(_) => None,
            Self::Keyframe(keyframe) => keyframe.delay,
        }
    }
}

impl From<f64> for Frame {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

/// Repeat count `-1` repeats forever.
pub const INFINITE_REPEAT: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repeat {
    pub count: i32,
    #[serde(default)]
    pub reverse: bool,
}

impl Repeat {
    pub fn new(count: i32, reverse: bool) -> Self {
        Self { count, reverse }
    }

    pub fn infinite(reverse: bool) -> Self {
        Self::new(INFINITE_REPEAT, reverse)
    }

    pub fn is_infinite(&self) -> bool {
        self.count == INFINITE_REPEAT
    }
}

/// Animation description for one property.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "camelCase", default)]
pub struct AnimationConfig<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<f64>,
    #[serde(alias = "to", skip_serializing_if = "Option::is_none")]
    pub target: Option<Target<T>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AnimationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(alias = "config", skip_serializing_if = "Option::is_none")]
    pub params: Option<MotionParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Vec<Frame>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Repeat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enter: Option<Box<AnimationConfig<T>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<Box<AnimationConfig<T>>>,
}

impl<T> Clone for AnimationConfig<T> {
    fn clone(&self) -> Self {
        Self {
            initial: self.initial,
            target: self.target.clone(),
            kind: self.kind,
            duration: self.duration,
            delay: self.delay,
            params: self.params,
            sequence: self.sequence.clone(),
            repeat: self.repeat,
            enter: self.enter.clone(),
            exit: self.exit.clone(),
        }
    }
}

impl<T> Default for AnimationConfig<T> {
    fn default() -> Self {
        Self {
            initial: None,
            target: None,
            kind: None,
            duration: None,
            delay: None,
            params: None,
            sequence: None,
            repeat: None,
            enter: None,
            exit: None,
        }
    }
}

impl<T> AnimationConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(mut self, initial: f64) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn with_target(mut self, target: impl Into<Target<T>>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_toggle(mut self, on: f64, off: f64) -> Self {
        self.target = Some(Target::Toggle { on, off });
        self
    }

    pub fn with_derived(mut self, f: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        self.target = Some(Target::derived(f));
        self
    }

    pub fn with_kind(mut self, kind: AnimationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Shorthand for `kind = spring` with the given parameters.
    pub fn with_spring(mut self, spring: SpringConfig) -> Self {
        self.kind = Some(AnimationKind::Spring);
        self.params = Some(MotionParams::Spring(spring));
        self
    }

    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.params = Some(MotionParams::Timing(timing));
        self
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration = Some(duration_ms);
        self
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay = Some(delay_ms);
        self
    }

    pub fn with_sequence<I, F>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Frame>,
    {
        self.sequence = Some(frames.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_repeat(mut self, count: i32, reverse: bool) -> Self {
        self.repeat = Some(Repeat::new(count, reverse));
        self
    }

    pub fn with_enter(mut self, enter: AnimationConfig<T>) -> Self {
        self.enter = Some(Box::new(enter));
        self
    }

    pub fn with_exit(mut self, exit: AnimationConfig<T>) -> Self {
        self.exit = Some(Box::new(exit));
        self
    }

    pub fn kind(&self) -> AnimationKind {
        self.kind.unwrap_or_default()
    }

    pub fn is_bidirectional(&self) -> bool {
        self.enter.is_some() || self.exit.is_some()
    }

    pub fn has_infinite_repeat(&self) -> bool {
        self.repeat.is_some_and(|r| r.is_infinite())
    }

    /// Value a live cell rests at for this property.
    pub fn initial_or(&self, property: AnimatableProperty) -> f64 {
        self.initial.unwrap_or_else(|| property.neutral())
    }
}

/// Per-property animation configs. An entry holding `None` is explicitly
/// disabled, which lets an override switch off a property a preset animates.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "", transparent)]
pub struct AnimationSpec<T> {
    entries: BTreeMap<AnimatableProperty, Option<AnimationConfig<T>>>,
}

impl<T> Clone for AnimationSpec<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T> Default for AnimationSpec<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> AnimationSpec<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: AnimatableProperty, config: AnimationConfig<T>) -> Self {
        self.entries.insert(property, Some(config));
        self
    }

    /// Add an explicit "none" entry for `property`.
    pub fn without(mut self, property: AnimatableProperty) -> Self {
        self.entries.insert(property, None);
        self
    }

    pub fn insert(&mut self, property: AnimatableProperty, config: Option<AnimationConfig<T>>) {
        self.entries.insert(property, config);
    }

    pub fn remove(&mut self, property: AnimatableProperty) -> Option<Option<AnimationConfig<T>>> {
        self.entries.remove(&property)
    }

    /// Active config for `property`, if any.
    pub fn get(&self, property: AnimatableProperty) -> Option<&AnimationConfig<T>> {
        self.entries.get(&property).and_then(Option::as_ref)
    }

    /// Raw entry, distinguishing "absent" (`None`) from "disabled" (`Some(None)`).
    pub fn entry(&self, property: AnimatableProperty) -> Option<&Option<AnimationConfig<T>>> {
        self.entries.get(&property)
    }

    pub fn contains(&self, property: AnimatableProperty) -> bool {
        self.entries.contains_key(&property)
    }

    /// Properties with a config, in style order.
    pub fn active(&self) -> impl Iterator<Item = (AnimatableProperty, &AnimationConfig<T>)> {
        self.entries
            .iter()
            .filter_map(|(property, config)| config.as_ref().map(|c| (*property, c)))
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn entries(
        &self,
    ) -> impl Iterator<Item = (AnimatableProperty, &Option<AnimationConfig<T>>)> {
        self.entries.iter().map(|(property, config)| (*property, config))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<(AnimatableProperty, AnimationConfig<T>)> for AnimationSpec<T> {
    fn from_iter<I: IntoIterator<Item = (AnimatableProperty, AnimationConfig<T>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(p, c)| (p, Some(c))).collect(),
        }
    }
}
