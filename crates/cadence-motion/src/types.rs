//! Core animation types.
//!
//! - `AnimatableProperty`: the fixed set of style properties an animator drives
//! - `CycleId`: identifier of one trigger-change cycle

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// A visual property that can be animated.
///
/// Variant order is the order in which transform entries are emitted by the
/// style derivation, so `Ord` is derived on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimatableProperty {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
    ScaleX,
    ScaleY,
    Rotate,
}

impl AnimatableProperty {
    /// Every animatable property, in style order.
    pub const ALL: [AnimatableProperty; 7] = [
        Self::Opacity,
        Self::TranslateX,
        Self::TranslateY,
        Self::Scale,
        Self::ScaleX,
        Self::ScaleY,
        Self::Rotate,
    ];

    /// Resting value used when a config does not provide `initial`.
    pub fn neutral(self) -> f64 {
        match self {
            Self::Opacity | Self::Scale | Self::ScaleX | Self::ScaleY => 1.0,
            Self::TranslateX | Self::TranslateY | Self::Rotate => 0.0,
        }
    }

    /// Position of this property in [`AnimatableProperty::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the property is rendered inside the `transform` list.
    pub fn is_transform(self) -> bool {
        !matches!(self, Self::Opacity)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::TranslateX => "translateX",
            Self::TranslateY => "translateY",
            Self::Scale => "scale",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::Rotate => "rotate",
        }
    }
}

impl fmt::Display for AnimatableProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimatableProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown animatable property '{s}'"))
    }
}

/// Identifier of one orchestration cycle.
///
/// Every trigger change allocates a fresh id; lifecycle messages carry it so
/// that anything posted by a superseded cycle can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CycleId(pub u64);

impl CycleId {
    /// Generate a new unique cycle id.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle#{}", self.0)
    }
}
