//! Style derivation from live cells.

use serde::Serialize;

use super::cell::LiveCells;
use super::spec::AnimationSpec;
use super::types::AnimatableProperty;

/// Single-key transform entry, e.g. `{"translateX": 12.0}` or
/// `{"rotate": "45deg"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformEntry {
    TranslateX(f64),
    TranslateY(f64),
    Scale(f64),
    ScaleX(f64),
    ScaleY(f64),
    Rotate(String),
}

impl TransformEntry {
    fn from_value(property: AnimatableProperty, value: f64) -> Option<Self> {
        Some(match property {
            AnimatableProperty::Opacity => return None,
            AnimatableProperty::TranslateX => Self::TranslateX(value),
            AnimatableProperty::TranslateY => Self::TranslateY(value),
            AnimatableProperty::Scale => Self::Scale(value),
            AnimatableProperty::ScaleX => Self::ScaleX(value),
            AnimatableProperty::ScaleY => Self::ScaleY(value),
            // `+ 0.0` folds -0 into 0 so it never renders as "-0deg".
            AnimatableProperty::Rotate => Self::Rotate(format!("{}deg", value + 0.0)),
        })
    }
}

/// Style object consumed by the rendering layer.
///
/// Only properties with a config in the current spec appear; `transform` is
/// omitted entirely when no transform property is configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnimatedStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<TransformEntry>,
}

impl AnimatedStyle {
    pub fn derive<T>(spec: &AnimationSpec<T>, cells: &LiveCells) -> Self {
        let mut style = AnimatedStyle::default();
        for property in AnimatableProperty::ALL {
            if spec.get(property).is_none() {
                continue;
            }
            let value = cells.value(property);
            match TransformEntry::from_value(property, value) {
                Some(entry) => style.transform.push(entry),
                None => style.opacity = Some(value),
            }
        }
        style
    }

    pub fn is_empty(&self) -> bool {
        self.opacity.is_none() && self.transform.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
