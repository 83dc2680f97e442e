use thiserror::Error;

use crate::types::AnimatableProperty;

#[derive(Error, Debug)]
pub enum MotionError {
    #[error("unknown preset '{name}' (available: {})", available.join(", "))]
    UnknownPreset { name: String, available: Vec<String> },

    #[error("{property}: no target configured and trigger {trigger} has no numeric value")]
    NonNumericTrigger {
        property: AnimatableProperty,
        trigger: String,
    },

    #[error("{property}: target resolved to non-finite value {value}")]
    NonFiniteTarget {
        property: AnimatableProperty,
        value: f64,
    },

    #[error("{property}: repeat count must be positive or -1, got {count}")]
    InvalidRepeat {
        property: AnimatableProperty,
        count: i32,
    },

    #[error("{property}: invalid spring parameters: {reason}")]
    InvalidSpring {
        property: AnimatableProperty,
        reason: &'static str,
    },

    #[error("invalid preset document: {0}")]
    PresetParse(#[from] toml::de::Error),

    #[error("preset '{name}': {message}")]
    InvalidPreset { name: String, message: String },
}

pub type MotionResult<T> = Result<T, MotionError>;
