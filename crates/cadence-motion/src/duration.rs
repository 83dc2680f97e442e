//! Duration arithmetic for a single property config.
//!
//! The result drives the completion timer, not the engine's own settle
//! detection, so for springs it is an approximation.

use super::spec::AnimationConfig;

/// Duration used when neither a frame nor the config sets one.
pub const DEFAULT_DURATION_MS: f64 = 300.0;

/// Total wall-clock duration of `config` in milliseconds.
///
/// Infinite repeats return `f64::INFINITY`.
pub fn total_duration_ms<T>(config: &AnimationConfig<T>) -> f64 {
    let fallback = config.duration.unwrap_or(DEFAULT_DURATION_MS);

    let single = match &config.sequence {
        Some(frames) => frames
            .iter()
            .map(|frame| frame.duration().unwrap_or(fallback) + frame.delay().unwrap_or(0.0))
            .sum(),
        None => fallback + config.delay.unwrap_or(0.0),
    };

    match config.repeat {
        Some(repeat) if repeat.is_infinite() => f64::INFINITY,
        Some(repeat) => single * f64::from(repeat.count),
        None => single,
    }
}
