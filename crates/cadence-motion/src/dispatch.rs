//! Per-property dispatch.
//!
//! Dispatch is split in two so that a trigger change can be validated in full
//! before anything is mutated:
//!
//! 1. [`plan`] picks the direction override, resolves the target and the
//!    completion delay. It is pure and fails with a [`MotionError`].
//! 2. [`compose`] turns a plan into a [`Transition`] through the engine's
//!    builder methods. It cannot fail.

use tracing::debug;

use super::duration::{DEFAULT_DURATION_MS, total_duration_ms};
use super::engine::MotionEngine;
use super::error::{MotionError, MotionResult};
use super::spec::{AnimationConfig, AnimationKind, AnimationSpec, Target, TimingConfig, Trigger};
use super::transition::Transition;
use super::types::AnimatableProperty;

/// When a dispatched property counts as complete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    /// Infinite repeats and non-positive durations.
    Immediate,
    /// After this many milliseconds.
    After(f64),
}

/// Everything needed to start one property.
#[derive(Debug, Clone)]
pub struct DispatchPlan<T> {
    pub property: AnimatableProperty,
    /// Config after the `enter`/`exit` override was applied.
    pub config: AnimationConfig<T>,
    pub target: f64,
    pub completion: Completion,
}

/// Apply `enter` (truthy trigger) or `exit` (falsy trigger) over `config`.
pub fn effective_config<T: Trigger>(config: &AnimationConfig<T>, trigger: &T) -> AnimationConfig<T> {
    match direction_override(config, trigger) {
        Some(over) => config.merged_with(over),
        None => config.clone(),
    }
}

fn direction_override<'a, T: Trigger>(
    config: &'a AnimationConfig<T>,
    trigger: &T,
) -> Option<&'a AnimationConfig<T>> {
    if trigger.is_truthy() {
        config.enter.as_deref()
    } else {
        config.exit.as_deref()
    }
}

/// Resolve the numeric target for `property`.
///
/// A bidirectional config with a constant target treats the constant as the
/// entered value: on a falsy trigger it heads back to `initial` unless the
/// `exit` override names its own target.
pub fn resolve_target<T: Trigger>(
    property: AnimatableProperty,
    config: &AnimationConfig<T>,
    trigger: &T,
) -> MotionResult<f64> {
    let effective = effective_config(config, trigger);
    let overridden = direction_override(config, trigger).is_some_and(|over| over.target.is_some());

    let value = match &effective.target {
        Some(Target::Constant(_)) if config.is_bidirectional() && !trigger.is_truthy() && !overridden => {
            config.initial_or(property)
        }
        Some(target) => target.resolve(trigger),
        None => trigger.as_number().ok_or_else(|| MotionError::NonNumericTrigger {
            property,
            trigger: format!("{trigger:?}"),
        })?,
    };

    if !value.is_finite() {
        return Err(MotionError::NonFiniteTarget { property, value });
    }
    Ok(value)
}

/// Validate and plan one property for `trigger`.
pub fn plan<T: Trigger>(
    property: AnimatableProperty,
    config: &AnimationConfig<T>,
    trigger: &T,
) -> MotionResult<DispatchPlan<T>> {
    let target = resolve_target(property, config, trigger)?;
    let effective = effective_config(config, trigger);

    if let Some(repeat) = effective.repeat {
        if repeat.count == 0 || repeat.count < -1 {
            return Err(MotionError::InvalidRepeat {
                property,
                count: repeat.count,
            });
        }
    }
    if effective.sequence.is_none() && effective.kind() == AnimationKind::Spring {
        let spring = effective.params.and_then(|p| p.spring().copied()).unwrap_or_default();
        if let Some(reason) = spring.invalid_reason() {
            return Err(MotionError::InvalidSpring { property, reason });
        }
    }
    if let Some(frame) = effective
        .sequence
        .iter()
        .flatten()
        .find(|frame| !frame.value().is_finite())
    {
        return Err(MotionError::NonFiniteTarget {
            property,
            value: frame.value(),
        });
    }

    let duration = total_duration_ms(&effective);
    let completion = if duration.is_finite() && duration > 0.0 {
        Completion::After(duration)
    } else {
        Completion::Immediate
    };

    Ok(DispatchPlan {
        property,
        config: effective,
        target,
        completion,
    })
}

/// Plan every active property of `spec`, failing on the first invalid one.
pub fn plan_cycle<T: Trigger>(spec: &AnimationSpec<T>, trigger: &T) -> MotionResult<Vec<DispatchPlan<T>>> {
    spec.active()
        .map(|(property, config)| plan(property, config, trigger))
        .collect()
}

/// Build the transition for a plan.
pub fn compose<T, E>(engine: &mut E, plan: &DispatchPlan<T>) -> Transition
where
    E: MotionEngine + ?Sized,
{
    let config = &plan.config;
    let timing = config.params.and_then(|p| p.timing().copied());
    let easing = timing.and_then(|t| t.easing);

    let mut transition = match &config.sequence {
        Some(frames) => {
            let mut steps = Vec::with_capacity(frames.len());
            for frame in frames {
                let duration = frame.duration().or(config.duration).unwrap_or(DEFAULT_DURATION_MS);
                let step = engine.timing(
                    frame.value(),
                    TimingConfig {
                        duration: Some(duration),
                        easing,
                    },
                );
                steps.push(match frame.delay() {
                    Some(delay) if delay > 0.0 => engine.delay(delay, step),
                    _ => step,
                });
            }
            engine.sequence(steps)
        }
        None => {
            let base = match config.kind() {
                AnimationKind::Spring => {
                    let spring = config.params.and_then(|p| p.spring().copied()).unwrap_or_default();
                    engine.spring(plan.target, spring)
                }
                AnimationKind::Timing => {
                    let duration = timing
                        .and_then(|t| t.duration)
                        .or(config.duration)
                        .unwrap_or(DEFAULT_DURATION_MS);
                    engine.timing(
                        plan.target,
                        TimingConfig {
                            duration: Some(duration),
                            easing,
                        },
                    )
                }
            };
            match config.delay {
                Some(delay) if delay > 0.0 => engine.delay(delay, base),
                _ => base,
            }
        }
    };

    if let Some(repeat) = config.repeat {
        transition = engine.repeat(transition, repeat.count, repeat.reverse);
    }

    debug!(
        property = %plan.property,
        target = plan.target,
        completion = ?plan.completion,
        "composed transition"
    );
    transition
}
