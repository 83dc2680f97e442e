//! "Animate by name" entry point.

use tracing::debug;

use super::animator::{AnimationOptions, Animator, CompleteCallback, CompletionMode};
use super::engine::MotionEngine;
use super::error::MotionResult;
use super::presets::PresetCatalog;
use super::spec::{AnimationSpec, Trigger};

/// Options for [`animate_by_preset`].
pub struct PresetOptions<T> {
    pub trigger: T,
    pub overrides: Option<AnimationSpec<T>>,
    pub on_complete: Option<CompleteCallback>,
    pub animate_on_mount: bool,
    pub completion: CompletionMode,
}

impl<T> PresetOptions<T> {
    pub fn new(trigger: T) -> Self {
        Self {
            trigger,
            overrides: None,
            on_complete: None,
            animate_on_mount: false,
            completion: CompletionMode::default(),
        }
    }

    pub fn overrides(mut self, overrides: AnimationSpec<T>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn animate_on_mount(mut self, enabled: bool) -> Self {
        self.animate_on_mount = enabled;
        self
    }

    pub fn completion(mut self, mode: CompletionMode) -> Self {
        self.completion = mode;
        self
    }
}

/// Build an [`Animator`] from the preset called `name`, with `overrides`
/// merged over it.
///
/// An unknown name fails before any animator or cell exists.
pub fn animate_by_preset<T, E>(
    catalog: &PresetCatalog<T>,
    name: &str,
    options: PresetOptions<T>,
    engine: E,
) -> MotionResult<Animator<T, E>>
where
    T: Trigger,
    E: MotionEngine,
{
    let PresetOptions {
        trigger,
        overrides,
        on_complete,
        animate_on_mount,
        completion,
    } = options;

    let animations = catalog.resolve(name, overrides.as_ref())?;
    debug!(preset = name, properties = animations.active_count(), "animating by preset");

    let mut animation = AnimationOptions::new(trigger, animations)
        .animate_on_mount(animate_on_mount)
        .completion(completion);
    animation.on_complete = on_complete;
    Animator::new(animation, engine)
}

impl<T: Trigger, E: MotionEngine> Animator<T, E> {
    /// Shorthand for [`animate_by_preset`] with the built-in catalog.
    pub fn from_preset(name: &str, options: PresetOptions<T>, engine: E) -> MotionResult<Self> {
        animate_by_preset(&PresetCatalog::builtin(), name, options, engine)
    }
}
