//! Override merge.
//!
//! Merging is one level deep: a property present in both specs gets a
//! field-by-field union where the override's set fields win. Anything else in
//! the override (a new property, or an explicit "none") replaces the base
//! entry wholesale.

use super::spec::{AnimationConfig, AnimationSpec};

impl<T> AnimationConfig<T> {
    /// Field union of `self` and `overrides`, preferring `overrides`.
    ///
    /// `enter`/`exit` are ordinary fields here and are replaced, not merged.
    pub fn merged_with(&self, overrides: &AnimationConfig<T>) -> AnimationConfig<T> {
        AnimationConfig {
            initial: overrides.initial.or(self.initial),
            target: overrides.target.clone().or_else(|| self.target.clone()),
            kind: overrides.kind.or(self.kind),
            duration: overrides.duration.or(self.duration),
            delay: overrides.delay.or(self.delay),
            params: overrides.params.or(self.params),
            sequence: overrides.sequence.clone().or_else(|| self.sequence.clone()),
            repeat: overrides.repeat.or(self.repeat),
            enter: overrides.enter.clone().or_else(|| self.enter.clone()),
            exit: overrides.exit.clone().or_else(|| self.exit.clone()),
        }
    }
}

/// Merge `overrides` over `base`, returning a new spec. Neither input changes.
pub fn merge_overrides<T>(base: &AnimationSpec<T>, overrides: &AnimationSpec<T>) -> AnimationSpec<T> {
    let mut merged = AnimationSpec::new();

    for (property, config) in base.entries() {
        merged.insert(property, config.clone());
    }

    for (property, over) in overrides.entries() {
        let entry = match (base.get(property), over) {
            (Some(existing), Some(over)) => Some(existing.merged_with(over)),
            _ => over.clone(),
        };
        merged.insert(property, entry);
    }

    merged
}
