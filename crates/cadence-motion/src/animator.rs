//! The orchestration state machine.
//!
//! An [`Animator`] owns the live cells for one animated element, reacts to
//! trigger changes by dispatching every configured property to its engine, and
//! fires lifecycle callbacks as properties complete.
//!
//! ```text
//! set_trigger ──► plan_cycle (validate all) ──► compose + engine.start
//!                                          └──► CompletionTimers / SettleHandle
//! tick(delta) ──► due timers ──► Mailbox ──► pump ──► OrchestrationState
//!                                                  └──► callbacks
//! ```
//!
//! Timers run on a host-driven clock: nothing completes until the host calls
//! [`Animator::tick`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::cell::LiveCells;
use super::dispatch::{Completion, DispatchPlan, compose, plan_cycle};
use super::engine::{MotionEngine, SettleHandle};
use super::error::MotionResult;
use super::events::{LifecycleEvent, Mailbox};
use super::scheduler::CompletionTimers;
use super::spec::{AnimationSpec, Trigger};
use super::state::{AnimationSnapshot, CompletionOutcome, OrchestrationState};
use super::style::AnimatedStyle;
use super::types::{AnimatableProperty, CycleId};

pub type CompleteCallback = Box<dyn FnMut()>;
pub type PropertyCallback = Box<dyn FnMut(AnimatableProperty)>;

/// How a dispatched property is judged complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// A timer set to the computed duration.
    #[default]
    Timer,
    /// The engine's settle notification.
    Settle,
}

/// Construction options for an [`Animator`].
pub struct AnimationOptions<T> {
    pub trigger: T,
    pub animations: AnimationSpec<T>,
    pub on_complete: Option<CompleteCallback>,
    pub on_animation_start: Option<PropertyCallback>,
    pub on_animation_end: Option<PropertyCallback>,
    /// Run a cycle for the initial trigger as soon as the animator is built.
    pub animate_on_mount: bool,
    pub completion: CompletionMode,
}

impl<T> AnimationOptions<T> {
    pub fn new(trigger: T, animations: AnimationSpec<T>) -> Self {
        Self {
            trigger,
            animations,
            on_complete: None,
            on_animation_start: None,
            on_animation_end: None,
            animate_on_mount: false,
            completion: CompletionMode::default(),
        }
    }

    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn on_animation_start(mut self, f: impl FnMut(AnimatableProperty) + 'static) -> Self {
        self.on_animation_start = Some(Box::new(f));
        self
    }

    pub fn on_animation_end(mut self, f: impl FnMut(AnimatableProperty) + 'static) -> Self {
        self.on_animation_end = Some(Box::new(f));
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

#[derive(Default)]
struct Callbacks {
    on_complete: Option<CompleteCallback>,
    on_animation_start: Option<PropertyCallback>,
    on_animation_end: Option<PropertyCallback>,
}

/// Orchestrates one element's property animations.
pub struct Animator<T: Trigger, E: MotionEngine> {
    trigger: T,
    animations: AnimationSpec<T>,
    engine: E,
    cells: LiveCells,
    state: OrchestrationState,
    timers: CompletionTimers,
    mailbox: Mailbox,
    callbacks: Callbacks,
    completion: CompletionMode,
}

impl<T: Trigger, E: MotionEngine> Animator<T, E> {
    /// Build an animator. Cells are seeded from each config's `initial`, or
    /// the property's neutral value.
    ///
    /// With `animate_on_mount` the first cycle runs here, and a configuration
    /// error is returned instead of an animator.
    pub fn new(options: AnimationOptions<T>, engine: E) -> MotionResult<Self> {
        let AnimationOptions {
            trigger,
            animations,
            on_complete,
            on_animation_start,
            on_animation_end,
            animate_on_mount,
            completion,
        } = options;

        let cells = LiveCells::neutral();
        for (property, config) in animations.active() {
            cells.get(property).set(config.initial_or(property));
        }

        let mut animator = Self {
            trigger,
            animations,
            engine,
            cells,
            state: OrchestrationState::idle(CycleId::new()),
            timers: CompletionTimers::new(),
            mailbox: Mailbox::new(),
            callbacks: Callbacks {
                on_complete,
                on_animation_start,
                on_animation_end,
            },
            completion,
        };

        if animate_on_mount {
            animator.retrigger()?;
        }
        Ok(animator)
    }

    /// Change the trigger. An unchanged trigger is a no-op returning
    /// `Ok(false)`; otherwise any in-flight cycle is superseded.
    ///
    /// The whole spec is validated first: on error nothing is mutated and the
    /// stored trigger keeps its previous value.
    pub fn set_trigger(&mut self, trigger: T) -> MotionResult<bool> {
        if trigger == self.trigger {
            return Ok(false);
        }
        let plans = plan_cycle(&self.animations, &trigger)?;
        self.trigger = trigger;
        self.run_cycle(plans);
        Ok(true)
    }

    /// Start a new cycle with the current trigger.
    pub fn retrigger(&mut self) -> MotionResult<()> {
        let plans = plan_cycle(&self.animations, &self.trigger)?;
        self.run_cycle(plans);
        Ok(())
    }

    /// Replace the spec without starting a cycle. Cells whose config defines
    /// `initial` are re-seeded with it.
    pub fn set_animations(&mut self, animations: AnimationSpec<T>) {
        let mut cancelled = Vec::new();
        for (property, config) in animations.active() {
            if let Some(initial) = config.initial {
                let cell = self.cells.get(property);
                self.engine.cancel(cell);
                cell.set(initial);
                cancelled.push(property);
            }
        }
        self.animations = animations;
        self.release_settles(cancelled);
    }

    /// Advance the completion clock by `delta_ms` and deliver pending
    /// lifecycle messages.
    pub fn tick(&mut self, delta_ms: f64) {
        let sender = self.mailbox.sender();
        for (cycle, property) in self.timers.advance(delta_ms) {
            sender.post(LifecycleEvent::Finished { cycle, property });
        }
        self.pump();
    }

    /// Deliver lifecycle messages posted so far (engine settle notifications
    /// in particular) without moving the clock.
    pub fn pump(&mut self) {
        for event in self.mailbox.drain() {
            if event.cycle() != self.state.cycle() {
                trace!(?event, current = %self.state.cycle(), "dropping stale lifecycle event");
                continue;
            }
            match event {
                LifecycleEvent::Started { property, .. } => {
                    if let Some(callback) = self.callbacks.on_animation_start.as_mut() {
                        guarded("on_animation_start", || callback(property));
                    }
                }
                LifecycleEvent::Finished { property, .. } => self.finish(property),
            }
        }
    }

    fn finish(&mut self, property: AnimatableProperty) {
        let outcome = self.state.mark_complete(property);
        if outcome == CompletionOutcome::Ignored {
            trace!(%property, "ignoring duplicate completion");
            return;
        }

        if let Some(callback) = self.callbacks.on_animation_end.as_mut() {
            guarded("on_animation_end", || callback(property));
        }

        if outcome == CompletionOutcome::CycleComplete {
            debug!(cycle = %self.state.cycle(), "cycle complete");
            if let Some(callback) = self.callbacks.on_complete.as_mut() {
                guarded("on_complete", callback);
            }
        }
    }

    fn run_cycle(&mut self, plans: Vec<DispatchPlan<T>>) {
        let cancelled = self.timers.cancel_all();
        let cycle = CycleId::new();
        if cancelled > 0 {
            debug!(%cycle, cancelled, "superseding in-flight cycle");
        }

        if plans.is_empty() {
            self.state = OrchestrationState::idle(cycle);
            debug!(%cycle, "no active properties, staying idle");
            return;
        }

        self.state = OrchestrationState::begin(cycle, plans.iter().map(|p| p.property));
        debug!(%cycle, properties = plans.len(), trigger = ?self.trigger, "starting cycle");

        let sender = self.mailbox.sender();
        for plan in &plans {
            let property = plan.property;
            sender.post(LifecycleEvent::Started { cycle, property });

            let transition = compose(&mut self.engine, plan);
            let settle = match self.completion {
                CompletionMode::Timer => SettleHandle::detached(cycle, property),
                CompletionMode::Settle => SettleHandle::new(cycle, property, sender.clone()),
            };
            self.engine.start(self.cells.get(property), transition, settle);

            match (plan.completion, self.completion) {
                (Completion::Immediate, _) => {
                    sender.post(LifecycleEvent::Finished { cycle, property });
                }
                (Completion::After(ms), CompletionMode::Timer) => {
                    self.timers.schedule(cycle, property, ms);
                }
                (Completion::After(_), CompletionMode::Settle) => {}
            }
        }

        self.pump();
    }

    /// Cancel engine animations and timers, put every cell back at its
    /// `initial` (or neutral) value and return to idle.
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        for property in AnimatableProperty::ALL {
            let cell = self.cells.get(property);
            self.engine.cancel(cell);
            let value = self
                .animations
                .get(property)
                .map_or_else(|| property.neutral(), |config| config.initial_or(property));
            cell.set(value);
        }
        self.state = OrchestrationState::idle(CycleId::new());
        debug!("animator reset");
    }

    /// Halt every cell in place. Bookkeeping and completion timers are left
    /// running, so `on_complete` still fires for the current cycle.
    ///
    /// In [`CompletionMode::Settle`] a halted transition never settles, so
    /// its property is completed here instead.
    pub fn pause(&mut self) {
        for cell in self.cells.iter() {
            self.engine.cancel(cell);
        }
        let pending: Vec<_> = self.state.pending().collect();
        self.release_settles(pending);
    }

    /// Complete properties of the current cycle whose settle handle was
    /// dropped by a cancel. Timer mode is left to its timers.
    fn release_settles(&mut self, properties: Vec<AnimatableProperty>) {
        if self.completion != CompletionMode::Settle {
            return;
        }
        let cycle = self.state.cycle();
        let sender = self.mailbox.sender();
        for property in properties {
            if self.state.is_pending(property) {
                trace!(%property, "completing cancelled transition");
                sender.post(LifecycleEvent::Finished { cycle, property });
            }
        }
        self.pump();
    }

    pub fn state(&self) -> AnimationSnapshot {
        self.state.snapshot()
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_running()
    }

    pub fn style(&self) -> AnimatedStyle {
        AnimatedStyle::derive(&self.animations, &self.cells)
    }

    pub fn cells(&self) -> &LiveCells {
        &self.cells
    }

    pub fn value(&self, property: AnimatableProperty) -> f64 {
        self.cells.value(property)
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn animations(&self) -> &AnimationSpec<T> {
        &self.animations
    }

    pub fn completion_mode(&self) -> CompletionMode {
        self.completion
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending_count()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn set_on_complete(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.on_complete = Some(Box::new(f));
    }

    pub fn set_on_animation_start(&mut self, f: impl FnMut(AnimatableProperty) + 'static) {
        self.callbacks.on_animation_start = Some(Box::new(f));
    }

    pub fn set_on_animation_end(&mut self, f: impl FnMut(AnimatableProperty) + 'static) {
        self.callbacks.on_animation_end = Some(Box::new(f));
    }
}

impl<T: Trigger, E: MotionEngine> Drop for Animator<T, E> {
    fn drop(&mut self) {
        self.timers.cancel_all();
        for cell in self.cells.iter() {
            self.engine.cancel(cell);
        }
    }
}

/// Run a user callback, logging instead of unwinding if it panics.
fn guarded(name: &str, f: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        warn!(callback = name, message = panic_message(payload.as_ref()), "animation callback panicked");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
