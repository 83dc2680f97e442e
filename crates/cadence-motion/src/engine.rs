//! The primitive engine capability.
//!
//! The orchestrator never interpolates values itself. It composes a
//! [`Transition`] through the builder methods of [`MotionEngine`] and hands it
//! to [`MotionEngine::start`] together with the cell to drive. Engines that can
//! detect settle report it by consuming the [`SettleHandle`].

use std::sync::{Arc, Mutex, PoisonError};

use super::cell::LiveCell;
use super::duration::DEFAULT_DURATION_MS;
use super::events::{LifecycleEvent, MailboxSender};
use super::spec::{SpringConfig, TimingConfig};
use super::transition::Transition;
use super::types::{AnimatableProperty, CycleId};

/// Token passed along with every started transition.
///
/// Calling [`notify`](SettleHandle::notify) posts a `Finished` message to the
/// animator's mailbox. Handles created while the animator completes through
/// timers are detached and notifying them does nothing.
#[derive(Debug)]
pub struct SettleHandle {
    cycle: CycleId,
    property: AnimatableProperty,
    mailbox: Option<MailboxSender>,
}

impl SettleHandle {
    pub fn new(cycle: CycleId, property: AnimatableProperty, mailbox: MailboxSender) -> Self {
        Self {
            cycle,
            property,
            mailbox: Some(mailbox),
        }
    }

    pub fn detached(cycle: CycleId, property: AnimatableProperty) -> Self {
        Self {
            cycle,
            property,
            mailbox: None,
        }
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn property(&self) -> AnimatableProperty {
        self.property
    }

    pub fn is_detached(&self) -> bool {
        self.mailbox.is_none()
    }

    /// Report that the transition came to rest.
    pub fn notify(self) {
        if let Some(mailbox) = self.mailbox {
            mailbox.post(LifecycleEvent::Finished {
                cycle: self.cycle,
                property: self.property,
            });
        }
    }
}

/// Capability an animation backend provides to the orchestrator.
///
/// The builder methods have default implementations producing plain
/// [`Transition`] values; engines override them only to observe or rewrite
/// what gets composed.
pub trait MotionEngine {
    fn timing(&mut self, target: f64, config: TimingConfig) -> Transition {
        Transition::Timing {
            target,
            duration_ms: config.duration.unwrap_or(DEFAULT_DURATION_MS),
            easing: config.easing.unwrap_or_default(),
        }
    }

    fn spring(&mut self, target: f64, config: SpringConfig) -> Transition {
        Transition::Spring { target, config }
    }

    fn sequence(&mut self, steps: Vec<Transition>) -> Transition {
        Transition::Sequence(steps)
    }

    fn delay(&mut self, delay_ms: f64, inner: Transition) -> Transition {
        Transition::Delay {
            delay_ms,
            inner: Box::new(inner),
        }
    }

    fn repeat(&mut self, inner: Transition, count: i32, reverse: bool) -> Transition {
        Transition::Repeat {
            inner: Box::new(inner),
            count,
            reverse,
        }
    }

    /// Begin driving `cell` with `transition`, replacing whatever was running
    /// on it.
    fn start(&mut self, cell: &LiveCell, transition: Transition, settle: SettleHandle);

    /// Halt `cell` where it is.
    fn cancel(&mut self, cell: &LiveCell);
}

/// Shares one engine between the animator and a render thread.
impl<E: MotionEngine> MotionEngine for Arc<Mutex<E>> {
    fn timing(&mut self, target: f64, config: TimingConfig) -> Transition {
        self.lock().unwrap_or_else(PoisonError::into_inner).timing(target, config)
    }

    fn spring(&mut self, target: f64, config: SpringConfig) -> Transition {
        self.lock().unwrap_or_else(PoisonError::into_inner).spring(target, config)
    }

    fn sequence(&mut self, steps: Vec<Transition>) -> Transition {
        self.lock().unwrap_or_else(PoisonError::into_inner).sequence(steps)
    }

    fn delay(&mut self, delay_ms: f64, inner: Transition) -> Transition {
        self.lock().unwrap_or_else(PoisonError::into_inner).delay(delay_ms, inner)
    }

    fn repeat(&mut self, inner: Transition, count: i32, reverse: bool) -> Transition {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .repeat(inner, count, reverse)
    }

    fn start(&mut self, cell: &LiveCell, transition: Transition, settle: SettleHandle) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .start(cell, transition, settle);
    }

    fn cancel(&mut self, cell: &LiveCell) {
        self.lock().unwrap_or_else(PoisonError::into_inner).cancel(cell);
    }
}

/// A call observed by [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Timing { target: f64, config: TimingConfig },
    Spring { target: f64, config: SpringConfig },
    Sequence { steps: usize },
    Delay { delay_ms: f64 },
    Repeat { count: i32, reverse: bool },
    Start {
        property: AnimatableProperty,
        transition: Transition,
    },
    Cancel { property: AnimatableProperty },
}

/// Engine that records every call and jumps cells straight to their final
/// value. Settle handles are held until [`settle`](RecordingEngine::settle)
/// or [`settle_all`](RecordingEngine::settle_all) is called.
///
/// Useful for tests and for headless hosts that only need the end state.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Vec<EngineCall>,
    unsettled: Vec<SettleHandle>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// `(target, config)` of every timing transition built.
    pub fn timing_calls(&self) -> Vec<(f64, TimingConfig)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Timing { target, config } => Some((*target, *config)),
                _ => None,
            })
            .collect()
    }

    /// `(target, config)` of every spring transition built.
    pub fn spring_calls(&self) -> Vec<(f64, SpringConfig)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Spring { target, config } => Some((*target, *config)),
                _ => None,
            })
            .collect()
    }

    /// Transitions started, in order.
    pub fn started(&self) -> Vec<(AnimatableProperty, &Transition)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Start {
                    property,
                    transition,
                } => Some((*property, transition)),
                _ => None,
            })
            .collect()
    }

    pub fn cancelled(&self) -> Vec<AnimatableProperty> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Cancel { property } => Some(*property),
                _ => None,
            })
            .collect()
    }

    pub fn unsettled_count(&self) -> usize {
        self.unsettled.len()
    }

    /// Notify the oldest pending settle handle for `property`.
    pub fn settle(&mut self, property: AnimatableProperty) -> bool {
        match self.unsettled.iter().position(|h| h.property() == property) {
            Some(index) => {
                self.unsettled.remove(index).notify();
                true
            }
            None => false,
        }
    }

    pub fn settle_all(&mut self) -> usize {
        let handles: Vec<_> = self.unsettled.drain(..).collect();
        let count = handles.len();
        for handle in handles {
            handle.notify();
        }
        count
    }
}

impl MotionEngine for RecordingEngine {
    fn timing(&mut self, target: f64, config: TimingConfig) -> Transition {
        self.calls.push(EngineCall::Timing { target, config });
        Transition::Timing {
            target,
            duration_ms: config.duration.unwrap_or(DEFAULT_DURATION_MS),
            easing: config.easing.unwrap_or_default(),
        }
    }

    fn spring(&mut self, target: f64, config: SpringConfig) -> Transition {
        self.calls.push(EngineCall::Spring { target, config });
        Transition::Spring { target, config }
    }

    fn sequence(&mut self, steps: Vec<Transition>) -> Transition {
        self.calls.push(EngineCall::Sequence { steps: steps.len() });
        Transition::Sequence(steps)
    }

    fn delay(&mut self, delay_ms: f64, inner: Transition) -> Transition {
        self.calls.push(EngineCall::Delay { delay_ms });
        Transition::Delay {
            delay_ms,
            inner: Box::new(inner),
        }
    }

    fn repeat(&mut self, inner: Transition, count: i32, reverse: bool) -> Transition {
        self.calls.push(EngineCall::Repeat { count, reverse });
        Transition::Repeat {
            inner: Box::new(inner),
            count,
            reverse,
        }
    }

    fn start(&mut self, cell: &LiveCell, transition: Transition, settle: SettleHandle) {
        self.unsettled.retain(|h| h.property() != cell.property());
        if !transition.is_unbounded() {
            cell.set(transition.end_value(cell.get()));
        }
        self.calls.push(EngineCall::Start {
            property: cell.property(),
            transition,
        });
        self.unsettled.push(settle);
    }

    fn cancel(&mut self, cell: &LiveCell) {
        self.unsettled.retain(|h| h.property() != cell.property());
        self.calls.push(EngineCall::Cancel {
            property: cell.property(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Mailbox;

    #[test]
    fn test_default_builders() {
        struct Null;
        impl MotionEngine for Null {
            fn start(&mut self, _: &LiveCell, _: Transition, _: SettleHandle) {}
            fn cancel(&mut self, _: &LiveCell) {}
        }

        let mut engine = Null;
        let timing = engine.timing(1.0, TimingConfig::default());
        assert_eq!(
            timing,
            Transition::Timing {
                target: 1.0,
                duration_ms: 300.0,
                easing: Default::default()
            }
        );
        let repeated = engine.repeat(timing.clone(), 2, true);
        assert_eq!(repeated.end_value(0.0), 0.0);
    }

    #[test]
    fn test_settle_handle_posts_finished() {
        let mailbox = Mailbox::new();
        let cycle = CycleId::new();
        SettleHandle::new(cycle, AnimatableProperty::Opacity, mailbox.sender()).notify();
        SettleHandle::detached(cycle, AnimatableProperty::Scale).notify();

        assert_eq!(
            mailbox.drain(),
            vec![LifecycleEvent::Finished {
                cycle,
                property: AnimatableProperty::Opacity
            }]
        );
    }

    #[test]
    fn test_recording_engine_jumps_to_end() {
        let mut engine = RecordingEngine::new();
        let cell = LiveCell::new(AnimatableProperty::TranslateX, 0.0);
        let steps = vec![
            engine.timing(-8.0, TimingConfig::default()),
            engine.timing(4.0, TimingConfig::default()),
        ];
        let sequence = engine.sequence(steps);
        engine.start(
            &cell,
            sequence,
            SettleHandle::detached(CycleId::new(), AnimatableProperty::TranslateX),
        );
        assert_eq!(cell.get(), 4.0);
        assert_eq!(engine.timing_calls().len(), 2);
        assert_eq!(engine.started().len(), 1);
        assert_eq!(engine.unsettled_count(), 1);

        engine.cancel(&cell);
        assert_eq!(engine.unsettled_count(), 0);
        assert_eq!(engine.cancelled(), vec![AnimatableProperty::TranslateX]);
    }

    #[test]
    fn test_shared_engine_forwards() {
        let shared = Arc::new(Mutex::new(RecordingEngine::new()));
        let mut handle = Arc::clone(&shared);
        let cell = LiveCell::new(AnimatableProperty::Opacity, 0.0);
        let transition = handle.timing(1.0, TimingConfig::default());
        handle.start(
            &cell,
            transition,
            SettleHandle::detached(CycleId::new(), AnimatableProperty::Opacity),
        );
        assert_eq!(cell.get(), 1.0);
        assert_eq!(shared.lock().unwrap().calls().len(), 2);
    }
}
