//! Completion timers on a host-driven clock.
//!
//! The host advances the clock by the frame delta; timers whose deadline has
//! passed are returned in deadline order (ties keep scheduling order).

use super::types::{AnimatableProperty, CycleId};

#[derive(Debug, Clone, Copy)]
struct PendingCompletion {
    due_ms: f64,
    seq: u64,
    cycle: CycleId,
    property: AnimatableProperty,
}

#[derive(Debug, Default)]
pub struct CompletionTimers {
    now_ms: f64,
    next_seq: u64,
    pending: Vec<PendingCompletion>,
}

impl CompletionTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Fire a completion for `property` after `after_ms` of clock time.
    pub fn schedule(&mut self, cycle: CycleId, property: AnimatableProperty, after_ms: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(PendingCompletion {
            due_ms: self.now_ms + after_ms.max(0.0),
            seq,
            cycle,
            property,
        });
    }

    /// Move the clock forward and return every timer that came due.
    pub fn advance(&mut self, delta_ms: f64) -> Vec<(CycleId, AnimatableProperty)> {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.now_ms += delta_ms;
        }

        let now = self.now_ms;
        let mut due: Vec<PendingCompletion> = Vec::new();
        self.pending.retain(|timer| {
            if timer.due_ms <= now {
                due.push(*timer);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| (t.cycle, t.property)).collect()
    }

    /// Drop every pending timer, returning how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clock time until the next deadline, if any timer is pending.
    pub fn next_due_in(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|t| (t.due_ms - self.now_ms).max(0.0))
            .min_by(f64::total_cmp)
    }
}
