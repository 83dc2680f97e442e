//! Per-cycle orchestration bookkeeping.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::types::{AnimatableProperty, CycleId};

/// Result of recording a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Already completed, or not part of this cycle.
    Ignored,
    /// Recorded; other properties are still running.
    Progress,
    /// Recorded, and it was the last one.
    CycleComplete,
}

/// Running/completed sets for one cycle. Replaced wholesale by each new cycle.
#[derive(Debug, Clone)]
pub struct OrchestrationState {
    cycle: CycleId,
    is_running: bool,
    active: BTreeSet<AnimatableProperty>,
    completed: BTreeSet<AnimatableProperty>,
}

impl OrchestrationState {
    pub fn idle(cycle: CycleId) -> Self {
        Self {
            cycle,
            is_running: false,
            active: BTreeSet::new(),
            completed: BTreeSet::new(),
        }
    }

    pub fn begin(cycle: CycleId, properties: impl IntoIterator<Item = AnimatableProperty>) -> Self {
        let active: BTreeSet<_> = properties.into_iter().collect();
        Self {
            cycle,
            is_running: !active.is_empty(),
            active,
            completed: BTreeSet::new(),
        }
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn mark_complete(&mut self, property: AnimatableProperty) -> CompletionOutcome {
        if !self.active.contains(&property) || !self.completed.insert(property) {
            return CompletionOutcome::Ignored;
        }
        if self.completed.len() == self.active.len() {
            self.is_running = false;
            CompletionOutcome::CycleComplete
        } else {
            CompletionOutcome::Progress
        }
    }

    pub fn is_complete(&self, property: AnimatableProperty) -> bool {
        self.completed.contains(&property)
    }

    /// Part of this cycle and not yet complete.
    pub fn is_pending(&self, property: AnimatableProperty) -> bool {
        self.active.contains(&property) && !self.completed.contains(&property)
    }

    pub fn pending(&self) -> impl Iterator<Item = AnimatableProperty> + '_ {
        self.active.difference(&self.completed).copied()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn total_count(&self) -> usize {
        self.active.len()
    }

    pub fn snapshot(&self) -> AnimationSnapshot {
        let total = self.total_count();
        let completed = self.completed_count();
        AnimationSnapshot {
            is_running: self.is_running,
            completed_count: completed,
            total_count: total,
            progress: if total > 0 {
                completed as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

/// Read-only view of an animator's progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSnapshot {
    pub is_running: bool,
    pub completed_count: usize,
    pub total_count: usize,
    pub progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnimatableProperty::{Opacity, Rotate, TranslateY};

    #[test]
    fn test_idle_snapshot() {
        let snapshot = OrchestrationState::idle(CycleId::new()).snapshot();
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.total_count, 0);
        assert_eq!(snapshot.progress, 0.0);
    }

    #[test]
    fn test_completion_progress() {
        let mut state = OrchestrationState::begin(CycleId::new(), [Opacity, TranslateY]);
        assert!(state.is_running());

        assert_eq!(state.mark_complete(Opacity), CompletionOutcome::Progress);
        assert_eq!(state.snapshot().progress, 0.5);
        assert_eq!(state.mark_complete(Opacity), CompletionOutcome::Ignored);
        assert_eq!(state.mark_complete(Rotate), CompletionOutcome::Ignored);

        assert_eq!(state.mark_complete(TranslateY), CompletionOutcome::CycleComplete);
        assert!(!state.is_running());
        assert_eq!(state.snapshot().progress, 1.0);
        assert_eq!(state.mark_complete(TranslateY), CompletionOutcome::Ignored);
    }

    #[test]
    fn test_snapshot_json() {
        let mut state = OrchestrationState::begin(CycleId::new(), [Opacity]);
        state.mark_complete(Opacity);
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isRunning": false,
                "completedCount": 1,
                "totalCount": 1,
                "progress": 1.0
            })
        );
    }
}
