//! Reference frame-stepped engine.
//!
//! `Tweener` interprets [`Transition`] trees against live cells. The host calls
//! [`Tweener::advance`] once per frame with the elapsed milliseconds, either on
//! the animator's thread or on a render thread through `Arc<Mutex<Tweener>>`.
//!
//! ```text
//! Tweener
//!   └── Running (one per cell)
//!         └── Node tree: Timing | Spring | Sequence | Delay | Repeat
//! ```

use tracing::trace;

use super::cell::LiveCell;
use super::easing::EasingFunction;
use super::engine::{MotionEngine, SettleHandle};
use super::spec::ResolvedSpring;
use super::transition::Transition;

/// Physics step used for spring integration.
const SPRING_STEP_MS: f64 = 1.0;

/// Springs that have not settled after this long are snapped to their target.
const SPRING_MAX_MS: f64 = 10_000.0;

#[derive(Debug)]
enum Node {
    Timing {
        from: Option<f64>,
        target: f64,
        duration_ms: f64,
        easing: EasingFunction,
        elapsed_ms: f64,
    },
    Spring {
        state: Option<(f64, f64)>,
        origin: f64,
        target: f64,
        spring: ResolvedSpring,
        elapsed_ms: f64,
    },
    Sequence {
        steps: Vec<Transition>,
        index: usize,
        current: Option<Box<Node>>,
    },
    Delay {
        remaining_ms: f64,
        inner: Box<Node>,
    },
    Repeat {
        source: Transition,
        count: i32,
        reverse: bool,
        iteration: i32,
        origin: Option<f64>,
        current: Box<Node>,
    },
}

impl Node {
    fn build(transition: &Transition) -> Node {
        match transition {
            Transition::Timing {
                target,
                duration_ms,
                easing,
            } => Node::Timing {
                from: None,
                target: *target,
                duration_ms: *duration_ms,
                easing: *easing,
                elapsed_ms: 0.0,
            },
            Transition::Spring { target, config } => Node::Spring {
                state: None,
                origin: 0.0,
                target: *target,
                spring: config.resolved(),
                elapsed_ms: 0.0,
            },
            Transition::Sequence(steps) => Node::Sequence {
                steps: steps.clone(),
                index: 0,
                current: None,
            },
            Transition::Delay { delay_ms, inner } => Node::Delay {
                remaining_ms: *delay_ms,
                inner: Box::new(Node::build(inner)),
            },
            Transition::Repeat {
                inner,
                count,
                reverse,
            } => Node::Repeat {
                source: (**inner).clone(),
                count: *count,
                reverse: *reverse,
                iteration: 0,
                origin: None,
                current: Box::new(Node::build(inner)),
            },
        }
    }

    /// Step by `dt` milliseconds. Returns the unused time once the node has
    /// finished, `None` while it is still running.
    fn advance(&mut self, cell: &LiveCell, dt: f64) -> Option<f64> {
        match self {
            Node::Timing {
                from,
                target,
                duration_ms,
                easing,
                elapsed_ms,
            } => {
                let start = *from.get_or_insert_with(|| cell.get());
                *elapsed_ms += dt;
                if *duration_ms <= 0.0 || *elapsed_ms >= *duration_ms {
                    cell.set(*target);
                    return Some((*elapsed_ms - duration_ms.max(0.0)).max(0.0));
                }
                let progress = easing.evaluate(*elapsed_ms / *duration_ms);
                cell.set(start + (*target - start) * progress);
                None
            }
            Node::Spring {
                state,
                origin,
                target,
                spring,
                elapsed_ms,
            } => {
                let (mut position, mut velocity) = match state {
                    Some(s) => *s,
                    None => {
                        *origin = cell.get();
                        (*origin, 0.0)
                    }
                };
                let mut remaining = dt;
                while remaining > 0.0 {
                    let step = remaining.min(SPRING_STEP_MS);
                    remaining -= step;
                    *elapsed_ms += step;

                    let h = step / 1000.0;
                    let displacement = position - *target;
                    let accel = (-spring.stiffness * displacement - spring.damping * velocity) / spring.mass;
                    velocity += accel * h;
                    position += velocity * h;

                    let crossed = (position - *target).signum() != (*origin - *target).signum();
                    let at_rest = velocity.abs() < spring.rest_speed_threshold
                        && (position - *target).abs() < spring.rest_displacement_threshold;
                    if at_rest || (spring.overshoot_clamping && crossed) || *elapsed_ms >= SPRING_MAX_MS {
                        cell.set(*target);
                        return Some(remaining);
                    }
                }
                *state = Some((position, velocity));
                cell.set(position);
                None
            }
            Node::Sequence {
                steps,
                index,
                current,
            } => {
                let mut dt = dt;
                loop {
                    let Some(step) = steps.get(*index) else {
                        return Some(dt);
                    };
                    let node = current.get_or_insert_with(|| Box::new(Node::build(step)));
                    let left = node.advance(cell, dt)?;
                    *index += 1;
                    *current = None;
                    dt = left;
                }
            }
            Node::Delay {
                remaining_ms,
                inner,
            } => {
                if *remaining_ms > dt {
                    *remaining_ms -= dt;
                    return None;
                }
                let left = dt - remaining_ms.max(0.0);
                *remaining_ms = 0.0;
                inner.advance(cell, left)
            }
            Node::Repeat {
                source,
                count,
                reverse,
                iteration,
                origin,
                current,
            } => {
                if *count == 0 {
                    return Some(dt);
                }
                let start = *origin.get_or_insert_with(|| cell.get());
                let mut dt = dt;
                loop {
                    let budget = dt;
                    let left = current.advance(cell, dt)?;
                    *iteration += 1;
                    if *count > 0 && *iteration >= *count {
                        return Some(left);
                    }
                    let next = if *reverse && *iteration % 2 == 1 {
                        source.reversed(start)
                    } else {
                        if !*reverse {
                            cell.set(start);
                        }
                        source.clone()
                    };
                    **current = Node::build(&next);
                    // A pass that consumed no time would spin forever.
                    if left >= budget {
                        return None;
                    }
                    dt = left;
                }
            }
        }
    }
}

#[derive(Debug)]
struct Running {
    cell: LiveCell,
    node: Node,
    settle: SettleHandle,
}

/// Frame-stepped interpreter of transition trees.
#[derive(Debug, Default)]
pub struct Tweener {
    running: Vec<Running>,
}

impl Tweener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step every running transition by `delta_ms`.
    ///
    /// Finished transitions write their final value, notify their settle
    /// handle and are dropped. Returns whether anything is still running.
    pub fn advance(&mut self, delta_ms: f64) -> bool {
        let delta_ms = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        let mut index = 0;
        while index < self.running.len() {
            let entry = &mut self.running[index];
            if entry.node.advance(&entry.cell, delta_ms).is_some() {
                let done = self.running.swap_remove(index);
                trace!(property = %done.cell.property(), "transition settled");
                done.settle.notify();
            } else {
                index += 1;
            }
        }
        !self.running.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.running.len()
    }
}

impl MotionEngine for Tweener {
    fn start(&mut self, cell: &LiveCell, transition: Transition, settle: SettleHandle) {
        self.cancel(cell);
        self.running.push(Running {
            cell: cell.clone(),
            node: Node::build(&transition),
            settle,
        });
    }

    fn cancel(&mut self, cell: &LiveCell) {
        self.running.retain(|entry| !entry.cell.same_cell(cell));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LifecycleEvent, Mailbox};
    use crate::spec::{SpringConfig, TimingConfig};
    use crate::types::{AnimatableProperty, CycleId};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn detached(cell: &LiveCell) -> SettleHandle {
        SettleHandle::detached(CycleId::new(), cell.property())
    }

    fn linear(target: f64, duration: f64) -> Transition {
        Transition::Timing {
            target,
            duration_ms: duration,
            easing: EasingFunction::Linear,
        }
    }

    #[test]
    fn test_timing_interpolates() {
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::Opacity, 0.0);
        tweener.start(&cell, linear(1.0, 100.0), detached(&cell));

        assert!(tweener.advance(25.0));
        assert!(approx_eq(cell.get(), 0.25));
        assert!(tweener.advance(50.0));
        assert!(approx_eq(cell.get(), 0.75));
        assert!(!tweener.advance(25.0));
        assert_eq!(cell.get(), 1.0);
        assert!(tweener.is_idle());
    }

    #[test]
    fn test_settle_notifies_mailbox() {
        let mailbox = Mailbox::new();
        let cycle = CycleId::new();
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::Scale, 1.0);
        let transition = tweener.timing(2.0, TimingConfig {
            duration: Some(50.0),
            easing: None,
        });
        tweener.start(
            &cell,
            transition,
            SettleHandle::new(cycle, AnimatableProperty::Scale, mailbox.sender()),
        );
        tweener.advance(30.0);
        assert!(mailbox.drain().is_empty());
        tweener.advance(30.0);
        assert_eq!(
            mailbox.drain(),
            vec![LifecycleEvent::Finished {
                cycle,
                property: AnimatableProperty::Scale
            }]
        );
    }

    #[test]
    fn test_sequence_carries_leftover_time() {
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::TranslateX, 0.0);
        let sequence = Transition::Sequence(vec![linear(-8.0, 50.0), linear(8.0, 50.0), linear(0.0, 50.0)]);
        tweener.start(&cell, sequence, detached(&cell));

        tweener.advance(75.0);
        assert!(approx_eq(cell.get(), 0.0));
        tweener.advance(25.0);
        assert!(approx_eq(cell.get(), 8.0));
        assert!(!tweener.advance(50.0));
        assert_eq!(cell.get(), 0.0);
    }

    #[test]
    fn test_delay_holds_value() {
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::Opacity, 0.0);
        let delayed = Transition::Delay {
            delay_ms: 100.0,
            inner: Box::new(linear(1.0, 100.0)),
        };
        tweener.start(&cell, delayed, detached(&cell));
        tweener.advance(100.0);
        assert_eq!(cell.get(), 0.0);
        tweener.advance(50.0);
        assert!(approx_eq(cell.get(), 0.5));
    }

    #[test]
    fn test_reverse_repeat_returns_to_origin() {
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::Scale, 1.0);
        let repeat = Transition::Repeat {
            inner: Box::new(linear(2.0, 100.0)),
            count: 2,
            reverse: true,
        };
        tweener.start(&cell, repeat, detached(&cell));
        tweener.advance(100.0);
        assert!(approx_eq(cell.get(), 2.0));
        tweener.advance(50.0);
        assert!(approx_eq(cell.get(), 1.5));
        assert!(!tweener.advance(50.0));
        assert_eq!(cell.get(), 1.0);
    }

    #[test]
    fn test_infinite_repeat_keeps_running() {
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::Scale, 1.0);
        let pulse = Transition::Repeat {
            inner: Box::new(Transition::Sequence(vec![linear(1.05, 400.0), linear(1.0, 400.0)])),
            count: -1,
            reverse: false,
        };
        tweener.start(&cell, pulse, detached(&cell));
        for _ in 0..100 {
            assert!(tweener.advance(16.0));
        }
        assert!(cell.get() >= 1.0 && cell.get() <= 1.05);
    }

    #[test]
    fn test_zero_duration_infinite_repeat_does_not_spin() {
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::Opacity, 0.0);
        let degenerate = Transition::Repeat {
            inner: Box::new(linear(1.0, 0.0)),
            count: -1,
            reverse: true,
        };
        tweener.start(&cell, degenerate, detached(&cell));
        assert!(tweener.advance(16.0));
    }

    #[test]
    fn test_spring_settles_on_target() {
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::Scale, 0.5);
        let spring = tweener.spring(1.0, SpringConfig::new(12.0, 200.0));
        tweener.start(&cell, spring, detached(&cell));

        let mut frames = 0;
        while tweener.advance(16.0) {
            frames += 1;
            assert!(frames < 1000, "spring never settled");
        }
        assert_eq!(cell.get(), 1.0);
        assert!(frames > 10);
    }

    #[test]
    fn test_spring_overshoot_clamping() {
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::TranslateY, 50.0);
        let config = SpringConfig {
            overshoot_clamping: Some(true),
            damping: Some(2.0),
            ..SpringConfig::default()
        };
        tweener.start(&cell, Transition::Spring { target: 0.0, config }, detached(&cell));
        while tweener.advance(16.0) {
            assert!(cell.get() >= 0.0);
        }
        assert_eq!(cell.get(), 0.0);
    }

    #[test]
    fn test_start_replaces_and_cancel_halts() {
        let mut tweener = Tweener::new();
        let cell = LiveCell::new(AnimatableProperty::Opacity, 0.0);
        tweener.start(&cell, linear(1.0, 100.0), detached(&cell));
        tweener.start(&cell, linear(0.5, 100.0), detached(&cell));
        assert_eq!(tweener.active_count(), 1);

        tweener.advance(50.0);
        let halted = cell.get();
        tweener.cancel(&cell);
        assert!(!tweener.advance(50.0));
        assert_eq!(cell.get(), halted);
    }
}
