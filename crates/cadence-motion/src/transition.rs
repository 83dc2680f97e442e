//! Composed transition descriptions.
//!
//! A [`Transition`] is the value handed to an engine for one live cell. It is
//! plain data: the dispatcher builds it through the
//! [`MotionEngine`](crate::engine::MotionEngine) builder methods and the engine
//! decides how to play it.

use super::easing::EasingFunction;
use super::spec::SpringConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Eased interpolation to `target` over `duration_ms`.
    Timing {
        target: f64,
        duration_ms: f64,
        easing: EasingFunction,
    },
    /// Spring physics toward `target`.
    Spring { target: f64, config: SpringConfig },
    /// Steps played back to back.
    Sequence(Vec<Transition>),
    /// Wait `delay_ms`, then play `inner`.
    Delay {
        delay_ms: f64,
        inner: Box<Transition>,
    },
    /// Play `inner` `count` times (`-1` forever), alternating direction when
    /// `reverse` is set.
    Repeat {
        inner: Box<Transition>,
        count: i32,
        reverse: bool,
    },
}

impl Transition {
    /// Value the cell rests at once the transition finishes, when it starts
    /// at `start`.
    pub fn end_value(&self, start: f64) -> f64 {
        match self {
            Self::Timing { target, .. } | Self::Spring { target, .. } => *target,
            Self::Sequence(steps) => steps.iter().fold(start, |value, step| step.end_value(value)),
            Self::Delay { inner, .. } => inner.end_value(start),
            Self::Repeat {
                inner,
                count,
                reverse,
            } => {
                if *reverse && *count > 0 && count % 2 == 0 {
                    start
                } else {
                    inner.end_value(start)
                }
            }
        }
    }

    /// The mirrored pass played on alternate repeat iterations: it walks the
    /// same waypoints backwards and comes to rest at `start`.
    pub fn reversed(&self, start: f64) -> Transition {
        match self {
            Self::Timing {
                duration_ms,
                easing,
                ..
            } => Self::Timing {
                target: start,
                duration_ms: *duration_ms,
                easing: *easing,
            },
            Self::Spring { config, .. } => Self::Spring {
                target: start,
                config: *config,
            },
            Self::Sequence(steps) => {
                let mut origins = Vec::with_capacity(steps.len());
                let mut value = start;
                for step in steps {
                    origins.push(value);
                    value = step.end_value(value);
                }
                Self::Sequence(
                    steps
                        .iter()
                        .zip(origins)
                        .rev()
                        .map(|(step, origin)| step.reversed(origin))
                        .collect(),
                )
            }
            Self::Delay { delay_ms, inner } => Self::Delay {
                delay_ms: *delay_ms,
                inner: Box::new(inner.reversed(start)),
            },
            Self::Repeat { .. } => self.clone(),
        }
    }

    /// Whether the transition never finishes on its own.
    pub fn is_unbounded(&self) -> bool {
        match self {
            Self::Timing { .. } | Self::Spring { .. } => false,
            Self::Sequence(steps) => steps.iter().any(Transition::is_unbounded),
            Self::Delay { inner, .. } => inner.is_unbounded(),
            Self::Repeat { inner, count, .. } => *count < 0 || inner.is_unbounded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(target: f64, duration_ms: f64) -> Transition {
        Transition::Timing {
            target,
            duration_ms,
            easing: EasingFunction::Linear,
        }
    }

    #[test]
    fn test_end_value() {
        assert_eq!(timing(1.0, 100.0).end_value(0.0), 1.0);
        let shake = Transition::Sequence(vec![timing(-8.0, 50.0), timing(8.0, 50.0), timing(0.0, 50.0)]);
        assert_eq!(shake.end_value(3.0), 0.0);
        assert_eq!(Transition::Sequence(vec![]).end_value(3.0), 3.0);
    }

    #[test]
    fn test_even_reverse_repeat_returns_to_start() {
        let repeat = |count| Transition::Repeat {
            inner: Box::new(timing(1.0, 100.0)),
            count,
            reverse: true,
        };
        assert_eq!(repeat(2).end_value(0.0), 0.0);
        assert_eq!(repeat(3).end_value(0.0), 1.0);
    }

    #[test]
    fn test_reversed_sequence_walks_back() {
        let sequence = Transition::Sequence(vec![timing(1.0, 10.0), timing(2.0, 20.0), timing(3.0, 30.0)]);
        let back = sequence.reversed(0.0);
        assert_eq!(
            back,
            Transition::Sequence(vec![timing(2.0, 30.0), timing(1.0, 20.0), timing(0.0, 10.0)])
        );
        assert_eq!(back.end_value(3.0), 0.0);
    }

    #[test]
    fn test_unbounded() {
        let forever = Transition::Repeat {
            inner: Box::new(timing(1.0, 100.0)),
            count: -1,
            reverse: false,
        };
        assert!(forever.is_unbounded());
        assert!(
            Transition::Delay {
                delay_ms: 10.0,
                inner: Box::new(forever)
            }
            .is_unbounded()
        );
        assert!(!timing(1.0, 1.0).is_unbounded());
    }
}
