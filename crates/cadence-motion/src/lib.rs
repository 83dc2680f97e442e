//! Declarative property animation orchestration.
//!
//! This crate provides:
//! - **Specs**: per-property animation configs keyed to a trigger value
//! - **Presets**: sixteen named specs plus TOML-registered extras
//! - **Animator**: dispatches every property on trigger change and tracks
//!   completion across them
//! - **Engines**: the [`MotionEngine`] capability, a recording engine and a
//!   frame-stepped reference engine
//!
//! # Architecture
//!
//! ```text
//! Animator
//!   ├── LiveCells (one shared f64 per property)
//!   ├── dispatch: plan (target, direction, duration) → compose (Transition)
//!   ├── CompletionTimers (host-driven clock)
//!   ├── Mailbox (lifecycle messages from any thread)
//!   └── OrchestrationState (running/completed per cycle)
//!
//! MotionEngine
//!   ├── RecordingEngine
//!   └── Tweener
//! ```
//!
//! # Usage
//!
//! ```
//! use cadence_motion::{Animator, PresetOptions, Tweener};
//!
//! let mut animator = Animator::from_preset("fadeIn", PresetOptions::new(false), Tweener::new())?;
//! animator.set_trigger(true)?;
//! for _ in 0..30 {
//!     animator.engine_mut().advance(16.0);
//!     animator.tick(16.0);
//! }
//! assert!(!animator.is_animating());
//! # Ok::<(), cadence_motion::MotionError>(())
//! ```

pub mod animator;
pub mod cell;
pub mod dispatch;
pub mod duration;
pub mod easing;
pub mod engine;
pub mod error;
pub mod events;
pub mod facade;
pub mod merge;
pub mod presets;
pub mod scheduler;
pub mod spec;
pub mod state;
pub mod style;
pub mod transition;
pub mod tween;
pub mod types;

pub use animator::{AnimationOptions, Animator, CompletionMode};
pub use cell::{LiveCell, LiveCells};
pub use dispatch::{Completion, DispatchPlan};
pub use duration::{DEFAULT_DURATION_MS, total_duration_ms};
pub use easing::EasingFunction;
pub use engine::{EngineCall, MotionEngine, RecordingEngine, SettleHandle};
pub use error::{MotionError, MotionResult};
pub use events::{LifecycleEvent, Mailbox, MailboxSender};
pub use facade::{PresetOptions, animate_by_preset};
pub use merge::merge_overrides;
pub use presets::{Preset, PresetCatalog};
pub use scheduler::CompletionTimers;
pub use spec::{
    AnimationConfig, AnimationKind, AnimationSpec, Frame, Keyframe, MotionParams, Repeat, SpringConfig, Target,
    TimingConfig, Trigger,
};
pub use state::{AnimationSnapshot, OrchestrationState};
pub use style::{AnimatedStyle, TransformEntry};
pub use transition::Transition;
pub use tween::Tweener;
pub use types::{AnimatableProperty, CycleId};

static_assertions::assert_impl_all!(LiveCell: Send, Sync, Clone);
static_assertions::assert_impl_all!(SettleHandle: Send);
static_assertions::assert_impl_all!(Tweener: Send);
