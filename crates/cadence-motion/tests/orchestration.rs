use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use cadence_motion::{
    AnimatableProperty::{Opacity, Rotate, Scale, TranslateX, TranslateY},
    AnimationConfig, AnimationKind, AnimationOptions, AnimationSpec, Animator, CompletionMode, MotionError,
    PresetCatalog, PresetOptions, RecordingEngine, SpringConfig, TimingConfig, Transition, Tweener, animate_by_preset,
    merge_overrides,
};

type Counter = Rc<RefCell<u32>>;

fn counter() -> Counter {
    Rc::new(RefCell::new(0))
}

fn counting(counter: &Counter) -> impl FnMut() + 'static {
    let counter = Rc::clone(counter);
    move || *counter.borrow_mut() += 1
}

#[test]
fn test_merge_identity_and_base_untouched() {
    let catalog: PresetCatalog<bool> = PresetCatalog::builtin();
    for name in catalog.names() {
        let spec = catalog.get(name).unwrap();
        assert_eq!(&merge_overrides(spec, &AnimationSpec::new()), spec);
    }

    let base = catalog.get("zoomIn").unwrap().clone();
    let overrides = AnimationSpec::new()
        .with(Scale, AnimationConfig::new().with_duration(120.0))
        .with(Rotate, AnimationConfig::new().with_target(15.0));
    let merged = merge_overrides(&base, &overrides);
    assert_eq!(&base, catalog.get("zoomIn").unwrap());
    assert_eq!(merged.get(Scale).unwrap().duration, Some(120.0));
    assert_eq!(merged.get(Scale).unwrap().initial, Some(0.8));
    assert!(merged.get(Rotate).is_some());
    assert!(base.get(Rotate).is_none());
}

#[test]
fn test_derived_target_uses_timing() {
    let spec = AnimationSpec::new().with(
        Opacity,
        AnimationConfig::new()
            .with_initial(0.0)
            .with_derived(|on: &bool| if *on { 1.0 } else { 0.0 }),
    );
    let mut animator = Animator::new(AnimationOptions::new(false, spec), RecordingEngine::new()).unwrap();
    animator.set_trigger(true).unwrap();

    let timing = animator.engine().timing_calls();
    assert_eq!(timing.len(), 1);
    assert_eq!(timing[0].0, 1.0);
    assert!(animator.engine().spring_calls().is_empty());
}

#[test]
fn test_spring_kind_uses_spring_only() {
    let params = SpringConfig::new(8.0, 180.0);
    let spec = AnimationSpec::new().with(
        Scale,
        AnimationConfig::new().with_initial(1.0).with_target(1.5).with_spring(params),
    );
    let mut animator = Animator::new(AnimationOptions::new(false, spec), RecordingEngine::new()).unwrap();
    animator.set_trigger(true).unwrap();

    assert_eq!(animator.engine().spring_calls(), vec![(1.5, params)]);
    assert!(animator.engine().timing_calls().is_empty());
}

#[test]
fn test_on_complete_waits_for_duration() {
    let done = counter();
    let spec = AnimationSpec::new().with(
        Opacity,
        AnimationConfig::new().with_initial(0.0).with_target(1.0).with_duration(500.0),
    );
    let options = AnimationOptions::new(false, spec).on_complete(counting(&done));
    let mut animator = Animator::new(options, RecordingEngine::new()).unwrap();
    animator.set_trigger(true).unwrap();

    animator.tick(499.0);
    assert_eq!(*done.borrow(), 0);
    assert!(animator.is_animating());

    animator.tick(1.0);
    assert_eq!(*done.borrow(), 1);

    animator.tick(10_000.0);
    assert_eq!(*done.borrow(), 1);
    assert!(!animator.is_animating());
}

#[test]
fn test_enter_and_exit_overrides() {
    let spec = AnimationSpec::new().with(
        Opacity,
        AnimationConfig::new()
            .with_initial(0.0)
            .with_target(1.0)
            .with_duration(999.0)
            .with_enter(AnimationConfig::new().with_kind(AnimationKind::Spring))
            .with_exit(AnimationConfig::new().with_duration(500.0)),
    );
    let mut animator = Animator::new(AnimationOptions::new(false, spec), RecordingEngine::new()).unwrap();

    animator.set_trigger(true).unwrap();
    assert_eq!(animator.engine().spring_calls(), vec![(1.0, SpringConfig::default())]);
    assert!(animator.engine().timing_calls().is_empty());

    animator.engine_mut().clear();
    animator.set_trigger(false).unwrap();
    assert_eq!(
        animator.engine().timing_calls(),
        vec![(
            0.0,
            TimingConfig {
                duration: Some(500.0),
                easing: None
            }
        )]
    );
    assert!(animator.engine().spring_calls().is_empty());
}

#[test]
fn test_animate_on_mount_dispatches_immediately() {
    let spec = AnimationSpec::new().with(
        Opacity,
        AnimationConfig::new()
            .with_initial(0.0)
            .with_target(1.0)
            .with_exit(AnimationConfig::new().with_duration(500.0)),
    );
    let animator = Animator::new(
        AnimationOptions::new(false, spec.clone()).animate_on_mount(true),
        RecordingEngine::new(),
    )
    .unwrap();
    assert_eq!(
        animator.engine().timing_calls(),
        vec![(
            0.0,
            TimingConfig {
                duration: Some(500.0),
                easing: None
            }
        )]
    );
    assert!(animator.is_animating());

    let quiet = Animator::new(AnimationOptions::new(false, spec), RecordingEngine::new()).unwrap();
    assert!(quiet.engine().calls().is_empty());
}

#[test]
fn test_superseded_cycle_never_completes() {
    let done = counter();
    let spec = AnimationSpec::new().with(
        Opacity,
        AnimationConfig::new().with_initial(0.0).with_toggle(1.0, 0.0).with_duration(300.0),
    );
    let options = AnimationOptions::new(false, spec).on_complete(counting(&done));
    let mut animator = Animator::new(options, RecordingEngine::new()).unwrap();

    animator.set_trigger(true).unwrap();
    animator.tick(200.0);
    animator.set_trigger(false).unwrap();
    assert_eq!(animator.pending_timers(), 1);

    animator.tick(150.0);
    assert_eq!(*done.borrow(), 0);
    animator.tick(150.0);
    assert_eq!(*done.borrow(), 1);
    animator.tick(1_000.0);
    assert_eq!(*done.borrow(), 1);
}

#[test]
fn test_infinite_repeat_completes_immediately() {
    let done = counter();
    let ends = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&ends);
    let options = AnimationOptions::new(false, PresetCatalog::builtin().get("pulse").unwrap().clone())
        .on_complete(counting(&done))
        .on_animation_end(move |p| seen.borrow_mut().push(p));
    let mut animator = Animator::new(options, Tweener::new()).unwrap();

    animator.set_trigger(true).unwrap();
    assert_eq!(*done.borrow(), 1);
    assert_eq!(*ends.borrow(), vec![Scale]);
    assert!(!animator.is_animating());
    assert_eq!(animator.pending_timers(), 0);
    assert!(animator.engine_mut().advance(16.0));
}

#[test]
fn test_mixed_completion_with_infinite_property() {
    let done = counter();
    let spec = AnimationSpec::new()
        .with(Scale, AnimationConfig::new().with_sequence([1.0, 1.1]).with_repeat(-1, true))
        .with(Opacity, AnimationConfig::new().with_target(0.5).with_duration(100.0));
    let options = AnimationOptions::new(false, spec).on_complete(counting(&done));
    let mut animator = Animator::new(options, RecordingEngine::new()).unwrap();

    animator.set_trigger(true).unwrap();
    let state = animator.state();
    assert_eq!((state.completed_count, state.total_count), (1, 2));
    assert_eq!(state.progress, 0.5);

    animator.tick(100.0);
    assert_eq!(*done.borrow(), 1);
}

#[test]
fn test_invalid_config_leaves_no_partial_state() {
    let spec: AnimationSpec<&'static str> = AnimationSpec::new()
        .with(Opacity, AnimationConfig::new().with_toggle(1.0, 0.0))
        .with(TranslateX, AnimationConfig::new());
    let mut animator = Animator::new(AnimationOptions::new("", spec), RecordingEngine::new()).unwrap();

    let err = animator.set_trigger("left").unwrap_err();
    assert!(matches!(err, MotionError::NonNumericTrigger { property: TranslateX, .. }));
    assert_eq!(*animator.trigger(), "");
    assert!(!animator.is_animating());
    assert!(animator.engine().calls().is_empty());
    assert_eq!(animator.value(Opacity), 1.0);

    assert!(animator.set_trigger("12").unwrap());
    assert_eq!(animator.value(TranslateX), 12.0);
}

#[test]
fn test_empty_spec_stays_idle() {
    let done = counter();
    let options = AnimationOptions::new(false, AnimationSpec::new()).on_complete(counting(&done));
    let mut animator = Animator::new(options, RecordingEngine::new()).unwrap();
    assert!(animator.set_trigger(true).unwrap());
    assert!(!animator.is_animating());
    assert_eq!(animator.state().total_count, 0);
    assert_eq!(*done.borrow(), 0);
}

#[test]
fn test_zero_duration_completes_immediately() {
    let done = counter();
    let spec = AnimationSpec::new().with(Rotate, AnimationConfig::new().with_target(90.0).with_duration(0.0));
    let options = AnimationOptions::new(0_u32, spec).on_complete(counting(&done));
    let mut animator = Animator::new(options, RecordingEngine::new()).unwrap();
    animator.set_trigger(1).unwrap();
    assert_eq!(*done.borrow(), 1);
    assert_eq!(animator.style().transform.len(), 1);
}

#[test]
fn test_settle_mode_waits_for_engine() {
    let done = counter();
    let options = AnimationOptions::new(false, PresetCatalog::builtin().get("bounceIn").unwrap().clone())
        .completion(CompletionMode::Settle)
        .on_complete(counting(&done));
    let mut animator = Animator::new(options, RecordingEngine::new()).unwrap();
    animator.set_trigger(true).unwrap();
    assert_eq!(animator.pending_timers(), 0);

    animator.tick(5_000.0);
    assert_eq!(*done.borrow(), 0);

    assert!(animator.engine_mut().settle(Scale));
    animator.pump();
    assert_eq!(*done.borrow(), 1);
}

#[test]
fn test_settle_from_superseded_cycle_is_dropped() {
    let done = counter();
    let spec = AnimationSpec::new().with(Opacity, AnimationConfig::new().with_toggle(1.0, 0.0));
    let engine = Arc::new(Mutex::new(RecordingEngine::new()));
    let options = AnimationOptions::new(false, spec)
        .completion(CompletionMode::Settle)
        .on_complete(counting(&done));
    let mut animator = Animator::new(options, Arc::clone(&engine)).unwrap();

    animator.set_trigger(true).unwrap();
    // Stale handle notified after the next cycle started.
    engine.lock().unwrap().settle(Opacity);
    animator.set_trigger(false).unwrap();
    assert_eq!(*done.borrow(), 0);

    engine.lock().unwrap().settle_all();
    animator.pump();
    assert_eq!(*done.borrow(), 1);
}

#[test]
fn test_tweener_drives_slide_in() {
    let done = counter();
    let mut animator = animate_by_preset(
        &PresetCatalog::builtin(),
        "slideInUp",
        PresetOptions::new(false).on_complete(counting(&done)),
        Tweener::new(),
    )
    .unwrap();
    assert_eq!(animator.value(TranslateY), 50.0);

    animator.set_trigger(true).unwrap();
    for _ in 0..10 {
        animator.engine_mut().advance(20.0);
        animator.tick(20.0);
    }
    let halfway = animator.value(TranslateY);
    assert!(halfway > 0.0 && halfway < 50.0);
    assert_eq!(*done.borrow(), 0);

    for _ in 0..15 {
        animator.engine_mut().advance(20.0);
        animator.tick(20.0);
    }
    assert_eq!(animator.value(TranslateY), 0.0);
    assert_eq!(animator.value(Opacity), 1.0);
    assert_eq!(*done.borrow(), 1);

    let style = animator.style().to_json();
    assert_eq!(style, serde_json::json!({ "opacity": 1.0, "transform": [{ "translateY": 0.0 }] }));
}

#[test]
fn test_shared_tweener_on_render_thread() {
    let tweener = Arc::new(Mutex::new(Tweener::new()));
    let mut animator =
        Animator::from_preset("zoomOut", PresetOptions::new(false), Arc::clone(&tweener)).unwrap();
    animator.set_trigger(true).unwrap();

    let render = Arc::clone(&tweener);
    std::thread::spawn(move || {
        for _ in 0..40 {
            render.lock().unwrap().advance(16.0);
        }
    })
    .join()
    .unwrap();

    assert_eq!(animator.value(Opacity), 0.0);
    assert_eq!(animator.value(Scale), 0.8);
}

#[test]
fn test_sequence_transition_shape() {
    let mut animator =
        Animator::from_preset("shake", PresetOptions::new(false), RecordingEngine::new()).unwrap();
    animator.set_trigger(true).unwrap();
    let started = animator.engine().started();
    assert_eq!(started.len(), 1);
    match started[0] {
        (TranslateX, Transition::Sequence(steps)) => assert_eq!(steps.len(), 6),
        ref other => panic!("unexpected start: {other:?}"),
    }
}
