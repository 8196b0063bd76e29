use folio_core::projection::project_point;
use folio_core::*;
use glam::{Vec2, Vec3};

const SIZE: Vec2 = Vec2::new(800.0, 600.0);

fn layout() -> SurfaceLayout {
    SurfaceLayout::new(SIZE)
}

fn run(rt: &mut SceneRuntime, inputs: &HostInputs, from_ms: f64, to_ms: f64, step_ms: f64) -> Vec<SceneEvent> {
    let mut events = Vec::new();
    let mut t = from_ms;
    while t <= to_ms {
        rt.frame(t, inputs, &layout(), &mut events);
        t += step_ms;
    }
    events
}

fn count(events: &[SceneEvent], e: &SceneEvent) -> usize {
    events.iter().filter(|x| *x == e).count()
}

#[test]
fn scene_kind_names() {
    for kind in [SceneKind::Dial, SceneKind::Capture, SceneKind::Showcase, SceneKind::Stage] {
        assert_eq!(SceneKind::parse(kind.as_str()), Some(kind));
    }
    assert_eq!(SceneKind::parse("orbit"), None);
}

#[test]
fn dial_assembles_then_answers_on_click() {
    let mut rt = SceneRuntime::new(SceneKind::Dial).expect("runtime");
    let inputs = HostInputs::default();
    assert_eq!(rt.phase_name(), "assembling");

    let events = run(&mut rt, &inputs, 0.0, 4000.0, 100.0);
    assert_eq!(count(&events, &SceneEvent::Assembled), 1);
    assert!(events.contains(&SceneEvent::PhaseChanged("ringing")));
    assert_eq!(rt.phase_name(), "ringing");

    let handset = rt.graph().find("handset").expect("handset");
    let p = project_point(rt.camera(), rt.graph().world_position(handset), &layout());
    assert!(p.visible);
    rt.push_pointer(PointerInput::Down {
        px: Vec2::new(p.x, p.y),
        button: 0,
    });
    let mut events = Vec::new();
    rt.frame(4100.0, &inputs, &layout(), &mut events);
    assert!(events.contains(&SceneEvent::Answered));
    assert!(events.contains(&SceneEvent::PhaseChanged("connected")));
    assert_eq!(rt.phase_name(), "connected");
}

#[test]
fn dial_ignores_clicks_elsewhere() {
    let mut rt = SceneRuntime::new(SceneKind::Dial).expect("runtime");
    let inputs = HostInputs::default();
    run(&mut rt, &inputs, 0.0, 4000.0, 100.0);
    rt.push_pointer(PointerInput::Down {
        px: Vec2::new(5.0, 5.0),
        button: 0,
    });
    let mut events = Vec::new();
    rt.frame(4100.0, &inputs, &layout(), &mut events);
    assert!(!events.contains(&SceneEvent::Answered));
    assert_eq!(rt.phase_name(), "ringing");
}

#[test]
fn dial_phase_override_is_reported() {
    let mut rt = SceneRuntime::new(SceneKind::Dial).expect("runtime");
    let mut inputs = HostInputs::default();
    inputs.set_phase("connected");
    let events = run(&mut rt, &inputs, 0.0, 100.0, 50.0);
    assert_eq!(count(&events, &SceneEvent::PhaseChanged("connected")), 1);
    assert!(!events.contains(&SceneEvent::Assembled));
    assert_eq!(rt.phase_name(), "connected");

    // Same phase again is not reported
    inputs.set_phase("connected");
    let events = run(&mut rt, &inputs, 150.0, 200.0, 50.0);
    assert_eq!(count(&events, &SceneEvent::PhaseChanged("connected")), 0);
    assert_eq!(rt.phase_name(), "connected");
}

#[test]
fn capture_full_cycle() {
    let mut rt = SceneRuntime::new(SceneKind::Capture).expect("runtime");
    let mut inputs = HostInputs::default();
    inputs.set_timeline(6.0);
    let events = run(&mut rt, &inputs, 0.0, 100.0, 50.0);
    assert_eq!(count(&events, &SceneEvent::Ready), 1);
    assert_eq!(rt.phase_name(), "ready");
    assert!(events
        .iter()
        .any(|e| matches!(e, SceneEvent::ScreenRect(Some(r)) if r.is_valid())));
    assert!(events
        .iter()
        .any(|e| matches!(e, SceneEvent::LensProjected(Some(a)) if a.is_valid())));

    inputs.set_capture_nonce(1);
    let events = run(&mut rt, &inputs, 200.0, 2200.0, 50.0);
    assert_eq!(count(&events, &SceneEvent::CaptureStart), 1);
    assert_eq!(count(&events, &SceneEvent::EjectDone), 1);
    assert_eq!(rt.phase_name(), "connected");

    inputs.set_retract_nonce(1);
    let events = run(&mut rt, &inputs, 2250.0, 3200.0, 50.0);
    assert_eq!(count(&events, &SceneEvent::RetractDone), 1);
    assert_eq!(rt.phase_name(), "ready");
    assert_eq!(count(&events, &SceneEvent::Ready), 0);
}

#[test]
fn capture_ready_override_accepts_capture_nonce() {
    let mut rt = SceneRuntime::new(SceneKind::Capture).expect("runtime");
    let mut inputs = HostInputs::default();
    inputs.set_phase("ready");
    let mut events = run(&mut rt, &inputs, 0.0, 50.0, 50.0);
    assert_eq!(rt.phase_name(), "ready");

    inputs.set_capture_nonce(1);
    events.extend(run(&mut rt, &inputs, 100.0, 100.0, 16.0));
    assert_eq!(rt.phase_name(), "capturing");
    assert_eq!(count(&events, &SceneEvent::CaptureStart), 1);
    assert_eq!(count(&events, &SceneEvent::PhaseChanged("ready")), 1);
    assert_eq!(count(&events, &SceneEvent::PhaseChanged("lens_intro")), 0);
}

#[test]
fn capture_click_starts_sequence_when_ready() {
    let mut rt = SceneRuntime::new(SceneKind::Capture).expect("runtime");
    let mut inputs = HostInputs::default();
    inputs.set_timeline(6.0);
    run(&mut rt, &inputs, 0.0, 50.0, 50.0);

    let center = project_point(rt.camera(), Vec3::ZERO, &layout());
    rt.push_pointer(PointerInput::Move(Vec2::new(center.x, center.y)));
    rt.push_pointer(PointerInput::Down {
        px: Vec2::new(center.x, center.y),
        button: 0,
    });
    let mut events = Vec::new();
    rt.frame(100.0, &inputs, &layout(), &mut events);
    assert!(events.contains(&SceneEvent::HoverChanged(true)));
    assert!(events.contains(&SceneEvent::CaptureStart));
    assert_eq!(rt.cursor().as_css(), "pointer");

    inputs.set_interactive(false);
    let mut events = Vec::new();
    rt.frame(150.0, &inputs, &layout(), &mut events);
    assert!(events.contains(&SceneEvent::HoverChanged(false)));
}

#[test]
fn hover_follows_camera_under_resting_pointer() {
    use folio_core::picking::ray_sphere;

    let mut rt = SceneRuntime::new(SceneKind::Capture).expect("runtime");
    let mut inputs = HostInputs::default();
    inputs.set_timeline(6.0);
    run(&mut rt, &inputs, 0.0, 50.0, 50.0);

    // Off to the side of the wide shot; the camera proxy is a 1.7 sphere at the origin
    let px = Vec2::new(100.0, 75.0);
    let ray = rt.camera().screen_ray(px, SIZE);
    assert!(ray_sphere(ray.origin, ray.dir, Vec3::ZERO, 1.7).is_none());
    rt.push_pointer(PointerInput::Move(px));
    let events = run(&mut rt, &inputs, 100.0, 100.0, 16.0);
    assert!(!events.contains(&SceneEvent::HoverChanged(true)));

    // Timeline back to the lens close-up, pointer untouched
    inputs.set_timeline(0.0);
    let events = run(&mut rt, &inputs, 150.0, 200.0, 50.0);
    let ray = rt.camera().screen_ray(px, SIZE);
    assert!(ray_sphere(ray.origin, ray.dir, Vec3::ZERO, 1.7).is_some());
    assert_eq!(count(&events, &SceneEvent::HoverChanged(true)), 1);
    assert_eq!(rt.cursor().as_css(), "pointer");
}

#[test]
fn capture_asset_failure_degrades_once() {
    let mut rt = SceneRuntime::new(SceneKind::Capture).expect("runtime");
    let mut inputs = HostInputs::default();
    inputs.set_timeline(3.0);
    run(&mut rt, &inputs, 0.0, 50.0, 50.0);

    let mut events = Vec::new();
    rt.asset_load_started("/models/camera.glb", &mut events);
    rt.asset_loaded(Err(AssetError::Fetch("404".into())), &mut events);
    rt.asset_loaded(Err(AssetError::NoBounds), &mut events);
    let errors = events
        .iter()
        .filter(|e| matches!(e, SceneEvent::StatusChanged { kind: StatusKind::Error, .. }))
        .count();
    assert_eq!(errors, 1);
    assert!(matches!(
        events[0],
        SceneEvent::StatusChanged {
            kind: StatusKind::Loading,
            ..
        }
    ));
    assert_eq!(count(&events, &SceneEvent::ScreenRect(None)), 1);
    assert_eq!(count(&events, &SceneEvent::LensProjected(None)), 1);
    assert!(rt.is_degraded());

    let events = run(&mut rt, &inputs, 100.0, 300.0, 50.0);
    assert!(!events
        .iter()
        .any(|e| matches!(e, SceneEvent::ScreenRect(_) | SceneEvent::LensProjected(_))));
    let expected = Camera {
        aspect: SIZE.x / SIZE.y,
        ..Camera::default()
    };
    assert_eq!(rt.camera(), &expected);
}

#[test]
fn showcase_model_load_reports_ready_and_rect() {
    let mut rt = SceneRuntime::new(SceneKind::Showcase).expect("runtime");
    let mut inputs = HostInputs::default();
    let mut events = Vec::new();
    rt.asset_loaded(
        Ok(Aabb::new(Vec3::new(-0.4, -0.8, -0.05), Vec3::new(0.4, 0.8, 0.05))),
        &mut events,
    );
    assert!(events.contains(&SceneEvent::StatusChanged {
        kind: StatusKind::Ready,
        message: String::new(),
    }));

    inputs.set_timeline(1.0);
    let events = run(&mut rt, &inputs, 0.0, 100.0, 50.0);
    assert_eq!(count(&events, &SceneEvent::Ready), 1);
    assert_eq!(rt.phase_name(), "framed");
    let rect = events
        .iter()
        .find_map(|e| match e {
            SceneEvent::ScreenRect(Some(r)) => Some(*r),
            _ => None,
        })
        .expect("screen rect");
    assert!(rect.is_valid());
    assert!(rect.height > rect.width);
    assert!(rect.left > 0.0 && rect.right() < SIZE.x);
}

#[test]
fn screen_rect_is_only_sent_on_change() {
    let mut rt = SceneRuntime::new(SceneKind::Showcase).expect("runtime");
    let mut inputs = HostInputs::default();
    inputs.set_timeline(1.0);
    run(&mut rt, &inputs, 0.0, 50.0, 50.0);
    let events = run(&mut rt, &inputs, 100.0, 300.0, 50.0);
    assert!(!events.iter().any(|e| matches!(e, SceneEvent::ScreenRect(_))));
}

#[test]
fn stage_emits_layer_styles() {
    let mut rt = SceneRuntime::new(SceneKind::Stage).expect("runtime");
    assert_eq!(rt.point_field().map(|f| f.points.len()), Some(1220));
    assert_eq!(rt.point_field().map(|f| f.edges.len()), Some(814));
    assert_eq!((rt.backdrop().width(), rt.backdrop().height()), (512, 1024));

    let mut inputs = HostInputs::default();
    let events = run(&mut rt, &inputs, 0.0, 0.0, 16.0);
    assert!(events.iter().any(|e| matches!(e, SceneEvent::Layer(_))));

    inputs.set_phase("compress");
    inputs.set_collapse_target(Some(Vec2::new(600.0, 100.0)));
    let events = run(&mut rt, &inputs, 1000.0, 2000.0, 100.0);
    assert_eq!(count(&events, &SceneEvent::PhaseChanged("compress")), 1);
    let last = events
        .iter()
        .rev()
        .find_map(|e| match e {
            SceneEvent::Layer(s) => Some(*s),
            _ => None,
        })
        .expect("layer");
    assert!((last.scale - 0.55).abs() < 1e-4);
    assert!((last.translate - Vec2::new(100.0, -100.0)).length() < 1e-2);
}

#[test]
fn bad_host_input_is_tolerated() {
    let mut rt = SceneRuntime::new(SceneKind::Showcase).expect("runtime");
    let mut inputs = HostInputs::default();
    inputs.set_phase("sideways");
    inputs.set_timeline(f32::NAN);
    assert_eq!(*inputs.timeline.get(), 0.0);

    let mut events = Vec::new();
    rt.frame(f64::NAN, &inputs, &layout(), &mut events);
    rt.frame(16.0, &inputs, &SurfaceLayout::new(Vec2::ZERO), &mut events);
    assert!(!events.iter().any(|e| matches!(e, SceneEvent::PhaseChanged(_))));
    assert_eq!(rt.phase_name(), "intro");

    inputs.set_collapse_target(Some(Vec2::new(f32::NAN, 1.0)));
    assert_eq!(*inputs.collapse_target.get(), None);
}
