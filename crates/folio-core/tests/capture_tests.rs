use folio_core::capture::*;
use folio_core::rigs::{build_capture, CaptureRig};
use folio_core::{Camera, SceneEvent};

struct Fixture {
    rig: CaptureRig,
    ctl: CaptureController,
    camera: Camera,
    events: Vec<SceneEvent>,
}

impl Fixture {
    fn new() -> Self {
        let mut rig = build_capture();
        let ctl = CaptureController::new(
            &mut rig.graph,
            rig.photo,
            rig.slot,
            rig.dock,
            CaptureConfig::default(),
        );
        Self {
            rig,
            ctl,
            camera: Camera::default(),
            events: Vec::new(),
        }
    }

    fn tick(&mut self, now: f64) {
        self.ctl
            .tick(now, &mut self.rig.graph, &mut self.camera, &mut self.events);
    }

    fn ready(mut self) -> Self {
        self.ctl.set_timeline(6.0);
        self.tick(0.0);
        assert_eq!(self.ctl.phase(), CapturePhase::Ready);
        self.events.clear();
        self
    }

    fn capture(&mut self, now: f64) -> bool {
        self.ctl
            .trigger_capture(now, &mut self.rig.graph, &mut self.events)
    }

    fn retract(&mut self, now: f64) -> bool {
        self.ctl
            .trigger_retract(now, &mut self.rig.graph, &mut self.events)
    }

    fn count(&self, e: &SceneEvent) -> usize {
        self.events.iter().filter(|x| *x == e).count()
    }

    fn photo(&self) -> folio_core::Pose {
        self.rig.graph.local(self.rig.photo)
    }
}

#[test]
fn timeline_walks_intro_phases_and_fires_ready_once() {
    let mut f = Fixture::new();
    f.tick(0.0);
    assert_eq!(f.ctl.phase(), CapturePhase::LensIntro);
    f.ctl.set_timeline(3.0);
    f.tick(16.0);
    assert_eq!(f.ctl.phase(), CapturePhase::LensCloseup);
    f.ctl.set_timeline(5.0);
    f.tick(32.0);
    assert_eq!(f.ctl.phase(), CapturePhase::DollyOut);
    assert_eq!(f.count(&SceneEvent::Ready), 0);
    f.ctl.set_timeline(6.0);
    f.tick(48.0);
    assert_eq!(f.ctl.phase(), CapturePhase::Ready);
    assert_eq!(f.count(&SceneEvent::Ready), 1);

    // Scrolling back and forth does not fire it again
    f.ctl.set_timeline(5.5);
    f.tick(64.0);
    assert_eq!(f.ctl.phase(), CapturePhase::DollyOut);
    f.ctl.set_timeline(8.0);
    f.tick(80.0);
    assert_eq!(f.count(&SceneEvent::Ready), 1);
}

#[test]
fn timeline_drives_camera_keys() {
    let mut f = Fixture::new();
    let cfg = CaptureConfig::default();
    f.tick(0.0);
    assert!((f.camera.eye - cfg.lens_key.eye).length() < 1e-5);
    f.ctl.set_timeline(6.0);
    f.tick(16.0);
    assert!((f.camera.eye - cfg.wide_key.eye).length() < 1e-5);
    assert!((f.camera.fovy_radians - cfg.wide_key.fovy_radians).abs() < 1e-5);

    // NaN timeline is ignored
    f.ctl.set_timeline(f32::NAN);
    assert_eq!(f.ctl.timeline(), 6.0);
}

#[test]
fn capture_before_ready_is_ignored() {
    let mut f = Fixture::new();
    assert!(!f.capture(0.0));
    assert_eq!(f.count(&SceneEvent::CaptureStart), 0);
    assert_eq!(f.ctl.phase(), CapturePhase::LensIntro);
}

#[test]
fn eject_holds_during_delay_and_lands_exactly_on_dock() {
    let mut f = Fixture::new().ready();
    let cfg = *f.ctl.config();
    let (d, t) = (cfg.eject_delay_ms as f64, cfg.eject_duration_ms as f64);
    let t0 = 1000.0;

    assert!(f.capture(t0));
    assert_eq!(f.count(&SceneEvent::CaptureStart), 1);

    f.tick(t0 + d / 2.0);
    assert_eq!(f.ctl.phase(), CapturePhase::Capturing);
    assert_eq!(f.photo(), *f.ctl.slot());

    f.tick(t0 + d + t * 0.5);
    assert_eq!(f.ctl.phase(), CapturePhase::Ejecting);
    assert_ne!(f.photo(), *f.ctl.slot());

    f.tick(t0 + d + t);
    assert!(f.photo().approx_eq(f.ctl.dock(), 1e-6));
    assert_eq!(f.count(&SceneEvent::EjectDone), 1);
    assert_eq!(f.ctl.phase(), CapturePhase::Connected);

    f.tick(t0 + d + t + 500.0);
    assert_eq!(f.count(&SceneEvent::EjectDone), 1);
    assert!(f.photo().approx_eq(f.ctl.dock(), 1e-6));
}

#[test]
fn capture_during_eject_is_ignored() {
    let mut f = Fixture::new().ready();
    assert!(f.capture(0.0));
    f.tick(100.0);
    assert!(!f.capture(120.0));
    f.tick(900.0);
    assert!(!f.capture(950.0));
    f.tick(5000.0);
    assert!(!f.capture(5010.0));
    assert_eq!(f.count(&SceneEvent::CaptureStart), 1);
    assert_eq!(f.count(&SceneEvent::EjectDone), 1);
}

#[test]
fn retract_interrupts_eject_and_returns_to_ready() {
    let mut f = Fixture::new().ready();
    assert!(f.capture(0.0));
    f.tick(900.0);
    assert_eq!(f.ctl.phase(), CapturePhase::Ejecting);

    assert!(f.retract(900.0));
    assert_eq!(f.ctl.phase(), CapturePhase::Retracting);
    let dur = f.ctl.config().retract_duration_ms as f64;
    f.tick(900.0 + dur * 0.5);
    assert_eq!(f.ctl.phase(), CapturePhase::Retracting);

    f.tick(900.0 + dur);
    assert_eq!(f.ctl.phase(), CapturePhase::Ready);
    assert!(f.photo().approx_eq(f.ctl.slot(), 1e-6));
    assert_eq!(f.count(&SceneEvent::RetractDone), 1);
    assert_eq!(f.count(&SceneEvent::EjectDone), 0);

    f.tick(900.0 + dur * 3.0);
    assert_eq!(f.count(&SceneEvent::RetractDone), 1);
    // A fresh capture is accepted again
    assert!(f.capture(5000.0));
    assert_eq!(f.count(&SceneEvent::CaptureStart), 2);
}

#[test]
fn capture_during_retract_is_rejected() {
    let mut f = Fixture::new().ready();
    f.capture(0.0);
    f.tick(3000.0);
    assert_eq!(f.ctl.phase(), CapturePhase::Connected);
    assert!(f.retract(3000.0));
    f.tick(3100.0);
    assert!(!f.capture(3110.0));
    assert_eq!(f.ctl.phase(), CapturePhase::Retracting);
    assert_eq!(f.count(&SceneEvent::CaptureStart), 1);
}

#[test]
fn retract_outside_sequence_does_nothing() {
    let mut f = Fixture::new().ready();
    assert!(!f.retract(0.0));
    assert_eq!(f.ctl.phase(), CapturePhase::Ready);
    assert!(f.events.is_empty());
}

#[test]
fn phase_override_snaps_photo() {
    let mut f = Fixture::new().ready();
    f.ctl
        .set_phase(CapturePhase::Connected, 0.0, &mut f.rig.graph, &mut f.events);
    assert_eq!(f.ctl.phase(), CapturePhase::Connected);
    assert!(f.photo().approx_eq(f.ctl.dock(), 1e-6));

    f.ctl
        .set_phase(CapturePhase::Retracting, 10.0, &mut f.rig.graph, &mut f.events);
    assert_eq!(f.ctl.phase(), CapturePhase::Retracting);

    f.ctl
        .set_phase(CapturePhase::Ready, 20.0, &mut f.rig.graph, &mut f.events);
    assert_eq!(f.photo(), *f.ctl.slot());
    assert_eq!(f.count(&SceneEvent::Ready), 0);
}

#[test]
fn ready_override_holds_until_timeline_moves() {
    let mut f = Fixture::new();
    f.ctl
        .set_phase(CapturePhase::Ready, 0.0, &mut f.rig.graph, &mut f.events);
    f.tick(16.0);
    f.tick(32.0);
    assert_eq!(f.ctl.phase(), CapturePhase::Ready);
    assert!(f.capture(48.0));
    assert_eq!(f.count(&SceneEvent::CaptureStart), 1);
    assert_eq!(f.ctl.phase(), CapturePhase::Capturing);
}

#[test]
fn intro_is_derived_again_once_timeline_changes() {
    let mut f = Fixture::new();
    f.ctl
        .set_phase(CapturePhase::Ready, 0.0, &mut f.rig.graph, &mut f.events);
    // Same value again keeps the override
    f.ctl.set_timeline(0.0);
    f.tick(16.0);
    assert_eq!(f.ctl.phase(), CapturePhase::Ready);

    f.ctl.set_timeline(2.0);
    f.tick(32.0);
    assert_eq!(f.ctl.phase(), CapturePhase::LensCloseup);
    assert_eq!(f.count(&SceneEvent::Ready), 0);
}

#[test]
fn eject_curve_is_continuous_and_bounded() {
    let f = Fixture::new();
    let slot = f.ctl.slot().position;
    let dock = f.ctl.dock().position;
    let span = (dock - slot).length();
    let mut prev = slot;
    for i in 0..=200 {
        let p = f.ctl.eject_pose(i as f32 / 200.0).position;
        assert!((p - prev).length() < span * 0.1, "jump at {i}");
        assert!((p - slot).length() <= span * 1.1);
        prev = p;
    }
    assert_eq!(f.ctl.eject_pose(1.0), *f.ctl.dock());
}

#[test]
fn phase_names_round_trip() {
    for p in [
        CapturePhase::LensIntro,
        CapturePhase::LensCloseup,
        CapturePhase::DollyOut,
        CapturePhase::Ready,
        CapturePhase::Capturing,
        CapturePhase::Ejecting,
        CapturePhase::Connected,
        CapturePhase::Retracting,
    ] {
        assert_eq!(CapturePhase::parse(p.as_str()), Some(p));
    }
}
