//! Camera intro and photo capture/eject/retract sequence.
//!
//! Before `Ready` the phase follows the host timeline: the camera starts on
//! the lens, closes up, then dollies out to the wide framing. After that the
//! controller owns a small clock-driven sequence for the photo that slides
//! out of the slot and back in.

use crate::camera::{Camera, CameraKey};
use crate::constants::{SETTLE_CYCLES, SETTLE_DECAY, SETTLE_WINDOW};
use crate::ease::{damped_settle, ease_in_out_cubic, progress, resist_release, smoothstep};
use crate::events::{EventSink, SceneEvent};
use crate::pose::Pose;
use crate::scene::{NodeId, SceneGraph};
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapturePhase {
    LensIntro,
    LensCloseup,
    DollyOut,
    Ready,
    Capturing,
    Ejecting,
    Connected,
    Retracting,
}

impl CapturePhase {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lens_intro" => Some(CapturePhase::LensIntro),
            "lens_closeup" => Some(CapturePhase::LensCloseup),
            "dolly_out" => Some(CapturePhase::DollyOut),
            "ready" => Some(CapturePhase::Ready),
            "capturing" => Some(CapturePhase::Capturing),
            "ejecting" => Some(CapturePhase::Ejecting),
            "connected" => Some(CapturePhase::Connected),
            "retracting" => Some(CapturePhase::Retracting),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CapturePhase::LensIntro => "lens_intro",
            CapturePhase::LensCloseup => "lens_closeup",
            CapturePhase::DollyOut => "dolly_out",
            CapturePhase::Ready => "ready",
            CapturePhase::Capturing => "capturing",
            CapturePhase::Ejecting => "ejecting",
            CapturePhase::Connected => "connected",
            CapturePhase::Retracting => "retracting",
        }
    }

    /// Phases whose identity comes from the timeline.
    pub fn is_intro(self) -> bool {
        matches!(
            self,
            CapturePhase::LensIntro | CapturePhase::LensCloseup | CapturePhase::DollyOut
        )
    }

    /// Phases in which the photo has left the slot.
    pub fn is_sequence(self) -> bool {
        matches!(
            self,
            CapturePhase::Capturing
                | CapturePhase::Ejecting
                | CapturePhase::Connected
                | CapturePhase::Retracting
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureConfig {
    /// Timeline window blending lens → closeup.
    pub closeup: (f32, f32),
    /// Timeline window blending closeup → wide.
    pub dolly: (f32, f32),
    pub ready_at: f32,
    pub lens_key: CameraKey,
    pub closeup_key: CameraKey,
    pub wide_key: CameraKey,
    pub eject_delay_ms: f32,
    pub eject_duration_ms: f32,
    pub retract_duration_ms: f32,
    /// `resist_release` shape of the eject travel.
    pub eject_knee: f32,
    pub eject_creep: f32,
    /// Peak settle overshoot at the dock, world units.
    pub eject_settle: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            closeup: (1.7, 4.8),
            dolly: (4.8, 6.0),
            ready_at: 6.0,
            lens_key: CameraKey::new(Vec3::new(0.0, 0.15, 4.2), Vec3::new(0.0, 0.15, 0.0), 28.0),
            closeup_key: CameraKey::new(Vec3::new(0.0, 0.15, 2.4), Vec3::new(0.0, 0.15, 0.0), 34.0),
            wide_key: CameraKey::new(Vec3::new(0.9, 0.6, 6.5), Vec3::new(0.0, -0.2, 0.0), 40.0),
            eject_delay_ms: 260.0,
            eject_duration_ms: 1400.0,
            retract_duration_ms: 650.0,
            eject_knee: 0.35,
            eject_creep: 0.12,
            eject_settle: 0.035,
        }
    }
}

impl CaptureConfig {
    /// Camera placement for a timeline value.
    pub fn camera_key(&self, timeline: f32) -> CameraKey {
        let a = smoothstep(self.closeup.0, self.closeup.1, timeline);
        let b = smoothstep(self.dolly.0, self.dolly.1, timeline);
        let near = CameraKey::lerp(&self.lens_key, &self.closeup_key, a);
        CameraKey::lerp(&near, &self.wide_key, b)
    }

    /// Intro phase implied by a timeline value.
    pub fn intro_phase(&self, timeline: f32) -> CapturePhase {
        if timeline >= self.ready_at {
            CapturePhase::Ready
        } else if timeline >= self.dolly.0 {
            CapturePhase::DollyOut
        } else if timeline >= self.closeup.0 {
            CapturePhase::LensCloseup
        } else {
            CapturePhase::LensIntro
        }
    }
}

pub struct CaptureController {
    config: CaptureConfig,
    phase: CapturePhase,
    photo: NodeId,
    slot: Pose,
    dock: Pose,
    timeline: f32,
    seq_start_ms: f64,
    retract_from: Pose,
    ready_fired: bool,
    eject_done_fired: bool,
    retract_done_fired: bool,
    /// An intro or ready phase set by the host holds until the timeline
    /// moves.
    pinned: bool,
}

impl CaptureController {
    /// `slot` is the photo's pose inside the body; `dock` where it rests
    /// once ejected. The photo stays hidden until a capture starts.
    pub fn new(
        graph: &mut SceneGraph,
        photo: NodeId,
        slot: Pose,
        dock: Pose,
        config: CaptureConfig,
    ) -> Self {
        let slot = slot.sanitized();
        graph.set_local(photo, slot);
        graph.set_visible(photo, false);
        Self {
            config,
            phase: CapturePhase::LensIntro,
            photo,
            slot,
            dock: dock.sanitized(),
            timeline: 0.0,
            seq_start_ms: 0.0,
            retract_from: slot,
            ready_fired: false,
            eject_done_fired: false,
            retract_done_fired: false,
            pinned: false,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn photo(&self) -> NodeId {
        self.photo
    }

    pub fn slot(&self) -> &Pose {
        &self.slot
    }

    pub fn dock(&self) -> &Pose {
        &self.dock
    }

    pub fn timeline(&self) -> f32 {
        self.timeline
    }

    /// Host timeline value. Non-finite values are ignored.
    pub fn set_timeline(&mut self, timeline: f32) {
        if timeline.is_finite() {
            if timeline != self.timeline {
                self.pinned = false;
            }
            self.timeline = timeline;
        }
    }

    fn enter(&mut self, phase: CapturePhase, sink: &mut impl EventSink) {
        if self.phase != phase {
            self.phase = phase;
            sink.emit(SceneEvent::PhaseChanged(phase.as_str()));
        }
    }

    /// Start the capture sequence. Only accepted from `Ready`; returns
    /// whether it started.
    pub fn trigger_capture(
        &mut self,
        now_ms: f64,
        graph: &mut SceneGraph,
        sink: &mut impl EventSink,
    ) -> bool {
        if self.phase != CapturePhase::Ready {
            log::debug!("[capture] capture ignored in {}", self.phase.as_str());
            return false;
        }
        self.start_sequence(now_ms, graph, sink);
        true
    }

    fn start_sequence(&mut self, now_ms: f64, graph: &mut SceneGraph, sink: &mut impl EventSink) {
        self.seq_start_ms = now_ms;
        self.eject_done_fired = false;
        self.retract_done_fired = false;
        graph.set_local(self.photo, self.slot);
        graph.set_visible(self.photo, true);
        sink.emit(SceneEvent::CaptureStart);
        self.enter(CapturePhase::Capturing, sink);
    }

    /// Send the photo back to the slot from wherever it is. Interrupts an
    /// eject in flight; returns whether a retract started.
    pub fn trigger_retract(
        &mut self,
        now_ms: f64,
        graph: &mut SceneGraph,
        sink: &mut impl EventSink,
    ) -> bool {
        match self.phase {
            CapturePhase::Capturing | CapturePhase::Ejecting | CapturePhase::Connected => {
                self.retract_from = graph.local(self.photo);
                self.seq_start_ms = now_ms;
                self.retract_done_fired = false;
                self.enter(CapturePhase::Retracting, sink);
                true
            }
            _ => false,
        }
    }

    /// Host override. Intro phases and `Ready` park the photo in the slot,
    /// `Connected` snaps it to the dock, `Capturing`/`Ejecting` restart the
    /// sequence at that step and `Retracting` behaves like a retract trigger.
    pub fn set_phase(
        &mut self,
        phase: CapturePhase,
        now_ms: f64,
        graph: &mut SceneGraph,
        sink: &mut impl EventSink,
    ) {
        self.pinned = phase.is_intro() || phase == CapturePhase::Ready;
        match phase {
            CapturePhase::Retracting => {
                self.trigger_retract(now_ms, graph, sink);
            }
            CapturePhase::Capturing => {
                if !matches!(self.phase, CapturePhase::Capturing | CapturePhase::Ejecting) {
                    self.start_sequence(now_ms, graph, sink);
                }
            }
            CapturePhase::Ejecting => {
                if self.phase != CapturePhase::Ejecting {
                    self.seq_start_ms = now_ms - self.config.eject_delay_ms.max(0.0) as f64;
                    self.eject_done_fired = false;
                    graph.set_local(self.photo, self.slot);
                    graph.set_visible(self.photo, true);
                    self.enter(CapturePhase::Ejecting, sink);
                }
            }
            CapturePhase::Connected => {
                self.ready_fired = true;
                self.eject_done_fired = true;
                graph.set_local(self.photo, self.dock);
                graph.set_visible(self.photo, true);
                self.enter(CapturePhase::Connected, sink);
            }
            _ => {
                if phase == CapturePhase::Ready {
                    self.ready_fired = true;
                }
                graph.set_local(self.photo, self.slot);
                graph.set_visible(self.photo, false);
                self.enter(phase, sink);
            }
        }
    }

    /// Advance to `now_ms`: camera from the timeline, phase from the
    /// timeline while in the intro, photo from the sequence clock.
    pub fn tick(
        &mut self,
        now_ms: f64,
        graph: &mut SceneGraph,
        camera: &mut Camera,
        sink: &mut impl EventSink,
    ) {
        self.config.camera_key(self.timeline).apply(camera);

        if self.phase.is_intro() || self.phase == CapturePhase::Ready {
            if self.pinned {
                return;
            }
            let next = self.config.intro_phase(self.timeline);
            self.enter(next, sink);
            if next == CapturePhase::Ready && !self.ready_fired {
                self.ready_fired = true;
                log::info!("[capture] ready");
                sink.emit(SceneEvent::Ready);
            }
            return;
        }

        let elapsed = (now_ms - self.seq_start_ms).max(0.0) as f32;
        match self.phase {
            CapturePhase::Capturing | CapturePhase::Ejecting => {
                let delay = self.config.eject_delay_ms.max(0.0);
                if elapsed < delay {
                    graph.set_local(self.photo, self.slot);
                    return;
                }
                self.enter(CapturePhase::Ejecting, sink);
                let p = progress(elapsed - delay, self.config.eject_duration_ms);
                graph.set_local(self.photo, self.eject_pose(p));
                if p >= 1.0 {
                    if !self.eject_done_fired {
                        self.eject_done_fired = true;
                        sink.emit(SceneEvent::EjectDone);
                    }
                    self.enter(CapturePhase::Connected, sink);
                }
            }
            CapturePhase::Connected => graph.set_local(self.photo, self.dock),
            CapturePhase::Retracting => {
                let p = progress(elapsed, self.config.retract_duration_ms);
                let pose = Pose::lerp(&self.retract_from, &self.slot, ease_in_out_cubic(p));
                graph.set_local(self.photo, pose);
                if p >= 1.0 {
                    graph.set_visible(self.photo, false);
                    if !self.retract_done_fired {
                        self.retract_done_fired = true;
                        sink.emit(SceneEvent::RetractDone);
                    }
                    self.enter(CapturePhase::Ready, sink);
                }
            }
            _ => {}
        }
    }

    /// Photo pose at eject progress `p`: resisted release plus a decaying
    /// overshoot along the travel direction near the dock.
    pub fn eject_pose(&self, p: f32) -> Pose {
        if p >= 1.0 {
            return self.dock;
        }
        let c = &self.config;
        let mut pose = Pose::lerp(&self.slot, &self.dock, resist_release(p, c.eject_knee, c.eject_creep));
        let settle_from = 1.0 - SETTLE_WINDOW;
        if p > settle_from {
            let s = (p - settle_from) / SETTLE_WINDOW;
            let dir = (self.dock.position - self.slot.position).normalize_or_zero();
            pose.position += dir * damped_settle(s, c.eject_settle, SETTLE_CYCLES, SETTLE_DECAY);
        }
        pose
    }
}
