//! Timeline-driven device turn and dolly for the screen overlay scene.

use crate::asset::DeviceAnchors;
use crate::camera::{Camera, CameraKey};
use crate::ease::{lerp, smoothstep};
use crate::events::{EventSink, SceneEvent};
use crate::pose::Pose;
use crate::scene::{NodeId, SceneGraph};
use glam::{EulerRot, Quat, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowcasePhase {
    Intro,
    Turning,
    Framed,
}

impl ShowcasePhase {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "intro" => Some(ShowcasePhase::Intro),
            "turning" => Some(ShowcasePhase::Turning),
            "framed" => Some(ShowcasePhase::Framed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShowcasePhase::Intro => "intro",
            ShowcasePhase::Turning => "turning",
            ShowcasePhase::Framed => "framed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShowcaseConfig {
    /// Timeline window of the yaw sweep.
    pub turn: (f32, f32),
    /// Timeline window of the camera push-in.
    pub frame: (f32, f32),
    pub yaw_from: f32,
    pub yaw_to: f32,
    pub pitch_from: f32,
    pub wide_key: CameraKey,
    pub framed_key: CameraKey,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            turn: (0.05, 0.6),
            frame: (0.45, 1.0),
            yaw_from: -2.6,
            yaw_to: 0.0,
            pitch_from: 0.35,
            wide_key: CameraKey::new(Vec3::new(0.0, 0.2, 7.5), Vec3::ZERO, 40.0),
            framed_key: CameraKey::new(Vec3::new(0.0, 0.0, 3.6), Vec3::ZERO, 38.0),
        }
    }
}

impl ShowcaseConfig {
    pub fn phase_at(&self, timeline: f32) -> ShowcasePhase {
        if timeline >= self.frame.1 {
            ShowcasePhase::Framed
        } else if timeline >= self.turn.0 {
            ShowcasePhase::Turning
        } else {
            ShowcasePhase::Intro
        }
    }

    /// Device orientation for a timeline value.
    pub fn device_rotation(&self, timeline: f32) -> Quat {
        let k = smoothstep(self.turn.0, self.turn.1, timeline);
        let yaw = lerp(self.yaw_from, self.yaw_to, k);
        let pitch = lerp(self.pitch_from, 0.0, k);
        Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
    }

    pub fn camera_key(&self, timeline: f32) -> CameraKey {
        let k = smoothstep(self.frame.0, self.frame.1, timeline);
        CameraKey::lerp(&self.wide_key, &self.framed_key, k)
    }
}

pub struct ShowcaseController {
    config: ShowcaseConfig,
    phase: ShowcasePhase,
    device: NodeId,
    rest: Pose,
    anchors: DeviceAnchors,
    timeline: f32,
    ready_fired: bool,
}

impl ShowcaseController {
    pub fn new(
        graph: &SceneGraph,
        device: NodeId,
        anchors: DeviceAnchors,
        config: ShowcaseConfig,
    ) -> Self {
        Self {
            config,
            phase: ShowcasePhase::Intro,
            device,
            rest: graph.local(device),
            anchors,
            timeline: 0.0,
            ready_fired: false,
        }
    }

    pub fn phase(&self) -> ShowcasePhase {
        self.phase
    }

    pub fn device(&self) -> NodeId {
        self.device
    }

    pub fn anchors(&self) -> &DeviceAnchors {
        &self.anchors
    }

    /// Replace the screen/lens anchors, e.g. after a model's bounds are known.
    pub fn install_anchors(&mut self, anchors: DeviceAnchors) {
        self.anchors = anchors;
    }

    pub fn set_timeline(&mut self, timeline: f32) {
        if timeline.is_finite() {
            self.timeline = timeline;
        }
    }

    /// Host override: jump the timeline to the start of `phase`.
    pub fn set_phase(&mut self, phase: ShowcasePhase) {
        self.timeline = match phase {
            ShowcasePhase::Intro => self.config.turn.0.min(0.0),
            ShowcasePhase::Turning => self.config.turn.0,
            ShowcasePhase::Framed => self.config.frame.1,
        };
    }

    pub fn tick(&mut self, graph: &mut SceneGraph, camera: &mut Camera, sink: &mut impl EventSink) {
        let t = self.timeline;
        graph.set_local(self.device, self.rest.with_rotation(self.config.device_rotation(t)));
        self.config.camera_key(t).apply(camera);

        let next = self.config.phase_at(t);
        if next != self.phase {
            self.phase = next;
            sink.emit(SceneEvent::PhaseChanged(next.as_str()));
        }
        if next == ShowcasePhase::Framed && !self.ready_fired {
            self.ready_fired = true;
            log::info!("[showcase] framed");
            sink.emit(SceneEvent::Ready);
        }
    }
}
