//! Staggered assembly followed by a ringing/connected toggle.
//!
//! Every animated part flies from an exploded `start` pose to its assembled
//! `target` pose inside its own sub-interval of the total duration. Intervals
//! come from the part's group window and its order within the group, so the
//! dial arrives first, then the body, then the cradle. Once everything has
//! landed the handset wobbles (ringing) until clicked.

use crate::constants::{MAX_FRAME_DT_MS, SETTLE_CYCLES, SETTLE_DECAY, SETTLE_WINDOW};
use crate::ease::{clamp01, damped_settle, ease_out_cubic, progress};
use crate::events::{EventSink, SceneEvent};
use crate::pose::Pose;
use crate::scene::{NodeId, SceneGraph};
use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialPhase {
    Assembling,
    Ringing,
    Connected,
}

impl DialPhase {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "assembling" => Some(DialPhase::Assembling),
            "ringing" => Some(DialPhase::Ringing),
            "connected" => Some(DialPhase::Connected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DialPhase::Assembling => "assembling",
            DialPhase::Ringing => "ringing",
            DialPhase::Connected => "connected",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssemblyGroup {
    Dial,
    Body,
    Cradle,
}

/// Timing of one group, as fractions of the total assembly duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupTiming {
    pub start: f32,
    pub end: f32,
    /// Share of the group window each part's own flight takes; the rest is
    /// spread as stagger between consecutive parts.
    pub span: f32,
    /// Peak settle overshoot in world units.
    pub settle: f32,
}

/// Declarative per-part animation record, attached at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartSpec {
    pub group: AssemblyGroup,
    pub order: u16,
    /// Exploded offset from the target position.
    pub offset: Vec3,
    /// Extra XYZ euler rotation (radians) in the exploded pose.
    pub spin: Vec3,
}

impl PartSpec {
    pub fn new(group: AssemblyGroup, order: u16, offset: Vec3) -> Self {
        Self {
            group,
            order,
            offset,
            spin: Vec3::ZERO,
        }
    }

    pub fn spin(mut self, spin: Vec3) -> Self {
        self.spin = spin;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Part {
    pub node: NodeId,
    pub spec: PartSpec,
    start: Pose,
    target: Pose,
    interval: (f32, f32),
    settle: f32,
}

impl Part {
    pub fn start(&self) -> &Pose {
        &self.start
    }

    pub fn target(&self) -> &Pose {
        &self.target
    }

    /// Normalized `[begin, end]` of this part's flight within the assembly.
    pub fn interval(&self) -> (f32, f32) {
        self.interval
    }

    /// Pose at normalized assembly progress `t`.
    pub fn pose_at(&self, t: f32) -> Pose {
        let (s, e) = self.interval;
        let p = if e > s {
            clamp01((t - s) / (e - s))
        } else if t >= e {
            1.0
        } else {
            0.0
        };
        if p >= 1.0 {
            return self.target;
        }
        let mut pose = Pose::lerp(&self.start, &self.target, ease_out_cubic(p));
        let settle_from = 1.0 - SETTLE_WINDOW;
        if p > settle_from {
            let s = (p - settle_from) / SETTLE_WINDOW;
            let dir = (self.target.position - self.start.position).normalize_or_zero();
            pose.position += dir * damped_settle(s, self.settle, SETTLE_CYCLES, SETTLE_DECAY);
        }
        pose
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WobbleConfig {
    pub bob: f32,
    pub roll: f32,
    pub pitch: f32,
    pub freq_hz: f32,
    /// Ring cadence: `ring_on_ms` of shaking every `ring_period_ms`.
    pub ring_period_ms: f32,
    pub ring_on_ms: f32,
    pub plunger_travel: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssemblyConfig {
    pub duration_ms: f32,
    pub dial: GroupTiming,
    pub body: GroupTiming,
    pub cradle: GroupTiming,
    pub wobble: WobbleConfig,
    /// Handset offset and tilt while connected.
    pub lift: Vec3,
    pub lift_tilt: f32,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            duration_ms: 3200.0,
            dial: GroupTiming {
                start: 0.0,
                end: 0.45,
                span: 0.55,
                settle: 0.05,
            },
            body: GroupTiming {
                start: 0.25,
                end: 0.75,
                span: 0.6,
                settle: 0.04,
            },
            cradle: GroupTiming {
                start: 0.55,
                end: 1.0,
                span: 0.5,
                settle: 0.06,
            },
            wobble: WobbleConfig {
                bob: 0.025,
                roll: 0.06,
                pitch: 0.03,
                freq_hz: 9.0,
                ring_period_ms: 2000.0,
                ring_on_ms: 1100.0,
                plunger_travel: 0.03,
            },
            lift: Vec3::new(0.0, 0.55, 0.35),
            lift_tilt: 0.45,
        }
    }
}

impl AssemblyConfig {
    pub fn timing(&self, group: AssemblyGroup) -> GroupTiming {
        match group {
            AssemblyGroup::Dial => self.dial,
            AssemblyGroup::Body => self.body,
            AssemblyGroup::Cradle => self.cradle,
        }
    }
}

/// Give every part its staggered sub-interval: parts of a group are ordered
/// by `order`, each flies for `span` of the group window, and the last one
/// lands exactly at the window end.
fn assign_intervals(config: &AssemblyConfig, parts: &mut [Part]) {
    for group in [AssemblyGroup::Dial, AssemblyGroup::Body, AssemblyGroup::Cradle] {
        let timing = config.timing(group);
        let w0 = clamp01(timing.start);
        let w1 = clamp01(timing.end).max(w0);
        let len = w1 - w0;
        let mut members: Vec<usize> = (0..parts.len())
            .filter(|&i| parts[i].spec.group == group)
            .collect();
        members.sort_by_key(|&i| (parts[i].spec.order, i));
        let k = members.len();
        if k == 0 {
            continue;
        }
        let flight = len * clamp01(timing.span);
        let step = if k > 1 {
            (len - flight) / (k - 1) as f32
        } else {
            0.0
        };
        for (slot, &i) in members.iter().enumerate() {
            let begin = w0 + step * slot as f32;
            let end = if slot + 1 == k { w1 } else { begin + flight };
            parts[i].interval = (begin, end.min(w1));
            parts[i].settle = timing.settle;
        }
    }
}

pub struct AssemblyController {
    config: AssemblyConfig,
    parts: Vec<Part>,
    phase: DialPhase,
    clock_ms: f32,
    assembled_fired: bool,
    handset: NodeId,
    handset_rest: Pose,
    plungers: [(NodeId, Pose); 2],
}

impl AssemblyController {
    /// Snapshot every part's current local pose as its target, derive the
    /// exploded start pose, and enter `Assembling`.
    pub fn new(
        graph: &mut SceneGraph,
        specs: &[(NodeId, PartSpec)],
        handset: NodeId,
        plungers: [NodeId; 2],
        config: AssemblyConfig,
    ) -> Self {
        let mut parts: Vec<Part> = specs
            .iter()
            .map(|(node, spec)| {
                let target = graph.local(*node);
                let spin = Quat::from_euler(EulerRot::XYZ, spec.spin.x, spec.spin.y, spec.spin.z);
                Part {
                    node: *node,
                    spec: *spec,
                    start: target.offset(spec.offset, spin),
                    target,
                    interval: (0.0, 1.0),
                    settle: 0.0,
                }
            })
            .collect();
        assign_intervals(&config, &mut parts);
        let mut ctl = Self {
            config,
            parts,
            phase: DialPhase::Assembling,
            clock_ms: 0.0,
            assembled_fired: false,
            handset,
            handset_rest: graph.local(handset),
            plungers: [
                (plungers[0], graph.local(plungers[0])),
                (plungers[1], graph.local(plungers[1])),
            ],
        };
        ctl.set_phase(DialPhase::Assembling, graph);
        ctl
    }

    pub fn phase(&self) -> DialPhase {
        self.phase
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn handset(&self) -> NodeId {
        self.handset
    }

    pub fn clock_ms(&self) -> f32 {
        self.clock_ms
    }

    pub fn assembled_fired(&self) -> bool {
        self.assembled_fired
    }

    /// Normalized assembly progress.
    pub fn progress(&self) -> f32 {
        match self.phase {
            DialPhase::Assembling => progress(self.clock_ms, self.config.duration_ms),
            _ => 1.0,
        }
    }

    /// Host override: snap every pose to the rest state of `phase` and reset
    /// the clock, with no interpolation.
    pub fn set_phase(&mut self, phase: DialPhase, graph: &mut SceneGraph) {
        self.phase = phase;
        self.clock_ms = 0.0;
        match phase {
            DialPhase::Assembling => {
                self.assembled_fired = false;
                for p in &self.parts {
                    graph.set_local(p.node, p.start);
                }
            }
            DialPhase::Ringing | DialPhase::Connected => {
                self.assembled_fired = true;
                for p in &self.parts {
                    graph.set_local(p.node, p.target);
                }
            }
        }
        self.apply_handset(graph);
    }

    pub fn tick(&mut self, dt_ms: f32, graph: &mut SceneGraph, sink: &mut impl EventSink) {
        let dt = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, MAX_FRAME_DT_MS)
        } else {
            0.0
        };
        self.clock_ms += dt;
        match self.phase {
            DialPhase::Assembling => {
                let t = progress(self.clock_ms, self.config.duration_ms);
                for p in &self.parts {
                    graph.set_local(p.node, p.pose_at(t));
                }
                if t >= 1.0 && !self.assembled_fired {
                    self.assembled_fired = true;
                    sink.emit(SceneEvent::Assembled);
                    log::info!("[dial] assembled; ringing");
                    self.phase = DialPhase::Ringing;
                    self.clock_ms = 0.0;
                    sink.emit(SceneEvent::PhaseChanged(self.phase.as_str()));
                    self.apply_handset(graph);
                }
            }
            DialPhase::Ringing | DialPhase::Connected => self.apply_handset(graph),
        }
    }

    /// Click on an interactive target. Returns whether it changed the phase.
    pub fn on_intent(
        &mut self,
        target: NodeId,
        graph: &mut SceneGraph,
        sink: &mut impl EventSink,
    ) -> bool {
        if !graph.is_within(target, self.handset) {
            return false;
        }
        let (next, event) = match self.phase {
            DialPhase::Ringing => (DialPhase::Connected, SceneEvent::Answered),
            DialPhase::Connected => (DialPhase::Ringing, SceneEvent::HungUp),
            DialPhase::Assembling => return false,
        };
        self.phase = next;
        self.clock_ms = 0.0;
        sink.emit(event);
        sink.emit(SceneEvent::PhaseChanged(next.as_str()));
        self.apply_handset(graph);
        true
    }

    /// Handset and plunger poses for the post-assembly phases. The ring
    /// shake runs in bursts and the two plungers move in opposition.
    fn apply_handset(&self, graph: &mut SceneGraph) {
        let w = &self.config.wobble;
        let [(p0, rest0), (p1, rest1)] = self.plungers;
        match self.phase {
            DialPhase::Assembling => {}
            DialPhase::Ringing => {
                let period = w.ring_period_ms.max(1.0);
                let in_burst = self.clock_ms % period;
                let envelope = if in_burst < w.ring_on_ms {
                    (std::f32::consts::PI * in_burst / w.ring_on_ms.max(1.0)).sin()
                } else {
                    0.0
                };
                let phase = TAU * w.freq_hz * self.clock_ms / 1000.0;
                let s = phase.sin() * envelope;
                let c = (phase * 0.5).cos() * envelope;
                let wobble = Quat::from_euler(EulerRot::XYZ, w.pitch * c, 0.0, w.roll * s);
                graph.set_local(
                    self.handset,
                    self.handset_rest.offset(Vec3::new(0.0, w.bob * s.abs(), 0.0), wobble),
                );
                graph.set_local(p0, rest0.offset(Vec3::Y * (w.plunger_travel * s), Quat::IDENTITY));
                graph.set_local(p1, rest1.offset(Vec3::Y * (-w.plunger_travel * s), Quat::IDENTITY));
            }
            DialPhase::Connected => {
                let tilt = Quat::from_rotation_x(-self.config.lift_tilt);
                graph.set_local(self.handset, self.handset_rest.offset(self.config.lift, tilt));
                let up = Vec3::Y * w.plunger_travel;
                graph.set_local(p0, rest0.offset(up, Quat::IDENTITY));
                graph.set_local(p1, rest1.offset(up, Quat::IDENTITY));
            }
        }
    }
}
