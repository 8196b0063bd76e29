//! One mounted scene: graph, camera, controller and per-frame pipeline.
//!
//! The frontend owns a [`SceneRuntime`] and calls [`SceneRuntime::frame`]
//! once per animation frame. Within a frame the order is fixed: host input
//! resync, pose update, camera/world update, projection, then the pointer
//! events queued since the previous frame.

use crate::asset::{anchors_from_bounds, AnchorConfig, AssetError};
use crate::assembly::{AssemblyConfig, AssemblyController, DialPhase};
use crate::camera::Camera;
use crate::capture::{CaptureConfig, CaptureController, CapturePhase};
use crate::constants::{BACKDROP_SEED, MAX_FRAME_DT_MS};
use crate::events::{EventSink, SceneEvent, StatusKind};
use crate::latest::Latest;
use crate::picking::{CursorHint, PointerPicker};
use crate::procgen::{generate_point_field, ConstellationParams, PointField, ProcgenError};
use crate::projection::{
    AnchorTracker, ProjectedAnchor, ProjectedRect, RectTracker, ScreenQuad, SurfaceLayout,
};
use crate::rigs::{build_capture, build_dial, build_showcase, fit_showcase};
use crate::scene::{Aabb, DrawInstance, NodeId, SceneGraph};
use crate::showcase::{ShowcaseConfig, ShowcaseController, ShowcasePhase};
use crate::stage::{LayerStyle, StageAnimator, StageConfig, StagePhase};
use crate::texture::{backdrop, rasterize_point_field, Rgba8, TextureBuffer};
use glam::{Vec2, Vec3};

const BACKDROP_SIZE: (u32, u32) = (512, 512);
const CONSTELLATION_SIZE: (u32, u32) = (512, 1024);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneKind {
    Dial,
    Capture,
    Showcase,
    Stage,
}

impl SceneKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dial" => Some(SceneKind::Dial),
            "capture" => Some(SceneKind::Capture),
            "showcase" => Some(SceneKind::Showcase),
            "stage" => Some(SceneKind::Stage),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SceneKind::Dial => "dial",
            SceneKind::Capture => "capture",
            SceneKind::Showcase => "showcase",
            SceneKind::Stage => "stage",
        }
    }
}

/// Values pushed by the host between frames. Each is a single
/// last-write-wins cell; the runtime consumes whatever changed at the top of
/// the next frame.
#[derive(Clone, Debug)]
pub struct HostInputs {
    pub phase: Latest<Option<String>>,
    pub timeline: Latest<f32>,
    pub capture_nonce: Latest<u32>,
    pub retract_nonce: Latest<u32>,
    pub interactive: Latest<bool>,
    pub collapse_target: Latest<Option<Vec2>>,
}

impl Default for HostInputs {
    fn default() -> Self {
        Self {
            phase: Latest::new(None),
            timeline: Latest::new(0.0),
            capture_nonce: Latest::new(0),
            retract_nonce: Latest::new(0),
            interactive: Latest::new(true),
            collapse_target: Latest::new(None),
        }
    }
}

impl HostInputs {
    pub fn set_phase(&mut self, phase: &str) {
        self.phase.set(Some(phase.to_string()));
    }

    /// Non-finite timeline values are dropped.
    pub fn set_timeline(&mut self, t: f32) {
        if t.is_finite() {
            self.timeline.set(t);
        }
    }

    pub fn set_capture_nonce(&mut self, n: u32) {
        self.capture_nonce.set(n);
    }

    pub fn set_retract_nonce(&mut self, n: u32) {
        self.retract_nonce.set(n);
    }

    pub fn set_interactive(&mut self, on: bool) {
        self.interactive.set(on);
    }

    pub fn set_collapse_target(&mut self, p: Option<Vec2>) {
        self.collapse_target.set(p.filter(|p| p.is_finite()));
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Seen {
    phase: u64,
    timeline: u64,
    capture: u64,
    retract: u64,
    interactive: u64,
    collapse: u64,
}

/// Pointer activity in render-surface CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Move(Vec2),
    Down { px: Vec2, button: i16 },
    Leave,
}

struct CaptureScene {
    ctl: CaptureController,
    root: NodeId,
    lens: NodeId,
    lens_radius: f32,
    photo_quad: ScreenQuad,
    /// Lens position from a loaded model, in root-local space.
    lens_override: Option<(Vec3, f32)>,
}

struct ShowcaseScene {
    ctl: ShowcaseController,
    body: NodeId,
    screen: NodeId,
    bump: NodeId,
}

struct StageScene {
    animator: StageAnimator,
    field: PointField,
}

enum Choreography {
    Dial(AssemblyController),
    Capture(CaptureScene),
    Showcase(ShowcaseScene),
    Stage(StageScene),
}

pub struct SceneRuntime {
    kind: SceneKind,
    graph: SceneGraph,
    camera: Camera,
    picker: PointerPicker,
    choreo: Choreography,
    backdrop: TextureBuffer,
    anchor_config: AnchorConfig,
    rect: RectTracker,
    lens: AnchorTracker,
    sent_rect: Option<Option<ProjectedRect>>,
    sent_lens: Option<Option<ProjectedAnchor>>,
    sent_layer: Option<LayerStyle>,
    pointer: Vec<PointerInput>,
    seen: Seen,
    last_now: Option<f64>,
    degraded: bool,
    load_error_reported: bool,
}

impl SceneRuntime {
    /// Build the rig for `kind` and run the procedural generators once.
    pub fn new(kind: SceneKind) -> Result<Self, ProcgenError> {
        let (graph, picker, choreo, anchor_config) = match kind {
            SceneKind::Dial => {
                let mut rig = build_dial();
                let ctl = AssemblyController::new(
                    &mut rig.graph,
                    &rig.parts,
                    rig.handset,
                    rig.plungers,
                    AssemblyConfig::default(),
                );
                let picker = PointerPicker::new(&[rig.handset]);
                (rig.graph, picker, Choreography::Dial(ctl), AnchorConfig::default())
            }
            SceneKind::Capture => {
                let mut rig = build_capture();
                let ctl = CaptureController::new(
                    &mut rig.graph,
                    rig.photo,
                    rig.slot,
                    rig.dock,
                    CaptureConfig::default(),
                );
                let picker = PointerPicker::new(&[rig.proxy]);
                let scene = CaptureScene {
                    ctl,
                    root: rig.root,
                    lens: rig.lens,
                    lens_radius: rig.lens_radius,
                    photo_quad: rig.photo_quad,
                    lens_override: None,
                };
                let anchors = AnchorConfig {
                    fit_height: 1.7,
                    lens: Vec3::new(0.5, 0.58, 1.0),
                    lens_radius: 0.18,
                    ..AnchorConfig::default()
                };
                (rig.graph, picker, Choreography::Capture(scene), anchors)
            }
            SceneKind::Showcase => {
                let anchor_config = AnchorConfig::default();
                let rig = build_showcase(&anchor_config);
                let ctl = ShowcaseController::new(
                    &rig.graph,
                    rig.device,
                    rig.anchors,
                    ShowcaseConfig::default(),
                );
                let picker = PointerPicker::new(&[rig.device]);
                let scene = ShowcaseScene {
                    ctl,
                    body: rig.body,
                    screen: rig.screen,
                    bump: rig.bump,
                };
                (rig.graph, picker, Choreography::Showcase(scene), anchor_config)
            }
            SceneKind::Stage => {
                let field = generate_point_field(&ConstellationParams::default())?;
                let scene = StageScene {
                    animator: StageAnimator::new(StageConfig::default()),
                    field,
                };
                (
                    SceneGraph::new(),
                    PointerPicker::new(&[]),
                    Choreography::Stage(scene),
                    AnchorConfig::default(),
                )
            }
        };

        let backdrop = match &choreo {
            Choreography::Stage(s) => {
                let (w, h) = CONSTELLATION_SIZE;
                rasterize_point_field(
                    &s.field,
                    w,
                    h,
                    Rgba8::new(170, 190, 255, 70),
                    Rgba8::new(235, 240, 255, 230),
                )?
            }
            _ => backdrop(BACKDROP_SEED, BACKDROP_SIZE.0, BACKDROP_SIZE.1)?,
        };
        log::info!("[scene] built kind={} nodes={}", kind.as_str(), graph.len());

        Ok(Self {
            kind,
            graph,
            camera: Camera::default(),
            picker,
            choreo,
            backdrop,
            anchor_config,
            rect: RectTracker::default(),
            lens: AnchorTracker::default(),
            sent_rect: None,
            sent_lens: None,
            sent_layer: None,
            pointer: Vec::new(),
            seen: Seen::default(),
            last_now: None,
            degraded: false,
            load_error_reported: false,
        })
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn backdrop(&self) -> &TextureBuffer {
        &self.backdrop
    }

    pub fn point_field(&self) -> Option<&PointField> {
        match &self.choreo {
            Choreography::Stage(s) => Some(&s.field),
            _ => None,
        }
    }

    pub fn instances(&self) -> Vec<DrawInstance> {
        self.graph.instances()
    }

    pub fn cursor(&self) -> CursorHint {
        self.picker.cursor()
    }

    /// Whether the last asset load failed and the scene runs on defaults.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn phase_name(&self) -> &'static str {
        match &self.choreo {
            Choreography::Dial(c) => c.phase().as_str(),
            Choreography::Capture(s) => s.ctl.phase().as_str(),
            Choreography::Showcase(s) => s.ctl.phase().as_str(),
            Choreography::Stage(s) => s.animator.phase().as_str(),
        }
    }

    /// Queue a pointer event for the end of the next frame.
    pub fn push_pointer(&mut self, input: PointerInput) {
        self.pointer.push(input);
    }

    pub fn frame(
        &mut self,
        now_ms: f64,
        inputs: &HostInputs,
        layout: &SurfaceLayout,
        sink: &mut impl EventSink,
    ) {
        let now_ms = if now_ms.is_finite() {
            now_ms
        } else {
            self.last_now.unwrap_or(0.0)
        };
        let dt = match self.last_now {
            Some(prev) => ((now_ms - prev) as f32).clamp(0.0, MAX_FRAME_DT_MS),
            None => 0.0,
        };
        self.last_now = Some(now_ms);

        self.resync(now_ms, inputs, layout, sink);
        self.advance(now_ms, dt, sink);
        if layout.is_usable() {
            self.camera.set_aspect_from(layout.surface_size);
        }
        self.graph.update_world();
        self.project(now_ms, layout, sink);
        self.handle_pointer(now_ms, layout, sink);
    }

    fn resync(
        &mut self,
        now_ms: f64,
        inputs: &HostInputs,
        layout: &SurfaceLayout,
        sink: &mut impl EventSink,
    ) {
        if let Some(&on) = inputs.interactive.take_changed(&mut self.seen.interactive) {
            self.picker.set_interactive(on, sink);
        }
        if let Some(&t) = inputs.timeline.take_changed(&mut self.seen.timeline) {
            match &mut self.choreo {
                Choreography::Capture(s) => s.ctl.set_timeline(t),
                Choreography::Showcase(s) => s.ctl.set_timeline(t),
                _ => {}
            }
        }
        if let Some(Some(name)) = inputs.phase.take_changed(&mut self.seen.phase) {
            self.apply_phase(name, now_ms, sink);
        }
        if inputs.capture_nonce.take_changed(&mut self.seen.capture).is_some() {
            if let Choreography::Capture(s) = &mut self.choreo {
                s.ctl.trigger_capture(now_ms, &mut self.graph, sink);
            }
        }
        if inputs.retract_nonce.take_changed(&mut self.seen.retract).is_some() {
            if let Choreography::Capture(s) = &mut self.choreo {
                s.ctl.trigger_retract(now_ms, &mut self.graph, sink);
            }
        }
        if let Choreography::Stage(s) = &mut self.choreo {
            s.animator.set_layer_size(layout.surface_size);
            if let Some(&p) = inputs.collapse_target.take_changed(&mut self.seen.collapse) {
                s.animator.set_collapse_target(p);
            }
        }
    }

    fn apply_phase(&mut self, name: &str, now_ms: f64, sink: &mut impl EventSink) {
        let graph = &mut self.graph;
        let applied = match &mut self.choreo {
            Choreography::Dial(c) => DialPhase::parse(name).map(|p| {
                if p != c.phase() {
                    c.set_phase(p, graph);
                    sink.emit(SceneEvent::PhaseChanged(p.as_str()));
                }
            }),
            Choreography::Capture(s) => {
                CapturePhase::parse(name).map(|p| s.ctl.set_phase(p, now_ms, graph, sink))
            }
            Choreography::Showcase(s) => ShowcasePhase::parse(name).map(|p| s.ctl.set_phase(p)),
            Choreography::Stage(s) => StagePhase::parse(name).map(|p| {
                if p != s.animator.phase() {
                    s.animator.set_phase(p, now_ms);
                    sink.emit(SceneEvent::PhaseChanged(p.as_str()));
                }
            }),
        };
        if applied.is_none() {
            log::warn!("[scene] unknown phase '{}' for {}", name, self.kind.as_str());
        }
    }

    fn advance(&mut self, now_ms: f64, dt: f32, sink: &mut impl EventSink) {
        // A failed asset load keeps the default camera.
        let mut camera = self.camera.clone();
        match &mut self.choreo {
            Choreography::Dial(c) => c.tick(dt, &mut self.graph, sink),
            Choreography::Capture(s) => s.ctl.tick(now_ms, &mut self.graph, &mut camera, sink),
            Choreography::Showcase(s) => s.ctl.tick(&mut self.graph, &mut camera, sink),
            Choreography::Stage(_) => {}
        }
        if !self.degraded {
            self.camera = camera;
        }
    }

    fn project(&mut self, now_ms: f64, layout: &SurfaceLayout, sink: &mut impl EventSink) {
        let (rect, lens) = match &self.choreo {
            Choreography::Stage(s) => {
                let style = s.animator.sample(now_ms);
                if self.sent_layer != Some(style) {
                    self.sent_layer = Some(style);
                    sink.emit(SceneEvent::Layer(style));
                }
                return;
            }
            _ if self.degraded => (None, None),
            Choreography::Dial(_) => return,
            Choreography::Capture(s) => {
                let photo = self.graph.world(s.ctl.photo());
                let rect = self.rect.track(&self.camera, &s.photo_quad, &photo, layout);
                let (center, radius) = match s.lens_override {
                    Some((p, r)) => (self.graph.world(s.root).transform_point3(p), r),
                    None => (self.graph.world_position(s.lens), s.lens_radius),
                };
                let lens = self.lens.track(&self.camera, center, radius, layout);
                (rect, lens)
            }
            Choreography::Showcase(s) => {
                let device = self.graph.world(s.ctl.device());
                let anchors = s.ctl.anchors();
                let rect = self.rect.track(&self.camera, &anchors.screen, &device, layout);
                let lens = self.lens.track(
                    &self.camera,
                    device.transform_point3(anchors.lens),
                    anchors.lens_radius,
                    layout,
                );
                (rect, lens)
            }
        };
        if self.sent_rect != Some(rect) {
            self.sent_rect = Some(rect);
            sink.emit(SceneEvent::ScreenRect(rect));
        }
        if self.sent_lens != Some(lens) {
            self.sent_lens = Some(lens);
            sink.emit(SceneEvent::LensProjected(lens));
        }
    }

    fn handle_pointer(&mut self, now_ms: f64, layout: &SurfaceLayout, sink: &mut impl EventSink) {
        let size = layout.surface_size;
        for input in std::mem::take(&mut self.pointer) {
            match input {
                PointerInput::Move(px) => {
                    self.picker.pointer_move(&self.graph, &self.camera, px, size, sink)
                }
                PointerInput::Leave => self.picker.pointer_leave(sink),
                PointerInput::Down { px, button } => {
                    let Some(hit) =
                        self.picker
                            .pointer_down(&self.graph, &self.camera, px, size, button, sink)
                    else {
                        continue;
                    };
                    match &mut self.choreo {
                        Choreography::Dial(c) => {
                            c.on_intent(hit, &mut self.graph, sink);
                        }
                        Choreography::Capture(s) => {
                            s.ctl.trigger_capture(now_ms, &mut self.graph, sink);
                        }
                        Choreography::Showcase(_) | Choreography::Stage(_) => {}
                    }
                }
            }
        }
        // the scene may have moved under a resting pointer
        self.picker.refresh(&self.graph, &self.camera, size, sink);
    }

    pub fn asset_load_started(&mut self, url: &str, sink: &mut impl EventSink) {
        log::info!("[asset] loading {}", url);
        sink.emit(SceneEvent::StatusChanged {
            kind: StatusKind::Loading,
            message: url.to_string(),
        });
    }

    /// Apply the outcome of a model load. Success installs bounds-derived
    /// anchors; failure is reported once and leaves the scene on its
    /// built-in geometry with the default camera and no overlay targets.
    pub fn asset_loaded(&mut self, result: Result<Aabb, AssetError>, sink: &mut impl EventSink) {
        let anchors = result.and_then(|b| anchors_from_bounds(&b, &self.anchor_config));
        match anchors {
            Ok(anchors) => {
                match &mut self.choreo {
                    Choreography::Showcase(s) => {
                        fit_showcase(&mut self.graph, s.body, s.screen, s.bump, &anchors);
                        s.ctl.install_anchors(anchors);
                    }
                    Choreography::Capture(s) => {
                        s.lens_override = Some((anchors.lens, anchors.lens_radius));
                    }
                    Choreography::Dial(_) | Choreography::Stage(_) => {
                        log::debug!("[asset] {} has no bounds anchors", self.kind.as_str());
                    }
                }
                self.degraded = false;
                self.rect.reset();
                self.lens.reset();
                log::info!("[asset] loaded, bounds {:?}", anchors.bounds);
                sink.emit(SceneEvent::StatusChanged {
                    kind: StatusKind::Ready,
                    message: String::new(),
                });
            }
            Err(e) => {
                log::error!("[asset] load failed: {}", e);
                self.degraded = true;
                let aspect = self.camera.aspect;
                self.camera = Camera {
                    aspect,
                    ..Camera::default()
                };
                self.rect.reset();
                self.lens.reset();
                if !self.load_error_reported {
                    self.load_error_reported = true;
                    sink.emit(SceneEvent::StatusChanged {
                        kind: StatusKind::Error,
                        message: e.to_string(),
                    });
                }
                if self.sent_rect != Some(None) {
                    self.sent_rect = Some(None);
                    sink.emit(SceneEvent::ScreenRect(None));
                }
                if self.sent_lens != Some(None) {
                    self.sent_lens = Some(None);
                    sink.emit(SceneEvent::LensProjected(None));
                }
            }
        }
    }
}
