//! Events raised toward the host page.
//!
//! Controllers never hold host callbacks; they emit into an [`EventSink`].
//! The web frontend collects a frame's events into a `Vec` and dispatches
//! them to JavaScript once the frame has released its borrows.

use crate::projection::{ProjectedAnchor, ProjectedRect};
use crate::scene::NodeId;
use crate::stage::LayerStyle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Ready,
    Error,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Loading => "loading",
            StatusKind::Ready => "ready",
            StatusKind::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    Ready,
    CaptureStart,
    EjectDone,
    RetractDone,
    Assembled,
    Answered,
    HungUp,
    PhaseChanged(&'static str),
    HoverChanged(bool),
    Intent(NodeId),
    StatusChanged { kind: StatusKind, message: String },
    /// `None` hides the overlay: no valid rect has been produced yet, or the
    /// target was dropped after an asset failure.
    ScreenRect(Option<ProjectedRect>),
    LensProjected(Option<ProjectedAnchor>),
    Layer(LayerStyle),
}

impl SceneEvent {
    /// Stable event name handed to the host.
    pub fn name(&self) -> &'static str {
        match self {
            SceneEvent::Ready => "ready",
            SceneEvent::CaptureStart => "captureStart",
            SceneEvent::EjectDone => "ejectDone",
            SceneEvent::RetractDone => "retractDone",
            SceneEvent::Assembled => "assembled",
            SceneEvent::Answered => "answered",
            SceneEvent::HungUp => "hungUp",
            SceneEvent::PhaseChanged(_) => "phase",
            SceneEvent::HoverChanged(_) => "hover",
            SceneEvent::Intent(_) => "intent",
            SceneEvent::StatusChanged { .. } => "status",
            SceneEvent::ScreenRect(_) => "screenRect",
            SceneEvent::LensProjected(_) => "lensProject",
            SceneEvent::Layer(_) => "layer",
        }
    }
}

pub trait EventSink {
    fn emit(&mut self, event: SceneEvent);
}

impl EventSink for Vec<SceneEvent> {
    fn emit(&mut self, event: SceneEvent) {
        self.push(event);
    }
}
