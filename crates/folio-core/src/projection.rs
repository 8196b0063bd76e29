//! World → screen projection for DOM overlay alignment.
//!
//! Points and quads go local → world (node world matrix) → clip (camera
//! view-projection) → NDC → render-surface pixels, and are finally offset
//! into the overlay container's coordinate space. Everything here works in
//! CSS pixels; the render surface's backing resolution never enters.

use crate::camera::Camera;
use crate::constants::{CORNER_RADIUS_FRACTION, CORNER_RADIUS_MAX_PX, CORNER_RADIUS_MIN_PX};
use glam::{Mat4, Quat, Vec2, Vec3};

const MIN_CLIP_W: f32 = 1e-5;

/// Where the render surface sits relative to the overlay container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceLayout {
    /// Render surface size in CSS pixels.
    pub surface_size: Vec2,
    /// Top-left of the render surface in client coordinates.
    pub canvas_origin: Vec2,
    /// Top-left of the overlay container in client coordinates.
    pub container_origin: Vec2,
}

impl SurfaceLayout {
    pub fn new(surface_size: Vec2) -> Self {
        Self {
            surface_size,
            canvas_origin: Vec2::ZERO,
            container_origin: Vec2::ZERO,
        }
    }

    pub fn with_origins(mut self, canvas_origin: Vec2, container_origin: Vec2) -> Self {
        self.canvas_origin = canvas_origin;
        self.container_origin = container_origin;
        self
    }

    /// Translation from surface pixels to container pixels.
    pub fn offset(&self) -> Vec2 {
        let o = self.canvas_origin - self.container_origin;
        if o.is_finite() {
            o
        } else {
            Vec2::ZERO
        }
    }

    pub fn is_usable(&self) -> bool {
        self.surface_size.is_finite() && self.surface_size.x > 0.0 && self.surface_size.y > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPoint {
    pub x: f32,
    pub y: f32,
    /// NDC depth, `0` at the near plane and `1` at the far plane.
    pub depth: f32,
    /// False when behind the camera or outside the near/far range.
    pub visible: bool,
}

struct Clip {
    px: Vec2,
    depth: f32,
    in_front: bool,
}

fn project_clip(view_proj: &Mat4, world: Vec3, layout: &SurfaceLayout) -> Clip {
    let clip = *view_proj * world.extend(1.0);
    if !clip.is_finite() || clip.w <= MIN_CLIP_W {
        return Clip {
            px: Vec2::NAN,
            depth: f32::NAN,
            in_front: false,
        };
    }
    let ndc = clip.truncate() / clip.w;
    let size = layout.surface_size;
    let px = Vec2::new(
        (ndc.x + 1.0) * 0.5 * size.x,
        (1.0 - ndc.y) * 0.5 * size.y,
    ) + layout.offset();
    Clip {
        px,
        depth: ndc.z,
        in_front: true,
    }
}

/// Project one world-space point.
pub fn project_point(camera: &Camera, world: Vec3, layout: &SurfaceLayout) -> ProjectedPoint {
    let c = project_clip(&camera.view_projection(), world, layout);
    let visible = c.in_front
        && layout.is_usable()
        && c.px.is_finite()
        && (0.0..=1.0).contains(&c.depth);
    ProjectedPoint {
        x: c.px.x,
        y: c.px.y,
        depth: c.depth,
        visible,
    }
}

/// A planar rectangle in some node's local space, facing local +Z when
/// `orientation` is identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenQuad {
    pub center: Vec3,
    pub orientation: Quat,
    pub width: f32,
    pub height: f32,
}

impl ScreenQuad {
    pub fn new(center: Vec3, width: f32, height: f32) -> Self {
        Self {
            center,
            orientation: Quat::IDENTITY,
            width,
            height,
        }
    }

    /// Corners in world space: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self, world: &Mat4) -> [Vec3; 4] {
        let hx = self.width * 0.5;
        let hy = self.height * 0.5;
        let rot = if self.orientation.is_finite() && self.orientation.length_squared() > 1e-12 {
            self.orientation.normalize()
        } else {
            Quat::IDENTITY
        };
        [
            Vec3::new(-hx, hy, 0.0),
            Vec3::new(hx, hy, 0.0),
            Vec3::new(hx, -hy, 0.0),
            Vec3::new(-hx, -hy, 0.0),
        ]
        .map(|c| world.transform_point3(self.center + rot * c))
    }
}

/// Corner radius policy: a fraction of the smaller rect side, clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerRadius {
    pub fraction: f32,
    pub min_px: f32,
    pub max_px: f32,
}

impl Default for CornerRadius {
    fn default() -> Self {
        Self {
            fraction: CORNER_RADIUS_FRACTION,
            min_px: CORNER_RADIUS_MIN_PX,
            max_px: CORNER_RADIUS_MAX_PX,
        }
    }
}

impl CornerRadius {
    /// Never more than half the smaller side.
    pub fn for_size(&self, width: f32, height: f32) -> f32 {
        let lo = self.min_px.min(self.max_px);
        let hi = self.max_px.max(self.min_px);
        let side = width.min(height).max(0.0);
        (side * self.fraction).clamp(lo, hi).min(side * 0.5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

impl ProjectedRect {
    pub fn is_valid(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.radius.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Screen-space bounding rect of a quad, or `None` when any corner is
/// non-finite or behind the camera, or the result is empty.
pub fn project_quad(
    camera: &Camera,
    quad: &ScreenQuad,
    world: &Mat4,
    layout: &SurfaceLayout,
    radius: &CornerRadius,
) -> Option<ProjectedRect> {
    if !layout.is_usable() {
        return None;
    }
    let vp = camera.view_projection();
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for corner in quad.corners(world) {
        let c = project_clip(&vp, corner, layout);
        if !c.in_front || !c.px.is_finite() {
            return None;
        }
        min = min.min(c.px);
        max = max.max(c.px);
    }
    let width = max.x - min.x;
    let height = max.y - min.y;
    let rect = ProjectedRect {
        left: min.x,
        top: min.y,
        width,
        height,
        radius: radius.for_size(width, height),
    };
    rect.is_valid().then_some(rect)
}

/// Keeps the last valid rectangle so overlays hold still through frames in
/// which the quad cannot be projected.
#[derive(Clone, Debug, Default)]
pub struct RectTracker {
    pub radius: CornerRadius,
    last_good: Option<ProjectedRect>,
}

impl RectTracker {
    pub fn new(radius: CornerRadius) -> Self {
        Self {
            radius,
            last_good: None,
        }
    }

    /// Accept a candidate if valid; always answer with the last good rect.
    pub fn update(&mut self, candidate: Option<ProjectedRect>) -> Option<ProjectedRect> {
        if let Some(r) = candidate.filter(ProjectedRect::is_valid) {
            self.last_good = Some(r);
        }
        self.last_good
    }

    pub fn track(
        &mut self,
        camera: &Camera,
        quad: &ScreenQuad,
        world: &Mat4,
        layout: &SurfaceLayout,
    ) -> Option<ProjectedRect> {
        let candidate = project_quad(camera, quad, world, layout, &self.radius);
        self.update(candidate)
    }

    pub fn last(&self) -> Option<ProjectedRect> {
        self.last_good
    }

    pub fn reset(&mut self) {
        self.last_good = None;
    }
}

/// A projected feature point plus its on-screen radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedAnchor {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl ProjectedAnchor {
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.radius.is_finite() && self.radius > 0.0
    }
}

/// Project `center` and derive the on-screen size of a sphere of
/// `world_radius` around it by projecting a point offset along camera right.
pub fn project_anchor(
    camera: &Camera,
    center: Vec3,
    world_radius: f32,
    layout: &SurfaceLayout,
) -> Option<ProjectedAnchor> {
    let c = project_point(camera, center, layout);
    if !c.visible {
        return None;
    }
    let edge = project_point(camera, center + camera.right() * world_radius.abs(), layout);
    if !edge.x.is_finite() || !edge.y.is_finite() {
        return None;
    }
    let anchor = ProjectedAnchor {
        x: c.x,
        y: c.y,
        radius: Vec2::new(edge.x - c.x, edge.y - c.y).length(),
    };
    anchor.is_valid().then_some(anchor)
}

/// Last-good-value holder for anchors, same policy as [`RectTracker`].
#[derive(Clone, Debug, Default)]
pub struct AnchorTracker {
    last_good: Option<ProjectedAnchor>,
}

impl AnchorTracker {
    pub fn update(&mut self, candidate: Option<ProjectedAnchor>) -> Option<ProjectedAnchor> {
        if let Some(a) = candidate.filter(ProjectedAnchor::is_valid) {
            self.last_good = Some(a);
        }
        self.last_good
    }

    pub fn track(
        &mut self,
        camera: &Camera,
        center: Vec3,
        world_radius: f32,
        layout: &SurfaceLayout,
    ) -> Option<ProjectedAnchor> {
        let candidate = project_anchor(camera, center, world_radius, layout);
        self.update(candidate)
    }

    pub fn last(&self) -> Option<ProjectedAnchor> {
        self.last_good
    }

    pub fn reset(&mut self) {
        self.last_good = None;
    }
}
