//! Pointer ray picking against interactive scene nodes.

use crate::camera::{Camera, Ray};
use crate::events::{EventSink, SceneEvent};
use crate::scene::{NodeId, SceneGraph, Shape};
use glam::{Mat4, Vec2, Vec3};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Pointer,
}

impl CursorHint {
    pub fn as_css(self) -> &'static str {
        match self {
            CursorHint::Default => "default",
            CursorHint::Pointer => "pointer",
        }
    }
}

/// Nearest non-negative hit distance along a unit-direction ray. A ray
/// starting inside the sphere hits its far side.
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 || !disc.is_finite() {
        return None;
    }
    let s = disc.sqrt();
    let t = -b - s;
    if t >= 0.0 {
        Some(t)
    } else {
        let far = -b + s;
        (far >= 0.0).then_some(far)
    }
}

/// Slab test of a ray against the box `[-half, half]` of a node, done in the
/// node's local space. `t` is returned in world ray units.
pub fn ray_obb(ray: &Ray, world: &Mat4, half: Vec3) -> Option<f32> {
    let det = world.determinant();
    if !det.is_finite() || det.abs() < 1e-12 {
        return None;
    }
    let inv = world.inverse();
    let o = inv.transform_point3(ray.origin);
    let d = inv.transform_vector3(ray.dir);
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (oa, da, ha) = (o[axis], d[axis], half[axis]);
        if da.abs() < 1e-12 {
            if oa < -ha || oa > ha {
                return None;
            }
            continue;
        }
        let t1 = (-ha - oa) / da;
        let t2 = (ha - oa) / da;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return None;
        }
    }
    if t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}

fn hit_node(graph: &SceneGraph, id: NodeId, ray: &Ray) -> Option<f32> {
    let node = graph.node(id)?;
    let world = node.world();
    match node.shape {
        Shape::Group => None,
        Shape::Cuboid { half_extents } => ray_obb(ray, world, half_extents),
        Shape::Sphere { radius } => {
            let center = world.transform_point3(Vec3::ZERO);
            let s = world
                .x_axis
                .truncate()
                .length()
                .max(world.y_axis.truncate().length())
                .max(world.z_axis.truncate().length());
            ray_sphere(ray.origin, ray.dir, center, radius * s)
        }
    }
}

/// Hover and click resolution for a fixed set of interactive roots.
///
/// Hidden nodes still count, so invisible proxies can widen a hit area.
#[derive(Clone, Debug, Default)]
pub struct PointerPicker {
    targets: SmallVec<[NodeId; 4]>,
    interactive: bool,
    hover: bool,
    last_px: Option<Vec2>,
}

impl PointerPicker {
    pub fn new(targets: &[NodeId]) -> Self {
        Self {
            targets: targets.iter().copied().collect(),
            interactive: true,
            hover: false,
            last_px: None,
        }
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    pub fn set_targets(&mut self, targets: &[NodeId]) {
        self.targets = targets.iter().copied().collect();
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn hover(&self) -> bool {
        self.hover
    }

    pub fn cursor(&self) -> CursorHint {
        if self.hover {
            CursorHint::Pointer
        } else {
            CursorHint::Default
        }
    }

    /// Turning interactivity off clears hover (reported once).
    pub fn set_interactive(&mut self, on: bool, sink: &mut impl EventSink) {
        self.interactive = on;
        if !on {
            self.set_hover(false, sink);
        }
    }

    fn set_hover(&mut self, hover: bool, sink: &mut impl EventSink) {
        if self.hover != hover {
            self.hover = hover;
            sink.emit(SceneEvent::HoverChanged(hover));
        }
    }

    /// Closest hit among all nodes of the interactive subtrees.
    pub fn hit_test(&self, graph: &SceneGraph, ray: &Ray) -> Option<(NodeId, f32)> {
        let mut best: Option<(NodeId, f32)> = None;
        for &root in &self.targets {
            for id in graph.subtree(root) {
                if let Some(t) = hit_node(graph, id, ray) {
                    if best.map_or(true, |(_, bt)| t < bt) {
                        best = Some((id, t));
                    }
                }
            }
        }
        best
    }

    fn pick(&self, graph: &SceneGraph, camera: &Camera, px: Vec2, size: Vec2) -> Option<NodeId> {
        if !px.is_finite() || !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
            return None;
        }
        let ray = camera.screen_ray(px, size);
        self.hit_test(graph, &ray).map(|(id, _)| id)
    }

    /// Pointer moved to `px` (surface CSS pixels).
    pub fn pointer_move(
        &mut self,
        graph: &SceneGraph,
        camera: &Camera,
        px: Vec2,
        size: Vec2,
        sink: &mut impl EventSink,
    ) {
        self.last_px = Some(px);
        let hover = self.interactive && self.pick(graph, camera, px, size).is_some();
        self.set_hover(hover, sink);
    }

    /// Re-test the last pointer position against the current graph and
    /// camera. Nothing happens once the pointer has left.
    pub fn refresh(
        &mut self,
        graph: &SceneGraph,
        camera: &Camera,
        size: Vec2,
        sink: &mut impl EventSink,
    ) {
        if let Some(px) = self.last_px {
            let hover = self.interactive && self.pick(graph, camera, px, size).is_some();
            self.set_hover(hover, sink);
        }
    }

    pub fn pointer_leave(&mut self, sink: &mut impl EventSink) {
        self.last_px = None;
        self.set_hover(false, sink);
    }

    /// Press with `button` (0 = primary). Returns the hit node when an
    /// intent was raised.
    pub fn pointer_down(
        &mut self,
        graph: &SceneGraph,
        camera: &Camera,
        px: Vec2,
        size: Vec2,
        button: i16,
        sink: &mut impl EventSink,
    ) -> Option<NodeId> {
        if !self.interactive || button != 0 {
            return None;
        }
        let hit = self.pick(graph, camera, px, size)?;
        sink.emit(SceneEvent::Intent(hit));
        Some(hit)
    }
}
