//! Arena-backed scene graph.
//!
//! Nodes are stored in insertion order and a child can only be added to an
//! existing node, so every parent index is smaller than its children's. That
//! lets [`SceneGraph::update_world`] compose world transforms top-down with a
//! single forward pass. Parents own their child id lists; children keep a
//! plain parent index used only for transform composition.

use crate::pose::Pose;
use glam::{Mat4, Vec3};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn from_half_extents(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half.abs(), center + half.abs())
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after an affine transform.
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        let corners = self.corners();
        let first = m.transform_point3(corners[0]);
        let mut out = Aabb {
            min: first,
            max: first,
        };
        for c in &corners[1..] {
            let p = m.transform_point3(*c);
            out.min = out.min.min(p);
            out.max = out.max.max(p);
        }
        out
    }
}

/// Geometry attached to a node. Spheres are only ever hit proxies; the
/// renderer draws cuboids.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Group,
    Cuboid { half_extents: Vec3 },
    Sphere { radius: f32 },
}

/// Construction record for a node.
#[derive(Clone, Debug)]
pub struct NodeDesc {
    pub name: String,
    pub local: Pose,
    pub shape: Shape,
    pub color: [f32; 4],
    pub visible: bool,
}

impl NodeDesc {
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            local: Pose::IDENTITY,
            shape: Shape::Group,
            color: [1.0, 1.0, 1.0, 1.0],
            visible: true,
        }
    }

    pub fn cuboid(name: &str, size: Vec3) -> Self {
        Self {
            shape: Shape::Cuboid {
                half_extents: size.abs() * 0.5,
            },
            ..Self::group(name)
        }
    }

    /// Invisible sphere used to enlarge a hit area.
    pub fn proxy(name: &str, radius: f32) -> Self {
        Self {
            shape: Shape::Sphere {
                radius: radius.abs(),
            },
            visible: false,
            ..Self::group(name)
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.local = Pose::new(position, self.local.rotation, self.local.scale);
        self
    }

    pub fn euler(mut self, euler: Vec3) -> Self {
        self.local = self.local.with_euler(euler);
        self
    }

    pub fn color(mut self, rgb: [f32; 3]) -> Self {
        self.color = [rgb[0], rgb[1], rgb[2], 1.0];
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub shape: Shape,
    pub color: [f32; 4],
    pub visible: bool,
    local: Pose,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    world: Mat4,
    world_visible: bool,
}

impl Node {
    pub fn local(&self) -> &Pose {
        &self.local
    }
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
    /// World transform as of the last [`SceneGraph::update_world`].
    pub fn world(&self) -> &Mat4 {
        &self.world
    }
    /// Visible and every ancestor visible, as of the last world update.
    pub fn world_visible(&self) -> bool {
        self.world_visible
    }
}

/// One drawable cuboid for the renderer: a unit cube model matrix and color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawInstance {
    pub model: Mat4,
    pub color: [f32; 4],
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node. `parent` must already exist; an unknown parent attaches
    /// the node at the root.
    pub fn add(&mut self, parent: Option<NodeId>, desc: NodeDesc) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = parent.filter(|p| p.index() < self.nodes.len());
        if let Some(p) = parent {
            self.nodes[p.index()].children.push(id);
        }
        let local = desc.local.sanitized();
        self.nodes.push(Node {
            name: desc.name,
            shape: desc.shape,
            color: desc.color,
            visible: desc.visible,
            local,
            parent,
            children: SmallVec::new(),
            world: local.to_mat4(),
            world_visible: desc.visible,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Build-time lookup. Not meant for per-frame use.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    pub fn local(&self, id: NodeId) -> Pose {
        self.node(id).map(|n| n.local).unwrap_or_default()
    }

    pub fn set_local(&mut self, id: NodeId, pose: Pose) {
        if let Some(n) = self.nodes.get_mut(id.index()) {
            n.local = pose.sanitized();
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(n) = self.nodes.get_mut(id.index()) {
            n.visible = visible;
        }
    }

    pub fn set_shape(&mut self, id: NodeId, shape: Shape) {
        if let Some(n) = self.nodes.get_mut(id.index()) {
            n.shape = shape;
        }
    }

    pub fn world(&self, id: NodeId) -> Mat4 {
        self.node(id).map(|n| n.world).unwrap_or(Mat4::IDENTITY)
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world(id).w_axis.truncate()
    }

    /// Recompute every world transform from the locals, parents first.
    pub fn update_world(&mut self) {
        for i in 0..self.nodes.len() {
            let (parent_world, parent_visible) = match self.nodes[i].parent {
                Some(p) => {
                    let pn = &self.nodes[p.index()];
                    (pn.world, pn.world_visible)
                }
                None => (Mat4::IDENTITY, true),
            };
            let n = &mut self.nodes[i];
            n.world = parent_world * n.local.to_mat4();
            n.world_visible = parent_visible && n.visible;
        }
    }

    /// `id` followed by all of its descendants, depth first.
    pub fn subtree(&self, id: NodeId) -> SmallVec<[NodeId; 16]> {
        let mut out = SmallVec::new();
        if self.node(id).is_none() {
            return out;
        }
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(n) = stack.pop() {
            out.push(n);
            for c in self.nodes[n.index()].children.iter().rev() {
                stack.push(*c);
            }
        }
        out
    }

    /// Whether `node` is `root` or one of its descendants.
    pub fn is_within(&self, node: NodeId, root: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(c) = cur {
            if c == root {
                return true;
            }
            cur = self.node(c).and_then(|n| n.parent);
        }
        false
    }

    /// World-space bounds of every cuboid in the subtree of `id`.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let mut acc: Option<Aabb> = None;
        for n in self.subtree(id) {
            let node = &self.nodes[n.index()];
            if let Shape::Cuboid { half_extents } = node.shape {
                let b = Aabb::from_half_extents(Vec3::ZERO, half_extents).transformed(&node.world);
                acc = Some(match acc {
                    Some(a) => a.union(&b),
                    None => b,
                });
            }
        }
        acc
    }

    /// Visible cuboids as unit-cube instances.
    pub fn instances(&self) -> Vec<DrawInstance> {
        self.nodes
            .iter()
            .filter(|n| n.world_visible)
            .filter_map(|n| match n.shape {
                Shape::Cuboid { half_extents } => Some(DrawInstance {
                    model: n.world * Mat4::from_scale(half_extents * 2.0),
                    color: n.color,
                }),
                _ => None,
            })
            .collect()
    }
}
