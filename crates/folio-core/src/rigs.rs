//! Box-assembled scene rigs.
//!
//! Each builder returns the graph plus the node ids its controller and
//! projection targets need, so nothing is looked up by name per frame.

use crate::asset::{builtin_anchors, AnchorConfig, DeviceAnchors};
use crate::assembly::{AssemblyGroup, PartSpec};
use crate::pose::Pose;
use crate::projection::ScreenQuad;
use crate::scene::{NodeDesc, NodeId, SceneGraph, Shape};
use glam::Vec3;
use std::f32::consts::TAU;

const IVORY: [f32; 3] = [0.86, 0.82, 0.72];
const CHARCOAL: [f32; 3] = [0.13, 0.13, 0.15];
const BRASS: [f32; 3] = [0.78, 0.62, 0.32];
const CREAM: [f32; 3] = [0.95, 0.93, 0.88];
const GLASS: [f32; 3] = [0.05, 0.06, 0.08];

const DIAL_HOLES: usize = 10;

pub struct DialRig {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub handset: NodeId,
    pub proxy: NodeId,
    pub plungers: [NodeId; 2],
    pub parts: Vec<(NodeId, PartSpec)>,
}

/// Rotary desk phone: body shell, dial with finger holes, cradle forks,
/// plungers and the handset (with an oversized hit proxy).
pub fn build_dial() -> DialRig {
    let mut g = SceneGraph::new();
    let mut parts = Vec::new();
    let root = g.add(None, NodeDesc::group("phone").at(Vec3::new(0.0, -0.3, 0.0)));

    let base = g.add(
        Some(root),
        NodeDesc::cuboid("base", Vec3::new(2.4, 0.35, 1.9))
            .at(Vec3::new(0.0, -0.55, 0.0))
            .color(CHARCOAL),
    );
    let shell = g.add(
        Some(root),
        NodeDesc::cuboid("shell", Vec3::new(2.0, 0.7, 1.6))
            .at(Vec3::new(0.0, -0.05, -0.05))
            .color(IVORY),
    );
    let face = g.add(
        Some(root),
        NodeDesc::cuboid("face", Vec3::new(1.6, 0.5, 0.35))
            .at(Vec3::new(0.0, 0.05, 0.75))
            .euler(Vec3::new(-0.35, 0.0, 0.0))
            .color(IVORY),
    );
    parts.push((base, PartSpec::new(AssemblyGroup::Body, 0, Vec3::new(0.0, -1.6, 0.0))));
    parts.push((
        shell,
        PartSpec::new(AssemblyGroup::Body, 1, Vec3::new(0.0, 2.2, -0.4)).spin(Vec3::new(0.3, 0.0, 0.0)),
    ));
    parts.push((
        face,
        PartSpec::new(AssemblyGroup::Body, 2, Vec3::new(0.0, 0.4, 1.8)).spin(Vec3::new(-0.6, 0.0, 0.0)),
    ));

    let dial = g.add(
        Some(root),
        NodeDesc::group("dial")
            .at(Vec3::new(0.0, 0.12, 0.95))
            .euler(Vec3::new(-0.35, 0.0, 0.0)),
    );
    let plate = g.add(
        Some(dial),
        NodeDesc::cuboid("dial_plate", Vec3::new(0.95, 0.95, 0.05)).color(CREAM),
    );
    parts.push((
        plate,
        PartSpec::new(AssemblyGroup::Dial, 0, Vec3::new(0.0, 0.0, 2.4)).spin(Vec3::new(0.0, 0.0, 1.2)),
    ));
    for i in 0..DIAL_HOLES {
        // Holes fill about 300° of the ring, leaving the finger-stop gap.
        let a = TAU * (0.1 + 0.83 * i as f32 / DIAL_HOLES as f32);
        let p = Vec3::new(a.cos() * 0.34, a.sin() * 0.34, 0.04);
        let hole = g.add(
            Some(dial),
            NodeDesc::cuboid("dial_hole", Vec3::new(0.1, 0.1, 0.03))
                .at(p)
                .euler(Vec3::new(0.0, 0.0, a))
                .color(CHARCOAL),
        );
        let out = Vec3::new(a.cos(), a.sin(), 1.5) * 0.9;
        parts.push((
            hole,
            PartSpec::new(AssemblyGroup::Dial, 1 + i as u16, out).spin(Vec3::new(0.0, 0.0, -1.5)),
        ));
    }
    let cap = g.add(
        Some(dial),
        NodeDesc::cuboid("dial_cap", Vec3::new(0.22, 0.22, 0.06))
            .at(Vec3::new(0.0, 0.0, 0.05))
            .color(BRASS),
    );
    parts.push((
        cap,
        PartSpec::new(AssemblyGroup::Dial, 1 + DIAL_HOLES as u16, Vec3::new(0.0, 0.0, 2.0)),
    ));

    let mut forks = [root; 2];
    let mut plungers = [root; 2];
    for (k, side) in [-1.0f32, 1.0].into_iter().enumerate() {
        forks[k] = g.add(
            Some(root),
            NodeDesc::cuboid("fork", Vec3::new(0.18, 0.45, 0.3))
                .at(Vec3::new(side * 0.85, 0.45, -0.2))
                .color(IVORY),
        );
        plungers[k] = g.add(
            Some(root),
            NodeDesc::cuboid("plunger", Vec3::new(0.12, 0.12, 0.12))
                .at(Vec3::new(side * 0.55, 0.36, -0.2))
                .color(CHARCOAL),
        );
        parts.push((
            forks[k],
            PartSpec::new(AssemblyGroup::Cradle, k as u16, Vec3::new(side * 1.4, 1.2, 0.0)),
        ));
        parts.push((
            plungers[k],
            PartSpec::new(AssemblyGroup::Cradle, 2 + k as u16, Vec3::new(0.0, 1.4, 0.0)),
        ));
    }

    let handset = g.add(Some(root), NodeDesc::group("handset").at(Vec3::new(0.0, 0.78, -0.2)));
    g.add(
        Some(handset),
        NodeDesc::cuboid("handset_grip", Vec3::new(1.5, 0.18, 0.26)).color(IVORY),
    );
    for side in [-1.0f32, 1.0] {
        g.add(
            Some(handset),
            NodeDesc::cuboid("handset_cup", Vec3::new(0.42, 0.26, 0.4))
                .at(Vec3::new(side * 0.78, -0.08, 0.0))
                .color(IVORY),
        );
    }
    let proxy = g.add(Some(handset), NodeDesc::proxy("handset_hit", 0.95));
    parts.push((
        handset,
        PartSpec::new(AssemblyGroup::Cradle, 4, Vec3::new(0.0, 2.6, 0.6)).spin(Vec3::new(0.0, 0.0, 0.5)),
    ));

    g.update_world();
    DialRig {
        graph: g,
        root,
        handset,
        proxy,
        plungers,
        parts,
    }
}

pub struct CaptureRig {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub lens: NodeId,
    pub lens_radius: f32,
    pub photo: NodeId,
    /// Photo face the host overlays the picture on, in photo-local space.
    pub photo_quad: ScreenQuad,
    pub proxy: NodeId,
    pub slot: Pose,
    pub dock: Pose,
}

/// Instant camera with a front lens and a photo that ejects from the slot.
pub fn build_capture() -> CaptureRig {
    let mut g = SceneGraph::new();
    let root = g.add(None, NodeDesc::group("instant_camera"));
    g.add(
        Some(root),
        NodeDesc::cuboid("body", Vec3::new(2.4, 1.7, 1.3)).color(CREAM),
    );
    g.add(
        Some(root),
        NodeDesc::cuboid("hood", Vec3::new(1.6, 0.45, 1.1))
            .at(Vec3::new(0.0, 1.05, -0.1))
            .color(CREAM),
    );
    g.add(
        Some(root),
        NodeDesc::cuboid("stripe", Vec3::new(2.42, 0.12, 1.32))
            .at(Vec3::new(0.0, -0.35, 0.0))
            .color(CHARCOAL),
    );
    g.add(
        Some(root),
        NodeDesc::cuboid("shutter", Vec3::new(0.22, 0.1, 0.22))
            .at(Vec3::new(0.85, 0.9, 0.35))
            .color([0.85, 0.18, 0.16]),
    );
    let lens = g.add(Some(root), NodeDesc::group("lens").at(Vec3::new(0.0, 0.15, 0.65)));
    g.add(
        Some(lens),
        NodeDesc::cuboid("lens_barrel", Vec3::new(0.85, 0.85, 0.3))
            .at(Vec3::new(0.0, 0.0, 0.15))
            .color(CHARCOAL),
    );
    g.add(
        Some(lens),
        NodeDesc::cuboid("lens_glass", Vec3::new(0.55, 0.55, 0.04))
            .at(Vec3::new(0.0, 0.0, 0.31))
            .color(GLASS),
    );
    g.add(
        Some(root),
        NodeDesc::cuboid("slot", Vec3::new(1.7, 0.05, 0.06))
            .at(Vec3::new(0.0, -0.72, 0.64))
            .color(GLASS),
    );

    let slot = Pose::at(Vec3::new(0.0, -0.1, 0.5));
    let dock = Pose::at(Vec3::new(0.0, -1.75, 0.95)).with_euler(Vec3::new(-0.18, 0.0, 0.0));
    let photo = g.add(
        Some(root),
        NodeDesc::cuboid("photo", Vec3::new(1.45, 1.7, 0.02))
            .at(slot.position)
            .color(CREAM),
    );
    let proxy = g.add(Some(root), NodeDesc::proxy("camera_hit", 1.7));

    g.update_world();
    CaptureRig {
        graph: g,
        root,
        lens,
        lens_radius: 0.42,
        photo,
        photo_quad: ScreenQuad::new(Vec3::new(0.0, 0.12, 0.011), 1.25, 1.25),
        proxy,
        slot,
        dock,
    }
}

pub struct ShowcaseRig {
    pub graph: SceneGraph,
    pub device: NodeId,
    pub body: NodeId,
    pub screen: NodeId,
    pub bump: NodeId,
    pub anchors: DeviceAnchors,
}

/// Slab phone with a dark screen and a rear camera bump.
pub fn build_showcase(config: &AnchorConfig) -> ShowcaseRig {
    let mut g = SceneGraph::new();
    let device = g.add(None, NodeDesc::group("device"));
    let body = g.add(Some(device), NodeDesc::cuboid("body", Vec3::ONE).color(CHARCOAL));
    let screen = g.add(Some(device), NodeDesc::cuboid("screen", Vec3::ONE).color(GLASS));
    let bump = g.add(Some(device), NodeDesc::cuboid("camera_bump", Vec3::ONE).color(CHARCOAL));
    let anchors = builtin_anchors(config);
    fit_showcase(&mut g, body, screen, bump, &anchors);
    g.update_world();
    ShowcaseRig {
        graph: g,
        device,
        body,
        screen,
        bump,
        anchors,
    }
}

/// Resize the showcase boxes to match `anchors`.
pub fn fit_showcase(
    g: &mut SceneGraph,
    body: NodeId,
    screen: NodeId,
    bump: NodeId,
    anchors: &DeviceAnchors,
) {
    let half = anchors.bounds.size() * 0.5;
    g.set_shape(body, Shape::Cuboid { half_extents: half });
    let q = anchors.screen;
    g.set_shape(
        screen,
        Shape::Cuboid {
            half_extents: Vec3::new(q.width * 0.5, q.height * 0.5, 0.002),
        },
    );
    g.set_local(screen, Pose::at(q.center - Vec3::Z * 0.002));
    let r = anchors.lens_radius.max(0.01);
    g.set_shape(
        bump,
        Shape::Cuboid {
            half_extents: Vec3::new(r * 1.6, r * 1.6, 0.02),
        },
    );
    g.set_local(bump, Pose::at(Vec3::new(anchors.lens.x, anchors.lens.y, -half.z - 0.02)));
}
