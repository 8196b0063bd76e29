//! Bounds of binary glTF models and the overlay anchors derived from them.
//!
//! Only what is needed to place overlays is read: the JSON chunk's
//! accessors, meshes and node transforms. Vertex data is never touched; the
//! `min`/`max` that glTF requires on `POSITION` accessors give the bounds.

use crate::projection::ScreenQuad;
use crate::scene::Aabb;
use fnv::FnvHashMap;
use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;
use thiserror::Error;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("not a binary glTF file (magic {0:#010x})")]
    BadMagic(u32),
    #[error("unsupported glTF container version {0}")]
    UnsupportedVersion(u32),
    #[error("truncated glTF container at byte {0}")]
    Truncated(usize),
    #[error("glTF container has no JSON chunk")]
    MissingJson,
    #[error("glTF JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model has no POSITION bounds")]
    NoBounds,
    #[error("fetch failed: {0}")]
    Fetch(String),
}

#[derive(Debug, Default, Deserialize)]
struct Gltf {
    #[serde(default)]
    accessors: Vec<Accessor>,
    #[serde(default)]
    meshes: Vec<Mesh>,
    #[serde(default)]
    nodes: Vec<GltfNode>,
}

#[derive(Debug, Default, Deserialize)]
struct Accessor {
    #[serde(default)]
    min: Option<Vec<f32>>,
    #[serde(default)]
    max: Option<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct Mesh {
    #[serde(default)]
    primitives: Vec<Primitive>,
}

#[derive(Debug, Deserialize)]
struct Primitive {
    #[serde(default)]
    attributes: FnvHashMap<String, usize>,
}

#[derive(Debug, Default, Deserialize)]
struct GltfNode {
    #[serde(default)]
    mesh: Option<usize>,
    #[serde(default)]
    children: Vec<usize>,
    #[serde(default)]
    matrix: Option<[f32; 16]>,
    #[serde(default)]
    translation: Option<[f32; 3]>,
    #[serde(default)]
    rotation: Option<[f32; 4]>,
    #[serde(default)]
    scale: Option<[f32; 3]>,
}

impl GltfNode {
    fn local(&self) -> Mat4 {
        if let Some(m) = self.matrix {
            return Mat4::from_cols_array(&m);
        }
        let t = self.translation.map(Vec3::from_array).unwrap_or(Vec3::ZERO);
        let r = self
            .rotation
            .map(Quat::from_array)
            .filter(|q| q.is_finite() && q.length_squared() > 1e-12)
            .map(Quat::normalize)
            .unwrap_or(Quat::IDENTITY);
        let s = self.scale.map(Vec3::from_array).unwrap_or(Vec3::ONE);
        Mat4::from_scale_rotation_translation(s, r, t)
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, AssetError> {
    let raw = bytes.get(at..at + 4).ok_or(AssetError::Truncated(at))?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// JSON chunk of a GLB container.
pub fn glb_json(bytes: &[u8]) -> Result<&[u8], AssetError> {
    let magic = read_u32(bytes, 0)?;
    if magic != GLB_MAGIC {
        return Err(AssetError::BadMagic(magic));
    }
    let version = read_u32(bytes, 4)?;
    if version != GLB_VERSION {
        return Err(AssetError::UnsupportedVersion(version));
    }
    let total = (read_u32(bytes, 8)? as usize).min(bytes.len());
    let mut at = HEADER_LEN;
    while at + CHUNK_HEADER_LEN <= total {
        let len = read_u32(bytes, at)? as usize;
        let kind = read_u32(bytes, at + 4)?;
        let start = at + CHUNK_HEADER_LEN;
        let end = start.checked_add(len).ok_or(AssetError::Truncated(start))?;
        if end > total {
            return Err(AssetError::Truncated(total));
        }
        if kind == CHUNK_JSON {
            return Ok(&bytes[start..end]);
        }
        at = end;
    }
    Err(AssetError::MissingJson)
}

fn accessor_bounds(doc: &Gltf, index: usize) -> Option<Aabb> {
    let acc = doc.accessors.get(index)?;
    let (min, max) = (acc.min.as_ref()?, acc.max.as_ref()?);
    if min.len() < 3 || max.len() < 3 {
        return None;
    }
    let b = Aabb::new(
        Vec3::new(min[0], min[1], min[2]),
        Vec3::new(max[0], max[1], max[2]),
    );
    b.is_valid().then_some(b)
}

fn mesh_bounds(doc: &Gltf, mesh: usize) -> Option<Aabb> {
    doc.meshes
        .get(mesh)?
        .primitives
        .iter()
        .filter_map(|p| p.attributes.get("POSITION"))
        .filter_map(|&a| accessor_bounds(doc, a))
        .reduce(|a, b| a.union(&b))
}

fn union(acc: Option<Aabb>, b: Aabb) -> Option<Aabb> {
    Some(match acc {
        Some(a) => a.union(&b),
        None => b,
    })
}

/// Bounds of every mesh in a glTF JSON document, in model space.
pub fn gltf_bounds(json: &[u8]) -> Result<Aabb, AssetError> {
    let doc: Gltf = serde_json::from_slice(json)?;
    let n = doc.nodes.len();
    let mut is_child = vec![false; n];
    for node in &doc.nodes {
        for &c in &node.children {
            if let Some(flag) = is_child.get_mut(c) {
                *flag = true;
            }
        }
    }

    let mut acc: Option<Aabb> = None;
    let mut visited = vec![false; n];
    let mut stack: Vec<(usize, Mat4)> = (0..n)
        .filter(|&i| !is_child[i])
        .map(|i| (i, Mat4::IDENTITY))
        .collect();
    while let Some((i, parent)) = stack.pop() {
        if std::mem::replace(&mut visited[i], true) {
            continue;
        }
        let node = &doc.nodes[i];
        let world = parent * node.local();
        if let Some(b) = node.mesh.and_then(|m| mesh_bounds(&doc, m)) {
            let b = b.transformed(&world);
            if b.is_valid() {
                acc = union(acc, b);
            }
        }
        stack.extend(node.children.iter().filter(|&&c| c < n).map(|&c| (c, world)));
    }

    // Meshes not placed by any node still count, untransformed.
    if acc.is_none() {
        for m in 0..doc.meshes.len() {
            if let Some(b) = mesh_bounds(&doc, m) {
                acc = union(acc, b);
            }
        }
    }
    acc.ok_or(AssetError::NoBounds)
}

/// Model-space bounds of a `.glb` file.
pub fn glb_bounds(bytes: &[u8]) -> Result<Aabb, AssetError> {
    gltf_bounds(glb_json(bytes)?)
}

/// Where overlay anchors sit relative to a device's bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorConfig {
    /// Height of the device once fitted into the scene.
    pub fit_height: f32,
    /// Screen inset from each side, as a fraction of width/height.
    pub bezel: f32,
    /// Lens position inside the bounds, each axis in `[0, 1]`.
    pub lens: Vec3,
    /// Lens radius as a fraction of device width.
    pub lens_radius: f32,
    /// Gap between faces and the anchors placed on them.
    pub face_offset: f32,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            fit_height: 2.4,
            bezel: 0.06,
            lens: Vec3::new(0.22, 0.88, 0.0),
            lens_radius: 0.08,
            face_offset: 0.002,
        }
    }
}

/// Overlay anchors in device-local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceAnchors {
    /// Front face screen, facing +Z.
    pub screen: ScreenQuad,
    pub lens: Vec3,
    pub lens_radius: f32,
    /// Device bounds after fitting.
    pub bounds: Aabb,
}

/// Fit `bounds` to `config.fit_height` around the origin and derive the
/// anchors in that fitted space.
pub fn anchors_from_bounds(bounds: &Aabb, config: &AnchorConfig) -> Result<DeviceAnchors, AssetError> {
    let size = bounds.size();
    if !bounds.is_valid() || size.max_element() <= 0.0 {
        return Err(AssetError::NoBounds);
    }
    Ok(fit_anchors(size, config))
}

/// Built-in phone-shaped device used until (or instead of) a loaded model.
pub fn builtin_anchors(config: &AnchorConfig) -> DeviceAnchors {
    fit_anchors(BUILTIN_DEVICE_SIZE, config)
}

const BUILTIN_DEVICE_SIZE: Vec3 = Vec3::new(0.72, 1.5, 0.08);

fn fit_anchors(size: Vec3, config: &AnchorConfig) -> DeviceAnchors {
    let reference = if size.y > 1e-6 { size.y } else { size.max_element() };
    let s = config.fit_height.abs().max(1e-3) / reference;
    let half = size * s * 0.5;
    let fitted = Aabb::new(-half, half);

    let bezel = config.bezel.clamp(0.0, 0.45);
    let screen = ScreenQuad::new(
        Vec3::new(0.0, 0.0, half.z + config.face_offset),
        half.x * 2.0 * (1.0 - 2.0 * bezel),
        half.y * 2.0 * (1.0 - 2.0 * bezel),
    );
    let l = config.lens.clamp(Vec3::ZERO, Vec3::ONE);
    let mut lens = fitted.min + (fitted.max - fitted.min) * l;
    lens.z += if l.z >= 0.5 {
        config.face_offset
    } else {
        -config.face_offset
    };
    DeviceAnchors {
        screen,
        lens,
        lens_radius: config.lens_radius.abs() * half.x * 2.0,
        bounds: fitted,
    }
}
