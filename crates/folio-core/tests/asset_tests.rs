use folio_core::asset::*;
use folio_core::Aabb;
use glam::Vec3;

const MESH_JSON: &str = r#"{
  "accessors": [{"min": [-1, -2, -0.5], "max": [1, 2, 0.5]}],
  "meshes": [{"primitives": [{"attributes": {"POSITION": 0, "NORMAL": 1}}]}],
  "nodes": [{"mesh": 0, "translation": [0, 1, 0]}]
}"#;

fn glb(json: &str, version: u32) -> Vec<u8> {
    let mut chunk = json.as_bytes().to_vec();
    while chunk.len() % 4 != 0 {
        chunk.push(b' ');
    }
    let total = 12 + 8 + chunk.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&chunk);
    out
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < 1e-5
}

#[test]
fn bounds_follow_node_translation() {
    let b = glb_bounds(&glb(MESH_JSON, 2)).expect("bounds");
    assert_eq!(b.min, Vec3::new(-1.0, -1.0, -0.5));
    assert_eq!(b.max, Vec3::new(1.0, 3.0, 0.5));
}

#[test]
fn nested_nodes_compose_transforms() {
    let json = r#"{
      "accessors": [{"min": [-1, -2, -0.5], "max": [1, 2, 0.5]}],
      "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
      "nodes": [{"children": [1], "scale": [2, 2, 2]}, {"mesh": 0}]
    }"#;
    let b = gltf_bounds(json.as_bytes()).expect("bounds");
    assert!(close(b.min, Vec3::new(-2.0, -4.0, -1.0)));
    assert!(close(b.max, Vec3::new(2.0, 4.0, 1.0)));
}

#[test]
fn unplaced_meshes_fall_back_to_raw_bounds() {
    let json = r#"{
      "accessors": [{"min": [0, 0, 0], "max": [1, 1, 1]}],
      "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}]
    }"#;
    let b = gltf_bounds(json.as_bytes()).expect("bounds");
    assert_eq!(b, Aabb::new(Vec3::ZERO, Vec3::ONE));
}

#[test]
fn container_errors() {
    let good = glb(MESH_JSON, 2);

    let mut bad = good.clone();
    bad[0] = b'x';
    assert!(matches!(glb_bounds(&bad), Err(AssetError::BadMagic(_))));

    assert!(matches!(
        glb_bounds(&glb(MESH_JSON, 1)),
        Err(AssetError::UnsupportedVersion(1))
    ));
    assert!(matches!(glb_bounds(&good[..6]), Err(AssetError::Truncated(_))));
    assert!(matches!(glb_bounds(&[]), Err(AssetError::Truncated(0))));

    // Header claims more than the chunk carries
    let mut short = good.clone();
    short.truncate(40);
    assert!(matches!(glb_bounds(&short), Err(AssetError::Truncated(_))));

    // Header only, no chunks
    let mut empty = Vec::new();
    empty.extend_from_slice(b"glTF");
    empty.extend_from_slice(&2u32.to_le_bytes());
    empty.extend_from_slice(&12u32.to_le_bytes());
    assert!(matches!(glb_bounds(&empty), Err(AssetError::MissingJson)));
}

#[test]
fn json_errors() {
    assert!(matches!(
        glb_bounds(&glb("{not json", 2)),
        Err(AssetError::Json(_))
    ));
    let no_position = r#"{
      "accessors": [{"min": [0, 0, 0], "max": [1, 1, 1]}],
      "meshes": [{"primitives": [{"attributes": {"NORMAL": 0}}]}],
      "nodes": [{"mesh": 0}]
    }"#;
    assert!(matches!(
        gltf_bounds(no_position.as_bytes()),
        Err(AssetError::NoBounds)
    ));
    let missing_minmax = r#"{
      "accessors": [{}],
      "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
      "nodes": [{"mesh": 0}]
    }"#;
    assert!(matches!(
        gltf_bounds(missing_minmax.as_bytes()),
        Err(AssetError::NoBounds)
    ));
}

#[test]
fn anchors_fit_to_height() {
    let bounds = Aabb::new(Vec3::new(-1.0, -1.0, -0.5), Vec3::new(1.0, 3.0, 0.5));
    let config = AnchorConfig::default();
    let a = anchors_from_bounds(&bounds, &config).expect("anchors");

    assert!(close(a.bounds.min, Vec3::new(-0.6, -1.2, -0.3)));
    assert!(close(a.bounds.max, Vec3::new(0.6, 1.2, 0.3)));
    assert!(close(a.screen.center, Vec3::new(0.0, 0.0, 0.302)));
    assert!((a.screen.width - 1.056).abs() < 1e-5);
    assert!((a.screen.height - 2.112).abs() < 1e-5);
    assert!(close(a.lens, Vec3::new(-0.336, 0.912, -0.302)));
    assert!((a.lens_radius - 0.096).abs() < 1e-5);
}

#[test]
fn degenerate_bounds_have_no_anchors() {
    let flat = Aabb::new(Vec3::ONE, Vec3::ONE);
    assert!(matches!(
        anchors_from_bounds(&flat, &AnchorConfig::default()),
        Err(AssetError::NoBounds)
    ));
    let nan = Aabb {
        min: Vec3::NAN,
        max: Vec3::ONE,
    };
    assert!(anchors_from_bounds(&nan, &AnchorConfig::default()).is_err());
}

#[test]
fn builtin_anchors_sit_on_front_face() {
    let a = builtin_anchors(&AnchorConfig::default());
    assert!((a.bounds.size().y - 2.4).abs() < 1e-5);
    assert!(a.screen.center.z > a.bounds.max.z);
    assert!(a.screen.width < a.bounds.size().x);
    assert!(a.lens_radius > 0.0);
}
