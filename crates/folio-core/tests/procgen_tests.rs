use folio_core::procgen::*;
use folio_core::texture::*;
use glam::Vec2;

#[test]
fn default_field_has_exact_counts_and_repeats() {
    let params = ConstellationParams::default();
    let a = generate_point_field(&params).expect("field");
    assert_eq!(a.points.len(), 1220);
    assert_eq!(a.edges.len(), 814);
    let b = generate_point_field(&params).expect("field");
    assert_eq!(a, b);
}

#[test]
fn points_stay_inside_rounded_rect() {
    let field = generate_point_field(&ConstellationParams::default()).expect("field");
    assert_eq!(field.bounds.size(), Vec2::new(0.5, 1.0));
    for p in &field.points {
        assert!(p.is_finite());
        assert!(field.bounds.sdf(*p) <= 1e-5, "{p:?} outside");
    }
}

#[test]
fn edges_are_ordered_unique_and_sorted() {
    let field = generate_point_field(&ConstellationParams::default()).expect("field");
    let mut seen = std::collections::HashSet::new();
    for e in &field.edges {
        assert!(e.a < e.b);
        assert!((e.b as usize) < field.points.len());
        assert!(seen.insert((e.a, e.b)), "duplicate edge {e:?}");
        let len = field.points[e.a as usize].distance(field.points[e.b as usize]);
        assert!((len - e.length).abs() < 1e-6);
    }
    for w in field.edges.windows(2) {
        assert!(w[0].length <= w[1].length);
    }
}

#[test]
fn seed_changes_layout() {
    let a = generate_point_field(&ConstellationParams::default()).expect("field");
    let b = generate_point_field(&ConstellationParams {
        seed: 99,
        ..ConstellationParams::default()
    })
    .expect("field");
    assert_ne!(a.points, b.points);
}

#[test]
fn small_field_fills_complete_graph() {
    let params = ConstellationParams {
        points: 10,
        edges: 45,
        ..ConstellationParams::default()
    };
    let field = generate_point_field(&params).expect("field");
    assert_eq!(field.edges.len(), 45);

    let err = generate_point_field(&ConstellationParams { edges: 46, ..params }).unwrap_err();
    assert_eq!(
        err,
        ProcgenError::TooManyEdges {
            requested: 46,
            points: 10,
            max: 45
        }
    );
}

#[test]
fn empty_field_is_allowed() {
    let field = generate_point_field(&ConstellationParams {
        points: 0,
        edges: 0,
        ..ConstellationParams::default()
    })
    .expect("field");
    assert!(field.points.is_empty());
    assert!(field.edges.is_empty());
}

#[test]
fn bad_aspect_is_rejected() {
    for aspect in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let r = generate_point_field(&ConstellationParams {
            aspect,
            ..ConstellationParams::default()
        });
        assert!(matches!(r, Err(ProcgenError::InvalidAspect(_))));
    }
}

#[test]
fn rounded_rect_cuts_corners() {
    let r = RoundedRect::with_aspect(0.5, 0.18);
    assert!(r.contains(Vec2::ZERO));
    assert!(r.contains(Vec2::new(0.24, 0.0)));
    assert!(!r.contains(Vec2::new(0.249, 0.499)));
    assert!(!r.contains(Vec2::new(0.3, 0.0)));
    assert!(r.sdf(Vec2::ZERO) < 0.0);
}

#[test]
fn seeded_rng_repeats() {
    let mut a = SeededRng::new(5);
    let mut b = SeededRng::new(5);
    for _ in 0..32 {
        let v = a.next_f32();
        assert_eq!(v, b.next_f32());
        assert!((0.0..1.0).contains(&v));
    }
    assert_eq!(a.index(0), 0);
    assert!(a.index(3) < 3);
}

#[test]
fn backdrop_is_opaque_and_repeatable() {
    let a = backdrop(3, 64, 48).expect("backdrop");
    let b = backdrop(3, 64, 48).expect("backdrop");
    assert_eq!(a, b);
    assert_eq!(a.as_bytes().len(), 64 * 48 * 4);
    assert!(a.pixels().iter().all(|p| p.a == 255));
    assert_ne!(a, backdrop(4, 64, 48).expect("backdrop"));
}

#[test]
fn empty_and_mismatched_textures_error() {
    assert_eq!(
        TextureBuffer::new(0, 4).unwrap_err(),
        ProcgenError::EmptyTexture { width: 0, height: 4 }
    );
    let mut base = TextureBuffer::new(4, 4).expect("tex");
    let top = TextureBuffer::new(4, 2).expect("tex");
    assert_eq!(
        base.blend_over(&top).unwrap_err(),
        ProcgenError::SizeMismatch {
            expected: (4, 4),
            actual: (4, 2)
        }
    );
}

#[test]
fn source_over_compositing() {
    let red = Rgba8::new(255, 0, 0, 255);
    let blue = Rgba8::new(0, 0, 255, 255);
    assert_eq!(red.over(blue), red);
    assert_eq!(Rgba8::TRANSPARENT.over(blue), blue);
    assert_eq!(Rgba8::TRANSPARENT.over(Rgba8::TRANSPARENT), Rgba8::TRANSPARENT);

    let mut tex = TextureBuffer::filled(2, 2, blue).expect("tex");
    tex.blend(1, 1, red);
    tex.blend(5, 5, red);
    assert_eq!(tex.get(1, 1), Some(red));
    assert_eq!(tex.get(0, 0), Some(blue));
    assert_eq!(tex.get(2, 0), None);
}

#[test]
fn rasterized_field_marks_pixels() {
    let field = generate_point_field(&ConstellationParams::default()).expect("field");
    let dot = Rgba8::new(255, 255, 255, 255);
    let tex = rasterize_point_field(&field, 64, 128, Rgba8::new(200, 200, 255, 80), dot)
        .expect("tex");
    let lit = tex.pixels().iter().filter(|p| p.a > 0).count();
    assert!(lit > 100);
    assert!(tex.pixels().iter().any(|p| *p == dot));
}
