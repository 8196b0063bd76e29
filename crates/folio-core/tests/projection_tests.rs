use folio_core::*;
use glam::{Mat4, Quat, Vec2, Vec3};

fn layout() -> SurfaceLayout {
    SurfaceLayout::new(Vec2::new(800.0, 800.0))
}

fn unit_quad() -> ScreenQuad {
    ScreenQuad::new(Vec3::ZERO, 1.0, 1.0)
}

#[test]
fn centered_quad_projects_to_centered_rect() {
    let cam = Camera::default();
    let rect = project_quad(&cam, &unit_quad(), &Mat4::IDENTITY, &layout(), &CornerRadius::default())
        .expect("quad in front of the camera");
    assert!(rect.width > 0.0 && rect.height > 0.0);
    assert!((rect.left + rect.width * 0.5 - 400.0).abs() < 0.01);
    assert!((rect.top + rect.height * 0.5 - 400.0).abs() < 0.01);

    // 45° vertical FOV at distance 6: half-height of the view is 6 * tan(22.5°)
    let half_view = 6.0 * (22.5f32).to_radians().tan();
    let expected = 0.5 / half_view * 400.0 * 2.0;
    assert!((rect.width - expected).abs() < 0.05, "{} vs {}", rect.width, expected);
    assert!((rect.height - expected).abs() < 0.05);
}

#[test]
fn quads_inside_frustum_have_positive_size() {
    let cam = Camera::default();
    let radius = CornerRadius::default();
    for (x, y, yaw) in [(0.0, 0.0, 0.0), (1.0, -0.5, 0.6), (-1.2, 0.8, -1.0), (0.3, 0.3, 1.3)] {
        let world = Mat4::from_rotation_translation(Quat::from_rotation_y(yaw), Vec3::new(x, y, 0.0));
        let rect = project_quad(&cam, &unit_quad(), &world, &layout(), &radius)
            .expect("visible quad");
        assert!(rect.is_valid());
        assert!(rect.width > 0.0 && rect.height > 0.0);
    }
}

#[test]
fn container_offset_is_applied() {
    let cam = Camera::default();
    let plain = project_quad(&cam, &unit_quad(), &Mat4::IDENTITY, &layout(), &CornerRadius::default())
        .expect("rect");
    let shifted_layout = layout().with_origins(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0));
    let shifted = project_quad(
        &cam,
        &unit_quad(),
        &Mat4::IDENTITY,
        &shifted_layout,
        &CornerRadius::default(),
    )
    .expect("rect");
    assert!((shifted.left - plain.left - 80.0).abs() < 1e-3);
    assert!((shifted.top - plain.top - 40.0).abs() < 1e-3);
    assert!((shifted.width - plain.width).abs() < 1e-3);
}

#[test]
fn quad_behind_camera_is_rejected() {
    let cam = Camera::default();
    let behind = Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));
    assert!(project_quad(&cam, &unit_quad(), &behind, &layout(), &CornerRadius::default()).is_none());
}

#[test]
fn tracker_keeps_last_good_rect() {
    let cam = Camera::default();
    let mut tracker = RectTracker::default();
    // Nothing valid yet: overlay stays hidden
    let nan = Mat4::from_translation(Vec3::new(f32::NAN, 0.0, 0.0));
    assert_eq!(tracker.track(&cam, &unit_quad(), &nan, &layout()), None);

    let good = tracker
        .track(&cam, &unit_quad(), &Mat4::IDENTITY, &layout())
        .expect("valid rect");
    // Non-finite and behind-camera frames fall back to the same rect
    assert_eq!(tracker.track(&cam, &unit_quad(), &nan, &layout()), Some(good));
    let behind = Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));
    assert_eq!(tracker.track(&cam, &unit_quad(), &behind, &layout()), Some(good));
    // Zero-size quad also falls back
    let flat = ScreenQuad::new(Vec3::ZERO, 0.0, 1.0);
    assert_eq!(tracker.track(&cam, &flat, &Mat4::IDENTITY, &layout()), Some(good));

    tracker.reset();
    assert_eq!(tracker.last(), None);
}

#[test]
fn unusable_surface_projects_nothing() {
    let cam = Camera::default();
    let empty = SurfaceLayout::new(Vec2::ZERO);
    assert!(project_quad(&cam, &unit_quad(), &Mat4::IDENTITY, &empty, &CornerRadius::default()).is_none());
    assert!(!project_point(&cam, Vec3::ZERO, &empty).visible);
}

#[test]
fn corner_radius_is_clamped() {
    let r = CornerRadius::default();
    assert_eq!(r.for_size(20.0, 40.0), CORNER_RADIUS_MIN_PX);
    assert_eq!(r.for_size(2000.0, 1000.0), CORNER_RADIUS_MAX_PX);
    assert!((r.for_size(200.0, 300.0) - 200.0 * CORNER_RADIUS_FRACTION).abs() < 1e-4);
}

#[test]
fn corner_radius_fits_tiny_rects() {
    let r = CornerRadius::default();
    assert_eq!(r.for_size(4.0, 100.0), 2.0);
    assert_eq!(r.for_size(30.0, 9.0), 4.5);
    assert_eq!(r.for_size(0.0, 10.0), 0.0);
}

#[test]
fn point_visibility_follows_clip_range() {
    let cam = Camera::default();
    let front = project_point(&cam, Vec3::ZERO, &layout());
    assert!(front.visible);
    assert!((front.x - 400.0).abs() < 1e-3 && (front.y - 400.0).abs() < 1e-3);
    assert!(front.depth > 0.0 && front.depth < 1.0);

    assert!(!project_point(&cam, Vec3::new(0.0, 0.0, 8.0), &layout()).visible);
    // Beyond the far plane
    assert!(!project_point(&cam, Vec3::new(0.0, 0.0, -500.0), &layout()).visible);
    // Between eye and near plane
    assert!(!project_point(&cam, Vec3::new(0.0, 0.0, 5.95), &layout()).visible);
}

#[test]
fn anchor_radius_scales_with_distance() {
    let cam = Camera::default();
    let near = project_anchor(&cam, Vec3::new(0.0, 0.0, 2.0), 0.3, &layout()).expect("near");
    let far = project_anchor(&cam, Vec3::new(0.0, 0.0, -4.0), 0.3, &layout()).expect("far");
    assert!(near.radius > far.radius);
    assert!(project_anchor(&cam, Vec3::new(0.0, 0.0, 9.0), 0.3, &layout()).is_none());

    let mut tracker = AnchorTracker::default();
    let a = tracker.track(&cam, Vec3::ZERO, 0.3, &layout());
    assert!(a.is_some());
    assert_eq!(tracker.track(&cam, Vec3::splat(f32::NAN), 0.3, &layout()), a);
}

#[test]
fn screen_ray_through_center_looks_forward() {
    let cam = Camera::default();
    let ray = cam.screen_ray(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));
    assert!((ray.origin - cam.eye).length() < 1e-6);
    assert!((ray.dir - Vec3::NEG_Z).length() < 1e-4);
}

#[test]
fn degenerate_camera_is_sanitized() {
    let cam = Camera {
        eye: Vec3::new(0.0, 3.0, 0.0),
        target: Vec3::new(0.0, 3.0, 0.0),
        up: Vec3::new(f32::NAN, 0.0, 0.0),
        aspect: 0.0,
        fovy_radians: f32::NAN,
        znear: -1.0,
        zfar: 0.0,
    };
    let vp = cam.view_projection();
    assert!(vp.is_finite());
    assert!(cam.forward().is_finite());
    assert!((cam.right().length() - 1.0).abs() < 1e-5);
}

#[test]
fn camera_key_blend_hits_endpoints() {
    let a = CameraKey::new(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, 30.0);
    let b = CameraKey::new(Vec3::new(2.0, 1.0, 8.0), Vec3::Y, 50.0);
    let start = CameraKey::lerp(&a, &b, 0.0);
    assert_eq!(start, a);
    let end = CameraKey::lerp(&a, &b, 1.0);
    assert!((end.eye - b.eye).length() < 1e-6);
    assert!((end.fovy_radians - b.fovy_radians).abs() < 1e-6);

    let mut cam = Camera::default();
    end.apply(&mut cam);
    assert_eq!(cam.target, end.target);
}
