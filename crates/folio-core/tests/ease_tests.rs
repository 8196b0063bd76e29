use folio_core::ease::*;

const CURVES: [Ease; 5] = [
    Ease::Linear,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::OutQuint,
];

#[test]
fn clamp01_stays_in_unit_range() {
    for t in [-5.0, -0.0, 0.0, 0.25, 1.0, 1.5, f32::INFINITY, f32::NEG_INFINITY] {
        let c = clamp01(t);
        assert!((0.0..=1.0).contains(&c), "clamp01({t}) = {c}");
    }
    assert_eq!(clamp01(f32::NAN), 0.0);
}

#[test]
fn easings_hit_bounds_exactly() {
    for e in CURVES {
        assert_eq!(e.apply(0.0), 0.0, "{e:?} at 0");
        assert_eq!(e.apply(1.0), 1.0, "{e:?} at 1");
        // Out-of-range input is clamped first
        assert_eq!(e.apply(-3.0), 0.0);
        assert_eq!(e.apply(7.0), 1.0);
        assert_eq!(e.apply(f32::NAN), 0.0);
    }
}

#[test]
fn easings_are_monotonic() {
    for e in CURVES {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = e.apply(i as f32 / 100.0);
            assert!(v + 1e-6 >= prev, "{e:?} dips at step {i}");
            prev = v;
        }
    }
}

#[test]
fn progress_handles_degenerate_durations() {
    assert_eq!(progress(50.0, 100.0), 0.5);
    assert_eq!(progress(500.0, 100.0), 1.0);
    assert_eq!(progress(-10.0, 100.0), 0.0);
    assert_eq!(progress(10.0, 0.0), 1.0);
    assert_eq!(progress(10.0, f32::NAN), 1.0);
    assert_eq!(progress(f32::NAN, 100.0), 0.0);
}

#[test]
fn smoothstep_windows() {
    assert_eq!(smoothstep(1.7, 4.8, 1.0), 0.0);
    assert_eq!(smoothstep(1.7, 4.8, 1.7), 0.0);
    assert_eq!(smoothstep(1.7, 4.8, 4.8), 1.0);
    assert_eq!(smoothstep(1.7, 4.8, 9.0), 1.0);
    let mid = smoothstep(0.0, 2.0, 1.0);
    assert!((mid - 0.5).abs() < 1e-6);
    // Degenerate window behaves as a step
    assert_eq!(smoothstep(2.0, 2.0, 1.9), 0.0);
    assert_eq!(smoothstep(2.0, 2.0, 2.0), 1.0);
}

#[test]
fn resist_release_creeps_then_releases() {
    assert_eq!(resist_release(0.0, 0.35, 0.12), 0.0);
    assert_eq!(resist_release(1.0, 0.35, 0.12), 1.0);
    // During the knee only the creep share is covered
    let at_knee = resist_release(0.35, 0.35, 0.12);
    assert!((at_knee - 0.12).abs() < 1e-5);
    assert!(resist_release(0.2, 0.35, 0.12) < 0.12);
    // After the knee it moves fast
    assert!(resist_release(0.6, 0.35, 0.12) > 0.6);
}

#[test]
fn damped_settle_vanishes_at_ends() {
    assert_eq!(damped_settle(0.0, 0.05, 1.5, 3.0), 0.0);
    assert_eq!(damped_settle(1.0, 0.05, 1.5, 3.0), 0.0);
    let mut peak = 0.0f32;
    for i in 1..100 {
        peak = peak.max(damped_settle(i as f32 / 100.0, 0.05, 1.5, 3.0).abs());
    }
    assert!(peak > 0.0 && peak <= 0.05);
    assert_eq!(damped_settle(0.5, f32::NAN, 1.5, 3.0), 0.0);
}
