//! Progress normalization and easing curves.
//!
//! Every curve clamps its input to `[0, 1]` first and returns exactly `0.0` and
//! `1.0` at the bounds, so callers can feed raw elapsed/duration ratios.

use std::f32::consts::TAU;

/// Clamp to `[0, 1]`. NaN maps to `0.0`.
#[inline]
pub fn clamp01(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Normalized progress of `elapsed` over `duration`. A non-positive or
/// non-finite duration counts as already complete.
#[inline]
pub fn progress(elapsed: f32, duration: f32) -> f32 {
    if !duration.is_finite() || duration <= 0.0 {
        return 1.0;
    }
    clamp01(elapsed / duration)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep between two edges. Degenerate windows act as a step.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if x.is_nan() {
        return 0.0;
    }
    if edge1 <= edge0 {
        return if x >= edge1 { 1.0 } else { 0.0 };
    }
    let t = clamp01((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn ease_in_cubic(t: f32) -> f32 {
    let t = clamp01(t);
    t * t * t
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let u = 1.0 - clamp01(t);
    1.0 - u * u * u
}

#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = clamp01(t);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

#[inline]
pub fn ease_out_quint(t: f32) -> f32 {
    let u = 1.0 - clamp01(t);
    1.0 - u * u * u * u * u
}

/// Slow-then-fast curve for mechanical travel: a short creep up to `creep`
/// while `t < knee`, then a fast release that decelerates into the end.
pub fn resist_release(t: f32, knee: f32, creep: f32) -> f32 {
    let t = clamp01(t);
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let knee = knee.clamp(0.0, 0.95);
    let creep = clamp01(creep);
    if t < knee {
        return creep * smoothstep(0.0, knee, t);
    }
    let u = (t - knee) / (1.0 - knee);
    creep + (1.0 - creep) * ease_out_cubic(u)
}

/// Decaying oscillation used near the end of a travel. Zero at both `s = 0`
/// and `s = 1`, so it never shifts the endpoints.
pub fn damped_settle(s: f32, amplitude: f32, cycles: f32, decay: f32) -> f32 {
    let s = clamp01(s);
    if !amplitude.is_finite() {
        return 0.0;
    }
    amplitude * (1.0 - s) * (-decay * s).exp() * (TAU * cycles * s).sin()
}

/// Named curves for declarative transition tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    Linear,
    InCubic,
    OutCubic,
    InOutCubic,
    OutQuint,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Ease::Linear => clamp01(t),
            Ease::InCubic => ease_in_cubic(t),
            Ease::OutCubic => ease_out_cubic(t),
            Ease::InOutCubic => ease_in_out_cubic(t),
            Ease::OutQuint => ease_out_quint(t),
        }
    }
}
