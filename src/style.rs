// CSS strings and surface sizing derived from core values.
//
// Pure functions only, so the host test suite can include this file.

use crate::constants::{LAYER_BLUR_MAX_PX, MAX_BACKING_DIM, MAX_DEVICE_PIXEL_RATIO};
use folio_core::stage::LayerStyle;
use glam::Vec2;

/// Backing store size for a surface of `css_w`×`css_h` CSS pixels.
pub fn backing_size(css_w: f64, css_h: f64, dpr: f64) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 {
        dpr.min(MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    };
    let px = |css: f64| {
        if css.is_finite() && css > 0.0 {
            ((css * dpr).round() as u32).clamp(1, MAX_BACKING_DIM)
        } else {
            1
        }
    };
    (px(css_w), px(css_h))
}

/// Map an offset measured against an element's on-screen rect (`shown`,
/// after CSS transforms) back onto its untransformed `layout` size.
pub fn untransform_px(px: Vec2, shown: Vec2, layout: Vec2) -> Vec2 {
    let axis = |p: f32, shown: f32, layout: f32| {
        if shown.is_finite() && shown > 0.0 && layout.is_finite() && layout > 0.0 {
            p * layout / shown
        } else {
            p
        }
    };
    Vec2::new(axis(px.x, shown.x, layout.x), axis(px.y, shown.y, layout.y))
}

fn finite_or(v: f32, default: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        default
    }
}

pub fn opacity_css(style: &LayerStyle) -> String {
    format!("{:.4}", finite_or(style.opacity, 0.0).clamp(0.0, 1.0))
}

pub fn transform_css(style: &LayerStyle) -> String {
    format!(
        "translate({:.2}px, {:.2}px) scale({:.4})",
        finite_or(style.translate.x, 0.0),
        finite_or(style.translate.y, 0.0),
        finite_or(style.scale, 1.0).max(0.0)
    )
}

/// `none` when unblurred, so the compositor can skip the filter.
pub fn filter_css(style: &LayerStyle) -> String {
    let blur = finite_or(style.blur_px, 0.0).clamp(0.0, LAYER_BLUR_MAX_PX);
    if blur < 0.01 {
        "none".to_string()
    } else {
        format!("blur({:.2}px)", blur)
    }
}

pub fn pointer_events_css(interactive: bool) -> &'static str {
    if interactive {
        "auto"
    } else {
        "none"
    }
}
