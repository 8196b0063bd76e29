//! Scene-driven styling of the canvas element: cursor and stage layer.

use crate::constants::LAYER_WILL_CHANGE;
use crate::style;
use folio_core::picking::CursorHint;
use folio_core::stage::LayerStyle;
use web_sys as web;

fn set_prop(el: &web::HtmlElement, name: &str, value: &str) {
    if let Err(e) = el.style().set_property(name, value) {
        log::warn!("[overlay] set {}: {:?}", name, e);
    }
}

pub fn apply_cursor(el: &web::HtmlElement, cursor: CursorHint) {
    set_prop(el, "cursor", cursor.as_css());
}

pub fn apply_interactive(el: &web::HtmlElement, interactive: bool) {
    set_prop(el, "pointer-events", style::pointer_events_css(interactive));
}

pub fn apply_layer(el: &web::HtmlElement, layer: &LayerStyle) {
    set_prop(el, "will-change", LAYER_WILL_CHANGE);
    set_prop(el, "opacity", &style::opacity_css(layer));
    set_prop(el, "transform", &style::transform_css(layer));
    set_prop(el, "filter", &style::filter_css(layer));
}

/// Remove everything this module may have set.
pub fn clear(el: &web::HtmlElement) {
    let s = el.style();
    for name in ["cursor", "pointer-events", "will-change", "opacity", "transform", "filter"] {
        _ = s.remove_property(name);
    }
}
