use crate::{dom, style};
use folio_core::PointerInput;
use glam::Vec2;
use web_sys as web;

/// Pointer position in render-surface CSS pixels.
#[inline]
pub fn pointer_surface_px(ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let px = Vec2::new(
        ev.client_x() as f32 - rect.left() as f32,
        ev.client_y() as f32 - rect.top() as f32,
    );
    let shown = Vec2::new(rect.width() as f32, rect.height() as f32);
    style::untransform_px(px, shown, dom::layout_size(canvas))
}

/// Translate a DOM pointer event into a runtime pointer input.
pub fn pointer_input(kind: &str, ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> Option<PointerInput> {
    match kind {
        "pointermove" => Some(PointerInput::Move(pointer_surface_px(ev, canvas))),
        "pointerdown" => Some(PointerInput::Down {
            px: pointer_surface_px(ev, canvas),
            button: ev.button(),
        }),
        "pointerleave" | "pointercancel" => Some(PointerInput::Leave),
        _ => None,
    }
}
