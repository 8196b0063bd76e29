use crate::style;
use folio_core::SurfaceLayout;
use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Element by id, cast to `T`.
pub fn element_by_id<T: JsCast>(id: &str) -> anyhow::Result<T> {
    let document = window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let el = document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", id))?;
    el.dyn_into::<T>()
        .map_err(|e| anyhow::anyhow!("#{} has the wrong element type: {:?}", id, e))
}

/// CSS size of the canvas before transforms. The stage layer style scales
/// and translates the canvas itself, so the bounding rect is not used here.
pub fn layout_size(canvas: &web::HtmlCanvasElement) -> Vec2 {
    Vec2::new(canvas.offset_width() as f32, canvas.offset_height() as f32)
}

/// Match the canvas backing store to its CSS size times the (capped)
/// device pixel ratio. Returns whether the size changed.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> bool {
    let Some(w) = web::window() else {
        return false;
    };
    let size = layout_size(canvas);
    let (w_px, h_px) = style::backing_size(size.x as f64, size.y as f64, w.device_pixel_ratio());
    if canvas.width() == w_px && canvas.height() == h_px {
        return false;
    }
    canvas.set_width(w_px);
    canvas.set_height(h_px);
    true
}

/// Untransformed surface size in CSS pixels and both elements' client
/// origins.
pub fn surface_layout(canvas: &web::HtmlCanvasElement, container: &web::Element) -> SurfaceLayout {
    let c = canvas.get_bounding_client_rect();
    let o = container.get_bounding_client_rect();
    SurfaceLayout::new(layout_size(canvas)).with_origins(
        Vec2::new(c.left() as f32, c.top() as f32),
        Vec2::new(o.left() as f32, o.top() as f32),
    )
}
