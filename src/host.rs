//! Scene events as plain JS objects handed to the host callback.

use crate::style;
use folio_core::SceneEvent;
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsValue;

fn set(obj: &Object, key: &str, value: impl Into<JsValue>) -> Result<(), JsValue> {
    Reflect::set(obj, &JsValue::from_str(key), &value.into()).map(|_| ())
}

pub fn event_object(ev: &SceneEvent) -> Result<Object, JsValue> {
    let o = Object::new();
    set(&o, "type", ev.name())?;
    match ev {
        SceneEvent::PhaseChanged(phase) => set(&o, "phase", *phase)?,
        SceneEvent::HoverChanged(hover) => set(&o, "hover", *hover)?,
        SceneEvent::Intent(node) => set(&o, "node", node.index() as u32)?,
        SceneEvent::StatusChanged { kind, message } => {
            set(&o, "kind", kind.as_str())?;
            set(&o, "message", message.as_str())?;
        }
        SceneEvent::ScreenRect(rect) => {
            set(&o, "visible", rect.is_some())?;
            if let Some(r) = rect {
                set(&o, "left", r.left)?;
                set(&o, "top", r.top)?;
                set(&o, "width", r.width)?;
                set(&o, "height", r.height)?;
                set(&o, "radius", r.radius)?;
            }
        }
        SceneEvent::LensProjected(anchor) => {
            set(&o, "visible", anchor.is_some())?;
            if let Some(a) = anchor {
                set(&o, "x", a.x)?;
                set(&o, "y", a.y)?;
                set(&o, "radius", a.radius)?;
            }
        }
        SceneEvent::Layer(s) => {
            set(&o, "opacity", s.opacity)?;
            set(&o, "translateX", s.translate.x)?;
            set(&o, "translateY", s.translate.y)?;
            set(&o, "scale", s.scale)?;
            set(&o, "blur", s.blur_px)?;
            set(&o, "transform", style::transform_css(s))?;
            set(&o, "filter", style::filter_css(s))?;
        }
        SceneEvent::Ready
        | SceneEvent::CaptureStart
        | SceneEvent::EjectDone
        | SceneEvent::RetractDone
        | SceneEvent::Assembled
        | SceneEvent::Answered
        | SceneEvent::HungUp => {}
    }
    Ok(o)
}

/// Hand each event to `callback`. Must not be called while scene state is
/// borrowed: the host may call back into the scene handle.
pub fn dispatch(callback: &Function, events: &[SceneEvent]) {
    for ev in events {
        let result = event_object(ev).and_then(|o| callback.call1(&JsValue::NULL, &o));
        if let Err(e) = result {
            log::warn!("[host] {} handler failed: {:?}", ev.name(), e);
        }
    }
}
