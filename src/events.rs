//! DOM listeners owned by a mounted scene.
//!
//! Every closure handed to the DOM is kept here together with the target and
//! event name it was registered under, so teardown can remove each one and
//! drop the closure instead of leaking it.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

#[derive(Default)]
pub struct ListenerRegistry {
    entries: Vec<Listener>,
}

impl ListenerRegistry {
    pub fn listen(
        &mut self,
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<()> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("add {} listener: {:?}", kind, e))?;
        self.entries.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Unregister and drop every listener. Safe to call repeatedly.
    pub fn remove_all(&mut self) {
        for l in self.entries.drain(..) {
            if let Err(e) = l
                .target
                .remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref())
            {
                log::warn!("[events] remove {} listener: {:?}", l.kind, e);
            }
        }
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        self.remove_all();
    }
}
