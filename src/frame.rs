//! Cancellable requestAnimationFrame loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct FrameLoop {
    tick: Tick,
    raf_id: Rc<Cell<Option<i32>>>,
    alive: Rc<Cell<bool>>,
    running: Rc<Cell<bool>>,
}

fn request(tick: &Tick) -> Option<i32> {
    let w = web::window()?;
    let t = tick.borrow();
    let cb = t.as_ref()?;
    w.request_animation_frame(cb.as_ref().unchecked_ref()).ok()
}

impl FrameLoop {
    /// Call `on_frame` once per animation frame until [`FrameLoop::cancel`].
    pub fn start(mut on_frame: impl FnMut() + 'static) -> anyhow::Result<Self> {
        let tick: Tick = Rc::new(RefCell::new(None));
        let raf_id = Rc::new(Cell::new(None));
        let alive = Rc::new(Cell::new(true));
        let running = Rc::new(Cell::new(false));

        let (tick_next, raf_next, alive_cb, running_cb) =
            (tick.clone(), raf_id.clone(), alive.clone(), running.clone());
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
            raf_next.set(None);
            if !alive_cb.get() {
                return;
            }
            running_cb.set(true);
            on_frame();
            running_cb.set(false);
            if alive_cb.get() {
                raf_next.set(request(&tick_next));
            }
        }) as Box<dyn FnMut(f64)>));

        let id = request(&tick).ok_or_else(|| anyhow::anyhow!("requestAnimationFrame unavailable"))?;
        raf_id.set(Some(id));
        Ok(Self {
            tick,
            raf_id,
            alive,
            running,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Stop the loop: cancel the pending frame and release the callback.
    /// Called from inside a frame, the callback is released once that frame
    /// has returned.
    pub fn cancel(&self) {
        if !self.alive.replace(false) {
            return;
        }
        if let (Some(id), Some(w)) = (self.raf_id.take(), web::window()) {
            if let Err(e) = w.cancel_animation_frame(id) {
                log::warn!("[frame] cancelAnimationFrame: {:?}", e);
            }
        }
        let Some(closure) = self.tick.borrow_mut().take() else {
            return;
        };
        if self.running.get() {
            wasm_bindgen_futures::spawn_local(async move { drop(closure) });
        } else {
            drop(closure);
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}
