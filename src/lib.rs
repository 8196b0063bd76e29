#![cfg(target_arch = "wasm32")]
//! Browser frontend: mounts a [`folio_core::SceneRuntime`] on a canvas,
//! drives it from requestAnimationFrame, renders it with WebGPU and hands
//! its events to a JavaScript callback.

use folio_core::picking::CursorHint;
use folio_core::throttle::LogThrottle;
use folio_core::{HostInputs, SceneEvent, SceneKind, SceneRuntime, StatusKind};
use glam::Vec2;
use instant::Instant;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod asset;
mod constants;
mod dom;
mod events;
mod frame;
mod host;
mod input;
mod overlay;
mod render;
mod style;

use events::ListenerRegistry;
use frame::FrameLoop;
use render::GpuState;

const POINTER_EVENTS: [&str; 4] = ["pointermove", "pointerdown", "pointerleave", "pointercancel"];

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("folio-web starting");
    Ok(())
}

/// Everything a frame touches. Borrowed for the duration of one tick, one
/// listener callback or one async completion; never across a call into JS.
struct Shared {
    runtime: SceneRuntime,
    inputs: HostInputs,
    gpu: Option<GpuState>,
    canvas: web::HtmlCanvasElement,
    container: web::Element,
    callback: js_sys::Function,
    /// Events raised outside a frame, delivered with the next one.
    pending: Vec<SceneEvent>,
    throttle: LogThrottle,
    clock: Instant,
    cursor: CursorHint,
    load_seq: u32,
    alive: bool,
}

impl Shared {
    fn now_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }

    fn tick(&mut self) -> Vec<SceneEvent> {
        let now_ms = self.now_ms();
        let layout = dom::surface_layout(&self.canvas, &self.container);
        let mut events = std::mem::take(&mut self.pending);
        self.runtime.frame(now_ms, &self.inputs, &layout, &mut events);

        for ev in &events {
            if let SceneEvent::Layer(layer) = ev {
                overlay::apply_layer(&self.canvas, layer);
            }
        }
        let cursor = self.runtime.cursor();
        if cursor != self.cursor {
            overlay::apply_cursor(&self.canvas, cursor);
            self.cursor = cursor;
        }

        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize_if_needed(self.canvas.width(), self.canvas.height());
            let instances = self.runtime.instances();
            if let Err(e) = gpu.render(self.runtime.camera(), &instances) {
                if let Some(suppressed) = self.throttle.should_log(now_ms) {
                    log::warn!("[frame] render: {:?} ({} suppressed)", e, suppressed);
                }
            }
        }
        events
    }

    fn shutdown(&mut self) {
        if !std::mem::replace(&mut self.alive, false) {
            return;
        }
        if let Some(mut gpu) = self.gpu.take() {
            gpu.destroy();
        }
        overlay::clear(&self.canvas);
        self.pending.clear();
    }
}

struct Mounted {
    shared: Rc<RefCell<Shared>>,
    listeners: ListenerRegistry,
    frame: FrameLoop,
}

/// Run `f` on the shared state and deliver whatever it queued. Skipped when
/// the scene is gone or the state is already borrowed.
fn with_shared(weak: &Weak<RefCell<Shared>>, f: impl FnOnce(&mut Shared)) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut s) = shared.try_borrow_mut() else {
        log::debug!("[mount] state busy, update dropped");
        return;
    };
    if s.alive {
        f(&mut *s);
    }
}

fn run_frame(weak: &Weak<RefCell<Shared>>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let (callback, events) = {
        let Ok(mut s) = shared.try_borrow_mut() else {
            return;
        };
        if !s.alive {
            return;
        }
        let events = s.tick();
        (s.callback.clone(), events)
    };
    if !events.is_empty() {
        host::dispatch(&callback, &events);
    }
}

fn wire_listeners(
    weak: &Weak<RefCell<Shared>>,
    canvas: &web::HtmlCanvasElement,
) -> anyhow::Result<ListenerRegistry> {
    let mut listeners = ListenerRegistry::default();
    for kind in POINTER_EVENTS {
        let weak = weak.clone();
        let canvas_ev = canvas.clone();
        listeners.listen(canvas, kind, move |ev: web::Event| {
            let Some(mouse) = ev.dyn_ref::<web::MouseEvent>() else {
                return;
            };
            if let Some(p) = input::pointer_input(kind, mouse, &canvas_ev) {
                with_shared(&weak, |s| s.runtime.push_pointer(p));
            }
        })?;
    }
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let canvas_resize = canvas.clone();
    listeners.listen(&window, "resize", move |_ev: web::Event| {
        dom::sync_canvas_backing_size(&canvas_resize);
    })?;
    Ok(listeners)
}

fn spawn_gpu_init(weak: Weak<RefCell<Shared>>, canvas: web::HtmlCanvasElement) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let backdrop = match shared.try_borrow() {
        Ok(s) => s.runtime.backdrop().clone(),
        Err(_) => return,
    };
    drop(shared);
    spawn_local(async move {
        let result = GpuState::new(&canvas, &backdrop).await;
        let Some(shared) = weak.upgrade() else {
            if let Ok(mut gpu) = result {
                gpu.destroy();
            }
            return;
        };
        let Ok(mut s) = shared.try_borrow_mut() else {
            return;
        };
        match result {
            Ok(mut gpu) if !s.alive => gpu.destroy(),
            Ok(gpu) => s.gpu = Some(gpu),
            Err(e) => {
                log::error!("[render] init failed: {:?}", e);
                s.pending.push(SceneEvent::StatusChanged {
                    kind: StatusKind::Error,
                    message: format!("WebGPU unavailable: {}", e),
                });
            }
        }
    });
}

fn mount_inner(
    canvas_id: &str,
    container_id: &str,
    kind: &str,
    on_event: js_sys::Function,
) -> anyhow::Result<Mounted> {
    let kind = SceneKind::parse(kind).ok_or_else(|| anyhow::anyhow!("unknown scene kind {:?}", kind))?;
    let canvas: web::HtmlCanvasElement = dom::element_by_id(canvas_id)?;
    let container: web::Element = dom::element_by_id(container_id)?;
    let runtime = SceneRuntime::new(kind).map_err(|e| anyhow::anyhow!("{}", e))?;
    dom::sync_canvas_backing_size(&canvas);

    let shared = Rc::new(RefCell::new(Shared {
        runtime,
        inputs: HostInputs::default(),
        gpu: None,
        canvas: canvas.clone(),
        container,
        callback: on_event,
        pending: Vec::new(),
        throttle: LogThrottle::default(),
        clock: Instant::now(),
        cursor: CursorHint::Default,
        load_seq: 0,
        alive: true,
    }));
    let weak = Rc::downgrade(&shared);
    let listeners = wire_listeners(&weak, &canvas)?;
    spawn_gpu_init(weak.clone(), canvas);
    let frame = FrameLoop::start(move || run_frame(&weak))?;
    log::info!("[mount] {} scene mounted", kind.as_str());
    Ok(Mounted {
        shared,
        listeners,
        frame,
    })
}

/// Mount a scene of `kind` (`dial`, `capture`, `showcase` or `stage`) on
/// the canvas `canvas_id`. Overlay rectangles are reported relative to
/// `container_id`. `on_event` receives one plain object per scene event.
#[wasm_bindgen]
pub fn mount(
    canvas_id: &str,
    container_id: &str,
    kind: &str,
    on_event: js_sys::Function,
) -> Result<SceneHandle, JsValue> {
    mount_inner(canvas_id, container_id, kind, on_event)
        .map(|m| SceneHandle { mounted: Some(m) })
        .map_err(|e| {
            log::error!("[mount] {:?}", e);
            JsValue::from_str(&e.to_string())
        })
}

#[wasm_bindgen]
pub struct SceneHandle {
    mounted: Option<Mounted>,
}

impl SceneHandle {
    fn update(&self, f: impl FnOnce(&mut Shared)) {
        if let Some(m) = &self.mounted {
            with_shared(&Rc::downgrade(&m.shared), f);
        }
    }
}

#[wasm_bindgen]
impl SceneHandle {
    pub fn set_phase(&self, phase: &str) {
        self.update(|s| s.inputs.set_phase(phase));
    }

    pub fn set_timeline(&self, t: f32) {
        self.update(|s| s.inputs.set_timeline(t));
    }

    pub fn set_capture_nonce(&self, n: u32) {
        self.update(|s| s.inputs.set_capture_nonce(n));
    }

    pub fn set_retract_nonce(&self, n: u32) {
        self.update(|s| s.inputs.set_retract_nonce(n));
    }

    pub fn set_interactive(&self, on: bool) {
        self.update(|s| {
            s.inputs.set_interactive(on);
            overlay::apply_interactive(&s.canvas, on);
        });
    }

    /// Point the stage layer collapses toward, in container CSS pixels.
    pub fn set_collapse_target(&self, x: f32, y: f32) {
        self.update(|s| s.inputs.set_collapse_target(Some(Vec2::new(x, y))));
    }

    pub fn clear_collapse_target(&self) {
        self.update(|s| s.inputs.set_collapse_target(None));
    }

    /// Fetch a `.glb` and re-anchor overlays to its bounds. Only the most
    /// recent request is applied.
    pub fn load_model(&self, url: String) {
        let Some(m) = &self.mounted else {
            return;
        };
        let weak = Rc::downgrade(&m.shared);
        let mut seq = None;
        with_shared(&weak, |s| {
            s.load_seq = s.load_seq.wrapping_add(1);
            seq = Some(s.load_seq);
            s.runtime.asset_load_started(&url, &mut s.pending);
        });
        let Some(seq) = seq else {
            return;
        };
        spawn_local(async move {
            let result = asset::load_bounds(&url).await;
            with_shared(&weak, |s| {
                if s.load_seq != seq {
                    log::info!("[asset] superseded load of {} ignored", url);
                    return;
                }
                s.runtime.asset_loaded(result, &mut s.pending);
            });
        });
    }

    /// Stop the frame loop, remove listeners and release GPU resources.
    /// Idempotent; every other method is a no-op afterwards.
    pub fn destroy(&mut self) {
        let Some(mut m) = self.mounted.take() else {
            return;
        };
        m.frame.cancel();
        m.listeners.remove_all();
        match m.shared.try_borrow_mut() {
            Ok(mut s) => s.shutdown(),
            Err(_) => log::warn!("[mount] destroy while state is borrowed"),
        }
        log::info!("[mount] destroyed");
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}
