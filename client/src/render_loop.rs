use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Drives the territory layer from `requestAnimationFrame`.
///
/// `wake()` requests a frame. The frame function receives the rAF timestamp
/// in milliseconds and returns `true` while it still has work (a non-empty
/// staleness queue, an active drag window), in which case the next frame is
/// requested automatically.
pub struct FrameLoop {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    pending: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl Inner {
    fn request(&self) {
        if self.pending.get() {
            return;
        }
        let cb_ref = self.callback.borrow();
        let (Some(cb), Some(window)) = (cb_ref.as_ref(), self.window.as_ref()) else {
            return;
        };
        if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            self.pending.set(true);
            self.raf_id.set(Some(id));
        }
    }
}

impl FrameLoop {
    pub fn new(mut frame_fn: impl FnMut(f64) -> bool + 'static) -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            pending: Cell::new(false),
            raf_id: Cell::new(None),
            callback: RefCell::new(None),
        });

        let inner_cb = inner.clone();
        let cb = Closure::<dyn FnMut(f64)>::new(move |now_ms: f64| {
            inner_cb.pending.set(false);
            inner_cb.raf_id.set(None);
            if frame_fn(now_ms) {
                inner_cb.request();
            }
        });
        *inner.callback.borrow_mut() = Some(cb);

        Self { inner }
    }

    /// Request one frame; coalesced with any frame already pending.
    pub fn wake(&self) {
        self.inner.request();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let Some(raf_id) = self.inner.raf_id.replace(None)
            && let Some(window) = self.inner.window.as_ref()
        {
            let _ = window.cancel_animation_frame(raf_id);
        }
        self.inner.pending.set(false);
        // Break the callback->inner reference cycle on teardown.
        self.inner.callback.borrow_mut().take();
    }
}
