//! Repeated invocation over a host timing primitive.
//!
//! The countdown polls once a second and the fireworks tick once per frame;
//! both only see the [`Scheduler`] trait, so native tests drive them with
//! [`ManualScheduler`] instead of a browser.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::error::{Error, Result};

/// Callback receives a host timestamp in milliseconds.
pub type TickFn = Box<dyn FnMut(f64)>;

pub trait Scheduler {
    /// Begin invoking `callback` repeatedly. Fails if already running.
    fn start(&mut self, callback: TickFn) -> Result<()>;
    /// Stop future invocations. Safe to call any number of times.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

pub(crate) fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

// --- requestAnimationFrame ---------------------------------------------------

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// One callback per display frame via `requestAnimationFrame`.
#[derive(Default)]
pub struct AnimationFrameLoop {
    slot: FrameSlot,
    pending: Rc<Cell<Option<i32>>>,
    running: Rc<Cell<bool>>,
    in_frame: Rc<Cell<bool>>,
}

impl AnimationFrameLoop {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for AnimationFrameLoop {
    fn start(&mut self, mut callback: TickFn) -> Result<()> {
        if self.running.get() {
            return Err(Error::AlreadyRunning);
        }
        let win = window().ok_or(Error::NoWindow)?;

        // The closure re-arms itself through a weak handle so dropping the
        // loop releases it.
        let slot = Rc::downgrade(&self.slot);
        let pending = self.pending.clone();
        let running = self.running.clone();
        let in_frame = self.in_frame.clone();
        let frame = Closure::wrap(Box::new(move |ts: f64| {
            pending.set(None);
            if !running.get() {
                return;
            }
            in_frame.set(true);
            callback(ts);
            in_frame.set(false);
            if !running.get() {
                return;
            }
            let (Some(w), Some(slot)) = (window(), slot.upgrade()) else {
                return;
            };
            if let Some(cb) = slot.borrow().as_ref() {
                match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => pending.set(Some(id)),
                    Err(err) => log::warn!("requestAnimationFrame failed: {err:?}"),
                }
            }
        }) as Box<dyn FnMut(f64)>);

        let id = win.request_animation_frame(frame.as_ref().unchecked_ref())?;
        *self.slot.borrow_mut() = Some(frame);
        self.pending.set(Some(id));
        self.running.set(true);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.set(false);
        if let Some(id) = self.pending.take() {
            if let Some(w) = window() {
                w.cancel_animation_frame(id).ok();
            }
        }
        // A closure must not be freed while it is executing; a stop issued
        // from inside the frame leaves it for the next stop or drop.
        if !self.in_frame.get() {
            self.slot.borrow_mut().take();
        }
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}

impl Drop for AnimationFrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

// --- setInterval -------------------------------------------------------------

/// Fixed-period callback via `setInterval`.
pub struct IntervalTimer {
    period_ms: i32,
    handle: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
    in_tick: Rc<Cell<bool>>,
}

impl IntervalTimer {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms: period_ms.min(i32::MAX as u32) as i32,
            handle: None,
            closure: None,
            in_tick: Rc::new(Cell::new(false)),
        }
    }
}

impl Scheduler for IntervalTimer {
    fn start(&mut self, mut callback: TickFn) -> Result<()> {
        if self.handle.is_some() {
            return Err(Error::AlreadyRunning);
        }
        let win = window().ok_or(Error::NoWindow)?;
        let in_tick = self.in_tick.clone();
        let closure = Closure::wrap(Box::new(move || {
            in_tick.set(true);
            callback(performance_now());
            in_tick.set(false);
        }) as Box<dyn FnMut()>);
        let handle = win.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            self.period_ms,
        )?;
        self.handle = Some(handle);
        self.closure = Some(closure);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(w) = window() {
                w.clear_interval_with_handle(handle);
            }
        }
        if !self.in_tick.get() {
            self.closure.take();
        }
    }

    fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

// --- synthetic ---------------------------------------------------------------

/// Host-free scheduler: each `fire` is one tick at a synthetic timestamp.
pub struct ManualScheduler {
    callback: Option<TickFn>,
    now_ms: f64,
    step_ms: f64,
    fired: u64,
}

impl ManualScheduler {
    pub fn new(step_ms: f64) -> Self {
        Self { callback: None, now_ms: 0.0, step_ms, fired: 0 }
    }

    /// Run one tick. Returns false when stopped.
    pub fn fire(&mut self) -> bool {
        let Some(cb) = self.callback.as_mut() else {
            return false;
        };
        self.now_ms += self.step_ms;
        self.fired += 1;
        cb(self.now_ms);
        true
    }

    pub fn run(&mut self, ticks: usize) -> usize {
        (0..ticks).take_while(|_| self.fire()).count()
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new(1000.0 / 60.0)
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, callback: TickFn) -> Result<()> {
        if self.callback.is_some() {
            return Err(Error::AlreadyRunning);
        }
        self.callback = Some(callback);
        Ok(())
    }

    fn stop(&mut self) {
        self.callback = None;
    }

    fn is_running(&self) -> bool {
        self.callback.is_some()
    }
}
