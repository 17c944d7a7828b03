//! Wiring between the pure engines, a [`Scheduler`] and a [`Surface`].
//!
//! Drivers own the shared state (`Rc<RefCell<_>>`) that the scheduled closure
//! touches. Ticks never overlap: every callback runs to completion on the one
//! UI thread before the host schedules the next.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::countdown::{Countdown, CountdownEngine, PageMode};
use crate::error::{Error, Result};
use crate::particles::ParticleSimulator;
use crate::scheduler::Scheduler;
use crate::surface::Surface;

/// Polls a [`CountdownEngine`] and publishes each sample.
pub struct CountdownDriver<S: Scheduler> {
    engine: CountdownEngine,
    scheduler: S,
    latest: Rc<Cell<Option<Countdown>>>,
}

impl<S: Scheduler> CountdownDriver<S> {
    pub fn new(engine: CountdownEngine, scheduler: S) -> Self {
        Self { engine, scheduler, latest: Rc::new(Cell::new(None)) }
    }

    /// Take the first sample right away, then one per scheduler tick.
    ///
    /// `clock` returns epoch milliseconds. Once `Reached` has been published
    /// it stays `Reached`, even if the wall clock is later set backwards.
    pub fn start<C, P>(&mut self, clock: C, mut publish: P) -> Result<()>
    where
        C: Fn() -> i64 + 'static,
        P: FnMut(Countdown) + 'static,
    {
        if self.scheduler.is_running() {
            return Err(Error::AlreadyRunning);
        }
        let engine = self.engine.clone();
        let first = engine.sample_millis(clock());
        self.latest.set(Some(first));
        publish(first);

        let latest = self.latest.clone();
        self.scheduler.start(Box::new(move |_| {
            let prev = latest.get();
            let next = match prev {
                Some(Countdown::Reached) => Countdown::Reached,
                _ => engine.sample_millis(clock()),
            };
            if next.is_reached() && !prev.is_some_and(|p| p.is_reached()) {
                log::info!("countdown reached target");
            }
            latest.set(Some(next));
            publish(next);
        }))
    }

    /// `None` before `start`, and again after `teardown`.
    pub fn current(&self) -> Option<Countdown> {
        self.latest.get()
    }

    pub fn page_mode(&self) -> Option<PageMode> {
        PageMode::for_sample(self.current())
    }

    pub fn engine(&self) -> &CountdownEngine {
        &self.engine
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn teardown(&mut self) {
        self.scheduler.stop();
        self.latest.set(None);
    }
}

/// Tracks the page mode the layers are showing. A switch only counts once its
/// mount step succeeded, so a failed mount is retried on the next sample.
#[derive(Debug, Default)]
pub struct ModeSwitch {
    current: Option<PageMode>,
}

impl ModeSwitch {
    pub fn current(&self) -> Option<PageMode> {
        self.current
    }

    /// Run `mount` unless `mode` is already showing. Returns whether a switch
    /// happened.
    pub fn switch<M>(&mut self, mode: PageMode, mount: M) -> Result<bool>
    where
        M: FnOnce(PageMode) -> Result<()>,
    {
        if self.current == Some(mode) {
            return Ok(false);
        }
        mount(mode)?;
        self.current = Some(mode);
        Ok(true)
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Runs a [`ParticleSimulator`] against a surface, one tick per frame.
pub struct FireworksDriver<S: Scheduler, F: Surface + 'static, R: Rng + 'static = ChaCha8Rng> {
    sim: Rc<RefCell<ParticleSimulator<R>>>,
    surface: Rc<RefCell<F>>,
    scheduler: S,
}

impl<S: Scheduler, F: Surface + 'static, R: Rng + 'static> FireworksDriver<S, F, R> {
    pub fn new(sim: ParticleSimulator<R>, surface: F, scheduler: S) -> Self {
        Self {
            sim: Rc::new(RefCell::new(sim)),
            surface: Rc::new(RefCell::new(surface)),
            scheduler,
        }
    }

    /// Seed the opening confetti and begin ticking.
    pub fn start(&mut self) -> Result<()> {
        if self.scheduler.is_running() {
            return Err(Error::AlreadyRunning);
        }
        self.sim.borrow_mut().seed();
        let sim = self.sim.clone();
        let surface = self.surface.clone();
        self.scheduler.start(Box::new(move |_| {
            let mut surface = surface.borrow_mut();
            sim.borrow_mut().tick(&mut *surface);
        }))
    }

    /// Host viewport changed; both surface and simulator re-read dimensions.
    pub fn resize(&mut self, width: f64, height: f64) {
        log::debug!("fireworks resized to {width}x{height}");
        self.surface.borrow_mut().resize(width, height);
        self.sim.borrow_mut().resize(width, height);
    }

    pub fn simulator(&self) -> Ref<'_, ParticleSimulator<R>> {
        self.sim.borrow()
    }

    pub fn surface(&self) -> Ref<'_, F> {
        self.surface.borrow()
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Stop ticking and drop every particle. Idempotent.
    pub fn teardown(&mut self) {
        self.scheduler.stop();
        self.sim.borrow_mut().clear();
    }
}
