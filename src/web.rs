//! Browser glue: DOM lookups, the two page layers, and the thread-local
//! state the exported functions operate on.
//!
//! The countdown driver and the visual layers live in separate thread-locals:
//! the countdown publishes its first sample synchronously from inside
//! `start`, and that publish switches layers.

use std::cell::RefCell;

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, Event, HtmlCanvasElement, Window, window};

use crate::config::SiteConfig;
use crate::countdown::{Countdown, CountdownEngine, PageMode, TimeLeft};
use crate::driver::{CountdownDriver, FireworksDriver, ModeSwitch};
use crate::error::{Error, Result};
use crate::particles::ParticleSimulator;
use crate::petals::PetalField;
use crate::scheduler::{AnimationFrameLoop, IntervalTimer, performance_now};
use crate::surface::{CanvasSurface, Surface};

type Fireworks = FireworksDriver<AnimationFrameLoop, CanvasSurface>;

/// Background and mode state, switched by countdown samples.
struct Layers {
    config: SiteConfig,
    mode: ModeSwitch,
    fireworks: Option<Fireworks>,
    resize: Option<ResizeListener>,
    petals: Option<Element>,
}

thread_local! {
    static COUNTDOWN: RefCell<Option<CountdownDriver<IntervalTimer>>> = const { RefCell::new(None) };
    static LAYERS: RefCell<Option<Layers>> = const { RefCell::new(None) };
}

fn win() -> Result<Window> {
    window().ok_or(Error::NoWindow)
}

fn doc() -> Result<Document> {
    win()?.document().ok_or(Error::NoDocument)
}

fn viewport_size(win: &Window) -> (f64, f64) {
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            log::warn!("getrandom unavailable ({err}), seeding from clock");
            performance_now().to_bits()
        }
    }
}

pub fn start_site(config: SiteConfig) -> Result<()> {
    teardown_site();
    log::info!("mounting countdown to {}", config.target.to_rfc3339());

    let engine = CountdownEngine::new(config.target);
    let mut driver = CountdownDriver::new(engine, IntervalTimer::new(config.poll_interval_ms));
    LAYERS.with(|l| {
        l.replace(Some(Layers { config, mode: ModeSwitch::default(), fireworks: None, resize: None, petals: None }));
    });

    driver.start(|| Utc::now().timestamp_millis(), publish)?;
    COUNTDOWN.with(|c| c.replace(Some(driver)));
    Ok(())
}

pub fn teardown_site() {
    if let Some(mut driver) = COUNTDOWN.with(|c| c.borrow_mut().take()) {
        driver.teardown();
    }
    if let Some(mut layers) = LAYERS.with(|l| l.borrow_mut().take()) {
        layers.unmount_fireworks();
        layers.unmount_petals();
        log::info!("site torn down");
    }
}

pub fn resize_fireworks(width: f64, height: f64) {
    LAYERS.with(|l| {
        if let Ok(mut slot) = l.try_borrow_mut() {
            if let Some(fw) = slot.as_mut().and_then(|layers| layers.fireworks.as_mut()) {
                fw.resize(width, height);
            }
        }
    });
}

pub fn countdown_snapshot_json() -> Option<String> {
    let sample = COUNTDOWN.with(|c| c.try_borrow().ok().and_then(|d| d.as_ref().and_then(|d| d.current())))?;
    sample.to_json().ok()
}

fn publish(sample: Countdown) {
    if let Some(left) = sample.time_left() {
        if let Err(err) = render_time_left(&left) {
            log::warn!("countdown render failed: {err}");
        }
    }
    let Some(mode) = PageMode::for_sample(Some(sample)) else {
        return;
    };
    LAYERS.with(|l| {
        let Ok(mut slot) = l.try_borrow_mut() else {
            return;
        };
        if let Some(layers) = slot.as_mut() {
            if let Err(err) = layers.apply_mode(mode) {
                log::warn!("switching to {} failed: {err}", mode.as_str());
            }
        }
    });
}

fn render_time_left(left: &TimeLeft) -> Result<()> {
    let doc = doc()?;
    for unit in left.units() {
        if let Some(el) = doc.get_element_by_id(&format!("tet-{}", unit.key)) {
            el.set_text_content(Some(&unit.padded()));
        }
    }
    Ok(())
}

impl Layers {
    fn apply_mode(&mut self, mode: PageMode) -> Result<()> {
        let mut switch = std::mem::take(&mut self.mode);
        let switched = switch.switch(mode, |mode| {
            log::info!("page mode -> {}", mode.as_str());
            match mode {
                PageMode::Countdown => {
                    self.unmount_fireworks();
                    self.mount_petals()?;
                }
                PageMode::Celebration => {
                    self.unmount_petals();
                    self.mount_fireworks()?;
                }
            }
            if let Some(body) = doc()?.body() {
                body.set_attribute("data-mode", mode.as_str())?;
            }
            Ok(())
        });
        self.mode = switch;
        switched.map(|_| ())
    }

    fn mount_petals(&mut self) -> Result<()> {
        let doc = doc()?;
        let id = &self.config.petal_container_id;
        let container = doc
            .get_element_by_id(id)
            .ok_or_else(|| Error::MissingElement(id.clone()))?;
        let mut rng = ChaCha8Rng::seed_from_u64(entropy_seed());
        let field = PetalField::generate(&mut rng, &self.config.petals);
        container.set_inner_html("");
        for petal in field.petals() {
            let span = doc.create_element("span")?;
            span.set_attribute("style", &petal.style())?;
            span.set_attribute("aria-hidden", "true")?;
            span.set_text_content(Some(petal.symbol));
            container.append_child(&span)?;
        }
        self.petals = Some(container);
        Ok(())
    }

    fn unmount_petals(&mut self) {
        if let Some(container) = self.petals.take() {
            container.set_inner_html("");
        }
    }

    fn mount_fireworks(&mut self) -> Result<()> {
        let win = win()?;
        let doc = doc()?;
        let id = &self.config.canvas_id;

        // Create / reuse the full-screen canvas.
        let canvas: HtmlCanvasElement = match doc.get_element_by_id(id) {
            Some(el) => el.dyn_into().map_err(|_| Error::MissingElement(id.clone()))?,
            None => {
                let c: HtmlCanvasElement = doc
                    .create_element("canvas")?
                    .dyn_into()
                    .map_err(|_| Error::Js("created element is not a canvas".into()))?;
                c.set_id(id);
                c.set_attribute("aria-hidden", "true")?;
                c.set_attribute("style", "position:fixed; inset:0; pointer-events:none; z-index:0;")?;
                doc.body().ok_or(Error::NoDocument)?.append_child(&c)?;
                c
            }
        };
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or(Error::NoContext)?
            .dyn_into()
            .map_err(|_| Error::NoContext)?;

        let (w, h) = viewport_size(&win);
        let mut surface = CanvasSurface::new(canvas, ctx);
        surface.resize(w, h);
        let sim = ParticleSimulator::with_seed(self.config.fireworks, w, h, entropy_seed());
        let mut fireworks = FireworksDriver::new(sim, surface, AnimationFrameLoop::new());
        fireworks.start()?;
        self.fireworks = Some(fireworks);
        self.resize = Some(ResizeListener::attach(&win)?);
        Ok(())
    }

    fn unmount_fireworks(&mut self) {
        // Listener first so no resize lands on a stopped driver.
        self.resize.take();
        if let Some(mut fw) = self.fireworks.take() {
            fw.teardown();
        }
    }
}

/// `resize` listener on `window`, removed on drop.
struct ResizeListener {
    target: Window,
    closure: Closure<dyn FnMut(Event)>,
}

impl ResizeListener {
    fn attach(win: &Window) -> Result<Self> {
        let closure = Closure::wrap(Box::new(move |_e: Event| {
            if let Some(w) = window() {
                let (width, height) = viewport_size(&w);
                resize_fireworks(width, height);
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        Ok(Self { target: win.clone(), closure })
    }
}

impl Drop for ResizeListener {
    fn drop(&mut self) {
        self.target
            .remove_event_listener_with_callback("resize", self.closure.as_ref().unchecked_ref())
            .ok();
    }
}
