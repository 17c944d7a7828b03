//! Tet countdown core crate.
//!
//! Counts down to Tet Binh Ngo (2026-02-17 00:00 UTC+7). While counting, the
//! page shows the countdown grid over falling blossoms; once the target is
//! reached it switches to the greeting over a fireworks/confetti canvas.
//! The countdown maths and the particle simulator are host-agnostic and run
//! natively under `cargo test`; `web` binds them to the browser.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod countdown;
pub mod driver;
pub mod error;
pub mod logging;
pub mod particles;
pub mod petals;
pub mod scheduler;
pub mod surface;
mod web;

pub use config::SiteConfig;
pub use countdown::{Countdown, CountdownEngine, PageMode, TimeLeft};
pub use error::Error;
pub use particles::{FireworksConfig, Particle, ParticleKind, ParticleSimulator};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(if cfg!(debug_assertions) { log::LevelFilter::Debug } else { log::LevelFilter::Info });
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Mount the page. `config_json` optionally overrides [`SiteConfig`] fields.
#[wasm_bindgen]
pub fn start_site(config_json: Option<String>) -> std::result::Result<(), JsValue> {
    let config = SiteConfig::from_optional_json(config_json.as_deref())?;
    web::start_site(config)?;
    Ok(())
}

/// Forward new viewport dimensions to the fireworks canvas, if mounted.
#[wasm_bindgen]
pub fn resize_fireworks(width: f64, height: f64) {
    web::resize_fireworks(width, height);
}

/// Stop all timers and frame callbacks and release the layers. Idempotent.
#[wasm_bindgen]
pub fn teardown_site() {
    web::teardown_site();
}

/// Latest countdown sample as JSON (`{"days":..}` or `null` once reached);
/// `undefined` before the site is started.
#[wasm_bindgen]
pub fn countdown_snapshot() -> Option<String> {
    web::countdown_snapshot_json()
}
