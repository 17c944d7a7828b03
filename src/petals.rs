//! Falling apricot/peach blossoms shown while the countdown is still running.
//!
//! Layout only: each petal gets a column, a start delay, a fall duration and a
//! glyph size. The fall itself is a CSS `fall` keyframe animation on the page.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::particles::uniform;

pub const FLOWERS: [&str; 3] = ["🌸", "🏵️", "🌺"];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetalConfig {
    pub count: usize,
    /// Random nudge added to each evenly spaced column, in percent.
    pub jitter_percent: f64,
    pub max_delay_s: f64,
    pub min_duration_s: f64,
    pub duration_spread_s: f64,
    pub min_size_rem: f64,
    pub size_spread_rem: f64,
}

impl Default for PetalConfig {
    fn default() -> Self {
        Self {
            count: 18,
            jitter_percent: 5.0,
            max_delay_s: 8.0,
            min_duration_s: 8.0,
            duration_spread_s: 7.0,
            min_size_rem: 1.2,
            size_spread_rem: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Petal {
    pub left_percent: f64,
    pub delay_s: f64,
    pub duration_s: f64,
    pub size_rem: f64,
    pub symbol: &'static str,
}

impl Petal {
    /// Inline style for an absolutely positioned `<span>`.
    pub fn style(&self) -> String {
        format!(
            "position:absolute; left:{:.2}%; top:-5%; opacity:0.6; font-size:{:.2}rem; animation:fall {:.2}s linear {:.2}s infinite;",
            self.left_percent, self.size_rem, self.duration_s, self.delay_s
        )
    }
}

pub struct PetalField {
    petals: Vec<Petal>,
}

impl PetalField {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, config: &PetalConfig) -> Self {
        let count = config.count.max(1) as f64;
        let petals = (0..config.count)
            .map(|i| Petal {
                left_percent: i as f64 / count * 100.0 + uniform(rng, 0.0, config.jitter_percent),
                delay_s: uniform(rng, 0.0, config.max_delay_s),
                duration_s: config.min_duration_s + uniform(rng, 0.0, config.duration_spread_s),
                size_rem: config.min_size_rem + uniform(rng, 0.0, config.size_spread_rem),
                symbol: FLOWERS[i % FLOWERS.len()],
            })
            .collect();
        Self { petals }
    }

    pub fn petals(&self) -> &[Petal] {
        &self.petals
    }
}
