use std::f64::consts::TAU;

use rand::Rng;

use crate::surface::Surface;

/// Tet red and gold.
pub const PALETTE: [&str; 6] = ["#dc2626", "#fbbf24", "#f59e0b", "#ef4444", "#fcd34d", "#ff6b35"];

const ROCKET_GRAVITY: f64 = 0.15;
const SPARK_GRAVITY: f64 = 0.06;
const CONFETTI_GRAVITY: f64 = 0.01;
/// A rocket bursts once its climb has slowed to this vertical speed.
const BURST_VY: f64 = -1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    /// Rising shell; bursts into sparks near the top of its arc.
    Rocket,
    Spark,
    /// Falling, spinning paper strip.
    Confetti,
}

impl ParticleKind {
    fn gravity(self) -> f64 {
        match self {
            ParticleKind::Rocket => ROCKET_GRAVITY,
            ParticleKind::Spark => SPARK_GRAVITY,
            ParticleKind::Confetti => CONFETTI_GRAVITY,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub alpha: f64,
    pub color: &'static str,
    pub size: f64,
    pub decay: f64,
    pub kind: ParticleKind,
    pub rotation: f64,
    pub rotation_speed: f64,
}

/// Uniform sample in `[lo, hi)`; tolerates `lo == hi` (zero-sized canvas).
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + rng.gen_range(0.0..1.0) * (hi - lo)
}

pub(crate) fn pick_color<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PALETTE[rng.gen_range(0..PALETTE.len())]
}

impl Particle {
    /// Confetti entering just above the top edge.
    pub fn confetti<R: Rng + ?Sized>(rng: &mut R, width: f64) -> Self {
        Self {
            x: uniform(rng, 0.0, width),
            y: -10.0,
            vx: uniform(rng, -0.75, 0.75),
            vy: uniform(rng, 1.5, 3.5),
            alpha: uniform(rng, 0.8, 1.0),
            color: pick_color(rng),
            size: uniform(rng, 3.0, 7.0),
            decay: 0.0003,
            kind: ParticleKind::Confetti,
            rotation: uniform(rng, 0.0, TAU),
            rotation_speed: uniform(rng, -0.05, 0.05),
        }
    }

    /// Rocket launched from the bottom edge, somewhere in the middle 60%.
    pub fn rocket<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
        Self {
            x: uniform(rng, width * 0.2, width * 0.8),
            y: height,
            vx: uniform(rng, -1.0, 1.0),
            vy: uniform(rng, -12.0, -8.0),
            alpha: 1.0,
            color: pick_color(rng),
            size: 3.0,
            decay: 0.0,
            kind: ParticleKind::Rocket,
            rotation: 0.0,
            rotation_speed: 0.0,
        }
    }

    /// Ring of 25..=44 sparks centred on this particle's position.
    pub fn burst<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Particle> {
        let count = 25 + rng.gen_range(0..20);
        let base = pick_color(rng);
        (0..count)
            .map(|i| {
                let angle = TAU * i as f64 / count as f64 + uniform(rng, -0.15, 0.15);
                let speed = uniform(rng, 2.0, 6.0);
                let color = if rng.gen_bool(0.3) { pick_color(rng) } else { base };
                Particle {
                    x: self.x,
                    y: self.y,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                    alpha: 1.0,
                    color,
                    size: uniform(rng, 1.5, 3.5),
                    decay: uniform(rng, 0.015, 0.025),
                    kind: ParticleKind::Spark,
                    rotation: 0.0,
                    rotation_speed: 0.0,
                }
            })
            .collect()
    }

    /// One frame of motion: position, fade, spin, then gravity.
    pub fn integrate(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.alpha -= self.decay;
        self.rotation += self.rotation_speed;
        self.vy += self.kind.gravity();
    }

    pub fn should_burst(&self) -> bool {
        self.kind == ParticleKind::Rocket && self.vy >= BURST_VY
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        match self.kind {
            ParticleKind::Rocket => surface.fill_circle(self.x, self.y, self.size, self.color, 1.0),
            ParticleKind::Spark => surface.fill_circle(self.x, self.y, self.size, self.color, self.alpha),
            ParticleKind::Confetti => surface.fill_rotated_rect(
                self.x,
                self.y,
                self.size,
                self.size / 2.0,
                self.rotation,
                self.color,
                self.alpha,
            ),
        }
    }
}

/// Canvas bounds padded by `margin`; open above, since rockets and sparks
/// may climb past the top edge and fall back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Viewport {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x > -self.margin && x < self.width + self.margin && y < self.height + self.margin
    }

    /// Culling predicate: visible enough and still on (or near) screen.
    pub fn keeps(&self, p: &Particle, alpha_floor: f64) -> bool {
        p.alpha > alpha_floor && self.contains(p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn confetti_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let p = Particle::confetti(&mut rng, 800.0);
            assert!((0.0..800.0).contains(&p.x));
            assert_eq!(p.y, -10.0);
            assert!((-0.75..0.75).contains(&p.vx));
            assert!((1.5..3.5).contains(&p.vy));
            assert!((0.8..1.0).contains(&p.alpha));
            assert!((3.0..7.0).contains(&p.size));
            assert!((-0.05..0.05).contains(&p.rotation_speed));
            assert!(PALETTE.contains(&p.color));
        }
    }

    #[test]
    fn rocket_launches_from_bottom_middle() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let p = Particle::rocket(&mut rng, 1000.0, 600.0);
            assert!((200.0..800.0).contains(&p.x));
            assert_eq!(p.y, 600.0);
            assert!((-12.0..-8.0).contains(&p.vy));
        }
    }

    #[test]
    fn burst_ring() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut rocket = Particle::rocket(&mut rng, 400.0, 400.0);
        rocket.x = 123.0;
        rocket.y = 45.0;
        for _ in 0..50 {
            let sparks = rocket.burst(&mut rng);
            assert!((25..45).contains(&sparks.len()));
            for s in &sparks {
                assert_eq!((s.x, s.y), (123.0, 45.0));
                assert_eq!(s.kind, ParticleKind::Spark);
                let speed = (s.vx * s.vx + s.vy * s.vy).sqrt();
                assert!((2.0 - 1e-9..6.0 + 1e-9).contains(&speed));
                assert!((0.015..0.025).contains(&s.decay));
            }
        }
    }

    #[test]
    fn confetti_spins_and_falls() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut p = Particle::confetti(&mut rng, 100.0);
        let (y0, vy0, rot0) = (p.y, p.vy, p.rotation);
        p.integrate();
        assert!((p.y - (y0 + vy0)).abs() < 1e-12);
        assert!((p.vy - (vy0 + 0.01)).abs() < 1e-12);
        assert!((p.rotation - (rot0 + p.rotation_speed)).abs() < 1e-12);
    }

    #[test]
    fn viewport_is_open_above() {
        let vp = Viewport { width: 100.0, height: 100.0, margin: 20.0 };
        assert!(vp.contains(50.0, -5_000.0));
        assert!(!vp.contains(-20.0, 50.0));
        assert!(!vp.contains(120.0, 50.0));
        assert!(!vp.contains(50.0, 120.0));
        assert!(vp.contains(119.9, 119.9));
    }
}
