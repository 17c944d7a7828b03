use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::config::FireworksConfig;
use super::particle::{Particle, ParticleKind, Viewport, uniform};
use crate::surface::Surface;

/// Upfront allocation bound; larger caps grow on demand.
const PREALLOC: usize = 256;

/// Frame-driven particle set: confetti drifting down, rockets climbing and
/// bursting into sparks.
///
/// Each `tick` builds the next generation from the current one instead of
/// editing the set in place; a bursting rocket simply contributes its sparks
/// to the next generation and not itself.
pub struct ParticleSimulator<R: Rng = ChaCha8Rng> {
    config: FireworksConfig,
    viewport: Viewport,
    particles: Vec<Particle>,
    rng: R,
    frame: u64,
    confetti_timer: u32,
    rocket_timer: u32,
    rocket_threshold: u32,
}

impl ParticleSimulator<ChaCha8Rng> {
    /// Deterministic simulator; same seed, same show.
    pub fn with_seed(config: FireworksConfig, width: f64, height: f64, seed: u64) -> Self {
        Self::new(config, width, height, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> ParticleSimulator<R> {
    pub fn new(config: FireworksConfig, width: f64, height: f64, mut rng: R) -> Self {
        let rocket_threshold = roll_rocket_threshold(&mut rng, &config);
        Self {
            viewport: Viewport { width, height, margin: config.margin },
            config,
            particles: Vec::with_capacity(config.max_particles.min(PREALLOC)),
            rng,
            frame: 0,
            confetti_timer: 0,
            rocket_timer: 0,
            rocket_threshold,
        }
    }

    /// Scatter the opening confetti over the whole screen so the first frame
    /// is not empty.
    pub fn seed(&mut self) {
        let room = self.config.max_particles.saturating_sub(self.particles.len());
        for _ in 0..self.config.initial_confetti.min(room) {
            let mut p = Particle::confetti(&mut self.rng, self.viewport.width);
            p.y = uniform(&mut self.rng, 0.0, self.viewport.height);
            self.particles.push(p);
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn set_spawning(&mut self, on: bool) {
        self.config.spawning = on;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &FireworksConfig {
        &self.config
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Drop every live particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Test hook: place a particle directly (still subject to the cap).
    pub fn push(&mut self, p: Particle) -> bool {
        if self.particles.len() >= self.config.max_particles {
            return false;
        }
        self.particles.push(p);
        true
    }

    /// Advance one animation frame and draw it onto `surface`.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.frame += 1;
        surface.clear();
        if self.config.spawning {
            self.spawn_confetti();
            self.spawn_rocket();
        }

        let alpha_floor = self.config.alpha_floor;
        let viewport = self.viewport;
        let mut survivors = Vec::with_capacity(self.particles.len());
        let mut bursts: Vec<Particle> = Vec::new();

        for mut p in self.particles.drain(..) {
            p.integrate();
            if p.should_burst() {
                bursts.push(p);
                continue;
            }
            p.draw(surface);
            if viewport.keeps(&p, alpha_floor) {
                survivors.push(p);
            }
        }

        // Sparks only take capacity the survivors left free.
        let mut room = self.config.max_particles.saturating_sub(survivors.len());
        for rocket in &bursts {
            let sparks = rocket.burst(&mut self.rng);
            log::debug!("rocket burst at ({:.0}, {:.0}) into {} sparks", rocket.x, rocket.y, sparks.len());
            for s in sparks {
                if room == 0 {
                    break;
                }
                if viewport.keeps(&s, alpha_floor) {
                    survivors.push(s);
                    room -= 1;
                }
            }
        }

        self.particles = survivors;
    }

    fn spawn_confetti(&mut self) {
        self.confetti_timer += 1;
        if self.confetti_timer >= self.config.confetti_every && self.particles.len() < self.config.max_particles {
            self.confetti_timer = 0;
            let p = Particle::confetti(&mut self.rng, self.viewport.width);
            self.particles.push(p);
        }
    }

    fn spawn_rocket(&mut self) {
        self.rocket_timer += 1;
        if self.rocket_timer < self.rocket_threshold {
            return;
        }
        self.rocket_timer = 0;
        self.rocket_threshold = roll_rocket_threshold(&mut self.rng, &self.config);
        if self.particles.len() < self.config.max_particles {
            let p = Particle::rocket(&mut self.rng, self.viewport.width, self.viewport.height);
            self.particles.push(p);
        }
    }

    pub fn count_kind(&self, kind: ParticleKind) -> usize {
        self.particles.iter().filter(|p| p.kind == kind).count()
    }
}

fn roll_rocket_threshold<R: Rng + ?Sized>(rng: &mut R, config: &FireworksConfig) -> u32 {
    if config.rocket_every_max <= config.rocket_every_min {
        return config.rocket_every_min.max(1);
    }
    rng.gen_range(config.rocket_every_min..config.rocket_every_max).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::PALETTE;
    use crate::surface::{DrawOp, RecordingSurface};

    fn quiet() -> FireworksConfig {
        FireworksConfig { spawning: false, ..FireworksConfig::default() }
    }

    fn rocket_at(x: f64, y: f64, vy: f64) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy,
            alpha: 1.0,
            color: PALETTE[0],
            size: 3.0,
            decay: 0.0,
            kind: ParticleKind::Rocket,
            rotation: 0.0,
            rotation_speed: 0.0,
        }
    }

    #[test]
    fn seed_scatters_confetti_vertically() {
        let mut sim = ParticleSimulator::with_seed(FireworksConfig::default(), 800.0, 600.0, 1);
        sim.seed();
        assert_eq!(sim.len(), 30);
        assert_eq!(sim.count_kind(ParticleKind::Confetti), 30);
        assert!(sim.particles().iter().all(|p| (0.0..600.0).contains(&p.y)));
        assert!(sim.particles().iter().any(|p| p.y > 10.0));
    }

    #[test]
    fn confetti_every_eighth_frame() {
        let cfg = FireworksConfig { rocket_every_min: 10_000, rocket_every_max: 10_001, ..FireworksConfig::default() };
        let mut sim = ParticleSimulator::with_seed(cfg, 800.0, 600.0, 2);
        let mut surface = RecordingSurface::new();
        for _ in 0..7 {
            sim.tick(&mut surface);
        }
        assert_eq!(sim.len(), 0);
        sim.tick(&mut surface);
        assert_eq!(sim.count_kind(ParticleKind::Confetti), 1);
        for _ in 0..8 {
            sim.tick(&mut surface);
        }
        assert_eq!(sim.count_kind(ParticleKind::Confetti), 2);
    }

    #[test]
    fn rocket_bursts_in_place_of_itself() {
        let mut sim = ParticleSimulator::with_seed(quiet(), 800.0, 600.0, 3);
        // vy -1.1 + 0.15 gravity crosses the -1 threshold this frame.
        sim.push(rocket_at(400.0, 300.0, -1.1));
        let mut surface = RecordingSurface::new();
        sim.tick(&mut surface);
        assert_eq!(sim.count_kind(ParticleKind::Rocket), 0);
        let sparks = sim.count_kind(ParticleKind::Spark);
        assert!((25..=45).contains(&sparks), "got {sparks} sparks");
        assert!(sim.particles().iter().all(|p| p.x == 400.0 && (p.y - 298.9).abs() < 1e-9));
        // Bursting rocket draws nothing on its last frame.
        assert!(surface.last_frame().is_empty());
    }

    #[test]
    fn climbing_rocket_is_drawn_and_kept() {
        let mut sim = ParticleSimulator::with_seed(quiet(), 800.0, 600.0, 4);
        sim.push(rocket_at(400.0, 600.0, -10.0));
        let mut surface = RecordingSurface::new();
        sim.tick(&mut surface);
        assert_eq!(sim.count_kind(ParticleKind::Rocket), 1);
        assert!(matches!(surface.last_frame(), [DrawOp::Circle { alpha, .. }] if *alpha == 1.0));
    }

    #[test]
    fn sparks_respect_cap() {
        let cfg = FireworksConfig { max_particles: 40, spawning: false, ..FireworksConfig::default() };
        let mut sim = ParticleSimulator::with_seed(cfg, 800.0, 600.0, 5);
        for i in 0..20 {
            let mut p = rocket_at(100.0 + i as f64, 300.0, -20.0);
            p.kind = ParticleKind::Confetti;
            p.vy = 0.0;
            sim.push(p);
        }
        sim.push(rocket_at(400.0, 300.0, -1.1));
        sim.tick(&mut RecordingSurface::new());
        assert_eq!(sim.len(), 40);
        assert_eq!(sim.count_kind(ParticleKind::Spark), 20);
    }

    #[test]
    fn culls_faded_and_offscreen() {
        let mut sim = ParticleSimulator::with_seed(quiet(), 100.0, 100.0, 6);
        let mut faded = rocket_at(50.0, 50.0, 0.0);
        faded.kind = ParticleKind::Spark;
        faded.alpha = 0.02;
        faded.decay = 0.02;
        let mut gone = faded.clone();
        gone.alpha = 1.0;
        gone.decay = 0.0;
        gone.x = 119.5;
        gone.vx = 1.0;
        let mut stays = gone.clone();
        stays.x = 50.0;
        stays.y = -500.0;
        sim.push(faded);
        sim.push(gone);
        sim.push(stays);
        sim.tick(&mut RecordingSurface::new());
        assert_eq!(sim.len(), 1);
        assert_eq!(sim.particles()[0].y, -500.0);
    }

    #[test]
    fn huge_cap_does_not_preallocate() {
        let cfg = FireworksConfig { max_particles: usize::MAX, ..quiet() };
        let mut sim = ParticleSimulator::with_seed(cfg, 800.0, 600.0, 1);
        sim.seed();
        assert_eq!(sim.len(), 30);
    }

    #[test]
    fn sparks_born_below_screen_are_dropped() {
        let mut sim = ParticleSimulator::with_seed(quiet(), 800.0, 600.0, 8);
        sim.push(rocket_at(400.0, 700.0, -1.1));
        sim.tick(&mut RecordingSurface::new());
        assert!(sim.is_empty());
    }

    #[test]
    fn disabled_spawning_never_adds() {
        let mut sim = ParticleSimulator::with_seed(quiet(), 800.0, 600.0, 7);
        let mut surface = RecordingSurface::new();
        for _ in 0..500 {
            sim.tick(&mut surface);
        }
        assert!(sim.is_empty());
    }
}
