use serde::{Deserialize, Serialize};

/// Tunables for [`super::ParticleSimulator`]. Units are frames and canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksConfig {
    /// Hard ceiling on live particles; spawns are skipped at the cap.
    pub max_particles: usize,
    /// A confetti piece is dropped every this many frames.
    pub confetti_every: u32,
    /// Rocket cadence is re-rolled in `[rocket_every_min, rocket_every_max)`.
    pub rocket_every_min: u32,
    pub rocket_every_max: u32,
    /// Confetti pieces scattered over the screen on start.
    pub initial_confetti: usize,
    pub spawning: bool,
    /// Viewport padding used by culling.
    pub margin: f64,
    pub alpha_floor: f64,
}

impl FireworksConfig {
    /// Largest cap accepted from outside configuration.
    pub const MAX_PARTICLES_LIMIT: usize = 10_000;

    pub fn validate(&self) -> Result<(), String> {
        if self.max_particles > Self::MAX_PARTICLES_LIMIT {
            return Err(format!(
                "fireworks.max_particles {} exceeds {}",
                self.max_particles,
                Self::MAX_PARTICLES_LIMIT
            ));
        }
        if self.initial_confetti > self.max_particles {
            return Err(format!(
                "fireworks.initial_confetti {} exceeds max_particles {}",
                self.initial_confetti, self.max_particles
            ));
        }
        if !(self.margin.is_finite() && self.alpha_floor.is_finite()) {
            return Err("fireworks.margin and alpha_floor must be finite".to_string());
        }
        Ok(())
    }
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            max_particles: 180,
            confetti_every: 8,
            rocket_every_min: 60,
            rocket_every_max: 120,
            initial_confetti: 30,
            spawning: true,
            margin: 20.0,
            alpha_floor: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FireworksConfig;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: FireworksConfig = serde_json::from_str(r#"{"max_particles": 50}"#).unwrap();
        assert_eq!(cfg.max_particles, 50);
        assert_eq!(cfg.confetti_every, 8);
        assert_eq!(cfg.initial_confetti, 30);
    }

    #[test]
    fn oversized_cap_fails_validation() {
        let cfg = FireworksConfig { max_particles: usize::MAX, ..FireworksConfig::default() };
        assert!(cfg.validate().is_err());
        assert!(FireworksConfig::default().validate().is_ok());
    }
}
