//! Page configuration, optionally overridden from JS as a JSON string.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::countdown::default_target;
use crate::error::{Error, Result};
use crate::particles::FireworksConfig;
use crate::petals::PetalConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// RFC 3339 instant the countdown runs to.
    pub target: DateTime<FixedOffset>,
    pub poll_interval_ms: u32,
    pub canvas_id: String,
    pub petal_container_id: String,
    pub fireworks: FireworksConfig,
    pub petals: PetalConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            poll_interval_ms: 1000,
            canvas_id: "tet-fireworks".to_string(),
            petal_container_id: "tet-petals".to_string(),
            fireworks: FireworksConfig::default(),
            petals: PetalConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.fireworks.validate().map_err(Error::InvalidConfig)?;
        Ok(config)
    }

    /// Defaults when `json` is absent or blank.
    pub fn from_optional_json(json: Option<&str>) -> Result<Self> {
        match json.map(str::trim) {
            Some(s) if !s.is_empty() => Self::from_json(s),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_means_defaults() {
        assert_eq!(SiteConfig::from_optional_json(None).unwrap(), SiteConfig::default());
        assert_eq!(SiteConfig::from_optional_json(Some("  ")).unwrap(), SiteConfig::default());
    }

    #[test]
    fn overrides_target_and_nested_fields() {
        let cfg = SiteConfig::from_json(
            r#"{"target": "2027-02-06T00:00:00+07:00", "fireworks": {"max_particles": 90}}"#,
        )
        .unwrap();
        assert_eq!(cfg.target.to_rfc3339(), "2027-02-06T00:00:00+07:00");
        assert_eq!(cfg.fireworks.max_particles, 90);
        assert_eq!(cfg.fireworks.confetti_every, 8);
        assert_eq!(cfg.poll_interval_ms, 1000);
    }

    #[test]
    fn bad_target_is_config_error() {
        let err = SiteConfig::from_json(r#"{"target": "next tuesday"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn oversized_particle_cap_is_rejected() {
        let err = SiteConfig::from_json(r#"{"fireworks": {"max_particles": 18446744073709551615}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "got {err:?}");
    }
}
