//! LEO Link Simulator
//!
//! Headless driver for the link-selection core. Wires the constellation
//! state, the link selector, and the ground site into a single session that
//! advances once per rendered frame.

use constellation_state::ConstellationConfig;
use link_selector::SelectorConfig;
use orbital_mechanics::GroundSite;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub mod session;

pub use session::{FrameReport, SimulationSession};

/// Default frame cadence
pub const DEFAULT_FRAME_RATE_HZ: f64 = 60.0;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Constellation config: {0}")]
    Constellation(#[from] constellation_state::ConfigError),
    #[error("Selector config: {0}")]
    Selector(#[from] link_selector::SelectorError),
    #[error("Frame rate must be positive, got {0}")]
    InvalidFrameRate(f64),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Session configuration, loadable from JSON with every field optional
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub constellation: ConstellationConfig,
    pub selector: SelectorConfig,
    pub site: GroundSite,
    /// RNG seed; a random one is drawn when absent
    pub seed: Option<u64>,
    pub frame_rate_hz: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            constellation: ConstellationConfig::default(),
            selector: SelectorConfig::default(),
            site: GroundSite::default(),
            seed: None,
            frame_rate_hz: DEFAULT_FRAME_RATE_HZ,
        }
    }
}

impl SimConfig {
    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.constellation.validate()?;
        self.selector.validate()?;
        if !(self.frame_rate_hz > 0.0 && self.frame_rate_hz.is_finite()) {
            return Err(SimError::InvalidFrameRate(self.frame_rate_hz));
        }
        Ok(())
    }

    /// Simulated seconds per frame
    pub fn frame_period_s(&self) -> f64 {
        1.0 / self.frame_rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.frame_period_s() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "seed": 42,
                "constellation": {{ "satellite_count": 36 }},
                "site": {{ "latitude_deg": 52.0, "longitude_deg": 4.4 }}
            }}"#
        )
        .unwrap();

        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.constellation.satellite_count, 36);
        assert_eq!(config.site.latitude_deg, 52.0);
        assert_eq!(config.site.texture_offset_deg, 90.0);
        assert_eq!(config.selector, SelectorConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimConfig::load(Path::new("/nonexistent/leo-link.json")).unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }

    #[test]
    fn test_validate_surfaces_nested_errors() {
        let mut config = SimConfig::default();
        config.constellation.satellite_count = 0;
        assert!(matches!(config.validate(), Err(SimError::Constellation(_))));

        let mut config = SimConfig::default();
        config.selector.hysteresis_margin = -3.0;
        assert!(matches!(config.validate(), Err(SimError::Selector(_))));

        let config = SimConfig {
            frame_rate_hz: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidFrameRate(_))));
    }
}
