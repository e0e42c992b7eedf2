//! Satellite Link Selector
//!
//! Scores every satellite against the ground observer once per frame, picks
//! the connected satellite under a hysteresis policy, and emits the
//! telemetry snapshot shown to the operator.
//!
//! # Scoring Model
//!
//! ```text
//! q(sat) = 0                                  if status == failure
//!        = Q(|p_sat - p_obs|) · a             if space weather is active
//!        = Q(|p_sat - p_obs|)                 otherwise
//!
//! Q(d)   = 0 for d > 4.0, else max(0, 100 - 20·d)
//! ```
//!
//! # Hysteresis
//!
//! | Current | Condition | Result |
//! |---------|-----------|--------|
//! | Unlinked | best exists | Linked(best) |
//! | Linked(c) | best ≠ c and (q(c) ≤ 0 or q(best) > q(c) + 10) | Linked(best) |
//! | Linked(c) | c failed, no best | Unlinked |
//! | Linked(c) | otherwise | Linked(c) |

use constellation_state::WeatherState;
use orbital_mechanics::{SatelliteStatus, SignalModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub mod scorer;
pub mod selector;

pub use scorer::{score_satellites, ScoredSatellite};
pub use selector::{best_candidate, decide, next_candidate, LinkSelector, LinkState, Transition};

/// Minimum quality advantage before a handover (quality points)
pub const HYSTERESIS_MARGIN: f64 = 10.0;

/// Signal multiplier while space weather is active
pub const WEATHER_ATTENUATION: f64 = 0.5;

/// Display latency per scene unit of slant distance (ms)
pub const LATENCY_MS_PER_UNIT: f64 = 0.02;

/// Signal bar color thresholds
pub const STRONG_SIGNAL_THRESHOLD: f64 = 70.0;
pub const FAIR_SIGNAL_THRESHOLD: f64 = 40.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    #[error("Hysteresis margin must be non-negative, got {0}")]
    InvalidMargin(f64),
    #[error("Weather attenuation must be in [0, 1], got {0}")]
    InvalidAttenuation(f64),
    #[error("Signal model needs a positive cutoff and falloff (cutoff {cutoff}, falloff {falloff})")]
    InvalidSignalModel { cutoff: f64, falloff: f64 },
}

pub type Result<T> = std::result::Result<T, SelectorError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    pub signal: SignalModel,
    pub hysteresis_margin: f64,
    pub weather_attenuation: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            signal: SignalModel::default(),
            hysteresis_margin: HYSTERESIS_MARGIN,
            weather_attenuation: WEATHER_ATTENUATION,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.hysteresis_margin >= 0.0) {
            return Err(SelectorError::InvalidMargin(self.hysteresis_margin));
        }
        if !(0.0..=1.0).contains(&self.weather_attenuation) {
            return Err(SelectorError::InvalidAttenuation(self.weather_attenuation));
        }
        if !(self.signal.cutoff > 0.0 && self.signal.falloff > 0.0) {
            return Err(SelectorError::InvalidSignalModel {
                cutoff: self.signal.cutoff,
                falloff: self.signal.falloff,
            });
        }
        Ok(())
    }
}

/// Per-satellite telemetry, recomputed every frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SatelliteTelemetry {
    /// Synthetic signal score (0-100)
    pub rssi: f64,
    /// Slant distance to the observer (scene units)
    pub distance: f64,
    pub altitude_km: f64,
    pub velocity_km_s: f64,
    pub latency_ms: f64,
}

/// Placement data for the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteTrack {
    pub id: String,
    pub position: [f64; 3],
    pub status: SatelliteStatus,
    pub connected: bool,
}

/// Signal bar color band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalBand {
    Strong,
    Fair,
    Weak,
}

impl SignalBand {
    pub fn from_quality(quality: f64) -> Self {
        if quality > STRONG_SIGNAL_THRESHOLD {
            SignalBand::Strong
        } else if quality > FAIR_SIGNAL_THRESHOLD {
            SignalBand::Fair
        } else {
            SignalBand::Weak
        }
    }
}

/// Operator-facing link status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkStatus {
    Locked,
    Scanning,
}

/// One frame of link state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSnapshot {
    pub sim_time: f64,
    pub connected_id: Option<String>,
    pub next_id: Option<String>,
    /// Quality of the connected satellite (0-100)
    pub signal_quality: f64,
    pub signal_band: SignalBand,
    pub link_status: LinkStatus,
    pub weather: WeatherState,
    pub weather_intensity: f64,
    pub satellite_count: usize,
    /// Satellites not in failure
    pub active_count: usize,
    /// Connected satellite's telemetry, zeros when unlinked
    pub target: SatelliteTelemetry,
    pub telemetry: BTreeMap<String, SatelliteTelemetry>,
    /// Constellation order
    pub tracks: Vec<SatelliteTrack>,
    pub transition: Transition,
}

impl LinkSnapshot {
    pub fn is_linked(&self) -> bool {
        self.connected_id.is_some()
    }

    pub fn telemetry_for(&self, id: &str) -> Option<&SatelliteTelemetry> {
        self.telemetry.get(id)
    }
}
