//! Constellation State
//!
//! Owns the satellite records, the space-weather flag, and the random-event
//! scheduler that injects storms and satellite faults.
//!
//! The scheduler is driven by simulated time (`advance(dt, rng)`) and an
//! injected random source, so every stochastic path can be replayed from a
//! seed.
//!
//! | Event | Default | Effect |
//! |-------|---------|--------|
//! | Space weather onset | p = 0.10 per tick | global ×0.5 signal for 3 s |
//! | Failure sweep | p = 0.05 per tick | each satellite toggles with p = 0.10 |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use orbital_mechanics::SatelliteStatus;

pub mod config;
pub mod state;

pub use config::ConstellationConfig;
pub use state::{generate_satellites, ConstellationState};

/// Id prefix and first index for generated satellites (SAT-101, SAT-102, ...)
pub const SATELLITE_ID_PREFIX: &str = "SAT";
pub const SATELLITE_ID_BASE: usize = 101;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Constellation must contain at least one satellite")]
    EmptyConstellation,
    #[error("Invalid altitude range: min {min} > max {max}")]
    InvalidAltitudeRange { min: f64, max: f64 },
    #[error("Altitude must be positive, got {0}")]
    NonPositiveAltitude(f64),
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Display state of the space-weather badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeatherState {
    Clear,
    Storm,
}

/// Global signal-degrading event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SpaceWeather {
    pub active: bool,
    /// Storm strength (0-1); reported only, attenuation is fixed
    pub intensity: f64,
}

impl SpaceWeather {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn storm(intensity: f64) -> Self {
        Self {
            active: true,
            intensity: intensity.clamp(0.0, 1.0),
        }
    }

    pub fn state(&self) -> WeatherState {
        if self.active {
            WeatherState::Storm
        } else {
            WeatherState::Clear
        }
    }
}

/// Mutation applied by the random-event scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstellationEvent {
    WeatherOnset {
        intensity: f64,
    },
    WeatherCleared,
    StatusToggled {
        id: String,
        from: SatelliteStatus,
        to: SatelliteStatus,
    },
}
