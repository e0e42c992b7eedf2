//! Constellation generation and event scheduler configuration

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Default constellation size
pub const DEFAULT_SATELLITE_COUNT: usize = 20;

/// Altitude band in scene units (400-2000 km)
pub const DEFAULT_ALTITUDE_MIN: f64 = 0.4;
pub const DEFAULT_ALTITUDE_MAX: f64 = 2.0;

/// Scheduler cadence (simulated seconds)
pub const DEFAULT_TICK_INTERVAL_S: f64 = 5.0;

pub const DEFAULT_WEATHER_PROBABILITY: f64 = 0.1;
pub const DEFAULT_WEATHER_DURATION_S: f64 = 3.0;
pub const DEFAULT_FAILURE_EVENT_PROBABILITY: f64 = 0.05;
pub const DEFAULT_FAILURE_TOGGLE_PROBABILITY: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConstellationConfig {
    /// Number of satellites generated at start
    pub satellite_count: usize,
    /// Lower altitude bound (scene units)
    pub altitude_min: f64,
    /// Upper altitude bound (scene units)
    pub altitude_max: f64,
    /// Seconds between random-event ticks
    pub tick_interval_s: f64,
    /// Chance per tick that a storm starts
    pub weather_probability: f64,
    /// Seconds a storm lasts before auto-clearing
    pub weather_duration_s: f64,
    /// Chance per tick that a failure sweep runs
    pub failure_event_probability: f64,
    /// Chance per satellite, within a sweep, of toggling Active/Failure
    pub failure_toggle_probability: f64,
}

impl Default for ConstellationConfig {
    fn default() -> Self {
        Self {
            satellite_count: DEFAULT_SATELLITE_COUNT,
            altitude_min: DEFAULT_ALTITUDE_MIN,
            altitude_max: DEFAULT_ALTITUDE_MAX,
            tick_interval_s: DEFAULT_TICK_INTERVAL_S,
            weather_probability: DEFAULT_WEATHER_PROBABILITY,
            weather_duration_s: DEFAULT_WEATHER_DURATION_S,
            failure_event_probability: DEFAULT_FAILURE_EVENT_PROBABILITY,
            failure_toggle_probability: DEFAULT_FAILURE_TOGGLE_PROBABILITY,
        }
    }
}

impl ConstellationConfig {
    pub fn with_satellite_count(mut self, count: usize) -> Self {
        self.satellite_count = count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.satellite_count == 0 {
            return Err(ConfigError::EmptyConstellation);
        }
        if !(self.altitude_min > 0.0) {
            return Err(ConfigError::NonPositiveAltitude(self.altitude_min));
        }
        if !(self.altitude_min <= self.altitude_max) {
            return Err(ConfigError::InvalidAltitudeRange {
                min: self.altitude_min,
                max: self.altitude_max,
            });
        }

        positive("tick_interval_s", self.tick_interval_s)?;
        positive("weather_duration_s", self.weather_duration_s)?;

        probability("weather_probability", self.weather_probability)?;
        probability("failure_event_probability", self.failure_event_probability)?;
        probability("failure_toggle_probability", self.failure_toggle_probability)?;

        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn probability(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}
