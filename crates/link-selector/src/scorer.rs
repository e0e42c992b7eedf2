//! Per-frame satellite scoring
//!
//! Propagates each satellite to the frame time, scores it against the
//! observer, and derives the telemetry fields in the same pass so the orbit
//! is evaluated once per satellite per frame.

use crate::{SatelliteTelemetry, SelectorConfig, LATENCY_MS_PER_UNIT};
use constellation_state::ConstellationState;
use orbital_mechanics::{altitude_km, Position, Satellite, SatelliteStatus};
use tracing::trace;

/// A satellite scored for one frame
#[derive(Debug, Clone)]
pub struct ScoredSatellite {
    pub id: String,
    pub status: SatelliteStatus,
    pub position: Position,
    /// Link quality after weather attenuation, 0 for failed satellites
    pub quality: f64,
    pub telemetry: SatelliteTelemetry,
}

impl ScoredSatellite {
    /// Eligible to be connected or offered as next
    pub fn is_candidate(&self) -> bool {
        !self.status.is_failed() && self.quality > 0.0
    }
}

/// Score every satellite in constellation order
pub fn score_satellites(
    constellation: &ConstellationState,
    observer: &Position,
    sim_time: f64,
    config: &SelectorConfig,
) -> Vec<ScoredSatellite> {
    let attenuation = if constellation.space_weather().active {
        config.weather_attenuation
    } else {
        1.0
    };

    constellation
        .satellites()
        .iter()
        .map(|sat| score_satellite(sat, observer, sim_time, config, attenuation))
        .collect()
}

fn score_satellite(
    sat: &Satellite,
    observer: &Position,
    sim_time: f64,
    config: &SelectorConfig,
    attenuation: f64,
) -> ScoredSatellite {
    let position = sat.position(sim_time);
    let distance = nalgebra::distance(&position, observer);

    let quality = if sat.status.is_failed() {
        0.0
    } else {
        config.signal.quality_at(distance) * attenuation
    };

    let telemetry = SatelliteTelemetry {
        rssi: quality,
        distance,
        altitude_km: altitude_km(&position),
        velocity_km_s: sat.elements.velocity_km_s(),
        latency_ms: distance * LATENCY_MS_PER_UNIT,
    };

    trace!(
        "Scored {}: q={:.1} d={:.3} status={:?}",
        sat.id,
        quality,
        distance,
        sat.status
    );

    ScoredSatellite {
        id: sat.id.clone(),
        status: sat.status,
        position,
        quality,
        telemetry,
    }
}
