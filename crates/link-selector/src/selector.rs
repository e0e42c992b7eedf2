//! Connected / next satellite selection with hysteresis

use crate::{
    score_satellites, LinkSnapshot, LinkStatus, SatelliteTrack, ScoredSatellite, SelectorConfig,
    SignalBand,
};
use constellation_state::ConstellationState;
use orbital_mechanics::Position;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Link state carried across frames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkState {
    #[default]
    Unlinked,
    Linked(String),
}

impl LinkState {
    pub fn connected_id(&self) -> Option<&str> {
        match self {
            LinkState::Unlinked => None,
            LinkState::Linked(id) => Some(id),
        }
    }
}

/// What one evaluation did to the link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Hold,
    Acquire { to: String },
    Handover { from: String, to: String },
    Drop { from: String },
}

impl Transition {
    pub fn is_change(&self) -> bool {
        !matches!(self, Transition::Hold)
    }
}

/// Highest-quality candidate; the first one encountered wins exact ties.
pub fn best_candidate(scored: &[ScoredSatellite]) -> Option<&ScoredSatellite> {
    next_candidate(scored, None)
}

/// Highest-quality candidate other than `excluded`
pub fn next_candidate<'a>(
    scored: &'a [ScoredSatellite],
    excluded: Option<&str>,
) -> Option<&'a ScoredSatellite> {
    scored
        .iter()
        .filter(|s| s.is_candidate() && Some(s.id.as_str()) != excluded)
        .fold(None, |best: Option<&ScoredSatellite>, s| match best {
            Some(b) if b.quality >= s.quality => Some(b),
            _ => Some(s),
        })
}

/// Apply the hysteresis rule to one frame of scores.
///
/// A linked satellite is displaced only when it has no signal or the best
/// candidate beats it by more than `margin`. A failed satellite with no
/// replacement drops the link.
pub fn decide(current: &LinkState, scored: &[ScoredSatellite], margin: f64) -> Transition {
    let best = best_candidate(scored);

    let current_id = match current {
        LinkState::Unlinked => {
            return match best {
                Some(b) => Transition::Acquire { to: b.id.clone() },
                None => Transition::Hold,
            };
        }
        LinkState::Linked(id) => id,
    };

    let current_sat = scored.iter().find(|s| &s.id == current_id);
    let current_quality = current_sat.map(|s| s.quality).unwrap_or(0.0);
    let current_lost = current_sat.map(|s| s.status.is_failed()).unwrap_or(true);

    match best {
        Some(b)
            if &b.id != current_id
                && (current_quality <= 0.0 || b.quality > current_quality + margin) =>
        {
            Transition::Handover {
                from: current_id.clone(),
                to: b.id.clone(),
            }
        }
        None if current_lost => Transition::Drop {
            from: current_id.clone(),
        },
        _ => Transition::Hold,
    }
}

/// Per-frame link evaluation.
///
/// Holds the only cross-frame state outside the constellation: the
/// currently connected satellite.
#[derive(Debug, Clone, Default)]
pub struct LinkSelector {
    config: SelectorConfig,
    state: LinkState,
}

impl LinkSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            state: LinkState::Unlinked,
        }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn link_state(&self) -> &LinkState {
        &self.state
    }

    pub fn connected_id(&self) -> Option<&str> {
        self.state.connected_id()
    }

    /// Forget the current link (session restart)
    pub fn reset(&mut self) {
        self.state = LinkState::Unlinked;
    }

    /// Score the constellation for `observer` at `sim_time`, update the link,
    /// and build the frame snapshot.
    pub fn evaluate(
        &mut self,
        constellation: &ConstellationState,
        observer: &Position,
        sim_time: f64,
    ) -> LinkSnapshot {
        let scored = score_satellites(constellation, observer, sim_time, &self.config);
        let transition = decide(&self.state, &scored, self.config.hysteresis_margin);
        self.apply(&transition, &scored);

        let connected = self.state.connected_id();
        let next = next_candidate(&scored, connected);

        let target = connected
            .and_then(|id| scored.iter().find(|s| s.id == id))
            .map(|s| s.telemetry)
            .unwrap_or_default();

        debug!(
            "t={:.2} connected={:?} q={:.1} next={:?}",
            sim_time,
            connected,
            target.rssi,
            next.map(|s| s.id.as_str())
        );

        let weather = constellation.space_weather();

        LinkSnapshot {
            sim_time,
            connected_id: connected.map(str::to_string),
            next_id: next.map(|s| s.id.clone()),
            signal_quality: target.rssi,
            signal_band: SignalBand::from_quality(target.rssi),
            link_status: if connected.is_some() {
                LinkStatus::Locked
            } else {
                LinkStatus::Scanning
            },
            weather: weather.state(),
            weather_intensity: weather.intensity,
            satellite_count: constellation.len(),
            active_count: constellation.active_count(),
            target,
            telemetry: scored
                .iter()
                .map(|s| (s.id.clone(), s.telemetry))
                .collect(),
            tracks: scored
                .iter()
                .map(|s| SatelliteTrack {
                    id: s.id.clone(),
                    position: [s.position.x, s.position.y, s.position.z],
                    status: s.status,
                    connected: Some(s.id.as_str()) == connected,
                })
                .collect(),
            transition,
        }
    }

    fn apply(&mut self, transition: &Transition, scored: &[ScoredSatellite]) {
        let quality_of = |id: &str| {
            scored
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.quality)
                .unwrap_or(0.0)
        };

        match transition {
            Transition::Hold => {}
            Transition::Acquire { to } => {
                info!("Link acquired: {} (q={:.1})", to, quality_of(to));
                self.state = LinkState::Linked(to.clone());
            }
            Transition::Handover { from, to } => {
                info!(
                    "Handover {} (q={:.1}) -> {} (q={:.1})",
                    from,
                    quality_of(from),
                    to,
                    quality_of(to)
                );
                self.state = LinkState::Linked(to.clone());
            }
            Transition::Drop { from } => {
                warn!("Link lost: {} failed with no replacement", from);
                self.state = LinkState::Unlinked;
            }
        }
    }
}
