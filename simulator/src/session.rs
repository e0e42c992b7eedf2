//! Simulation session
//!
//! One session owns the constellation, the link selector, the random source,
//! and the simulated clock. Each `step` runs the frame in a fixed order:
//!
//! 1. scheduler events (storms, faults) for the elapsed time
//! 2. observer position for the new frame time
//! 3. link evaluation and snapshot
//!
//! so a frame never sees a half-applied event.

use crate::{Result, SimConfig};
use chrono::{DateTime, Utc};
use constellation_state::{ConstellationEvent, ConstellationState};
use link_selector::{LinkSelector, LinkSnapshot};
use orbital_mechanics::{GroundSite, Position};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Output of one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    pub session_id: Uuid,
    pub frame: u64,
    pub observer: [f64; 3],
    /// Scheduler events applied before this frame was evaluated
    pub events: Vec<ConstellationEvent>,
    pub snapshot: LinkSnapshot,
}

pub struct SimulationSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    seed: u64,
    rng: StdRng,
    constellation: ConstellationState,
    selector: LinkSelector,
    site: GroundSite,
    sim_time: f64,
    frame: u64,
}

impl SimulationSession {
    pub fn new(config: &SimConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let constellation = ConstellationState::new(config.constellation.clone(), &mut rng)?;

        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            seed,
            rng,
            constellation,
            selector: LinkSelector::new(config.selector.clone()),
            site: config.site,
            sim_time: 0.0,
            frame: 0,
        };

        info!(
            "Session {} started (seed {}, {} satellites, site {:.2}°, {:.2}°)",
            session.id,
            seed,
            session.constellation.len(),
            session.site.latitude_deg,
            session.site.longitude_deg
        );

        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn constellation(&self) -> &ConstellationState {
        &self.constellation
    }

    pub fn selector(&self) -> &LinkSelector {
        &self.selector
    }

    /// Advance `dt` seconds with the observer at the configured ground site
    pub fn step(&mut self, dt: f64) -> FrameReport {
        let dt = frame_delta(dt);
        let observer = self.site.world_position(self.sim_time + dt);
        self.step_with_observer(dt, observer)
    }

    /// Advance `dt` seconds with an observer position supplied by the caller
    /// (e.g. the renderer's marker transform for this frame)
    pub fn step_with_observer(&mut self, dt: f64, observer: Position) -> FrameReport {
        let dt = frame_delta(dt);

        let events = self.constellation.advance(dt, &mut self.rng);
        self.sim_time += dt;

        let snapshot = self
            .selector
            .evaluate(&self.constellation, &observer, self.sim_time);

        self.frame += 1;

        FrameReport {
            session_id: self.id,
            frame: self.frame,
            observer: [observer.x, observer.y, observer.z],
            events,
            snapshot,
        }
    }
}

/// Negative, NaN and infinite frame deltas count as zero
fn frame_delta(dt: f64) -> f64 {
    if dt.is_finite() {
        dt.max(0.0)
    } else {
        0.0
    }
}

impl Drop for SimulationSession {
    fn drop(&mut self) {
        info!(
            "Session {} ended after {} frames ({:.1}s simulated)",
            self.id, self.frame, self.sim_time
        );
    }
}
