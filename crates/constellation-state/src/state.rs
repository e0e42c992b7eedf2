//! Satellite records and the random-event scheduler

use crate::{
    ConstellationConfig, ConstellationEvent, Result, SpaceWeather, SATELLITE_ID_BASE,
    SATELLITE_ID_PREFIX,
};
use orbital_mechanics::{OrbitalElements, Satellite, SatelliteStatus};
use rand::Rng;
use std::f64::consts::PI;
use tracing::{debug, info};

/// Generate `config.satellite_count` satellites with randomized geometry.
///
/// Altitude is uniform over the configured band, inclination uniform in
/// [-90°, 90°], RAAN and phase uniform in [0, 2π).
pub fn generate_satellites<R: Rng + ?Sized>(
    config: &ConstellationConfig,
    rng: &mut R,
) -> Vec<Satellite> {
    let band = config.altitude_max - config.altitude_min;

    (0..config.satellite_count)
        .map(|i| {
            let altitude = config.altitude_min + rng.gen::<f64>() * band;
            let inclination = (rng.gen::<f64>() * 180.0 - 90.0).to_radians();
            let raan = rng.gen::<f64>() * 2.0 * PI;
            let phase = rng.gen::<f64>() * 2.0 * PI;

            Satellite::new(
                format!("{}-{}", SATELLITE_ID_PREFIX, i + SATELLITE_ID_BASE),
                OrbitalElements::new(altitude, inclination, raan, phase),
            )
        })
        .collect()
}

/// Mutable simulation state shared by the frame loop and the event scheduler
#[derive(Debug, Clone)]
pub struct ConstellationState {
    satellites: Vec<Satellite>,
    space_weather: SpaceWeather,
    config: ConstellationConfig,
    /// Simulated seconds since the last scheduler tick
    since_tick: f64,
    /// Seconds left before the active storm clears
    weather_clear_in: Option<f64>,
}

impl ConstellationState {
    /// Validate the config and generate a fresh constellation
    pub fn new<R: Rng + ?Sized>(config: ConstellationConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let satellites = generate_satellites(&config, rng);

        info!(
            "Generated {} satellites ({:.0}-{:.0} km)",
            satellites.len(),
            config.altitude_min * 1000.0,
            config.altitude_max * 1000.0
        );

        Ok(Self::from_satellites(satellites, config))
    }

    /// Wrap an existing satellite list (fixtures, replays)
    pub fn from_satellites(satellites: Vec<Satellite>, config: ConstellationConfig) -> Self {
        Self {
            satellites,
            space_weather: SpaceWeather::clear(),
            config,
            since_tick: 0.0,
            weather_clear_in: None,
        }
    }

    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    pub fn satellite(&self, id: &str) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    /// Satellites not in failure
    pub fn active_count(&self) -> usize {
        self.satellites
            .iter()
            .filter(|s| !s.status.is_failed())
            .count()
    }

    pub fn space_weather(&self) -> SpaceWeather {
        self.space_weather
    }

    pub fn config(&self) -> &ConstellationConfig {
        &self.config
    }

    /// Force a storm, as a scheduler tick would
    pub fn start_storm(&mut self, intensity: f64) -> ConstellationEvent {
        self.space_weather = SpaceWeather::storm(intensity);
        self.weather_clear_in = Some(self.config.weather_duration_s);

        info!(
            "Space weather onset (intensity {:.2}, clears in {:.1}s)",
            self.space_weather.intensity, self.config.weather_duration_s
        );

        ConstellationEvent::WeatherOnset {
            intensity: self.space_weather.intensity,
        }
    }

    /// One scheduler firing: maybe a storm, maybe a failure sweep.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<ConstellationEvent> {
        let mut events = Vec::new();

        if rng.gen::<f64>() < self.config.weather_probability {
            let intensity = rng.gen::<f64>();
            events.push(self.start_storm(intensity));
        }

        if rng.gen::<f64>() < self.config.failure_event_probability {
            debug!("Failure sweep over {} satellites", self.satellites.len());

            for sat in self.satellites.iter_mut() {
                // Drawn for every satellite so the stream does not depend on status
                let roll = rng.gen::<f64>();
                if roll >= self.config.failure_toggle_probability {
                    continue;
                }

                let to = match sat.status {
                    SatelliteStatus::Active => SatelliteStatus::Failure,
                    SatelliteStatus::Failure => SatelliteStatus::Active,
                    SatelliteStatus::Buffering => continue,
                };

                info!("{} status {:?} -> {:?}", sat.id, sat.status, to);

                events.push(ConstellationEvent::StatusToggled {
                    id: sat.id.clone(),
                    from: sat.status,
                    to,
                });
                sat.status = to;
            }
        }

        events
    }

    /// Advance simulated time by `dt` seconds.
    ///
    /// Counts down an active storm and fires `tick` each time a full
    /// `tick_interval_s` has elapsed. Large steps are split at tick
    /// boundaries so a storm started mid-step still counts down. Non-positive
    /// and non-finite steps do nothing.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f64, rng: &mut R) -> Vec<ConstellationEvent> {
        let mut events = Vec::new();
        if !(dt > 0.0) || !dt.is_finite() {
            return events;
        }

        let interval = self.config.tick_interval_s;
        let mut remaining = dt;

        while remaining > 0.0 {
            let step = remaining.min(interval - self.since_tick);

            if let Some(event) = self.expire_weather(step) {
                events.push(event);
            }

            self.since_tick += step;
            remaining -= step;

            if self.since_tick >= interval {
                self.since_tick = 0.0;
                debug!("Scheduler tick");
                events.extend(self.tick(rng));
            }
        }

        events
    }

    fn expire_weather(&mut self, step: f64) -> Option<ConstellationEvent> {
        let left = self.weather_clear_in? - step;

        if left > 0.0 {
            self.weather_clear_in = Some(left);
            return None;
        }

        self.weather_clear_in = None;
        self.space_weather = SpaceWeather::clear();
        info!("Space weather cleared");

        Some(ConstellationEvent::WeatherCleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeatherState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// Config where every roll succeeds
    fn always() -> ConstellationConfig {
        ConstellationConfig {
            weather_probability: 1.0,
            failure_event_probability: 1.0,
            failure_toggle_probability: 1.0,
            ..Default::default()
        }
    }

    /// Config where no roll succeeds
    fn never() -> ConstellationConfig {
        ConstellationConfig {
            weather_probability: 0.0,
            failure_event_probability: 0.0,
            failure_toggle_probability: 0.0,
            ..Default::default()
        }
    }

    fn fixture(statuses: &[SatelliteStatus], config: ConstellationConfig) -> ConstellationState {
        let satellites = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                Satellite::new(
                    format!("SAT-{}", 101 + i),
                    OrbitalElements::new(0.5, 0.0, 0.0, 0.0),
                )
                .with_status(*status)
            })
            .collect();
        ConstellationState::from_satellites(satellites, config)
    }

    #[test]
    fn test_generate_default_count_and_ids() {
        let state = ConstellationState::new(ConstellationConfig::default(), &mut rng(1)).unwrap();
        assert_eq!(state.len(), 20);
        assert_eq!(state.satellites()[0].id, "SAT-101");
        assert_eq!(state.satellites()[19].id, "SAT-120");
        assert!(state.satellites().iter().all(|s| s.status == SatelliteStatus::Active));
        assert_eq!(state.space_weather(), SpaceWeather::clear());
    }

    #[test]
    fn test_generated_elements_in_range() {
        let config = ConstellationConfig::default().with_satellite_count(500);
        let satellites = generate_satellites(&config, &mut rng(7));

        for sat in &satellites {
            let e = sat.elements;
            assert!((0.4..=2.0).contains(&e.altitude), "altitude {}", e.altitude);
            assert!(e.inclination.abs() <= PI / 2.0);
            assert!((0.0..2.0 * PI).contains(&e.raan));
            assert!((0.0..2.0 * PI).contains(&e.phase));
            assert_eq!(e.speed, orbital_mechanics::circular_speed(e.altitude));
        }
    }

    #[test]
    fn test_generation_reproducible_from_seed() {
        let config = ConstellationConfig::default();
        let a = generate_satellites(&config, &mut rng(99));
        let b = generate_satellites(&config, &mut rng(99));
        let elements = |v: &[Satellite]| v.iter().map(|s| s.elements).collect::<Vec<_>>();
        assert_eq!(elements(&a), elements(&b));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ConstellationConfig::default().with_satellite_count(0);
        assert!(ConstellationState::new(config, &mut rng(1)).is_err());
    }

    #[test]
    fn test_tick_weather_rate_is_about_ten_percent() {
        // Statistical: 1000 ticks at p = 0.1, expect ~100 onsets (σ ≈ 9.5)
        let mut state = ConstellationState::new(ConstellationConfig::default(), &mut rng(3)).unwrap();
        let mut r = rng(2024);

        let onsets = (0..1000)
            .flat_map(|_| state.tick(&mut r))
            .filter(|e| matches!(e, ConstellationEvent::WeatherOnset { .. }))
            .count();

        assert!((60..=140).contains(&onsets), "onsets = {onsets}");
    }

    #[test]
    fn test_tick_toggles_active_and_failure() {
        let mut state = fixture(
            &[SatelliteStatus::Active, SatelliteStatus::Failure],
            always(),
        );
        let events = state.tick(&mut rng(5));

        assert_eq!(state.satellites()[0].status, SatelliteStatus::Failure);
        assert_eq!(state.satellites()[1].status, SatelliteStatus::Active);
        assert_eq!(events.len(), 3); // onset + two toggles
        assert_eq!(state.active_count(), 1);
    }

    #[test]
    fn test_tick_never_touches_buffering() {
        let mut state = fixture(&[SatelliteStatus::Buffering; 4], always());
        for _ in 0..10 {
            let events = state.tick(&mut rng(11));
            assert!(!events
                .iter()
                .any(|e| matches!(e, ConstellationEvent::StatusToggled { .. })));
        }
        assert!(state
            .satellites()
            .iter()
            .all(|s| s.status == SatelliteStatus::Buffering));
    }

    #[test]
    fn test_tick_with_zero_probabilities_is_quiet() {
        let mut state = fixture(&[SatelliteStatus::Active; 3], never());
        for _ in 0..100 {
            assert!(state.tick(&mut rng(8)).is_empty());
        }
    }

    #[test]
    fn test_advance_fires_tick_on_interval() {
        let config = ConstellationConfig {
            failure_event_probability: 0.0,
            ..always()
        };
        let mut state = fixture(&[SatelliteStatus::Active], config);
        let mut r = rng(1);

        assert!(state.advance(4.9, &mut r).is_empty());
        assert_eq!(state.space_weather().state(), WeatherState::Clear);

        let events = state.advance(0.2, &mut r);
        assert!(matches!(events[..], [ConstellationEvent::WeatherOnset { .. }]));
        assert_eq!(state.space_weather().state(), WeatherState::Storm);
    }

    #[test]
    fn test_storm_clears_after_duration() {
        let mut state = fixture(&[SatelliteStatus::Active], never());
        let mut r = rng(1);
        state.start_storm(0.8);

        assert!(state.advance(2.5, &mut r).is_empty());
        assert!(state.space_weather().active);

        let events = state.advance(0.6, &mut r);
        assert_eq!(events, vec![ConstellationEvent::WeatherCleared]);
        assert!(!state.space_weather().active);
        assert_eq!(state.space_weather().intensity, 0.0);
    }

    #[test]
    fn test_new_storm_rearms_timer() {
        let mut state = fixture(&[SatelliteStatus::Active], never());
        let mut r = rng(1);
        state.start_storm(0.3);
        state.advance(2.0, &mut r);
        state.start_storm(0.6);
        state.advance(2.0, &mut r);
        assert!(state.space_weather().active, "second storm runs its full duration");
        assert_eq!(state.space_weather().intensity, 0.6);
    }

    #[test]
    fn test_large_step_fires_every_tick() {
        let config = ConstellationConfig {
            failure_event_probability: 0.0,
            weather_duration_s: 1.0,
            ..always()
        };
        let mut state = fixture(&[SatelliteStatus::Active], config);

        // Ticks at 5, 10, 15; storms at 5 and 10 clear one second later
        let events = state.advance(15.5, &mut rng(4));
        let onsets = events
            .iter()
            .filter(|e| matches!(e, ConstellationEvent::WeatherOnset { .. }))
            .count();
        let clears = events
            .iter()
            .filter(|e| **e == ConstellationEvent::WeatherCleared)
            .count();

        assert_eq!(onsets, 3);
        assert_eq!(clears, 2);
        assert!(state.space_weather().active);
    }

    #[test]
    fn test_advance_ignores_non_positive_steps() {
        let mut state = fixture(&[SatelliteStatus::Active], always());
        let mut r = rng(1);
        assert!(state.advance(0.0, &mut r).is_empty());
        assert!(state.advance(-10.0, &mut r).is_empty());
        assert!(state.advance(f64::NAN, &mut r).is_empty());
        assert!(state.advance(f64::INFINITY, &mut r).is_empty());
        assert_eq!(state.satellites()[0].status, SatelliteStatus::Active);
    }

    #[test]
    fn test_lookup_by_id_and_config() {
        let state = ConstellationState::new(ConstellationConfig::default(), &mut rng(8)).unwrap();
        assert_eq!(state.config().tick_interval_s, 5.0);
        assert!(state.satellite("SAT-101").is_some());
        assert!(state.satellite("SAT-120").is_some());
        assert!(state.satellite("SAT-121").is_none());
    }
}
