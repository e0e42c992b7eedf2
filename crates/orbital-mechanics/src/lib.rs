//! Orbital Mechanics Library
//!
//! Simplified circular-orbit propagation, signal quality scoring, and ground
//! site placement for the LEO link simulator.
//!
//! All distances are in scene units (1 unit = 1000 km) so that positions can
//! be handed straight to a renderer.

use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Reference sphere radius (Earth) in scene units
pub const EARTH_RADIUS: f64 = 6.371;

/// Scaled gravitational parameter. `sqrt(GM / r)` with `r` in scene units
/// reads directly in km/s.
pub const GM: f64 = 398.6;

/// Scaler applied to the circular speed to get a watchable angular rate
pub const VISUAL_SPEED_SCALE: f64 = 0.05;

/// Distance beyond which no link is modeled (scene units)
pub const VISIBILITY_CUTOFF: f64 = 4.0;

/// Quality points lost per scene unit of distance
pub const QUALITY_FALLOFF: f64 = 20.0;

/// Maximum quality score
pub const MAX_QUALITY: f64 = 100.0;

/// Scene units to kilometers
pub const KM_PER_UNIT: f64 = 1000.0;

pub type Position = Point3<f64>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SatelliteStatus {
    Active,
    /// Defined for the operator panel; no transition produces it yet.
    Buffering,
    Failure,
}

impl SatelliteStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, SatelliteStatus::Failure)
    }
}

/// Immutable orbital geometry of one satellite
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OrbitalElements {
    /// Height above the reference sphere (scene units)
    pub altitude: f64,
    /// Plane tilt (radians)
    pub inclination: f64,
    /// Right ascension of ascending node (radians)
    pub raan: f64,
    /// Angle along the orbit at t = 0 (radians)
    pub phase: f64,
    /// Angular rate (radians per simulated second)
    pub speed: f64,
}

impl OrbitalElements {
    /// Build elements, deriving `speed` from altitude
    pub fn new(altitude: f64, inclination: f64, raan: f64, phase: f64) -> Self {
        Self {
            altitude,
            inclination,
            raan,
            phase,
            speed: circular_speed(altitude),
        }
    }

    /// Orbit radius measured from the sphere center
    pub fn radius(&self) -> f64 {
        EARTH_RADIUS + self.altitude
    }

    pub fn altitude_km(&self) -> f64 {
        self.altitude * KM_PER_UNIT
    }

    pub fn velocity_km_s(&self) -> f64 {
        orbital_velocity_km_s(self.altitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub id: String,
    pub elements: OrbitalElements,
    pub status: SatelliteStatus,
}

impl Satellite {
    pub fn new(id: impl Into<String>, elements: OrbitalElements) -> Self {
        Self {
            id: id.into(),
            elements,
            status: SatelliteStatus::Active,
        }
    }

    pub fn with_status(mut self, status: SatelliteStatus) -> Self {
        self.status = status;
        self
    }

    pub fn position(&self, sim_time: f64) -> Position {
        propagation::compute_position(&self.elements, sim_time)
    }
}

/// Visual angular rate for a circular orbit at `altitude`
pub fn circular_speed(altitude: f64) -> f64 {
    (GM / (EARTH_RADIUS + altitude)).sqrt() * VISUAL_SPEED_SCALE
}

/// Circular orbital velocity in km/s
pub fn orbital_velocity_km_s(altitude: f64) -> f64 {
    (GM / (EARTH_RADIUS + altitude)).sqrt()
}

/// Height of a position above the reference sphere in km
pub fn altitude_km(position: &Position) -> f64 {
    (position.coords.norm() - EARTH_RADIUS) * KM_PER_UNIT
}

pub mod propagation {
    use super::*;

    /// Position on the circular orbit at `sim_time` seconds.
    ///
    /// The orbit starts in the equatorial x/z plane, is tilted about +x by the
    /// inclination, then swung about the polar +y axis by the RAAN.
    pub fn compute_position(elements: &OrbitalElements, sim_time: f64) -> Position {
        let r = elements.radius();
        let theta = elements.phase + elements.speed * sim_time;

        let planar = Vector3::new(r * theta.cos(), 0.0, r * theta.sin());

        let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), elements.inclination);
        let node = Rotation3::from_axis_angle(&Vector3::y_axis(), elements.raan);

        Point3::from(node * (tilt * planar))
    }
}

pub mod signal {
    use super::*;

    /// Linear distance falloff with a hard visibility cutoff.
    ///
    /// Earth blockage is not modeled: a satellite on the far side of the
    /// sphere still scores if it is within `cutoff`.
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    pub struct SignalModel {
        /// Visibility cutoff (scene units)
        pub cutoff: f64,
        /// Quality points lost per scene unit
        pub falloff: f64,
    }

    impl Default for SignalModel {
        fn default() -> Self {
            Self {
                cutoff: VISIBILITY_CUTOFF,
                falloff: QUALITY_FALLOFF,
            }
        }
    }

    impl SignalModel {
        /// Quality in [0, 100] for a given separation
        pub fn quality_at(&self, distance: f64) -> f64 {
            if distance > self.cutoff {
                return 0.0;
            }
            (MAX_QUALITY - distance * self.falloff).max(0.0)
        }

        pub fn quality(&self, satellite: &Position, observer: &Position) -> f64 {
            self.quality_at(nalgebra::distance(satellite, observer))
        }
    }

    /// Quality score between a satellite and an observer with the default model
    pub fn compute_signal_quality(satellite: &Position, observer: &Position) -> f64 {
        SignalModel::default().quality(satellite, observer)
    }
}

pub mod ground {
    use super::*;

    /// Earth spin about the polar axis (radians per simulated second)
    pub const EARTH_SPIN_RATE: f64 = 0.05;

    /// Marker lift above the surface
    const SURFACE_LIFT: f64 = 1.01;

    /// Fixed observer on the rotating Earth
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    pub struct GroundSite {
        pub latitude_deg: f64,
        pub longitude_deg: f64,
        /// Longitude offset aligning the site with the globe texture
        pub texture_offset_deg: f64,
    }

    impl Default for GroundSite {
        fn default() -> Self {
            Self {
                latitude_deg: 19.0,
                longitude_deg: 165.0,
                texture_offset_deg: 90.0,
            }
        }
    }

    impl GroundSite {
        pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
            Self {
                latitude_deg,
                longitude_deg,
                ..Self::default()
            }
        }

        /// Site position in the Earth's body frame
        pub fn local_position(&self) -> Position {
            let r = EARTH_RADIUS * SURFACE_LIFT;
            let phi = (90.0 - self.latitude_deg).to_radians();
            let theta = (self.longitude_deg + self.texture_offset_deg).to_radians();

            Point3::new(
                -r * phi.sin() * theta.cos(),
                r * phi.cos(),
                r * phi.sin() * theta.sin(),
            )
        }

        /// Site position in the scene after the Earth has spun for `sim_time`
        pub fn world_position(&self, sim_time: f64) -> Position {
            let spin = Rotation3::from_axis_angle(&Vector3::y_axis(), EARTH_SPIN_RATE * sim_time);
            spin * self.local_position()
        }
    }
}

pub use ground::GroundSite;
pub use propagation::compute_position;
pub use signal::{compute_signal_quality, SignalModel};
