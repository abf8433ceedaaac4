//! Great-circle leg provider.
//!
//! Uses the Haversine formula for distance and a constant speed for travel
//! time. It ignores the road network but never fails for valid coordinates,
//! which makes it the default provider.

use geo::Coord;

use crate::travel_time::{Leg, LegProvider, TravelTimeError};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Assumed travel speed: 40 km/h expressed in meters per second.
pub const DEFAULT_SPEED_MPS: f64 = 11.11;

/// Haversine-based [`LegProvider`].
///
/// # Examples
/// ```
/// use geo::Coord;
/// use itinerary_core::{HaversineProvider, LegProvider};
///
/// let provider = HaversineProvider::default();
/// let leg = provider
///     .compute_leg(Coord { x: 106.70, y: 10.77 }, Coord { x: 106.71, y: 10.78 })
///     .unwrap();
/// assert!(leg.distance_meters > 1000.0);
/// assert!(leg.duration_seconds > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaversineProvider {
    /// Assumed travel speed in meters per second.
    pub speed_mps: f64,
}

impl Default for HaversineProvider {
    fn default() -> Self {
        Self {
            speed_mps: DEFAULT_SPEED_MPS,
        }
    }
}

impl HaversineProvider {
    /// Construct a provider with an explicit speed in meters per second.
    #[must_use]
    pub const fn new(speed_mps: f64) -> Self {
        Self { speed_mps }
    }

    /// Great-circle distance between two coordinates in meters.
    #[must_use]
    pub fn distance_meters(from: Coord<f64>, to: Coord<f64>) -> f64 {
        let lat1 = from.y.to_radians();
        let lat2 = to.y.to_radians();
        let delta_lat = (to.y - from.y).to_radians();
        let delta_lon = (to.x - from.x).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }
}

pub(crate) fn check_coordinate(coord: Coord<f64>) -> Result<(), TravelTimeError> {
    let in_range = coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y);
    if in_range {
        Ok(())
    } else {
        Err(TravelTimeError::InvalidCoordinate {
            lon: coord.x,
            lat: coord.y,
        })
    }
}

impl LegProvider for HaversineProvider {
    fn compute_leg(&self, from: Coord<f64>, to: Coord<f64>) -> Result<Leg, TravelTimeError> {
        check_coordinate(from)?;
        check_coordinate(to)?;
        let distance = Self::distance_meters(from, to);
        Leg::new(distance, distance / self.speed_mps).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_point_has_zero_distance() {
        let here = Coord { x: -115.1, y: 36.1 };
        assert!(HaversineProvider::distance_meters(here, here) < 0.001);
    }

    #[rstest]
    fn known_distance_is_close() {
        // Las Vegas to Los Angeles is roughly 370 km.
        let km = HaversineProvider::distance_meters(
            Coord { x: -115.14, y: 36.17 },
            Coord { x: -118.24, y: 34.05 },
        ) / 1000.0;
        assert!(km > 350.0 && km < 400.0, "expected ~370 km, got {km}");
    }

    #[rstest]
    fn duration_uses_configured_speed() {
        let provider = HaversineProvider::new(10.0);
        let leg = provider
            .compute_leg(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.01 })
            .expect("valid coordinates");
        assert!((leg.duration_seconds - leg.distance_meters / 10.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(Coord { x: 181.0, y: 0.0 })]
    #[case(Coord { x: 0.0, y: -91.0 })]
    #[case(Coord { x: f64::NAN, y: 0.0 })]
    fn rejects_invalid_coordinates(#[case] bad: Coord<f64>) {
        let err = HaversineProvider::default()
            .compute_leg(bad, Coord { x: 0.0, y: 0.0 })
            .expect_err("invalid coordinate should fail");
        assert!(matches!(err, TravelTimeError::InvalidCoordinate { .. }));
    }
}
