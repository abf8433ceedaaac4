//! Deterministic providers and point builders used by unit and behaviour
//! tests across the workspace.

use geo::Coord;

use crate::matrix::DistanceDurationMatrix;
use crate::optimizer::DayPlan;
use crate::point::{OpeningPeriod, Point};
use crate::travel_time::{Leg, LegProvider, TravelTimeError};

/// Provider returning 1 km and one minute between distinct coordinates.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitLegProvider;

impl LegProvider for UnitLegProvider {
    fn compute_leg(&self, from: Coord<f64>, to: Coord<f64>) -> Result<Leg, TravelTimeError> {
        if from == to {
            Ok(Leg::ZERO)
        } else {
            Ok(Leg::new(1000.0, 60.0))
        }
    }
}

/// Provider returning the same leg for every pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLegProvider {
    leg: Leg,
}

impl FixedLegProvider {
    /// Answer every request with `distance_meters` and `duration_seconds`.
    #[must_use]
    pub const fn new(distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            leg: Leg::new(distance_meters, duration_seconds),
        }
    }
}

impl LegProvider for FixedLegProvider {
    fn compute_leg(&self, _from: Coord<f64>, _to: Coord<f64>) -> Result<Leg, TravelTimeError> {
        Ok(self.leg)
    }
}

/// Provider that always fails with the configured error.
#[derive(Debug, Clone, PartialEq)]
pub struct FailingLegProvider {
    error: TravelTimeError,
}

impl FailingLegProvider {
    /// Fail with `error`.
    #[must_use]
    pub const fn new(error: TravelTimeError) -> Self {
        Self { error }
    }

    /// Fail with a network error.
    #[must_use]
    pub fn network() -> Self {
        Self::new(TravelTimeError::NetworkError {
            url: "http://routing.invalid".to_owned(),
            message: "connection refused".to_owned(),
        })
    }
}

impl LegProvider for FailingLegProvider {
    fn compute_leg(&self, _from: Coord<f64>, _to: Coord<f64>) -> Result<Leg, TravelTimeError> {
        Err(self.error.clone())
    }
}

/// `count` always-open points `p0..` named `Place 0..`, spaced about 1 km
/// apart with a 60 minute visit and default priority.
#[must_use]
pub fn sample_points(count: usize) -> Vec<Point> {
    (0..count)
        .map(|index| {
            let offset = f64::from(u32::try_from(index).unwrap_or(u32::MAX)) * 0.01;
            Point::new(
                format!("p{index}"),
                format!("Place {index}"),
                Coord {
                    x: 106.70 + offset,
                    y: 10.77,
                },
            )
        })
        .collect()
}

/// A point open between `open` and `close` (minutes) on `day_of_week`.
#[must_use]
pub fn windowed_point(
    id: &str,
    location: Coord<f64>,
    day_of_week: u8,
    open: u32,
    close: u32,
) -> Point {
    Point::new(id, id, location).with_opening_periods(vec![OpeningPeriod::new(day_of_week, open, close)])
}

/// A plan over `points` with every leg equal to `leg`.
#[must_use]
pub fn uniform_plan(points: Vec<Point>, leg: Leg) -> DayPlan {
    let matrix = DistanceDurationMatrix::from_fn(points.len(), |_, _| leg);
    DayPlan::new(points, matrix)
}
