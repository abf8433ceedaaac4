//! Visiting orders and their travel totals.

use crate::matrix::DistanceDurationMatrix;
use crate::point::Point;

/// Ordered indices into a day's point list.
///
/// With an anchor the route starts and ends at index 0.
pub type Route = Vec<usize>;

/// Distance and duration accumulated along a route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteTotals {
    /// Travel distance in meters.
    pub distance_meters: f64,
    /// Travel plus visit time in seconds.
    pub duration_seconds: f64,
}

/// Sum adjacent legs and visit durations along `route`.
///
/// Anchor visits contribute nothing. Indices outside `points` or the matrix
/// are ignored.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use itinerary_core::{route_totals, DistanceDurationMatrix, Leg, Point};
///
/// let points = vec![
///     Point::anchor("Hotel", Coord { x: 0.0, y: 0.0 }),
///     Point::new("a", "A", Coord { x: 0.0, y: 0.01 }).with_visit_minutes(30),
/// ];
/// let matrix = DistanceDurationMatrix::from_fn(2, |_, _| Leg::new(1000.0, 120.0));
/// let totals = route_totals(&[0, 1, 0], &points, &matrix);
/// assert_eq!(totals.distance_meters, 2000.0);
/// assert_eq!(totals.duration_seconds, 240.0 + 30.0 * 60.0);
/// ```
#[must_use]
pub fn route_totals(
    route: &[usize],
    points: &[Point],
    matrix: &DistanceDurationMatrix,
) -> RouteTotals {
    let travel = route.windows(2).fold(RouteTotals::default(), |acc, pair| {
        let &[from, to] = pair else {
            return acc;
        };
        RouteTotals {
            distance_meters: acc.distance_meters + matrix.distance(from, to).unwrap_or(0.0),
            duration_seconds: acc.duration_seconds + matrix.duration(from, to).unwrap_or(0.0),
        }
    });
    let visits: f64 = route
        .iter()
        .filter_map(|index| points.get(*index))
        .filter(|point| !point.is_anchor())
        .map(|point| f64::from(point.visit_minutes) * 60.0)
        .sum();
    RouteTotals {
        duration_seconds: travel.duration_seconds + visits,
        ..travel
    }
}
