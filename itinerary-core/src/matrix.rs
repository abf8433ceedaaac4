//! Pairwise distance and duration matrices.
//!
//! [`MatrixBuilder`] asks a [`LegProvider`] for every ordered pair of points
//! on a bounded `rayon` pool. Matrices are immutable once built and indexed
//! by position in the point list handed to the builder.

use geo::Coord;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::MatrixError;
use crate::point::Point;
use crate::travel_time::{Leg, LegProvider};

/// Default number of concurrent provider calls.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// Largest jitter, in degrees, applied to a synthesized anchor.
pub const ANCHOR_JITTER_DEGREES: f64 = 0.005;

/// Distances (meters) and durations (seconds) between every pair of points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DistanceDurationMatrix {
    size: usize,
    distances: Vec<f64>,
    durations: Vec<f64>,
}

impl DistanceDurationMatrix {
    /// Build a matrix from a leg function; the diagonal is always zero.
    ///
    /// # Examples
    /// ```
    /// use itinerary_core::{DistanceDurationMatrix, Leg};
    ///
    /// let matrix = DistanceDurationMatrix::from_fn(3, |i, j| {
    ///     Leg::new(100.0 * (i + j) as f64, 60.0)
    /// });
    /// assert_eq!(matrix.distance(1, 2), Some(300.0));
    /// assert_eq!(matrix.duration(2, 2), Some(0.0));
    /// assert_eq!(matrix.travel_minutes(0, 1), Some(1.0));
    /// ```
    #[must_use]
    pub fn from_fn(size: usize, mut leg: impl FnMut(usize, usize) -> Leg) -> Self {
        let legs = (0..size * size)
            .map(|cell| {
                let (from, to) = (cell / size, cell % size);
                if from == to { Leg::ZERO } else { leg(from, to) }
            })
            .collect();
        Self::from_legs(size, legs)
    }

    fn from_legs(size: usize, legs: Vec<Leg>) -> Self {
        let (distances, durations) = legs
            .into_iter()
            .map(|leg| (leg.distance_meters, leg.duration_seconds))
            .unzip();
        Self {
            size,
            distances,
            durations,
        }
    }

    /// Number of points covered by the matrix.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether the matrix covers no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn cell(&self, from: usize, to: usize) -> Option<usize> {
        (from < self.size && to < self.size).then(|| from * self.size + to)
    }

    /// Distance in meters from `from` to `to`.
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> Option<f64> {
        self.cell(from, to)
            .and_then(|cell| self.distances.get(cell).copied())
    }

    /// Duration in seconds from `from` to `to`.
    #[must_use]
    pub fn duration(&self, from: usize, to: usize) -> Option<f64> {
        self.cell(from, to)
            .and_then(|cell| self.durations.get(cell).copied())
    }

    /// Duration in minutes from `from` to `to`.
    #[must_use]
    pub fn travel_minutes(&self, from: usize, to: usize) -> Option<f64> {
        self.duration(from, to).map(|seconds| seconds / 60.0)
    }
}

/// Source of the offset applied when synthesizing an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AnchorOffset {
    /// Uniform jitter from the thread-local generator.
    #[default]
    Random,
    /// Uniform jitter from a ChaCha8 generator seeded with the value.
    Seeded(u64),
    /// A fixed offset in degrees.
    Fixed {
        /// Latitude offset in degrees.
        lat: f64,
        /// Longitude offset in degrees.
        lon: f64,
    },
}

impl AnchorOffset {
    fn resolve(&self) -> (f64, f64) {
        fn jitter(rng: &mut impl Rng) -> (f64, f64) {
            (
                rng.gen_range(-ANCHOR_JITTER_DEGREES..ANCHOR_JITTER_DEGREES),
                rng.gen_range(-ANCHOR_JITTER_DEGREES..ANCHOR_JITTER_DEGREES),
            )
        }
        match *self {
            Self::Random => jitter(&mut rand::thread_rng()),
            Self::Seeded(seed) => jitter(&mut ChaCha8Rng::seed_from_u64(seed)),
            Self::Fixed { lat, lon } => (lat, lon),
        }
    }
}

/// Place a synthetic anchor near `first`.
///
/// The anchor has zero visit time, no opening periods and the anchor
/// priority.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use itinerary_core::{synthesize_virtual_anchor, AnchorOffset, Point, VIRTUAL_ANCHOR_ID};
///
/// let first = Point::new("a", "Market", Coord { x: 106.70, y: 10.77 });
/// let anchor = synthesize_virtual_anchor(&first, &AnchorOffset::Fixed { lat: 0.001, lon: -0.002 });
/// assert_eq!(anchor.id, VIRTUAL_ANCHOR_ID);
/// assert!((anchor.location.y - 10.771).abs() < 1e-9);
/// assert!((anchor.location.x - 106.698).abs() < 1e-9);
/// ```
#[must_use]
pub fn synthesize_virtual_anchor(first: &Point, offset: &AnchorOffset) -> Point {
    let (dlat, dlon) = offset.resolve();
    let location = Coord {
        x: (first.location.x + dlon).clamp(-180.0, 180.0),
        y: (first.location.y + dlat).clamp(-90.0, 90.0),
    };
    Point::virtual_anchor(location)
}

/// Points and matrix produced by [`MatrixBuilder::build_anchored`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredMatrix {
    /// Point list with an anchor at index 0 whenever any point exists.
    pub points: Vec<Point>,
    /// Matrix over [`AnchoredMatrix::points`].
    pub matrix: DistanceDurationMatrix,
    /// Whether the anchor was synthesized.
    pub virtual_anchor: bool,
}

/// Builds [`DistanceDurationMatrix`] values with bounded parallelism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixBuilder {
    max_concurrency: usize,
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}

impl MatrixBuilder {
    /// Create a builder running at most `max_concurrency` provider calls at
    /// once. Zero is treated as one.
    #[must_use]
    pub const fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: if max_concurrency == 0 {
                1
            } else {
                max_concurrency
            },
        }
    }

    /// Configured concurrency bound.
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Query `provider` for every ordered pair of distinct points.
    ///
    /// # Errors
    /// Returns [`MatrixError::Provider`] for the first failing pair, or
    /// [`MatrixError::ThreadPool`] when the worker pool cannot start.
    pub fn build<P>(
        &self,
        points: &[Point],
        provider: &P,
    ) -> Result<DistanceDurationMatrix, MatrixError>
    where
        P: LegProvider + ?Sized,
    {
        let size = points.len();
        if size == 0 {
            return Ok(DistanceDurationMatrix::default());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_concurrency)
            .thread_name(|index| format!("itinerary-matrix-{index}"))
            .build()
            .map_err(|err| MatrixError::ThreadPool(err.to_string()))?;

        let legs = pool.install(|| {
            (0..size * size)
                .into_par_iter()
                .map(|cell| compute_cell(points, provider, cell / size, cell % size))
                .collect::<Result<Vec<_>, _>>()
        })?;

        log::debug!(
            "built {size}x{size} matrix with {} provider calls",
            size * (size - 1)
        );
        Ok(DistanceDurationMatrix::from_legs(size, legs))
    }

    /// Ensure an anchor exists at index 0, then build the full matrix.
    ///
    /// When the first point is not an anchor a virtual one is synthesized
    /// next to it using `offset` and inserted at the front.
    ///
    /// # Errors
    /// Propagates failures from [`MatrixBuilder::build`].
    pub fn build_anchored<P>(
        &self,
        mut points: Vec<Point>,
        offset: &AnchorOffset,
        provider: &P,
    ) -> Result<AnchoredMatrix, MatrixError>
    where
        P: LegProvider + ?Sized,
    {
        let virtual_anchor = match points.first() {
            Some(first) if !first.is_anchor() => {
                let anchor = synthesize_virtual_anchor(first, offset);
                log::debug!(
                    "synthesized virtual anchor at ({}, {})",
                    anchor.location.x,
                    anchor.location.y
                );
                points.insert(0, anchor);
                true
            }
            _ => false,
        };
        let matrix = self.build(&points, provider)?;
        Ok(AnchoredMatrix {
            points,
            matrix,
            virtual_anchor,
        })
    }
}

fn compute_cell<P>(points: &[Point], provider: &P, from: usize, to: usize) -> Result<Leg, MatrixError>
where
    P: LegProvider + ?Sized,
{
    if from == to {
        return Ok(Leg::ZERO);
    }
    let (Some(origin), Some(destination)) = (points.get(from), points.get(to)) else {
        return Ok(Leg::ZERO);
    };
    provider
        .compute_leg(origin.location, destination.location)
        .and_then(Leg::validate)
        .map_err(|source| MatrixError::Provider {
            from: origin.id.clone(),
            to: destination.id.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haversine::HaversineProvider;
    use crate::test_support::{FailingLegProvider, FixedLegProvider, sample_points};
    use crate::travel_time::TravelTimeError;
    use rstest::rstest;

    #[rstest]
    fn builds_square_matrix_with_zero_diagonal() {
        let points = sample_points(3);
        let matrix = MatrixBuilder::default()
            .build(&points, &FixedLegProvider::new(500.0, 120.0))
            .expect("matrix builds");

        assert_eq!(matrix.len(), 3);
        for i in 0..3 {
            assert_eq!(matrix.distance(i, i), Some(0.0));
            for j in (0..3).filter(|j| *j != i) {
                assert_eq!(matrix.distance(i, j), Some(500.0));
                assert_eq!(matrix.travel_minutes(i, j), Some(2.0));
            }
        }
        assert_eq!(matrix.distance(3, 0), None);
    }

    #[rstest]
    fn empty_point_list_builds_empty_matrix() {
        let matrix = MatrixBuilder::default()
            .build(&[], &HaversineProvider::default())
            .expect("empty matrix");
        assert!(matrix.is_empty());
    }

    #[rstest]
    fn provider_failure_aborts_build() {
        let err = MatrixBuilder::new(2)
            .build(&sample_points(3), &FailingLegProvider::network())
            .expect_err("provider fails");
        assert!(matches!(
            err,
            MatrixError::Provider {
                source: TravelTimeError::NetworkError { .. },
                ..
            }
        ));
    }

    #[rstest]
    fn malformed_legs_are_rejected() {
        let err = MatrixBuilder::default()
            .build(&sample_points(2), &FixedLegProvider::new(-1.0, 10.0))
            .expect_err("negative distance");
        assert!(matches!(
            err,
            MatrixError::Provider {
                source: TravelTimeError::MalformedLeg { .. },
                ..
            }
        ));
    }

    #[rstest]
    fn zero_concurrency_is_clamped() {
        assert_eq!(MatrixBuilder::new(0).max_concurrency(), 1);
    }

    #[rstest]
    fn build_anchored_inserts_virtual_anchor() {
        let anchored = MatrixBuilder::default()
            .build_anchored(
                sample_points(3),
                &AnchorOffset::Seeded(7),
                &HaversineProvider::default(),
            )
            .expect("matrix builds");

        assert!(anchored.virtual_anchor);
        assert_eq!(anchored.points.len(), 4);
        assert_eq!(anchored.matrix.len(), 4);
        let anchor = anchored.points.first().expect("anchor");
        assert!(anchor.is_anchor());
        assert_eq!(anchored.matrix.distance(0, 0), Some(0.0));
        assert!(anchored.matrix.distance(0, 1).is_some_and(|d| d > 0.0));
    }

    #[rstest]
    fn build_anchored_keeps_existing_anchor() {
        let mut points = sample_points(2);
        points.insert(0, Point::anchor("Hotel", Coord { x: 106.7, y: 10.77 }));
        let anchored = MatrixBuilder::default()
            .build_anchored(points, &AnchorOffset::Random, &HaversineProvider::default())
            .expect("matrix builds");
        assert!(!anchored.virtual_anchor);
        assert_eq!(anchored.points.len(), 3);
    }

    #[rstest]
    fn seeded_jitter_is_reproducible_and_bounded() {
        let first = Point::new("a", "A", Coord { x: 10.0, y: 20.0 });
        let one = synthesize_virtual_anchor(&first, &AnchorOffset::Seeded(42));
        let two = synthesize_virtual_anchor(&first, &AnchorOffset::Seeded(42));
        assert_eq!(one.location, two.location);
        assert!((one.location.x - 10.0).abs() <= ANCHOR_JITTER_DEGREES);
        assert!((one.location.y - 20.0).abs() <= ANCHOR_JITTER_DEGREES);
        assert_eq!(one.visit_minutes, 0);
        assert!(one.opening_periods.is_empty());
    }
}
