//! Test utilities for leg providers.
//!
//! [`StubLegProvider`] is a deterministic stand-in for the OSRM provider that
//! answers from a pre-configured response without making HTTP requests.

use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Coord;
use itinerary_core::{Leg, LegProvider, TravelTimeError};

/// Stub [`LegProvider`] for tests.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use itinerary_core::{Leg, LegProvider};
/// use itinerary_routing::test_support::StubLegProvider;
///
/// let provider = StubLegProvider::with_leg(Leg::new(1200.0, 240.0));
/// let leg = provider
///     .compute_leg(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 })
///     .expect("stub should answer");
/// assert_eq!(leg.duration_seconds, 240.0);
/// assert_eq!(provider.requests(), 1);
/// ```
#[derive(Debug)]
pub struct StubLegProvider {
    response: StubResponse,
    requests: AtomicUsize,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Leg(Leg),
    Error(TravelTimeError),
}

impl StubLegProvider {
    /// Create a provider that answers every distinct pair with `leg`.
    ///
    /// Identical coordinates yield [`Leg::ZERO`] without counting as a
    /// request, mirroring the OSRM provider.
    #[must_use]
    pub const fn with_leg(leg: Leg) -> Self {
        Self {
            response: StubResponse::Leg(leg),
            requests: AtomicUsize::new(0),
        }
    }

    /// Create a provider that fails every distinct pair with `error`.
    #[must_use]
    pub const fn with_error(error: TravelTimeError) -> Self {
        Self {
            response: StubResponse::Error(error),
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of requests answered so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl LegProvider for StubLegProvider {
    fn compute_leg(&self, from: Coord<f64>, to: Coord<f64>) -> Result<Leg, TravelTimeError> {
        if from == to {
            return Ok(Leg::ZERO);
        }
        self.requests.fetch_add(1, Ordering::Relaxed);
        match &self.response {
            StubResponse::Leg(leg) => Ok(*leg),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}
