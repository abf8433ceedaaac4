//! Leg provider trait and the leg value it returns.

use geo::Coord;

use super::error::TravelTimeError;

/// Distance and estimated travel time between two coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    /// Travel distance in meters.
    pub distance_meters: f64,
    /// Estimated travel duration in seconds.
    pub duration_seconds: f64,
}

impl Leg {
    /// A zero-length leg, used for the matrix diagonal.
    pub const ZERO: Self = Self {
        distance_meters: 0.0,
        duration_seconds: 0.0,
    };

    /// Construct a leg from raw provider values.
    #[must_use]
    pub const fn new(distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            distance_meters,
            duration_seconds,
        }
    }

    /// Reject negative or non-finite values.
    ///
    /// # Examples
    /// ```
    /// use itinerary_core::{Leg, TravelTimeError};
    ///
    /// assert!(Leg::new(120.0, 10.8).validate().is_ok());
    /// assert!(matches!(
    ///     Leg::new(f64::NAN, 1.0).validate(),
    ///     Err(TravelTimeError::MalformedLeg { .. })
    /// ));
    /// ```
    pub fn validate(self) -> Result<Self, TravelTimeError> {
        let valid = |value: f64| value.is_finite() && value >= 0.0;
        if valid(self.distance_meters) && valid(self.duration_seconds) {
            Ok(self)
        } else {
            Err(TravelTimeError::MalformedLeg {
                distance_meters: self.distance_meters,
                duration_seconds: self.duration_seconds,
            })
        }
    }
}

/// Fetch the distance and travel time between two coordinates.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
/// Implementations must be `Send + Sync`; the matrix builder calls them from a
/// bounded pool of worker threads.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use itinerary_core::{Leg, LegProvider, TravelTimeError};
///
/// struct UnitProvider;
///
/// impl LegProvider for UnitProvider {
///     fn compute_leg(&self, from: Coord<f64>, to: Coord<f64>) -> Result<Leg, TravelTimeError> {
///         if from == to {
///             return Ok(Leg::ZERO);
///         }
///         Ok(Leg::new(1.0, 1.0))
///     }
/// }
///
/// let leg = UnitProvider.compute_leg(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 })?;
/// assert_eq!(leg.duration_seconds, 1.0);
/// # Ok::<(), TravelTimeError>(())
/// ```
pub trait LegProvider: Send + Sync {
    /// Return the leg from `from` to `to`.
    fn compute_leg(&self, from: Coord<f64>, to: Coord<f64>) -> Result<Leg, TravelTimeError>;
}

impl<P: LegProvider + ?Sized> LegProvider for &P {
    fn compute_leg(&self, from: Coord<f64>, to: Coord<f64>) -> Result<Leg, TravelTimeError> {
        (**self).compute_leg(from, to)
    }
}

impl<P: LegProvider + ?Sized> LegProvider for Box<P> {
    fn compute_leg(&self, from: Coord<f64>, to: Coord<f64>) -> Result<Leg, TravelTimeError> {
        (**self).compute_leg(from, to)
    }
}
