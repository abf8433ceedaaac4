//! Errors raised before an optimizer runs.

use thiserror::Error;

use crate::travel_time::TravelTimeError;

/// Errors from [`crate::MatrixBuilder`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// The leg provider failed for one ordered pair of points.
    #[error("leg from {from} to {to} failed: {source}")]
    Provider {
        /// Identifier of the origin point.
        from: String,
        /// Identifier of the destination point.
        to: String,
        /// Underlying provider failure.
        #[source]
        source: TravelTimeError,
    },
    /// The worker pool could not be created.
    #[error("failed to start matrix worker pool: {0}")]
    ThreadPool(String),
}

/// Errors returned by day planning.
///
/// Precondition failures are reported here; the optimizers themselves are
/// infallible once a matrix exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// No entry carried usable coordinates.
    #[error("no places with valid coordinates were found")]
    NoPointsFound,
    /// Too few usable places to build a route.
    #[error("at least 2 places with valid coordinates are required, found {usable}")]
    InsufficientPoints {
        /// Number of usable non-anchor places.
        usable: usize,
    },
    /// Request parameters were rejected.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },
    /// Building the distance and duration matrix failed.
    #[error(transparent)]
    Provider(#[from] MatrixError),
}
