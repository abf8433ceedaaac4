use thiserror::Error;

/// Errors from [`crate::travel_time::LegProvider::compute_leg`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TravelTimeError {
    /// A coordinate was not finite or fell outside WGS84 bounds.
    #[error("coordinate ({lon}, {lat}) is not a valid WGS84 position")]
    InvalidCoordinate {
        /// Longitude supplied to the provider.
        lon: f64,
        /// Latitude supplied to the provider.
        lat: f64,
    },
    /// The provider returned a negative or non-finite distance or duration.
    #[error("provider returned a malformed leg (distance {distance_meters} m, duration {duration_seconds} s)")]
    MalformedLeg {
        /// Distance reported by the provider.
        distance_meters: f64,
        /// Duration reported by the provider.
        duration_seconds: f64,
    },
    /// The request did not complete before the configured timeout.
    #[error("request to {url} timed out after {timeout_secs} s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The routing service answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The request failed before a response was received.
    #[error("request to {url} failed: {message}")]
    NetworkError {
        /// Requested URL.
        url: String,
        /// Error description.
        message: String,
    },
    /// The routing service reported an error in its payload.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Service-specific status code.
        code: String,
        /// Error description.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Decoder error description.
        message: String,
    },
}
