//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM; `"Ok"` on success, otherwise values such as
    /// `"NoRoute"` or `"InvalidQuery"`.
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    pub routes: Option<Vec<RouteSummary>>,
}

/// The parts of an OSRM route the provider reads.
#[derive(Debug, Deserialize)]
pub struct RouteSummary {
    /// Distance in meters.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}
