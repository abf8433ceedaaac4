//! [`LegProvider`] backed by the OSRM Route service.
//!
//! The provider bridges the synchronous trait to asynchronous HTTP calls by
//! blocking on a Tokio runtime it owns.

use std::time::Duration;

use geo::Coord;
use itinerary_core::{Leg, LegProvider, TravelTimeError};
use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use crate::osrm::RouteResponse;

/// Error type for [`OsrmLegProvider`] construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "itinerary-routing/0.1";

/// Default OSRM routing profile.
pub const DEFAULT_PROFILE: &str = "driving";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`OsrmLegProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsrmLegProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile segment of the request path.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmLegProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmLegProviderConfig {
    /// Create a configuration for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile, such as `foot` or `bike`.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Leg provider issuing one OSRM Route request per ordered pair.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider blocks on its own current-thread
/// runtime. Inside a multi-threaded runtime it uses that runtime's handle
/// through [`tokio::task::block_in_place`]. Inside a `current_thread` runtime
/// it falls back to its own runtime, which can deadlock if the caller's
/// runtime drives IO this request depends on.
pub struct OsrmLegProvider {
    client: Client,
    config: OsrmLegProviderConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmLegProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmLegProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OsrmLegProvider {
    /// Create a provider for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmLegProviderConfig::new(base_url))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OsrmLegProviderConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OsrmLegProviderConfig {
        &self.config
    }

    /// `{base}/route/v1/{profile}/{lon},{lat};{lon},{lat}?overview=false`
    fn build_route_url(&self, from: Coord<f64>, to: Coord<f64>) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=false",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            from.x,
            from.y,
            to.x,
            to.y
        )
    }

    async fn fetch_leg_async(&self, url: String) -> Result<Leg, TravelTimeError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let route_response: RouteResponse =
            response
                .json()
                .await
                .map_err(|err| TravelTimeError::ParseError {
                    message: err.to_string(),
                })?;

        Self::convert_response(route_response)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TravelTimeError {
        if error.is_timeout() {
            return TravelTimeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TravelTimeError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TravelTimeError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Read the best route's distance and duration.
    fn convert_response(response: RouteResponse) -> Result<Leg, TravelTimeError> {
        if !response.is_ok() {
            return Err(TravelTimeError::ServiceError {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let best = response
            .routes
            .and_then(|routes| routes.into_iter().next())
            .ok_or_else(|| TravelTimeError::ParseError {
                message: "OSRM response contains no routes".to_owned(),
            })?;

        Leg::new(best.distance, best.duration).validate()
    }
}

fn check_coordinate(coord: Coord<f64>) -> Result<(), TravelTimeError> {
    let in_range = (-180.0..=180.0).contains(&coord.x) && (-90.0..=90.0).contains(&coord.y);
    if in_range {
        Ok(())
    } else {
        Err(TravelTimeError::InvalidCoordinate {
            lon: coord.x,
            lat: coord.y,
        })
    }
}

impl LegProvider for OsrmLegProvider {
    /// Fetch the leg between two coordinates.
    ///
    /// Identical coordinates short-circuit to [`Leg::ZERO`] without a request.
    fn compute_leg(&self, from: Coord<f64>, to: Coord<f64>) -> Result<Leg, TravelTimeError> {
        check_coordinate(from)?;
        check_coordinate(to)?;
        if from == to {
            return Ok(Leg::ZERO);
        }

        let url = self.build_route_url(from, to);
        log::debug!("requesting OSRM leg {url}");
        let future = self.fetch_leg_async(url);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osrm::RouteSummary;
    use rstest::{fixture, rstest};

    #[fixture]
    fn provider() -> OsrmLegProvider {
        OsrmLegProvider::new("http://osrm.example.com").expect("provider should build")
    }

    fn ok_response(distance: f64, duration: f64) -> RouteResponse {
        RouteResponse {
            code: "Ok".to_owned(),
            message: None,
            routes: Some(vec![RouteSummary { distance, duration }]),
        }
    }

    #[rstest]
    fn build_route_url_formats_coordinates(provider: OsrmLegProvider) {
        let url = provider.build_route_url(Coord { x: 106.7, y: 10.77 }, Coord { x: 106.71, y: 10.78 });

        assert_eq!(
            url,
            "http://osrm.example.com/route/v1/driving/106.7,10.77;106.71,10.78?overview=false"
        );
    }

    #[rstest]
    fn build_route_url_uses_profile_and_strips_trailing_slash() {
        let config = OsrmLegProviderConfig::new("http://osrm.example.com/").with_profile("foot");
        let provider = OsrmLegProvider::with_config(config).expect("provider should build");

        let url = provider.build_route_url(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });

        assert!(url.starts_with("http://osrm.example.com/route/v1/foot/"));
        assert!(!url.contains("//route"));
    }

    #[rstest]
    fn convert_response_reads_first_route() {
        let leg = OsrmLegProvider::convert_response(ok_response(1523.4, 201.7))
            .expect("should convert");

        assert_eq!(leg, Leg::new(1523.4, 201.7));
    }

    #[rstest]
    fn convert_response_maps_service_errors() {
        let response = RouteResponse {
            code: "NoRoute".to_owned(),
            message: Some("Impossible route".to_owned()),
            routes: None,
        };

        let err = OsrmLegProvider::convert_response(response).expect_err("should fail");

        assert_eq!(
            err,
            TravelTimeError::ServiceError {
                code: "NoRoute".to_owned(),
                message: "Impossible route".to_owned(),
            }
        );
    }

    #[rstest]
    fn convert_response_rejects_missing_routes() {
        let response = RouteResponse {
            code: "Ok".to_owned(),
            message: None,
            routes: Some(Vec::new()),
        };

        let err = OsrmLegProvider::convert_response(response).expect_err("should fail");

        assert!(matches!(err, TravelTimeError::ParseError { .. }));
    }

    #[rstest]
    fn convert_response_rejects_negative_duration() {
        let err = OsrmLegProvider::convert_response(ok_response(10.0, -1.0))
            .expect_err("should fail");

        assert!(matches!(err, TravelTimeError::MalformedLeg { .. }));
    }

    #[rstest]
    fn identical_coordinates_skip_the_request(provider: OsrmLegProvider) {
        let here = Coord { x: 106.7, y: 10.77 };

        let leg = provider.compute_leg(here, here).expect("no request needed");

        assert_eq!(leg, Leg::ZERO);
    }

    #[rstest]
    fn out_of_range_coordinates_are_rejected(provider: OsrmLegProvider) {
        let err = provider
            .compute_leg(Coord { x: 200.0, y: 10.0 }, Coord { x: 0.0, y: 0.0 })
            .expect_err("longitude out of range");

        assert!(matches!(err, TravelTimeError::InvalidCoordinate { .. }));
    }

    #[rstest]
    fn unreachable_service_reports_transport_error() {
        let config = OsrmLegProviderConfig::new("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let provider = OsrmLegProvider::with_config(config).expect("provider should build");

        let err = provider
            .compute_leg(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 })
            .expect_err("nothing listens on the discard port");

        assert!(matches!(
            err,
            TravelTimeError::NetworkError { .. } | TravelTimeError::Timeout { .. }
        ));
    }

    #[rstest]
    fn config_defaults() {
        let config = OsrmLegProviderConfig::default();

        assert_eq!(config.profile, DEFAULT_PROFILE);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}
