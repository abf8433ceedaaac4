//! OSRM-backed leg provider.
//!
//! [`OsrmLegProvider`] implements [`itinerary_core::LegProvider`] by calling
//! the OSRM Route service for each ordered pair of points. The provider trait
//! is synchronous so the core stays embeddable; the provider blocks on a Tokio
//! runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use geo::Coord;
//! use itinerary_core::LegProvider;
//! use itinerary_routing::{OsrmLegProvider, OsrmLegProviderConfig};
//!
//! let config = OsrmLegProviderConfig::new("http://localhost:5000")
//!     .with_profile("foot")
//!     .with_timeout(Duration::from_secs(10));
//! let provider = OsrmLegProvider::with_config(config)?;
//! let leg = provider.compute_leg(Coord { x: 106.70, y: 10.77 }, Coord { x: 106.71, y: 10.78 })?;
//! println!("{} m in {} s", leg.distance_meters, leg.duration_seconds);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_PROFILE, DEFAULT_USER_AGENT, OsrmLegProvider, OsrmLegProviderConfig,
    ProviderBuildError,
};
