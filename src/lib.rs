//! Facade crate for the itinerary engine.
//!
//! This crate re-exports the core domain types and the optimizers, and exposes
//! the OSRM leg provider behind the `routing-osrm` feature.

#![forbid(unsafe_code)]

pub use itinerary_core::{
    Algorithm, AnchorOffset, Diagnostics, HaversineProvider, Leg, LegProvider, OptimizationResult,
    OptimizeError, Point, RawAnchor, RawPlace, RouteEvaluator, RouteOptimizer, ScoringPolicy,
    TimeStatus, TimeWarning, TimelineEntry, TravelTimeError,
};
pub use itinerary_solver::{
    AnnealingOptimizer, AnnealingParams, CancellationToken, DayPlanner, DayPlannerConfig,
    DayRequest, GreedyOptimizer, optimize_day,
};

#[cfg(feature = "routing-osrm")]
pub use itinerary_routing::{OsrmLegProvider, OsrmLegProviderConfig};
