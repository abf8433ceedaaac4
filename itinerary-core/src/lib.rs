//! Core domain types for the itinerary engine.
//!
//! The crate turns raw day-itinerary entries into validated [`Point`] values,
//! builds pairwise distance and duration matrices through a pluggable
//! [`LegProvider`], and scores candidate visiting orders with the
//! [`RouteEvaluator`]. Optimizers live in `itinerary-solver` and implement the
//! [`RouteOptimizer`] trait defined here.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod evaluator;
pub mod haversine;
pub mod matrix;
pub mod optimizer;
pub mod point;
pub mod result;
pub mod route;
pub mod schedule;
#[doc(hidden)]
pub mod test_support;
pub mod travel_time;

pub use error::{MatrixError, OptimizeError};
pub use evaluator::{
    DEFAULT_MUST_INCLUDE_BONUS, Evaluation, MustIncludeBonus, RouteEvaluator, ScoringPolicy,
};
pub use haversine::HaversineProvider;
pub use matrix::{
    AnchorOffset, AnchoredMatrix, DistanceDurationMatrix, MatrixBuilder, synthesize_virtual_anchor,
};
pub use optimizer::{DEFAULT_DAY_OF_WEEK, DEFAULT_START_MINUTES, DayPlan, RouteOptimizer};
pub use point::{
    ANCHOR_ID, DropReason, DroppedPlace, NormalizedPoints, OpeningPeriod, Point, RawAnchor,
    RawClock, RawOpeningPeriod, RawPlace, VIRTUAL_ANCHOR_ID, normalize,
};
pub use result::{Algorithm, Diagnostics, OptimizationResult, ParseAlgorithmError, Termination};
pub use route::{Route, RouteTotals, route_totals};
pub use schedule::{
    ArrivalAssessment, OpeningWindow, TimeStatus, TimeWarning, TimelineEntry, format_clock,
    score_arrival, warning_for,
};
pub use travel_time::{Leg, LegProvider, TravelTimeError};
