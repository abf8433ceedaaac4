//! Route optimizers for a single day's itinerary.
//!
//! [`GreedyOptimizer`] builds a route by repeatedly taking the best-scoring
//! next stop. [`AnnealingOptimizer`] searches swap neighbourhoods with
//! simulated annealing. Both implement
//! [`RouteOptimizer`](itinerary_core::RouteOptimizer) and score routes with the
//! shared [`RouteEvaluator`](itinerary_core::RouteEvaluator).
//!
//! [`DayPlanner`] ties normalization, matrix construction and optimization
//! together; [`optimize_day`] runs it with the Haversine provider and default
//! configuration.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod annealing;
mod cancellation;
mod greedy;
mod planner;

pub use annealing::{AnnealingOptimizer, AnnealingParams, AnnealingParamsError};
pub use cancellation::CancellationToken;
pub use greedy::GreedyOptimizer;
pub use planner::{DayPlanner, DayPlannerConfig, DayRequest, optimize_day};
