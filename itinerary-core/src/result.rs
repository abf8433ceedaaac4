//! The output contract shared by every optimizer.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::optimizer::DayPlan;
use crate::point::DroppedPlace;
use crate::route::route_totals;
use crate::schedule::{TimeWarning, TimelineEntry};

/// Available optimization algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Algorithm {
    /// Simulated annealing.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "sa", alias = "annealing"))]
    Annealing,
    /// Greedy nearest-best construction.
    Greedy,
}

impl Algorithm {
    /// Human-readable label reported in results.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Annealing => "Simulated Annealing",
            Self::Greedy => "Greedy",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when an algorithm name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm `{0}`; expected `sa` or `greedy`")]
pub struct ParseAlgorithmError(pub String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sa" | "annealing" | "simulated-annealing" => Ok(Self::Annealing),
            "greedy" => Ok(Self::Greedy),
            other => Err(ParseAlgorithmError(other.to_owned())),
        }
    }
}

/// Why an optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Termination {
    /// The algorithm ran to its natural end.
    #[default]
    Completed,
    /// A cancellation token fired or the deadline passed.
    Cancelled,
    /// The iteration cap was reached first.
    IterationLimitReached,
}

/// Run details that are not part of the route itself.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Diagnostics {
    /// Why the optimizer stopped.
    pub termination: Termination,
    /// Iterations performed; zero for constructive algorithms.
    pub iterations: u64,
    /// Places excluded during normalization.
    pub dropped_points: Vec<DroppedPlace>,
    /// Whether the anchor was synthesized.
    pub virtual_anchor: bool,
    /// Best score after each iteration, when recorded.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty", default))]
    pub best_score_history: Vec<f64>,
}

/// Outcome of one optimization run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct OptimizationResult {
    /// Point names in visiting order.
    pub route: Vec<String>,
    /// Point identifiers in visiting order.
    pub place_ids: Vec<String>,
    /// Travel distance in meters.
    pub total_distance: f64,
    /// Travel plus visit time in seconds.
    pub total_duration: f64,
    /// Fitness score of the route.
    pub total_score: f64,
    /// Algorithm label.
    pub algorithm: String,
    /// Opening-hours violations.
    pub time_warnings: Vec<TimeWarning>,
    /// Per-stop schedule.
    pub timeline: Vec<TimelineEntry>,
    /// Number of non-anchor stops.
    pub visited_points_count: usize,
    /// Wall-clock time spent optimizing.
    pub execution_time_ms: u64,
    /// Run details.
    pub diagnostics: Diagnostics,
}

impl OptimizationResult {
    /// Assemble a result for `route` over `plan`.
    ///
    /// Score, timeline and warnings come from the plan's evaluator; totals
    /// are summed directly from the matrix.
    #[must_use]
    pub fn from_route(
        plan: &DayPlan,
        route: &[usize],
        algorithm: Algorithm,
        diagnostics: Diagnostics,
        elapsed: Duration,
    ) -> Self {
        let evaluation = plan.evaluator().evaluate(route);
        let totals = route_totals(route, &plan.points, &plan.matrix);
        let stops: Vec<_> = route
            .iter()
            .filter_map(|index| plan.points.get(*index))
            .collect();

        Self {
            route: stops.iter().map(|point| point.name.clone()).collect(),
            place_ids: stops.iter().map(|point| point.id.clone()).collect(),
            total_distance: totals.distance_meters,
            total_duration: totals.duration_seconds,
            total_score: evaluation.score,
            algorithm: algorithm.label().to_owned(),
            time_warnings: evaluation.time_warnings,
            timeline: evaluation.timeline,
            visited_points_count: stops.iter().filter(|point| !point.is_anchor()).count(),
            execution_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sa", Algorithm::Annealing)]
    #[case("SA", Algorithm::Annealing)]
    #[case("annealing", Algorithm::Annealing)]
    #[case(" greedy ", Algorithm::Greedy)]
    fn parses_algorithm_names(#[case] input: &str, #[case] expected: Algorithm) {
        assert_eq!(input.parse::<Algorithm>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_algorithm() {
        let err = "tabu".parse::<Algorithm>().expect_err("unknown");
        assert_eq!(err, ParseAlgorithmError("tabu".to_owned()));
    }

    #[rstest]
    fn labels_match_display() {
        assert_eq!(Algorithm::Annealing.to_string(), "Simulated Annealing");
        assert_eq!(Algorithm::Greedy.label(), "Greedy");
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn termination_serializes_screaming_case() {
        let json = serde_json::to_string(&Termination::IterationLimitReached).expect("serialize");
        assert_eq!(json, "\"ITERATION_LIMIT_REACHED\"");
    }
}
