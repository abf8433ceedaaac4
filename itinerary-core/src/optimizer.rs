//! The optimizer seam.

use crate::evaluator::{RouteEvaluator, ScoringPolicy};
use crate::matrix::DistanceDurationMatrix;
use crate::point::Point;
use crate::result::{Algorithm, OptimizationResult};

/// Start of the day when callers supply none: 08:00.
pub const DEFAULT_START_MINUTES: u32 = 8 * 60;
/// Day of week used when callers supply none: Monday.
pub const DEFAULT_DAY_OF_WEEK: u8 = 1;

/// Everything an optimizer needs for one day.
///
/// `points` and `matrix` share indices. When the first point is an anchor
/// routes start and end there.
#[derive(Debug, Clone)]
pub struct DayPlan {
    /// Points to visit, anchor first when present.
    pub points: Vec<Point>,
    /// Pairwise legs over `points`.
    pub matrix: DistanceDurationMatrix,
    /// Start of the day in minutes since midnight.
    pub start_minutes: u32,
    /// Day of week, `0 = Sunday`.
    pub day_of_week: u8,
    /// Caller scoring rules.
    pub policy: ScoringPolicy,
}

impl DayPlan {
    /// Create a plan starting at [`DEFAULT_START_MINUTES`] on
    /// [`DEFAULT_DAY_OF_WEEK`] with no extra scoring rules.
    #[must_use]
    pub fn new(points: Vec<Point>, matrix: DistanceDurationMatrix) -> Self {
        Self {
            points,
            matrix,
            start_minutes: DEFAULT_START_MINUTES,
            day_of_week: DEFAULT_DAY_OF_WEEK,
            policy: ScoringPolicy::none(),
        }
    }

    /// Set the start of the day.
    #[must_use]
    pub const fn with_start_minutes(mut self, start_minutes: u32) -> Self {
        self.start_minutes = start_minutes;
        self
    }

    /// Set the day of week.
    #[must_use]
    pub const fn with_day_of_week(mut self, day_of_week: u8) -> Self {
        self.day_of_week = day_of_week;
        self
    }

    /// Replace the scoring rules.
    #[must_use]
    pub fn with_policy(mut self, policy: ScoringPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether index 0 is an anchor.
    #[must_use]
    pub fn has_anchor(&self) -> bool {
        self.points.first().is_some_and(Point::is_anchor)
    }

    /// Evaluator bound to this plan.
    #[must_use]
    pub const fn evaluator(&self) -> RouteEvaluator<'_> {
        RouteEvaluator::new(self)
    }
}

/// Produce a visiting order for a [`DayPlan`].
///
/// Optimizers are infallible: preconditions are checked before a plan is
/// built. Implementations must be `Send + Sync`.
pub trait RouteOptimizer: Send + Sync {
    /// Which algorithm this optimizer runs.
    fn algorithm(&self) -> Algorithm;

    /// Optimize the plan.
    fn optimize(&self, plan: &DayPlan) -> OptimizationResult;
}

impl<T: RouteOptimizer + ?Sized> RouteOptimizer for Box<T> {
    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }

    fn optimize(&self, plan: &DayPlan) -> OptimizationResult {
        (**self).optimize(plan)
    }
}
