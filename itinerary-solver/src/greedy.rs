//! Greedy nearest-best construction.

use std::time::Instant;

use itinerary_core::evaluator::PRIORITY_WEIGHT;
use itinerary_core::{
    Algorithm, DayPlan, Diagnostics, OptimizationResult, RouteOptimizer, score_arrival,
};

/// Builds a route by always moving to the best-scoring unvisited point.
///
/// A candidate's score is its priority weight minus the travel minutes from
/// the current stop and any opening-hours penalty, plus the availability and
/// must-include bonuses. Ties go to the lowest point index. With an anchor
/// the route returns to it at the end.
///
/// # Examples
/// ```
/// use itinerary_core::test_support::{sample_points, uniform_plan};
/// use itinerary_core::{Leg, RouteOptimizer};
/// use itinerary_solver::GreedyOptimizer;
///
/// let plan = uniform_plan(sample_points(3), Leg::new(1000.0, 300.0));
/// let result = GreedyOptimizer.optimize(&plan);
/// assert_eq!(result.place_ids, ["p0", "p1", "p2"]);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyOptimizer;

struct Candidate {
    index: usize,
    score: f64,
    departure_minutes: f64,
}

#[expect(
    clippy::float_arithmetic,
    reason = "candidate scores combine travel minutes, penalties and bonuses"
)]
fn best_candidate(plan: &DayPlan, visited: &[bool], current: usize, clock: f64) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for (index, point) in plan.points.iter().enumerate() {
        let already = visited.get(index).copied().unwrap_or(true);
        if already || point.is_anchor() {
            continue;
        }
        let travel = plan.matrix.travel_minutes(current, index).unwrap_or(0.0);
        let assessment = score_arrival(point, clock + travel, plan.day_of_week);
        let score = f64::from(point.priority) * PRIORITY_WEIGHT - travel - assessment.penalty
            + assessment.bonus
            + plan.policy.bonus_for(point);
        if best.as_ref().is_none_or(|leader| score > leader.score) {
            best = Some(Candidate {
                index,
                score,
                departure_minutes: assessment.departure_minutes(point.visit_minutes),
            });
        }
    }
    best
}

#[expect(
    clippy::float_arithmetic,
    reason = "the clock starts at the first stop's departure time"
)]
fn first_departure(plan: &DayPlan) -> f64 {
    let visit = plan.points.first().map_or(0, |first| first.visit_minutes);
    f64::from(plan.start_minutes) + f64::from(visit)
}

impl GreedyOptimizer {
    /// Construct the visiting order for `plan`.
    #[must_use]
    pub fn route(plan: &DayPlan) -> Vec<usize> {
        if plan.points.is_empty() {
            return Vec::new();
        }
        let mut visited = vec![false; plan.points.len()];
        if let Some(first) = visited.first_mut() {
            *first = true;
        }
        let mut route = vec![0];
        let mut current = 0;
        let mut clock = first_departure(plan);

        while let Some(next) = best_candidate(plan, &visited, current, clock) {
            if let Some(flag) = visited.get_mut(next.index) {
                *flag = true;
            }
            route.push(next.index);
            current = next.index;
            clock = next.departure_minutes;
        }

        if plan.has_anchor() && route.len() > 1 {
            route.push(0);
        }
        route
    }
}

impl RouteOptimizer for GreedyOptimizer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Greedy
    }

    fn optimize(&self, plan: &DayPlan) -> OptimizationResult {
        let started_at = Instant::now();
        let route = Self::route(plan);
        log::debug!("greedy route visits {} stops", route.len());
        OptimizationResult::from_route(
            plan,
            &route,
            self.algorithm(),
            Diagnostics::default(),
            started_at.elapsed(),
        )
    }
}
