//! Route scoring.
//!
//! [`RouteEvaluator`] walks a route over a [`DayPlan`], advancing a clock by
//! travel and visit time, and turns each stop into a timeline entry, optional
//! opening-hours warning and score contribution. Both optimizers maximize the
//! resulting score.

use std::fmt;
use std::sync::Arc;

use crate::optimizer::DayPlan;
use crate::point::Point;
use crate::schedule::{TimeStatus, TimeWarning, TimelineEntry, format_clock, score_arrival, warning_for};

/// Score per priority point.
pub const PRIORITY_WEIGHT: f64 = 1000.0;
/// Score subtracted per meter travelled.
pub const DISTANCE_WEIGHT: f64 = 0.01;
/// Bonus commonly granted to must-include places.
pub const DEFAULT_MUST_INCLUDE_BONUS: f64 = 3000.0;

/// Caller-supplied bonus for places that should not be left out.
pub type MustIncludeBonus = Arc<dyn Fn(&Point) -> f64 + Send + Sync>;

/// Caller-tunable scoring rules.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use itinerary_core::{Point, ScoringPolicy};
///
/// let policy = ScoringPolicy::name_contains(["cathedral"], 3000.0);
/// let church = Point::new("c", "Notre Dame Cathedral", Coord { x: 0.0, y: 0.0 });
/// let cafe = Point::new("k", "Corner Cafe", Coord { x: 0.0, y: 0.0 });
/// assert_eq!(policy.bonus_for(&church), 3000.0);
/// assert_eq!(policy.bonus_for(&cafe), 0.0);
/// ```
#[derive(Clone, Default)]
pub struct ScoringPolicy {
    must_include: Option<MustIncludeBonus>,
}

impl fmt::Debug for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringPolicy")
            .field("must_include", &self.must_include.is_some())
            .finish()
    }
}

impl ScoringPolicy {
    /// A policy granting no extra bonus.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A policy using `bonus` for every non-anchor point.
    #[must_use]
    pub fn with_bonus<F>(bonus: F) -> Self
    where
        F: Fn(&Point) -> f64 + Send + Sync + 'static,
    {
        Self {
            must_include: Some(Arc::new(bonus)),
        }
    }

    /// Grant `bonus` to points whose name contains any of `needles`,
    /// ignoring case.
    #[must_use]
    pub fn name_contains<I, S>(needles: I, bonus: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let needles: Vec<String> = needles
            .into_iter()
            .map(|needle| needle.as_ref().to_lowercase())
            .filter(|needle| !needle.is_empty())
            .collect();
        if needles.is_empty() {
            return Self::none();
        }
        Self::with_bonus(move |point: &Point| {
            let name = point.name.to_lowercase();
            if needles.iter().any(|needle| name.contains(needle.as_str())) {
                bonus
            } else {
                0.0
            }
        })
    }

    /// Bonus for visiting `point`; anchors never earn one.
    #[must_use]
    pub fn bonus_for(&self, point: &Point) -> f64 {
        match &self.must_include {
            Some(bonus) if !point.is_anchor() => bonus(point),
            _ => 0.0,
        }
    }
}

/// Score and schedule of a single route.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    /// Fitness score; higher is better.
    pub score: f64,
    /// Travel distance in meters, including any implicit return leg.
    pub total_distance: f64,
    /// Travel plus visit time in seconds, including any implicit return leg.
    pub total_duration: f64,
    /// Opening-hours violations in visiting order.
    pub time_warnings: Vec<TimeWarning>,
    /// One entry per stop.
    pub timeline: Vec<TimelineEntry>,
}

/// Scores routes over a [`DayPlan`].
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator<'a> {
    plan: &'a DayPlan,
}

struct Walk<'p> {
    clock: f64,
    previous: Option<usize>,
    evaluation: Evaluation,
    points: &'p [Point],
}

impl Walk<'_> {
    fn travel_to(&mut self, plan: &DayPlan, index: usize) {
        let Some(previous) = self.previous else {
            return;
        };
        let distance = plan.matrix.distance(previous, index).unwrap_or(0.0);
        let duration = plan.matrix.duration(previous, index).unwrap_or(0.0);
        self.clock += duration / 60.0;
        self.evaluation.total_distance += distance;
        self.evaluation.total_duration += duration;
    }

    fn record(&mut self, name: String, arrival: f64, departure: f64, visit_minutes: u32, status: TimeStatus) {
        self.evaluation.timeline.push(TimelineEntry {
            name,
            arrival_time: format_clock(arrival),
            departure_time: format_clock(departure),
            visit_duration: visit_minutes,
            status,
        });
    }

    fn return_label(&self) -> String {
        let name = self.points.first().map_or("", |anchor| anchor.name.as_str());
        format!("Return to {name}")
    }
}

impl<'a> RouteEvaluator<'a> {
    /// Create an evaluator for `plan`.
    #[must_use]
    pub const fn new(plan: &'a DayPlan) -> Self {
        Self { plan }
    }

    /// Score `route`.
    ///
    /// Every stop, anchors included, earns its priority and availability
    /// score; anchors never earn the must-include bonus. A terminal anchor
    /// stop is labelled `Return to <anchor>`. When the plan has an anchor and the
    /// route does not end there, a return leg is added to the totals and the
    /// timeline. Indices outside the point list are skipped.
    #[must_use]
    pub fn evaluate(&self, route: &[usize]) -> Evaluation {
        let plan = self.plan;
        let mut walk = Walk {
            clock: f64::from(plan.start_minutes),
            previous: None,
            evaluation: Evaluation::default(),
            points: &plan.points,
        };
        let last_position = route.len().saturating_sub(1);

        for (position, &index) in route.iter().enumerate() {
            let Some(point) = plan.points.get(index) else {
                log::warn!("skipping route index {index} outside {} points", plan.points.len());
                continue;
            };
            walk.travel_to(plan, index);
            walk.previous = Some(index);
            let arrival = walk.clock;

            let assessment = score_arrival(point, arrival, plan.day_of_week);
            if let Some(warning) = warning_for(point, &assessment) {
                walk.evaluation.time_warnings.push(warning);
            }
            let name = if point.is_anchor() && position > 0 && position == last_position {
                walk.return_label()
            } else {
                point.name.clone()
            };
            let departure = assessment.departure_minutes(point.visit_minutes);
            walk.record(name, arrival, departure, point.visit_minutes, assessment.status);
            walk.clock = departure;
            walk.evaluation.total_duration += f64::from(point.visit_minutes) * 60.0;
            walk.evaluation.score += assessment.net()
                + f64::from(point.priority) * PRIORITY_WEIGHT
                + plan.policy.bonus_for(point);
        }

        if plan.has_anchor() && walk.previous.is_some_and(|last| last != 0) {
            walk.travel_to(plan, 0);
            let arrival = walk.clock;
            let label = walk.return_label();
            walk.record(label, arrival, arrival, 0, TimeStatus::Ok);
        }

        let mut evaluation = walk.evaluation;
        evaluation.score -= evaluation.total_distance * DISTANCE_WEIGHT;
        evaluation
    }

    /// Score of `route`.
    #[must_use]
    pub fn score(&self, route: &[usize]) -> f64 {
        self.evaluate(route).score
    }
}
