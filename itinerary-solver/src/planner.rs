//! From raw itinerary entries to an optimized day.

use itinerary_core::{
    Algorithm, AnchorOffset, DEFAULT_DAY_OF_WEEK, DEFAULT_START_MINUTES, DayPlan,
    HaversineProvider, LegProvider, MatrixBuilder, OptimizationResult, OptimizeError, RawAnchor,
    RawPlace, RouteOptimizer, ScoringPolicy, matrix::DEFAULT_MAX_CONCURRENCY, normalize,
};

use crate::annealing::{AnnealingOptimizer, AnnealingParams};
use crate::cancellation::CancellationToken;
use crate::greedy::GreedyOptimizer;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Configuration for [`DayPlanner`].
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlannerConfig {
    /// Upper bound on concurrent provider calls while building the matrix.
    pub max_concurrency: usize,
    /// Offset used when a virtual anchor is synthesized.
    pub anchor_offset: AnchorOffset,
    /// Simulated annealing tuning.
    pub annealing: AnnealingParams,
}

impl Default for DayPlannerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            anchor_offset: AnchorOffset::Random,
            annealing: AnnealingParams::default(),
        }
    }
}

/// Per-call options for [`DayPlanner::plan_day`].
#[derive(Debug, Clone)]
pub struct DayRequest {
    /// Optimizer to run.
    pub algorithm: Algorithm,
    /// Start of the day in minutes since midnight.
    pub start_minutes: u32,
    /// Day of week, `0 = Sunday`.
    pub day_of_week: u8,
    /// Caller scoring rules.
    pub policy: ScoringPolicy,
    /// Token that stops this request's annealing run; `None` runs to
    /// completion.
    pub cancellation: Option<CancellationToken>,
}

impl Default for DayRequest {
    fn default() -> Self {
        Self::new(Algorithm::default())
    }
}

impl DayRequest {
    /// A request for `algorithm` starting at 08:00 on Monday.
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            start_minutes: DEFAULT_START_MINUTES,
            day_of_week: DEFAULT_DAY_OF_WEEK,
            policy: ScoringPolicy::none(),
            cancellation: None,
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

    /// Let `token` cancel the annealing run for this request only.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn validate(&self) -> Result<(), OptimizeError> {
        if self.day_of_week > 6 {
            return Err(OptimizeError::InvalidRequest {
                reason: format!("day of week {} is outside 0..=6", self.day_of_week),
            });
        }
        if self.start_minutes >= MINUTES_PER_DAY {
            return Err(OptimizeError::InvalidRequest {
                reason: format!("start time {} is not within one day", self.start_minutes),
            });
        }
        Ok(())
    }
}

/// Plans a day over a [`LegProvider`].
///
/// # Examples
/// ```
/// use itinerary_core::test_support::UnitLegProvider;
/// use itinerary_core::{Algorithm, RawAnchor, RawPlace};
/// use itinerary_solver::{DayPlanner, DayRequest};
///
/// let places: Vec<RawPlace> = (0..3)
///     .map(|i| RawPlace {
///         id: format!("p{i}"),
///         name: format!("Place {i}"),
///         coordinates: Some(vec![106.70 + f64::from(i) * 0.01, 10.77]),
///         ..RawPlace::default()
///     })
///     .collect();
/// let hotel = RawAnchor { name: Some("Hotel".into()), coordinates: Some(vec![106.69, 10.77]) };
///
/// let planner = DayPlanner::new(UnitLegProvider);
/// let result = planner.plan_day(&places, Some(&hotel), &DayRequest::new(Algorithm::Greedy))?;
/// assert_eq!(result.visited_points_count, 3);
/// assert_eq!(result.route.first().map(String::as_str), Some("Hotel"));
/// # Ok::<(), itinerary_core::OptimizeError>(())
/// ```
#[derive(Debug)]
pub struct DayPlanner<P: LegProvider> {
    provider: P,
    config: DayPlannerConfig,
}

impl<P: LegProvider> DayPlanner<P> {
    /// Construct a planner using default configuration.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, DayPlannerConfig::default())
    }

    /// Construct a planner with explicit configuration.
    #[must_use]
    pub fn with_config(provider: P, config: DayPlannerConfig) -> Self {
        Self { provider, config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &DayPlannerConfig {
        &self.config
    }

    fn optimizer(&self, request: &DayRequest) -> Result<Box<dyn RouteOptimizer>, OptimizeError> {
        Ok(match request.algorithm {
            Algorithm::Greedy => Box::new(GreedyOptimizer),
            Algorithm::Annealing => {
                let optimizer = AnnealingOptimizer::new(self.config.annealing.clone()).map_err(
                    |err| OptimizeError::InvalidRequest {
                        reason: err.to_string(),
                    },
                )?;
                match &request.cancellation {
                    Some(token) => Box::new(optimizer.with_cancellation(token.clone())),
                    None => Box::new(optimizer),
                }
            }
        })
    }

    /// Normalize `places`, build the matrix and run the requested optimizer.
    ///
    /// # Errors
    /// - [`OptimizeError::InvalidRequest`] for an out-of-range day or start
    ///   time, or invalid annealing parameters.
    /// - [`OptimizeError::NoPointsFound`] when no place has usable
    ///   coordinates.
    /// - [`OptimizeError::InsufficientPoints`] when only one does.
    /// - [`OptimizeError::Provider`] when the leg provider fails.
    pub fn plan_day(
        &self,
        places: &[RawPlace],
        anchor: Option<&RawAnchor>,
        request: &DayRequest,
    ) -> Result<OptimizationResult, OptimizeError> {
        request.validate()?;
        let optimizer = self.optimizer(request)?;

        let normalized = normalize(places, anchor);
        match normalized.place_count() {
            0 => return Err(OptimizeError::NoPointsFound),
            1 => return Err(OptimizeError::InsufficientPoints { usable: 1 }),
            _ => {}
        }

        let anchored = MatrixBuilder::new(self.config.max_concurrency).build_anchored(
            normalized.points,
            &self.config.anchor_offset,
            &self.provider,
        )?;
        let plan = DayPlan::new(anchored.points, anchored.matrix)
            .with_start_minutes(request.start_minutes)
            .with_day_of_week(request.day_of_week)
            .with_policy(request.policy.clone());

        let mut result = optimizer.optimize(&plan);
        result.diagnostics.dropped_points = normalized.dropped;
        result.diagnostics.virtual_anchor = anchored.virtual_anchor;
        log::debug!(
            "{} planned {} stops with score {}",
            result.algorithm,
            result.visited_points_count,
            result.total_score
        );
        Ok(result)
    }
}

/// Plan a day with the Haversine provider and default configuration.
///
/// # Errors
/// See [`DayPlanner::plan_day`].
pub fn optimize_day(
    places: &[RawPlace],
    anchor: Option<&RawAnchor>,
    start_minutes: u32,
    day_of_week: u8,
    algorithm: Algorithm,
) -> Result<OptimizationResult, OptimizeError> {
    let request = DayRequest::new(algorithm)
        .with_start_minutes(start_minutes)
        .with_day_of_week(day_of_week);
    DayPlanner::new(HaversineProvider::default()).plan_day(places, anchor, &request)
}
