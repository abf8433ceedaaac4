//! Simulated annealing over swap neighbourhoods.
//!
//! The search starts from the identity order, proposes swaps of two interior
//! stops and accepts worse routes with probability `exp(delta / T)`. The
//! temperature cools geometrically until it reaches the stopping
//! temperature, the iteration cap is hit, the deadline passes or the
//! [`CancellationToken`] fires. The best route seen is returned.

use std::time::{Duration, Instant};

use itinerary_core::{
    Algorithm, DayPlan, Diagnostics, OptimizationResult, RouteEvaluator, RouteOptimizer,
    Termination,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::cancellation::CancellationToken;

/// Errors from [`AnnealingParams::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnealingParamsError {
    /// A parameter was NaN or infinite.
    #[error("{name} must be finite")]
    NonFinite {
        /// Name of the offending parameter.
        name: &'static str,
    },
    /// The stopping temperature was not strictly between zero and the
    /// initial temperature.
    #[error("stopping temperature {stopping} must be positive and below the initial temperature {initial}")]
    Temperatures {
        /// Configured initial temperature.
        initial: f64,
        /// Configured stopping temperature.
        stopping: f64,
    },
    /// The cooling rate was not strictly between zero and one.
    #[error("cooling rate {0} must lie strictly between 0 and 1")]
    CoolingRate(f64),
    /// The iteration cap was zero.
    #[error("max_iterations must be positive")]
    ZeroIterations,
}

/// Tuning for [`AnnealingOptimizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingParams {
    /// Starting temperature.
    pub initial_temperature: f64,
    /// Multiplier applied to the temperature after every iteration.
    pub cooling_rate: f64,
    /// Temperature at which the search completes.
    pub stopping_temperature: f64,
    /// Upper bound on iterations regardless of temperature.
    pub max_iterations: u64,
    /// Seed for reproducible runs; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Wall-clock budget for the search.
    pub time_limit: Option<Duration>,
    /// Record the best score after every iteration.
    pub record_history: bool,
}

impl Default for AnnealingParams {
    fn default() -> Self {
        Self {
            initial_temperature: 10_000.0,
            cooling_rate: 0.995,
            stopping_temperature: 0.1,
            max_iterations: 100_000,
            seed: None,
            time_limit: None,
            record_history: false,
        }
    }
}

impl AnnealingParams {
    /// Set the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the wall-clock budget.
    #[must_use]
    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Set the iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the temperature schedule.
    #[must_use]
    pub const fn with_schedule(mut self, initial: f64, cooling_rate: f64, stopping: f64) -> Self {
        self.initial_temperature = initial;
        self.cooling_rate = cooling_rate;
        self.stopping_temperature = stopping;
        self
    }

    /// Record best-score history in the result diagnostics.
    #[must_use]
    pub const fn with_history(mut self) -> Self {
        self.record_history = true;
        self
    }

    /// Check the schedule is well formed.
    ///
    /// # Errors
    /// Returns an [`AnnealingParamsError`] describing the first invalid
    /// parameter.
    ///
    /// # Examples
    /// ```
    /// use itinerary_solver::{AnnealingParams, AnnealingParamsError};
    ///
    /// assert!(AnnealingParams::default().validate().is_ok());
    /// let hot = AnnealingParams::default().with_schedule(10.0, 1.0, 0.1);
    /// assert_eq!(hot.validate(), Err(AnnealingParamsError::CoolingRate(1.0)));
    /// ```
    pub fn validate(&self) -> Result<(), AnnealingParamsError> {
        for (name, value) in [
            ("initial_temperature", self.initial_temperature),
            ("cooling_rate", self.cooling_rate),
            ("stopping_temperature", self.stopping_temperature),
        ] {
            if !value.is_finite() {
                return Err(AnnealingParamsError::NonFinite { name });
            }
        }
        if self.stopping_temperature <= 0.0 || self.stopping_temperature >= self.initial_temperature
        {
            return Err(AnnealingParamsError::Temperatures {
                initial: self.initial_temperature,
                stopping: self.stopping_temperature,
            });
        }
        if self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(AnnealingParamsError::CoolingRate(self.cooling_rate));
        }
        if self.max_iterations == 0 {
            return Err(AnnealingParamsError::ZeroIterations);
        }
        Ok(())
    }
}

/// Simulated annealing optimizer.
///
/// # Examples
/// ```
/// use itinerary_core::test_support::{sample_points, uniform_plan};
/// use itinerary_core::{Leg, RouteOptimizer, Termination};
/// use itinerary_solver::{AnnealingOptimizer, AnnealingParams};
///
/// let plan = uniform_plan(sample_points(4), Leg::new(1000.0, 300.0));
/// let optimizer = AnnealingOptimizer::new(AnnealingParams::default().with_seed(7))?;
/// let result = optimizer.optimize(&plan);
/// assert_eq!(result.visited_points_count, 4);
/// assert_eq!(result.diagnostics.termination, Termination::Completed);
/// # Ok::<(), itinerary_solver::AnnealingParamsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AnnealingOptimizer {
    params: AnnealingParams,
    cancellation: CancellationToken,
}

impl AnnealingOptimizer {
    /// Create an optimizer after validating `params`.
    ///
    /// # Errors
    /// Returns [`AnnealingParamsError`] when the schedule is invalid.
    pub fn new(params: AnnealingParams) -> Result<Self, AnnealingParamsError> {
        params.validate()?;
        Ok(Self {
            params,
            cancellation: CancellationToken::new(),
        })
    }

    /// Observe `token` instead of a private one.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Token that stops this optimizer when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Parameters in use.
    #[must_use]
    pub const fn params(&self) -> &AnnealingParams {
        &self.params
    }

    fn rng(&self) -> ChaCha8Rng {
        self.params
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
    }

    fn stop_reason(&self, iterations: u64, temperature: f64, started_at: Instant) -> Option<Termination> {
        if temperature <= self.params.stopping_temperature {
            return Some(Termination::Completed);
        }
        if iterations >= self.params.max_iterations {
            return Some(Termination::IterationLimitReached);
        }
        let expired = self
            .params
            .time_limit
            .is_some_and(|limit| started_at.elapsed() >= limit);
        if expired || self.cancellation.is_cancelled() {
            return Some(Termination::Cancelled);
        }
        None
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "annealing compares score deltas against a cooling temperature"
    )]
    fn anneal(&self, evaluator: &RouteEvaluator<'_>, initial: Vec<usize>, interior: (usize, usize)) -> Search {
        let started_at = Instant::now();
        let mut rng = self.rng();
        let mut current = initial;
        let mut current_score = evaluator.score(&current);
        let mut search = Search {
            best: current.clone(),
            best_score: current_score,
            iterations: 0,
            termination: Termination::Completed,
            history: Vec::new(),
        };
        let mut temperature = self.params.initial_temperature;

        let (low, high) = interior;
        loop {
            if let Some(reason) = self.stop_reason(search.iterations, temperature, started_at) {
                search.termination = reason;
                break;
            }

            let mut candidate = current.clone();
            if high > low {
                let first = rng.gen_range(low..high);
                let second = rng.gen_range(low..high);
                candidate.swap(first, second);
            }
            let candidate_score = evaluator.score(&candidate);
            let delta = candidate_score - current_score;
            if delta > 0.0 || rng.r#gen::<f64>() < (delta / temperature).exp() {
                current = candidate;
                current_score = candidate_score;
                if current_score > search.best_score {
                    search.best.clone_from(&current);
                    search.best_score = current_score;
                }
            }
            if self.params.record_history {
                search.history.push(search.best_score);
            }

            temperature *= self.params.cooling_rate;
            search.iterations += 1;
        }
        search
    }
}

struct Search {
    best: Vec<usize>,
    best_score: f64,
    iterations: u64,
    termination: Termination,
    history: Vec<f64>,
}

/// Identity order and the half-open range of swappable positions.
fn initial_route(plan: &DayPlan) -> (Vec<usize>, (usize, usize)) {
    let size = plan.points.len();
    let mut route: Vec<usize> = (0..size).collect();
    if plan.has_anchor() && size > 1 {
        route.push(0);
        (route, (1, size))
    } else {
        (route, (0, size))
    }
}

impl RouteOptimizer for AnnealingOptimizer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Annealing
    }

    fn optimize(&self, plan: &DayPlan) -> OptimizationResult {
        let started_at = Instant::now();
        let (initial, interior) = initial_route(plan);
        let search = self.anneal(&plan.evaluator(), initial, interior);
        log::debug!(
            "annealing stopped after {} iterations ({:?}), best score {}",
            search.iterations,
            search.termination,
            search.best_score
        );

        let diagnostics = Diagnostics {
            termination: search.termination,
            iterations: search.iterations,
            best_score_history: search.history,
            ..Diagnostics::default()
        };
        OptimizationResult::from_route(
            plan,
            &search.best,
            self.algorithm(),
            diagnostics,
            started_at.elapsed(),
        )
    }
}
