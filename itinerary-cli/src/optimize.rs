//! Optimize command implementation for the itinerary CLI.

use std::io::{BufReader, Write};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use itinerary_core::matrix::DEFAULT_MAX_CONCURRENCY;
use itinerary_core::{
    Algorithm, AnchorOffset, DEFAULT_DAY_OF_WEEK, DEFAULT_MUST_INCLUDE_BONUS,
    DEFAULT_START_MINUTES, HaversineProvider, LegProvider, OptimizationResult,
    ParseAlgorithmError, RawAnchor, RawClock, RawPlace, ScoringPolicy,
};
use itinerary_routing::{DEFAULT_PROFILE, OsrmLegProvider, OsrmLegProviderConfig};
use itinerary_solver::{AnnealingParams, DayPlanner, DayPlannerConfig, DayRequest};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_ALGORITHM, ARG_DAY_OF_WEEK, ARG_MAX_CONCURRENCY, ARG_MUST_INCLUDE,
    ARG_MUST_INCLUDE_BONUS, ARG_OSRM_BASE_URL, ARG_OSRM_PROFILE, ARG_REQUEST, ARG_SEED,
    ARG_START_TIME, ARG_TIME_LIMIT_MS, CliError, ENV_REQUEST,
};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Optimize the visiting order of a day's places. The request \
                 is a JSON file holding `places` and an optional `anchor`. \
                 Legs come from an OSRM instance when a base URL is set and \
                 from great-circle estimates otherwise.",
    about = "Optimize a day itinerary"
)]
#[ortho_config(prefix = "ITINERARY")]
pub(crate) struct OptimizeArgs {
    /// Path to a JSON file containing the day's places.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Optimizer to run: `sa` or `greedy`.
    #[arg(long = ARG_ALGORITHM, value_name = "name")]
    #[serde(default)]
    pub(crate) algorithm: Option<String>,
    /// Start of the day as `HH:MM`.
    #[arg(long = ARG_START_TIME, value_name = "time")]
    #[serde(default)]
    pub(crate) start_time: Option<String>,
    /// Day of week, 0 = Sunday.
    #[arg(long = ARG_DAY_OF_WEEK, value_name = "day")]
    #[serde(default)]
    pub(crate) day_of_week: Option<u8>,
    /// Seed for reproducible annealing and anchor placement.
    #[arg(long = ARG_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Wall-clock budget for annealing in milliseconds.
    #[arg(long = ARG_TIME_LIMIT_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) time_limit_ms: Option<u64>,
    /// Base URL for an OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// OSRM routing profile.
    #[arg(long = ARG_OSRM_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) osrm_profile: Option<String>,
    /// Comma-separated name fragments that earn the must-include bonus.
    #[arg(long = ARG_MUST_INCLUDE, value_name = "names")]
    #[serde(default)]
    pub(crate) must_include: Option<String>,
    /// Bonus granted to must-include places.
    #[arg(long = ARG_MUST_INCLUDE_BONUS, value_name = "points")]
    #[serde(default)]
    pub(crate) must_include_bonus: Option<f64>,
    /// Upper bound on concurrent leg requests.
    #[arg(long = ARG_MAX_CONCURRENCY, value_name = "n")]
    #[serde(default)]
    pub(crate) max_concurrency: Option<usize>,
}

impl OptimizeArgs {
    pub(crate) fn into_config(self) -> Result<OptimizeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OptimizeConfig::try_from(merged)
    }
}

/// Resolved `optimize` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OptimizeConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) algorithm: Algorithm,
    pub(crate) start_minutes: u32,
    pub(crate) day_of_week: u8,
    pub(crate) seed: Option<u64>,
    pub(crate) time_limit: Option<Duration>,
    pub(crate) osrm_base_url: Option<String>,
    pub(crate) osrm_profile: String,
    pub(crate) must_include: Vec<String>,
    pub(crate) must_include_bonus: f64,
    pub(crate) max_concurrency: usize,
}

impl OptimizeConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match file_is_file(&self.request_path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field: ARG_REQUEST,
                path: self.request_path.clone(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field: ARG_REQUEST,
                    path: self.request_path.clone(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_REQUEST,
                path: self.request_path.clone(),
                source,
            }),
        }
    }

    fn policy(&self) -> ScoringPolicy {
        ScoringPolicy::name_contains(&self.must_include, self.must_include_bonus)
    }

    pub(crate) fn planner_config(&self) -> Result<DayPlannerConfig, CliError> {
        let mut annealing = AnnealingParams::default();
        if let Some(seed) = self.seed {
            annealing = annealing.with_seed(seed);
        }
        if let Some(limit) = self.time_limit {
            annealing = annealing.with_time_limit(limit);
        }
        annealing.validate()?;
        Ok(DayPlannerConfig {
            max_concurrency: self.max_concurrency,
            anchor_offset: self.seed.map_or(AnchorOffset::Random, AnchorOffset::Seeded),
            annealing,
        })
    }

    fn day_request(&self) -> DayRequest {
        DayRequest::new(self.algorithm)
            .with_start_minutes(self.start_minutes)
            .with_day_of_week(self.day_of_week)
            .with_policy(self.policy())
    }
}

fn parse_algorithm(value: Option<String>) -> Result<Algorithm, CliError> {
    value.map_or(Ok(Algorithm::default()), |name| {
        name.parse().map_err(|err: ParseAlgorithmError| CliError::InvalidArgument {
            field: ARG_ALGORITHM,
            reason: err.to_string(),
        })
    })
}

fn parse_start_time(value: Option<String>) -> Result<u32, CliError> {
    let Some(text) = value else {
        return Ok(DEFAULT_START_MINUTES);
    };
    RawClock::Text(text.clone())
        .to_minutes()
        .filter(|minutes| *minutes < MINUTES_PER_DAY)
        .ok_or_else(|| CliError::InvalidArgument {
            field: ARG_START_TIME,
            reason: format!("`{text}` is not a time of day such as 08:30"),
        })
}

fn parse_day_of_week(value: Option<u8>) -> Result<u8, CliError> {
    match value {
        None => Ok(DEFAULT_DAY_OF_WEEK),
        Some(day) if day <= 6 => Ok(day),
        Some(day) => Err(CliError::InvalidArgument {
            field: ARG_DAY_OF_WEEK,
            reason: format!("{day} is outside 0 (Sunday) to 6 (Saturday)"),
        }),
    }
}

fn parse_bonus(value: Option<f64>) -> Result<f64, CliError> {
    match value {
        None => Ok(DEFAULT_MUST_INCLUDE_BONUS),
        Some(bonus) if bonus.is_finite() => Ok(bonus),
        Some(bonus) => Err(CliError::InvalidArgument {
            field: ARG_MUST_INCLUDE_BONUS,
            reason: format!("{bonus} is not a finite number"),
        }),
    }
}

fn split_names(value: Option<String>) -> Vec<String> {
    value
        .map(|names| {
            names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

impl TryFrom<OptimizeArgs> for OptimizeConfig {
    type Error = CliError;

    fn try_from(args: OptimizeArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_REQUEST,
        })?;
        let max_concurrency = match args.max_concurrency {
            Some(0) => {
                return Err(CliError::InvalidArgument {
                    field: ARG_MAX_CONCURRENCY,
                    reason: "must be at least 1".to_owned(),
                });
            }
            Some(limit) => limit,
            None => DEFAULT_MAX_CONCURRENCY,
        };
        let osrm_profile = args.osrm_profile.unwrap_or_else(|| DEFAULT_PROFILE.to_owned());
        if osrm_profile.trim().is_empty() {
            return Err(CliError::InvalidArgument {
                field: ARG_OSRM_PROFILE,
                reason: "must not be empty".to_owned(),
            });
        }

        Ok(Self {
            request_path,
            algorithm: parse_algorithm(args.algorithm)?,
            start_minutes: parse_start_time(args.start_time)?,
            day_of_week: parse_day_of_week(args.day_of_week)?,
            seed: args.seed,
            time_limit: args.time_limit_ms.map(Duration::from_millis),
            osrm_base_url: args.osrm_base_url,
            osrm_profile,
            must_include: split_names(args.must_include),
            must_include_bonus: parse_bonus(args.must_include_bonus)?,
            max_concurrency,
        })
    }
}

/// The JSON document read by the `optimize` command.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct DayRequestFile {
    /// Places to order.
    pub(crate) places: Vec<RawPlace>,
    /// Optional start and end of the day.
    pub(crate) anchor: Option<RawAnchor>,
}

/// Builds the leg provider for the current invocation.
pub(crate) trait LegProviderFactory {
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn LegProvider>, CliError>;
}

pub(crate) struct DefaultLegProviderFactory;

impl LegProviderFactory for DefaultLegProviderFactory {
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn LegProvider>, CliError> {
        let Some(base_url) = &config.osrm_base_url else {
            return Ok(Box::new(HaversineProvider::default()));
        };
        let provider_config =
            OsrmLegProviderConfig::new(base_url.clone()).with_profile(config.osrm_profile.clone());
        let provider = OsrmLegProvider::with_config(provider_config).map_err(|source| {
            CliError::BuildLegProvider {
                base_url: base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(provider))
    }
}

pub(crate) fn run_optimize(args: OptimizeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_optimize_with(args, &DefaultLegProviderFactory, &mut stdout)
}

pub(crate) fn run_optimize_with(
    args: OptimizeArgs,
    factory: &dyn LegProviderFactory,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let result = execute_optimize(args, factory)?;
    write_result(writer, &result)
}

fn execute_optimize(
    args: OptimizeArgs,
    factory: &dyn LegProviderFactory,
) -> Result<OptimizationResult, CliError> {
    let config = resolve_optimize_config(args)?;
    let request = load_day_request(&config.request_path)?;
    let provider = factory.build(&config)?;
    let planner = DayPlanner::with_config(provider, config.planner_config()?);
    planner
        .plan_day(&request.places, request.anchor.as_ref(), &config.day_request())
        .map_err(|source| CliError::Optimize { source })
}

fn resolve_optimize_config(args: OptimizeArgs) -> Result<OptimizeConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`DayRequestFile`] from disk.
pub(crate) fn load_day_request(path: &Utf8Path) -> Result<DayRequestFile, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseRequest {
        path: path.to_path_buf(),
        source,
    })
}

fn write_result(writer: &mut dyn Write, result: &OptimizationResult) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(result).map_err(CliError::SerializeResult)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<OptimizeConfig, CliError> {
    let merged = OptimizeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    OptimizeConfig::try_from(merged)
}
