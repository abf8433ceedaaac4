//! Command-line interface for optimizing a day's itinerary.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod optimize;

pub use error::CliError;
use optimize::{OptimizeArgs, run_optimize};

pub(crate) const ARG_REQUEST: &str = "request";
pub(crate) const ARG_ALGORITHM: &str = "algorithm";
pub(crate) const ARG_START_TIME: &str = "start-time";
pub(crate) const ARG_DAY_OF_WEEK: &str = "day-of-week";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_TIME_LIMIT_MS: &str = "time-limit-ms";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_OSRM_PROFILE: &str = "osrm-profile";
pub(crate) const ARG_MUST_INCLUDE: &str = "must-include";
pub(crate) const ARG_MUST_INCLUDE_BONUS: &str = "must-include-bonus";
pub(crate) const ARG_MAX_CONCURRENCY: &str = "max-concurrency";
pub(crate) const ENV_REQUEST: &str = "ITINERARY_CMDS_OPTIMIZE_REQUEST_PATH";

/// Run the itinerary CLI with the current process arguments and environment.
///
/// # Errors
/// Returns a [`CliError`] when arguments, configuration, the request file or
/// the optimization itself fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Optimize(args) => run_optimize(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "itinerary",
    about = "Order a day's places into a route that respects opening hours",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Optimize the visiting order of a JSON day request.
    Optimize(OptimizeArgs),
}

#[cfg(test)]
mod tests;
