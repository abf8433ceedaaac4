//! Shared test harness modules for the itinerary CLI.

use super::*;

mod helpers;
mod optimize_unit;
