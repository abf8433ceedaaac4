//! Compute the distance and travel time of a single leg between two points.
//!
//! The [`LegProvider`] trait abstracts the external routing collaborator.
//! Callers supply two coordinates and receive a [`Leg`] holding the distance in
//! meters and the estimated duration in seconds. The matrix builder calls the
//! provider once per ordered pair of points.

mod error;
mod provider;

pub use error::TravelTimeError;
pub use provider::{Leg, LegProvider};
