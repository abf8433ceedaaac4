//! Proptest strategies for itinerary-core property tests.

use geo::Coord;
use itinerary_core::{OpeningPeriod, Point};
use proptest::prelude::*;

/// Strategy for a WGS84 coordinate inside a city-sized box.
pub fn coord_strategy() -> impl Strategy<Value = Coord<f64>> {
    (106.6_f64..106.8_f64, 10.7_f64..10.9_f64).prop_map(|(x, y)| Coord { x, y })
}

/// Strategy for an optional single opening window on Monday.
fn periods_strategy() -> impl Strategy<Value = Vec<OpeningPeriod>> {
    prop_oneof![
        Just(Vec::new()),
        (6_u32..12_u32, 13_u32..22_u32)
            .prop_map(|(open, close)| vec![OpeningPeriod::new(1, open * 60, close * 60)]),
    ]
}

/// Strategy for between `min` and `max` points with unique identifiers.
pub fn point_set_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Point>> {
    proptest::collection::vec(
        (coord_strategy(), 0_u32..120_u32, 1_i32..=5_i32, periods_strategy()),
        min..=max,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (location, visit, priority, periods))| {
                Point::new(format!("p{index}"), format!("Place {index}"), location)
                    .with_visit_minutes(visit)
                    .with_priority(priority)
                    .with_opening_periods(periods)
            })
            .collect()
    })
}
