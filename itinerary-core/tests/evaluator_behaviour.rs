//! Behavioural tests for opening-hours scoring in the route evaluator.

use std::cell::RefCell;

use geo::Coord;
use itinerary_core::test_support::{uniform_plan, windowed_point};
use itinerary_core::{Evaluation, Leg, Point, TimeStatus};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const MONDAY: u8 = 1;

#[derive(Debug, Default)]
struct EvaluationWorld {
    point: RefCell<Option<Point>>,
    evaluation: RefCell<Option<Evaluation>>,
}

#[fixture]
fn world() -> EvaluationWorld {
    EvaluationWorld::default()
}

fn evaluation(world: &EvaluationWorld) -> Evaluation {
    world
        .evaluation
        .borrow()
        .clone()
        .expect("route should be evaluated")
}

fn first_status(world: &EvaluationWorld) -> TimeStatus {
    evaluation(world)
        .timeline
        .first()
        .map(|entry| entry.status)
        .expect("timeline entry")
}

#[given("a place open from 09:00 to 17:00 with a 30 minute visit")]
fn given_windowed_place(world: &EvaluationWorld) {
    let point = windowed_point("bakery", Coord { x: 0.0, y: 0.0 }, MONDAY, 9 * 60, 17 * 60)
        .with_visit_minutes(30);
    world.point.replace(Some(point));
}

#[given("a place without opening hours")]
fn given_open_place(world: &EvaluationWorld) {
    let point = Point::new("park", "Park", Coord { x: 0.0, y: 0.0 }).with_visit_minutes(30);
    world.point.replace(Some(point));
}

#[when("the route is evaluated starting at 08:30")]
fn when_evaluated(world: &EvaluationWorld) {
    let point = world.point.take().expect("point should be given");
    let plan = uniform_plan(vec![point], Leg::ZERO)
        .with_start_minutes(8 * 60 + 30)
        .with_day_of_week(MONDAY);
    world.evaluation.replace(Some(plan.evaluator().evaluate(&[0])));
}

#[then("the stop waits for opening")]
fn then_waits(world: &EvaluationWorld) {
    assert_eq!(first_status(world), TimeStatus::WaitForOpening);
    let evaluated = evaluation(world);
    let warning = evaluated.time_warnings.first().expect("wait warning");
    assert_eq!(warning.wait_time, Some(30.0));
}

#[then("the wait penalty is 15")]
fn then_wait_penalty(world: &EvaluationWorld) {
    // Priority 3 earns 3000; the wait costs 0.5 per minute.
    assert!((evaluation(world).score - (3000.0 - 15.0)).abs() < 1e-9);
}

#[then("the visit starts at 09:00")]
fn then_visit_starts(world: &EvaluationWorld) {
    let evaluated = evaluation(world);
    let entry = evaluated.timeline.first().expect("timeline entry");
    assert_eq!(entry.arrival_time, "08:30");
    assert_eq!(entry.departure_time, "09:30");
}

#[then("the stop is on time")]
fn then_on_time(world: &EvaluationWorld) {
    assert_eq!(first_status(world), TimeStatus::Ok);
    assert!(evaluation(world).time_warnings.is_empty());
}

#[then("the availability bonus is applied")]
fn then_bonus(world: &EvaluationWorld) {
    assert!((evaluation(world).score - 3200.0).abs() < 1e-9);
}

#[scenario(path = "tests/features/evaluator.feature", index = 0)]
fn early_arrival_waits(world: EvaluationWorld) {
    drop(world);
}

#[scenario(path = "tests/features/evaluator.feature", index = 1)]
fn always_open_bonus(world: EvaluationWorld) {
    drop(world);
}
