//! Opening-hour assessment shared by the evaluator and the optimizers.
//!
//! [`score_arrival`] is the single place where arrival times are checked
//! against a point's opening periods and turned into a status, a penalty and
//! an availability bonus. Clock values are minutes since midnight as `f64`
//! because travel legs contribute fractional minutes.

use crate::point::Point;

/// Bonus for a point without opening-hour restrictions.
pub const ALWAYS_OPEN_BONUS: f64 = 200.0;
/// Penalty per minute spent waiting for a point to open.
pub const WAIT_PENALTY_PER_MINUTE: f64 = 0.5;
/// Flat penalty for arriving after closing time.
pub const AFTER_CLOSING_PENALTY: f64 = 1000.0;
/// Penalty per minute a visit runs past closing time.
pub const OVERTIME_PENALTY_PER_MINUTE: f64 = 0.8;
/// Overtime beyond this many minutes incurs [`LONG_OVERTIME_PENALTY`].
pub const LONG_OVERTIME_THRESHOLD_MINUTES: f64 = 60.0;
/// Extra flat penalty for long overtime.
pub const LONG_OVERTIME_PENALTY: f64 = 500.0;

/// Outcome of checking an arrival against opening hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TimeStatus {
    /// Open on arrival and for the whole visit, or unrestricted.
    Ok,
    /// Arrived before opening; the visit starts at opening time.
    WaitForOpening,
    /// Arrived after closing.
    AfterClosing,
    /// Arrived on time but the visit runs past closing.
    VisitExceedsClosing,
}

/// The opening window an arrival was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningWindow {
    /// Opening time in minutes since midnight.
    pub open_minutes: u32,
    /// Closing time in minutes since midnight.
    pub close_minutes: u32,
}

/// Result of [`score_arrival`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalAssessment {
    /// Time-window status.
    pub status: TimeStatus,
    /// Window used for the check, if the point had one for the day.
    pub window: Option<OpeningWindow>,
    /// Arrival time.
    pub arrival_minutes: f64,
    /// Time the visit starts, after any wait.
    pub start_minutes: f64,
    /// Minutes waited for opening.
    pub wait_minutes: f64,
    /// Minutes the visit runs past closing.
    pub overtime_minutes: f64,
    /// Non-negative amount to subtract from the score.
    pub penalty: f64,
    /// Non-negative amount to add to the score.
    pub bonus: f64,
}

impl ArrivalAssessment {
    /// Time the visit ends.
    #[must_use]
    pub fn departure_minutes(&self, visit_minutes: u32) -> f64 {
        self.start_minutes + f64::from(visit_minutes)
    }

    /// Net score contribution of the time window.
    #[must_use]
    pub fn net(&self) -> f64 {
        self.bonus - self.penalty
    }
}

fn window_for(point: &Point, day_of_week: u8, arrival: f64) -> Option<OpeningWindow> {
    let mut last = None;
    for period in point.periods_on(day_of_week) {
        let window = OpeningWindow {
            open_minutes: period.open_minutes,
            close_minutes: period.close_minutes,
        };
        if f64::from(period.close_minutes) >= arrival {
            return Some(window);
        }
        last = Some(window);
    }
    last
}

/// Check an arrival at `point` against its opening periods for `day_of_week`.
///
/// A point without periods is always open and earns [`ALWAYS_OPEN_BONUS`].
/// A point whose declared hours could not be read is `Ok` with neither bonus
/// nor penalty. A point with periods, none of which fall on the day, is closed all day:
/// the arrival is `AfterClosing` with no window. Otherwise the first window of
/// the day that has not closed by the arrival is used, falling back to the
/// day's last window.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use itinerary_core::{score_arrival, OpeningPeriod, Point, TimeStatus};
///
/// let museum = Point::new("m", "Museum", Coord { x: 0.0, y: 0.0 })
///     .with_visit_minutes(30)
///     .with_opening_periods(vec![OpeningPeriod::new(1, 9 * 60, 17 * 60)]);
/// let assessment = score_arrival(&museum, 8.0 * 60.0 + 30.0, 1);
/// assert_eq!(assessment.status, TimeStatus::WaitForOpening);
/// assert_eq!(assessment.wait_minutes, 30.0);
/// assert_eq!(assessment.penalty, 15.0);
/// assert_eq!(assessment.start_minutes, 540.0);
/// ```
#[must_use]
pub fn score_arrival(point: &Point, arrival_minutes: f64, day_of_week: u8) -> ArrivalAssessment {
    let mut assessment = ArrivalAssessment {
        status: TimeStatus::Ok,
        window: None,
        arrival_minutes,
        start_minutes: arrival_minutes,
        wait_minutes: 0.0,
        overtime_minutes: 0.0,
        penalty: 0.0,
        bonus: 0.0,
    };

    if point.is_always_open() {
        assessment.bonus = ALWAYS_OPEN_BONUS;
        return assessment;
    }
    if point.hours_unknown && point.opening_periods.is_empty() {
        return assessment;
    }

    let Some(window) = window_for(point, day_of_week, arrival_minutes) else {
        assessment.status = TimeStatus::AfterClosing;
        assessment.penalty = AFTER_CLOSING_PENALTY;
        return assessment;
    };
    assessment.window = Some(window);
    let open = f64::from(window.open_minutes);
    let close = f64::from(window.close_minutes);

    if arrival_minutes < open {
        assessment.status = TimeStatus::WaitForOpening;
        assessment.wait_minutes = open - arrival_minutes;
        assessment.start_minutes = open;
        assessment.penalty = WAIT_PENALTY_PER_MINUTE * assessment.wait_minutes;
    } else if arrival_minutes > close {
        assessment.status = TimeStatus::AfterClosing;
        assessment.penalty = AFTER_CLOSING_PENALTY;
    } else if arrival_minutes + f64::from(point.visit_minutes) > close {
        let overtime = arrival_minutes + f64::from(point.visit_minutes) - close;
        assessment.status = TimeStatus::VisitExceedsClosing;
        assessment.overtime_minutes = overtime;
        assessment.penalty = OVERTIME_PENALTY_PER_MINUTE * overtime;
        if overtime > LONG_OVERTIME_THRESHOLD_MINUTES {
            assessment.penalty += LONG_OVERTIME_PENALTY;
        }
    }

    assessment
}

/// Render minutes since midnight as `HH:MM`.
///
/// # Examples
/// ```
/// use itinerary_core::format_clock;
///
/// assert_eq!(format_clock(480.0), "08:00");
/// assert_eq!(format_clock(545.7), "09:05");
/// assert_eq!(format_clock(1500.0), "25:00");
/// ```
#[must_use]
pub fn format_clock(minutes: f64) -> String {
    let whole = if minutes.is_finite() {
        minutes.max(0.0).floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// One stop on the rendered timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TimelineEntry {
    /// Display name of the stop.
    pub name: String,
    /// Arrival time as `HH:MM`.
    pub arrival_time: String,
    /// Departure time as `HH:MM`.
    pub departure_time: String,
    /// Minutes spent at the stop.
    pub visit_duration: u32,
    /// Time-window status.
    pub status: TimeStatus,
}

/// A human-readable opening-hours violation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TimeWarning {
    /// Identifier of the affected point.
    pub place_id: String,
    /// Display name of the affected point.
    pub place_name: String,
    /// Description of the violation.
    pub warning: String,
    /// Arrival time as `HH:MM`.
    pub arrival_time: String,
    /// Opening time as `HH:MM`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub opening_time: Option<String>,
    /// Closing time as `HH:MM`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub closing_time: Option<String>,
    /// Minutes waited for opening.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub wait_time: Option<f64>,
    /// Departure time as `HH:MM`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub departure_time: Option<String>,
}

/// Build the warning for a non-`Ok` assessment.
#[must_use]
pub fn warning_for(point: &Point, assessment: &ArrivalAssessment) -> Option<TimeWarning> {
    if assessment.status == TimeStatus::Ok {
        return None;
    }
    let arrival = format_clock(assessment.arrival_minutes);
    let Some(window) = assessment.window else {
        return Some(TimeWarning {
            place_id: point.id.clone(),
            place_name: point.name.clone(),
            warning: format!("Arrives at {arrival}, but the place is closed on this day"),
            arrival_time: arrival,
            opening_time: None,
            closing_time: None,
            wait_time: None,
            departure_time: None,
        });
    };
    let open = format_clock(f64::from(window.open_minutes));
    let close = format_clock(f64::from(window.close_minutes));
    let departure = format_clock(assessment.departure_minutes(point.visit_minutes));

    let (warning, wait_time, departure_time) = match assessment.status {
        TimeStatus::Ok => return None,
        TimeStatus::WaitForOpening => (
            format!(
                "Arrives at {arrival}, before opening at {open}; waits {:.0} minutes",
                assessment.wait_minutes
            ),
            Some(assessment.wait_minutes),
            None,
        ),
        TimeStatus::AfterClosing => (
            format!("Arrives at {arrival}, after closing at {close}"),
            None,
            None,
        ),
        TimeStatus::VisitExceedsClosing => (
            format!(
                "Visit ends at {departure}, {:.0} minutes after closing at {close}",
                assessment.overtime_minutes
            ),
            None,
            Some(departure),
        ),
    };

    Some(TimeWarning {
        place_id: point.id.clone(),
        place_name: point.name.clone(),
        warning,
        arrival_time: arrival,
        opening_time: Some(open),
        closing_time: Some(close),
        wait_time,
        departure_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::OpeningPeriod;
    use geo::Coord;
    use rstest::{fixture, rstest};

    const MONDAY: u8 = 1;

    #[fixture]
    fn office_hours() -> Point {
        Point::new("p", "Palace", Coord { x: 0.0, y: 0.0 })
            .with_visit_minutes(30)
            .with_opening_periods(vec![OpeningPeriod::new(MONDAY, 9 * 60, 17 * 60)])
    }

    #[rstest]
    fn early_arrival_waits_for_opening(office_hours: Point) {
        let assessment = score_arrival(&office_hours, 510.0, MONDAY);
        assert_eq!(assessment.status, TimeStatus::WaitForOpening);
        assert!((assessment.wait_minutes - 30.0).abs() < f64::EPSILON);
        assert!((assessment.penalty - 15.0).abs() < f64::EPSILON);
        assert!((assessment.start_minutes - 540.0).abs() < f64::EPSILON);
        assert!((assessment.departure_minutes(30) - 570.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn late_arrival_pays_flat_penalty(office_hours: Point) {
        let assessment = score_arrival(&office_hours, 1030.0, MONDAY);
        assert_eq!(assessment.status, TimeStatus::AfterClosing);
        assert!((assessment.penalty - AFTER_CLOSING_PENALTY).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(1000.0, 10.0, 8.0)]
    #[case(1010.0, 20.0, 16.0)]
    fn short_overtime_is_proportional(
        office_hours: Point,
        #[case] arrival: f64,
        #[case] overtime: f64,
        #[case] penalty: f64,
    ) {
        let assessment = score_arrival(&office_hours, arrival, MONDAY);
        assert_eq!(assessment.status, TimeStatus::VisitExceedsClosing);
        assert!((assessment.overtime_minutes - overtime).abs() < 1e-9);
        assert!((assessment.penalty - penalty).abs() < 1e-9);
    }

    #[rstest]
    fn long_overtime_adds_flat_penalty() {
        let point = Point::new("p", "Palace", Coord { x: 0.0, y: 0.0 })
            .with_visit_minutes(120)
            .with_opening_periods(vec![OpeningPeriod::new(MONDAY, 9 * 60, 17 * 60)]);
        let assessment = score_arrival(&point, 16.0 * 60.0, MONDAY);
        assert!((assessment.overtime_minutes - 60.0).abs() < 1e-9);
        assert!((assessment.penalty - 48.0).abs() < 1e-9);

        let later = score_arrival(&point, 16.0 * 60.0 + 30.0, MONDAY);
        assert!((later.penalty - (0.8 * 90.0 + LONG_OVERTIME_PENALTY)).abs() < 1e-9);
    }

    #[rstest]
    fn always_open_earns_bonus() {
        let point = Point::new("p", "Park", Coord { x: 0.0, y: 0.0 });
        let assessment = score_arrival(&point, 0.0, MONDAY);
        assert_eq!(assessment.status, TimeStatus::Ok);
        assert!((assessment.net() - ALWAYS_OPEN_BONUS).abs() < f64::EPSILON);
        assert!(warning_for(&point, &assessment).is_none());
    }

    #[rstest]
    fn unreadable_hours_earn_no_bonus() {
        let point = Point {
            hours_unknown: true,
            ..Point::new("u", "Unknown Hours", Coord { x: 0.0, y: 0.0 })
        };
        let assessment = score_arrival(&point, 600.0, MONDAY);
        assert_eq!(assessment.status, TimeStatus::Ok);
        assert!(assessment.net().abs() < f64::EPSILON);
        assert!(warning_for(&point, &assessment).is_none());
    }

    #[rstest]
    fn tuesday_only_place_is_closed_on_monday() {
        let point = Point::new("t", "Tuesday Market", Coord { x: 0.0, y: 0.0 })
            .with_visit_minutes(30)
            .with_opening_periods(vec![OpeningPeriod::new(MONDAY + 1, 9 * 60, 10 * 60)]);
        let assessment = score_arrival(&point, 9.0 * 60.0 + 30.0, MONDAY);
        assert_eq!(assessment.status, TimeStatus::AfterClosing);
        assert!(assessment.window.is_none());
        assert!((assessment.net() + AFTER_CLOSING_PENALTY).abs() < f64::EPSILON);
        assert!((assessment.departure_minutes(30) - 600.0).abs() < f64::EPSILON);

        let warning = warning_for(&point, &assessment).expect("closed day produces a warning");
        assert_eq!(warning.arrival_time, "09:30");
        assert!(warning.warning.contains("closed on this day"));
        assert!(warning.opening_time.is_none());
        assert!(warning.closing_time.is_none());
    }

    #[rstest]
    fn split_day_uses_the_window_still_open() {
        let point = Point::new("p", "Pagoda", Coord { x: 0.0, y: 0.0 })
            .with_visit_minutes(30)
            .with_opening_periods(vec![
                OpeningPeriod::new(MONDAY, 7 * 60, 11 * 60),
                OpeningPeriod::new(MONDAY, 13 * 60, 17 * 60),
            ]);
        let assessment = score_arrival(&point, 12.0 * 60.0, MONDAY);
        assert_eq!(assessment.status, TimeStatus::WaitForOpening);
        assert!((assessment.wait_minutes - 60.0).abs() < f64::EPSILON);

        let evening = score_arrival(&point, 18.0 * 60.0, MONDAY);
        assert_eq!(evening.status, TimeStatus::AfterClosing);
    }

    #[rstest]
    fn wait_warning_carries_times(office_hours: Point) {
        let assessment = score_arrival(&office_hours, 510.0, MONDAY);
        let warning = warning_for(&office_hours, &assessment).expect("wait produces a warning");
        assert_eq!(warning.arrival_time, "08:30");
        assert_eq!(warning.opening_time.as_deref(), Some("09:00"));
        assert_eq!(warning.closing_time.as_deref(), Some("17:00"));
        assert_eq!(warning.wait_time, Some(30.0));
        assert!(warning.warning.contains("waits 30 minutes"));
    }

    #[rstest]
    fn overtime_warning_carries_departure(office_hours: Point) {
        let assessment = score_arrival(&office_hours, 1010.0, MONDAY);
        let warning = warning_for(&office_hours, &assessment).expect("overtime produces a warning");
        assert_eq!(warning.departure_time.as_deref(), Some("17:20"));
    }

    #[rstest]
    #[case(0.0, "00:00")]
    #[case(59.9, "00:59")]
    #[case(600.0, "10:00")]
    #[case(-5.0, "00:00")]
    fn clock_formatting(#[case] minutes: f64, #[case] expected: &str) {
        assert_eq!(format_clock(minutes), expected);
    }
}
