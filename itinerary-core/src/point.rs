//! Points of interest and normalization of raw itinerary entries.
//!
//! Raw entries come from the calling application and may be missing
//! coordinates, durations or priorities. [`normalize`] keeps the usable ones,
//! fills defaults and places the anchor (the traveller's lodging) at index 0.

use geo::Coord;

/// Identifier reserved for a caller-supplied anchor.
pub const ANCHOR_ID: &str = "anchor";
/// Identifier reserved for a synthesized anchor.
pub const VIRTUAL_ANCHOR_ID: &str = "virtual-anchor";
/// Display name of a synthesized anchor.
pub const VIRTUAL_ANCHOR_NAME: &str = "Virtual Hotel";
/// Display name used when the anchor carries no name.
pub const DEFAULT_ANCHOR_NAME: &str = "Hotel";
/// Visit length used when a place declares none.
pub const DEFAULT_VISIT_MINUTES: u32 = 60;
/// Priority used when a place declares none.
pub const DEFAULT_PRIORITY: i32 = 3;
/// Priority assigned to anchors.
pub const ANCHOR_PRIORITY: i32 = 5;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A day-of-week scoped opening window, in minutes since midnight.
///
/// Windows that close after midnight have `close_minutes > 1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpeningPeriod {
    /// Day of week, `0 = Sunday` through `6 = Saturday`.
    pub day_of_week: u8,
    /// Opening time in minutes since midnight.
    pub open_minutes: u32,
    /// Closing time in minutes since midnight.
    pub close_minutes: u32,
}

impl OpeningPeriod {
    /// Construct a period, rolling a close time earlier than the open time
    /// over to the following day.
    ///
    /// # Examples
    /// ```
    /// use itinerary_core::OpeningPeriod;
    ///
    /// let bar = OpeningPeriod::new(5, 18 * 60, 2 * 60);
    /// assert_eq!(bar.close_minutes, 26 * 60);
    /// ```
    #[must_use]
    pub const fn new(day_of_week: u8, open_minutes: u32, close_minutes: u32) -> Self {
        let close_minutes = if close_minutes < open_minutes {
            close_minutes + MINUTES_PER_DAY
        } else {
            close_minutes
        };
        Self {
            day_of_week,
            open_minutes,
            close_minutes,
        }
    }
}

/// A visitable location on the day's route.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Minutes spent at the point once arrived.
    pub visit_minutes: u32,
    /// Desirability weight; higher is better.
    pub priority: i32,
    /// Opening windows; empty means open around the clock unless
    /// `hours_unknown` is set.
    pub opening_periods: Vec<OpeningPeriod>,
    /// Opening hours were declared but none could be read.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hours_unknown: bool,
}

impl Point {
    /// Construct a point with default visit length and priority, open 24/7.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use itinerary_core::Point;
    ///
    /// let museum = Point::new("p1", "Museum", Coord { x: 106.7, y: 10.8 })
    ///     .with_priority(5)
    ///     .with_visit_minutes(90);
    /// assert_eq!(museum.priority, 5);
    /// assert!(museum.is_always_open());
    /// ```
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            visit_minutes: DEFAULT_VISIT_MINUTES,
            priority: DEFAULT_PRIORITY,
            opening_periods: Vec::new(),
            hours_unknown: false,
        }
    }

    /// Construct the caller-supplied anchor.
    #[must_use]
    pub fn anchor(name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            visit_minutes: 0,
            priority: ANCHOR_PRIORITY,
            ..Self::new(ANCHOR_ID, name, location)
        }
    }

    /// Construct a synthesized anchor.
    #[must_use]
    pub fn virtual_anchor(location: Coord<f64>) -> Self {
        Self {
            id: VIRTUAL_ANCHOR_ID.to_owned(),
            ..Self::anchor(VIRTUAL_ANCHOR_NAME, location)
        }
    }

    /// Set the visit length in minutes.
    #[must_use]
    pub const fn with_visit_minutes(mut self, minutes: u32) -> Self {
        self.visit_minutes = minutes;
        self
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Replace the opening periods.
    #[must_use]
    pub fn with_opening_periods(mut self, periods: Vec<OpeningPeriod>) -> Self {
        self.opening_periods = periods;
        self
    }

    /// Whether this point is a real or synthesized anchor.
    #[must_use]
    pub fn is_anchor(&self) -> bool {
        self.id == ANCHOR_ID || self.id == VIRTUAL_ANCHOR_ID
    }

    /// Whether the point is known to have no opening-hour restrictions.
    #[must_use]
    pub fn is_always_open(&self) -> bool {
        self.opening_periods.is_empty() && !self.hours_unknown
    }

    /// Opening periods that apply on `day_of_week`, in declaration order.
    pub fn periods_on(&self, day_of_week: u8) -> impl Iterator<Item = &OpeningPeriod> {
        self.opening_periods
            .iter()
            .filter(move |period| period.day_of_week == day_of_week)
    }
}

/// A clock time as supplied by callers: integer minutes or `"HHMM"`/`"HH:MM"`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawClock {
    /// Minutes since midnight.
    Minutes(u32),
    /// Textual time such as `"0930"` or `"09:30"`.
    Text(String),
}

impl RawClock {
    /// Resolve to minutes since midnight.
    ///
    /// # Examples
    /// ```
    /// use itinerary_core::RawClock;
    ///
    /// assert_eq!(RawClock::Text("0930".into()).to_minutes(), Some(570));
    /// assert_eq!(RawClock::Text("17:45".into()).to_minutes(), Some(1065));
    /// assert_eq!(RawClock::Minutes(600).to_minutes(), Some(600));
    /// assert_eq!(RawClock::Text("25:00".into()).to_minutes(), None);
    /// ```
    #[must_use]
    pub fn to_minutes(&self) -> Option<u32> {
        match self {
            Self::Minutes(minutes) => (*minutes <= MINUTES_PER_DAY).then_some(*minutes),
            Self::Text(text) => parse_clock_text(text.trim()),
        }
    }
}

fn parse_clock_text(text: &str) -> Option<u32> {
    let (hours, minutes) = match text.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if (3..=4).contains(&text.len()) && text.is_ascii() => {
            text.split_at(text.len() - 2)
        }
        None => return None,
    };
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    let valid = minutes < 60 && (hours < 24 || (hours == 24 && minutes == 0));
    valid.then_some(hours * 60 + minutes)
}

/// An opening period as supplied by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RawOpeningPeriod {
    /// Day of week, `0 = Sunday`.
    pub day_of_week: u8,
    /// Opening time.
    pub open_time: RawClock,
    /// Closing time.
    pub close_time: RawClock,
}

impl RawOpeningPeriod {
    fn resolve(&self) -> Option<OpeningPeriod> {
        if self.day_of_week > 6 {
            return None;
        }
        let open = self.open_time.to_minutes()?;
        let close = self.close_time.to_minutes()?;
        Some(OpeningPeriod::new(self.day_of_week, open, close))
    }
}

/// Extra attraction metadata attached to a place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct RawAttractionData {
    /// Opening periods published for the attraction.
    pub opening_periods: Option<Vec<RawOpeningPeriod>>,
}

/// A day-itinerary entry as supplied by callers.
///
/// Coordinates are a `[longitude, latitude]` pair.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct RawPlace {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// `[longitude, latitude]`.
    pub coordinates: Option<Vec<f64>>,
    /// Visit length in minutes.
    pub visit_duration: Option<u32>,
    /// Legacy field consulted when `visit_duration` is absent.
    pub time_start: Option<u32>,
    /// Priority weight.
    pub priority: Option<i32>,
    /// Legacy field consulted when `priority` is absent.
    pub time_end: Option<i32>,
    /// Opening periods declared on the entry itself.
    pub opening_periods: Option<Vec<RawOpeningPeriod>>,
    /// Attraction metadata; its opening periods take precedence.
    pub attraction_data: Option<RawAttractionData>,
}

/// The start/end location as supplied by callers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawAnchor {
    /// Display name, typically the hotel name.
    pub name: Option<String>,
    /// `[longitude, latitude]`.
    pub coordinates: Option<Vec<f64>>,
}

/// Why a raw place was left out of the point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DropReason {
    /// No coordinate pair was supplied.
    MissingCoordinates,
    /// The pair had the wrong arity or was out of range.
    InvalidCoordinates,
}

/// A raw place excluded during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DroppedPlace {
    /// Identifier of the raw place.
    pub id: String,
    /// Display name of the raw place.
    pub name: String,
    /// Reason for exclusion.
    pub reason: DropReason,
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedPoints {
    /// Usable points; the anchor, when present, is at index 0.
    pub points: Vec<Point>,
    /// Whether a caller-supplied anchor was accepted.
    pub has_anchor: bool,
    /// Places left out for lack of usable coordinates.
    pub dropped: Vec<DroppedPlace>,
}

impl NormalizedPoints {
    /// Number of usable non-anchor places.
    #[must_use]
    pub fn place_count(&self) -> usize {
        self.points.iter().filter(|point| !point.is_anchor()).count()
    }
}

fn parse_coordinates(raw: Option<&[f64]>) -> Result<Coord<f64>, DropReason> {
    let pair = match raw {
        None | Some([]) => return Err(DropReason::MissingCoordinates),
        Some(&[lon, lat]) => Coord { x: lon, y: lat },
        Some(_) => return Err(DropReason::InvalidCoordinates),
    };
    crate::haversine::check_coordinate(pair).map_err(|_| DropReason::InvalidCoordinates)?;
    Ok(pair)
}

/// Readable periods, and whether periods were declared but none were readable.
fn resolve_periods(place: &RawPlace) -> (Vec<OpeningPeriod>, bool) {
    let raw = place
        .attraction_data
        .as_ref()
        .and_then(|data| data.opening_periods.as_ref())
        .or(place.opening_periods.as_ref());
    let Some(raw) = raw else {
        return (Vec::new(), false);
    };
    let periods: Vec<OpeningPeriod> = raw
        .iter()
        .filter_map(|period| {
            let resolved = period.resolve();
            if resolved.is_none() {
                log::warn!(
                    "skipping unparseable opening period {period:?} on place {}",
                    place.id
                );
            }
            resolved
        })
        .collect();
    let unknown = periods.is_empty() && !raw.is_empty();
    if unknown {
        log::warn!(
            "place {} declares opening hours but none are readable",
            place.id
        );
    }
    (periods, unknown)
}

fn point_from_raw(place: &RawPlace, location: Coord<f64>) -> Point {
    let visit_minutes = place
        .visit_duration
        .or(place.time_start)
        .unwrap_or(DEFAULT_VISIT_MINUTES);
    let priority = place.priority.or(place.time_end).unwrap_or(DEFAULT_PRIORITY);
    let (periods, hours_unknown) = resolve_periods(place);
    Point {
        hours_unknown,
        ..Point::new(place.id.clone(), place.name.clone(), location)
            .with_visit_minutes(visit_minutes)
            .with_priority(priority)
            .with_opening_periods(periods)
    }
}

/// Convert raw itinerary entries and an optional anchor into [`Point`]s.
///
/// Places without a valid coordinate pair are excluded and listed in
/// [`NormalizedPoints::dropped`]. An anchor with a valid coordinate becomes
/// index 0. Callers decide whether enough points remain to optimize.
///
/// # Examples
/// ```
/// use itinerary_core::{normalize, RawAnchor, RawPlace};
///
/// let places = vec![
///     RawPlace { id: "a".into(), name: "Market".into(), coordinates: Some(vec![106.70, 10.77]), ..RawPlace::default() },
///     RawPlace { id: "b".into(), name: "Nowhere".into(), coordinates: None, ..RawPlace::default() },
/// ];
/// let anchor = RawAnchor { name: Some("Hotel".into()), coordinates: Some(vec![106.69, 10.78]) };
/// let normalized = normalize(&places, Some(&anchor));
/// assert!(normalized.has_anchor);
/// assert_eq!(normalized.points.len(), 2);
/// assert_eq!(normalized.points[0].id, "anchor");
/// assert_eq!(normalized.dropped.len(), 1);
/// ```
#[must_use]
pub fn normalize(raw_places: &[RawPlace], raw_anchor: Option<&RawAnchor>) -> NormalizedPoints {
    let mut normalized = NormalizedPoints::default();

    if let Some(anchor) = raw_anchor {
        match parse_coordinates(anchor.coordinates.as_deref()) {
            Ok(location) => {
                let name = anchor.name.as_deref().unwrap_or(DEFAULT_ANCHOR_NAME);
                normalized.points.push(Point::anchor(name, location));
                normalized.has_anchor = true;
            }
            Err(reason) => log::warn!("ignoring anchor without usable coordinates: {reason:?}"),
        }
    }

    for place in raw_places {
        match parse_coordinates(place.coordinates.as_deref()) {
            Ok(location) => normalized.points.push(point_from_raw(place, location)),
            Err(reason) => {
                log::warn!("dropping place {} ({}): {reason:?}", place.id, place.name);
                normalized.dropped.push(DroppedPlace {
                    id: place.id.clone(),
                    name: place.name.clone(),
                    reason,
                });
            }
        }
    }

    normalized
}
