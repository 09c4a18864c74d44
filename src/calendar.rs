//! Calendar event derivation and `.ics` export
//!
//! Each day contributes its meal followed by its activities, in the order the
//! itinerary lists them. Events are never re-sorted by their computed start
//! time, so an activity scheduled before lunch still follows the meal event.

use crate::itinerary::{ItineraryDay, PlaceVisit};
use crate::TripError;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, instrument};

pub const EXPORT_FILE_NAME: &str = "trip-itinerary.ics";
pub const EXPORT_MIME_TYPE: &str = "text/calendar;charset=utf-8";

const PRODUCT_ID: &str = "-//Trip-sonality//Trip-sonality Calendar//EN";
const FOOD_PREFIX: &str = "🍴";
const ACTIVITY_PREFIX: &str = "🎬";
const DEFAULT_DURATION_HOURS: u32 = 1;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\((\d+)h\)").expect("duration pattern is valid"))
}

/// Time of day parsed from a "H:MM AM|PM" display string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Parse the leading "H:MM AM|PM" of a visit time, ignoring any trailing
    /// "(Nh)" annotation. Anything else is rejected rather than guessed at.
    pub fn parse(time: &str) -> Result<Self, TripError> {
        let malformed = || TripError::MalformedTimeString(time.to_string());

        let (hour_minute, rest) = time.split_once(' ').ok_or_else(malformed)?;
        let suffix = rest.split(' ').next().unwrap_or_default();

        let (hour, minute) = hour_minute.split_once(':').ok_or_else(malformed)?;
        let mut hour = parse_digits(hour).ok_or_else(malformed)?;
        let minute = parse_digits(minute).ok_or_else(malformed)?;

        if !(1..=12).contains(&hour) || minute > 59 {
            return Err(malformed());
        }

        match suffix {
            "PM" if hour < 12 => hour += 12,
            "AM" if hour == 12 => hour = 0,
            "AM" | "PM" => {}
            _ => return Err(malformed()),
        }

        Ok(Self { hour, minute })
    }

    fn to_naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

/// Non-empty run of ASCII digits. `u32::from_str` alone would let a sign through.
fn parse_digits(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Hours from a "(Nh)" annotation anywhere in the string, defaulting to one.
/// A count too large for `u32` is malformed.
pub fn parse_duration_hours(time: &str) -> Result<u32, TripError> {
    match duration_pattern().captures(time) {
        Some(captures) => captures[1]
            .parse()
            .map_err(|_| TripError::MalformedTimeString(time.to_string())),
        None => Ok(DEFAULT_DURATION_HOURS),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Food,
    Activity,
}

impl EventKind {
    fn prefix(&self) -> &'static str {
        match self {
            EventKind::Food => FOOD_PREFIX,
            EventKind::Activity => ACTIVITY_PREFIX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub kind: EventKind,
    pub title: String,
    pub start: NaiveDateTime,
    pub duration_hours: u32,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl CalendarEvent {
    fn from_visit(kind: EventKind, visit: &PlaceVisit, date: NaiveDate) -> Result<Self, TripError> {
        let time = TimeOfDay::parse(&visit.time)?
            .to_naive_time()
            .ok_or_else(|| TripError::MalformedTimeString(visit.time.clone()))?;

        let duration_hours = match kind {
            EventKind::Food => DEFAULT_DURATION_HOURS,
            EventKind::Activity => parse_duration_hours(&visit.time)?,
        };

        Ok(Self {
            kind,
            title: format!("{} {}", kind.prefix(), visit.place),
            start: date.and_time(time),
            duration_hours,
            description: (!visit.cost.is_empty()).then(|| format!("Cost: {}", visit.cost)),
            location: (!visit.place.is_empty()).then(|| visit.place.clone()),
        })
    }

    /// `YYYYMMDDTHHMM00Z`, taken straight from the local fields
    pub fn dtstart(&self) -> String {
        format!(
            "{}{:02}{:02}T{:02}{:02}00Z",
            self.start.year(),
            self.start.month(),
            self.start.day(),
            self.start.hour(),
            self.start.minute()
        )
    }
}

/// Expand an itinerary into dated events starting on `trip_start`.
///
/// Day N of the itinerary lands on `trip_start + (N - 1)` days, where N is the
/// position in the slice rather than anything parsed from the day label.
#[instrument(level = "debug", skip(days), fields(days = days.len()))]
pub fn derive_events(days: &[ItineraryDay], trip_start: NaiveDate) -> Result<Vec<CalendarEvent>, TripError> {
    let mut events = Vec::new();

    for (offset, day) in days.iter().enumerate() {
        let date = trip_start
            .checked_add_days(Days::new(offset as u64))
            .ok_or_else(|| TripError::ParseError(format!("{} falls outside the calendar range", day.day_label)))?;

        events.push(CalendarEvent::from_visit(EventKind::Food, &day.food, date)?);
        for activity in &day.activities {
            events.push(CalendarEvent::from_visit(EventKind::Activity, activity, date)?);
        }
    }

    debug!(events = events.len(), "Derived calendar events");
    Ok(events)
}

/// Serialize events into the calendar document, CRLF separated
pub fn to_ics(events: &[CalendarEvent]) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODUCT_ID),
    ];

    for event in events {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("SUMMARY:{}", event.title));
        lines.push(format!("DTSTART:{}", event.dtstart()));
        lines.push(format!("DURATION:PT{}H", event.duration_hours));
        if let Some(description) = &event.description {
            lines.push(format!("DESCRIPTION:{}", description));
        }
        if let Some(location) = &event.location {
            lines.push(format!("LOCATION:{}", location));
        }
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    lines.retain(|line| !line.is_empty());
    lines.join("\r\n")
}

/// A ready-to-download calendar file
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarExport {
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

impl CalendarExport {
    /// Write the document into `dir`, returning the full path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, TripError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.content)?;
        info!(path = %path.display(), bytes = self.content.len(), "Calendar export written");
        Ok(path)
    }
}

/// Derive and serialize the calendar export for an itinerary
pub fn export_calendar(days: &[ItineraryDay], trip_start: NaiveDate) -> Result<CalendarExport, TripError> {
    let events = derive_events(days, trip_start)?;
    Ok(CalendarExport {
        file_name: EXPORT_FILE_NAME.to_string(),
        mime_type: EXPORT_MIME_TYPE.to_string(),
        content: to_ics(&events),
    })
}
