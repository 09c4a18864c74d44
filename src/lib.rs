//! # Tripsonality
//!
//! Core of the Tripsonality trip planner. The planning itself happens in a
//! remote service; this crate submits the trip form, normalizes whatever
//! itinerary comes back into a canonical day-by-day model, and derives map
//! markers, share links and an `.ics` calendar export from it.

pub mod calendar;
pub mod client;
pub mod config;
pub mod guides;
pub mod itinerary;
pub mod locations;
pub mod logging;
pub mod session;
pub mod share;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export main types for convenience
pub use calendar::{derive_events, export_calendar, to_ics, CalendarEvent, CalendarExport, TimeOfDay};
pub use client::{PlanRequest, PlannerClient, TripForm};
pub use config::Config;
pub use guides::{Guide, GuideKind, GuideTab};
pub use itinerary::{normalize, placeholder_itinerary, ItineraryDay, ParsedItinerary, PlaceVisit, SummaryContext};
pub use locations::{extract_locations, LatLng, MapLocation};
pub use session::{AppState, InFlightGuard, WelcomeStore};
pub use share::{parse_share_link, share_link};

/// Error types for the trip planner
#[derive(Error, Debug)]
pub enum TripError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Planner returned {status}: {body}")]
    PlannerStatus { status: u16, body: String },

    #[error("JSON processing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed time string: {0:?}")]
    MalformedTimeString(String),

    #[error("{0}")]
    MissingField(String),

    #[error("A planning request is already in flight")]
    RequestInFlight,

    #[error("Invalid share link: {0}")]
    InvalidShareLink(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Myers-Briggs personality type sent to the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mbti {
    Intj,
    Intp,
    Entj,
    Entp,
    Infj,
    Infp,
    Enfj,
    Enfp,
    Istj,
    Isfj,
    Estj,
    Esfj,
    Istp,
    Isfp,
    Estp,
    Esfp,
}

impl Mbti {
    pub const ALL: [Mbti; 16] = [
        Mbti::Intj,
        Mbti::Intp,
        Mbti::Entj,
        Mbti::Entp,
        Mbti::Infj,
        Mbti::Infp,
        Mbti::Enfj,
        Mbti::Enfp,
        Mbti::Istj,
        Mbti::Isfj,
        Mbti::Estj,
        Mbti::Esfj,
        Mbti::Istp,
        Mbti::Isfp,
        Mbti::Estp,
        Mbti::Esfp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mbti::Intj => "INTJ",
            Mbti::Intp => "INTP",
            Mbti::Entj => "ENTJ",
            Mbti::Entp => "ENTP",
            Mbti::Infj => "INFJ",
            Mbti::Infp => "INFP",
            Mbti::Enfj => "ENFJ",
            Mbti::Enfp => "ENFP",
            Mbti::Istj => "ISTJ",
            Mbti::Isfj => "ISFJ",
            Mbti::Estj => "ESTJ",
            Mbti::Esfj => "ESFJ",
            Mbti::Istp => "ISTP",
            Mbti::Isfp => "ISFP",
            Mbti::Estp => "ESTP",
            Mbti::Esfp => "ESFP",
        }
    }
}

impl Default for Mbti {
    fn default() -> Self {
        Mbti::Infj
    }
}

impl fmt::Display for Mbti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mbti {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Mbti::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| TripError::ParseError(format!("Invalid MBTI type: {}", s)))
    }
}

/// Budget choices offered by the trip form
pub const BUDGET_OPTIONS: [&str; 5] = ["500 USD", "1000 USD", "1500 USD", "2000 USD", "2500+ USD"];

/// Parse a budget label such as "1500 USD" or "2500+ USD" into its amount
pub fn parse_budget(label: &str) -> Result<u32, TripError> {
    let digits: String = label
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse::<u32>()
        .map_err(|_| TripError::ParseError(format!("Invalid budget: {}", label)))
}

/// Submit a trip form to the configured planner and return the normalized itinerary.
///
/// An empty vector means the planner answered but supplied no usable itinerary.
///
/// # Example
/// ```no_run
/// use tripsonality::{plan_trip, Config, TripForm};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let form = TripForm {
///     location: "Tokyo".to_string(),
///     theme: "Tech".to_string(),
///     dates: "4".to_string(),
///     ..TripForm::default()
/// };
///
/// let days = plan_trip(&Config::default(), &form).await?;
/// println!("Planned {} days", days.len());
/// # Ok(())
/// # }
/// ```
pub async fn plan_trip(config: &Config, form: &TripForm) -> Result<Vec<ItineraryDay>, TripError> {
    let client = PlannerClient::new(config)?;
    client.plan(form).await
}
