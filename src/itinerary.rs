//! Canonical itinerary model and normalization of planner responses

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Display values for the meal the planner does not supply
const PLACEHOLDER_FOOD_TIME: &str = "12:00 PM";
const PLACEHOLDER_FOOD_PLACE: &str = "Local Restaurant";
const PLACEHOLDER_FOOD_COST: &str = "$25";

/// Cost shown when a POI carries no price level
const FALLBACK_ACTIVITY_COST: &str = "$20";
const COST_PER_PRICE_LEVEL: f64 = 15.0;

/// A single timed stop in a day: a meal or an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceVisit {
    /// "H:MM AM|PM", activities optionally followed by " (Nh)"
    pub time: String,
    pub place: String,
    /// Display string, never parsed as currency
    pub cost: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

impl PlaceVisit {
    pub fn new(time: &str, place: &str, cost: &str) -> Self {
        Self {
            time: time.to_string(),
            place: place.to_string(),
            cost: cost.to_string(),
            lat: 0.0,
            lng: 0.0,
        }
    }

    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.lat = lat;
        self.lng = lng;
        self
    }

    /// Both coordinates zero means the source never supplied a position
    pub fn has_coordinates(&self) -> bool {
        self.lat != 0.0 || self.lng != 0.0
    }
}

/// One day of the canonical itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// "Day N", 1-based and contiguous
    #[serde(rename = "day")]
    pub day_label: String,
    pub food: PlaceVisit,
    pub activities: Vec<PlaceVisit>,
    pub summary: String,
}

/// Theme and location used to write each day's summary
#[derive(Debug, Clone, Default)]
pub struct SummaryContext {
    pub theme: String,
    pub location: String,
}

impl SummaryContext {
    pub fn new(theme: &str, location: &str) -> Self {
        Self {
            theme: theme.to_string(),
            location: location.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        let theme = match self.theme.trim() {
            "" => "travel",
            theme => theme,
        };
        let location = match self.location.trim() {
            "" => "your destination",
            location => location,
        };
        format!("Enjoy a {}-themed day exploring {}.", theme, location)
    }
}

/// Planner response envelope: `{ success, data: { itinerary: [...] } }`
#[derive(Debug, Deserialize)]
struct PlanResponse {
    #[serde(default)]
    success: Option<bool>,
    data: PlanData,
}

#[derive(Debug, Deserialize)]
struct PlanData {
    itinerary: Vec<BackendDay>,
}

/// A day as the planner returns it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendDay {
    #[serde(default)]
    pub activities: Vec<BackendActivity>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendActivity {
    pub time: String,
    pub poi: Poi,
}

/// Point of interest attached to a planner activity
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Poi {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub price_level: Option<f64>,
}

/// Result of validating a planner payload before it is mapped
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedItinerary {
    Parsed(Vec<BackendDay>),
    Empty,
}

impl ParsedItinerary {
    /// Validate the payload shape. Anything unexpected is `Empty`, never an error.
    pub fn from_value(payload: &Value) -> Self {
        if payload.is_null() {
            debug!("No planner payload supplied");
            return ParsedItinerary::Empty;
        }

        match PlanResponse::deserialize(payload) {
            Ok(PlanResponse { success: Some(false), .. }) => {
                warn!("Planner reported success=false, ignoring itinerary");
                ParsedItinerary::Empty
            }
            Ok(response) => ParsedItinerary::Parsed(response.data.itinerary),
            Err(e) => {
                warn!(error = %e, "Planner payload does not contain a usable itinerary");
                ParsedItinerary::Empty
            }
        }
    }
}

/// Convert a planner payload into canonical days.
///
/// Malformed or missing payloads yield an empty vector; callers should keep
/// whatever itinerary they already hold in that case.
pub fn normalize(payload: &Value, context: &SummaryContext) -> Vec<ItineraryDay> {
    match ParsedItinerary::from_value(payload) {
        ParsedItinerary::Parsed(days) => {
            let summary = context.summary();
            let normalized: Vec<ItineraryDay> = days
                .iter()
                .enumerate()
                .map(|(index, day)| normalize_day(index, day, &summary))
                .collect();
            debug!(days = normalized.len(), "Normalized planner itinerary");
            normalized
        }
        ParsedItinerary::Empty => Vec::new(),
    }
}

fn normalize_day(index: usize, day: &BackendDay, summary: &str) -> ItineraryDay {
    let (lat, lng) = day
        .activities
        .first()
        .map(|first| (first.poi.lat.unwrap_or(0.0), first.poi.lng.unwrap_or(0.0)))
        .unwrap_or((0.0, 0.0));

    let food = PlaceVisit::new(PLACEHOLDER_FOOD_TIME, PLACEHOLDER_FOOD_PLACE, PLACEHOLDER_FOOD_COST).at(lat, lng);

    let activities = day
        .activities
        .iter()
        .map(|activity| PlaceVisit {
            time: activity.time.clone(),
            place: activity.poi.name.clone(),
            cost: activity_cost(activity.poi.price_level),
            lat: activity.poi.lat.unwrap_or(0.0),
            lng: activity.poi.lng.unwrap_or(0.0),
        })
        .collect();

    ItineraryDay {
        day_label: format!("Day {}", index + 1),
        food,
        activities,
        summary: summary.to_string(),
    }
}

fn activity_cost(price_level: Option<f64>) -> String {
    match price_level {
        Some(level) => {
            let amount = level * COST_PER_PRICE_LEVEL;
            if amount.fract() == 0.0 {
                format!("${}", amount as i64)
            } else {
                format!("${}", amount)
            }
        }
        None => FALLBACK_ACTIVITY_COST.to_string(),
    }
}

/// The fixed six-day Los Angeles movie trip shown before any plan arrives
pub fn placeholder_itinerary() -> Vec<ItineraryDay> {
    fn day(n: usize, food: PlaceVisit, activities: Vec<PlaceVisit>, summary: &str) -> ItineraryDay {
        ItineraryDay {
            day_label: format!("Day {}", n),
            food,
            activities,
            summary: summary.to_string(),
        }
    }

    vec![
        day(
            1,
            PlaceVisit::new("12:00 PM", "Grand Central Market", "$25").at(34.0509, -118.2494),
            vec![
                PlaceVisit::new("2:00 PM (2h)", "Hollywood Walk of Fame", "$0").at(34.1016, -118.3267),
                PlaceVisit::new("5:00 PM (2h)", "TCL Chinese Theatre", "$20").at(34.1022, -118.341),
            ],
            "Kick off your LA movie-themed trip with tasty street food and a stroll among the stars.",
        ),
        day(
            2,
            PlaceVisit::new("1:00 PM", "In-N-Out Burger", "$15").at(34.0981, -118.3375),
            vec![
                PlaceVisit::new("2:30 PM (2h)", "Griffith Observatory", "$15").at(34.1184, -118.3004),
                PlaceVisit::new("6:00 PM (2h)", "Hollywood Bowl Tour", "$30").at(34.1127, -118.3392),
            ],
            "Enjoy a classic California burger, then catch panoramic city views and a behind-the-scenes music venue tour.",
        ),
        day(
            3,
            PlaceVisit::new("11:30 AM", "Grandma's Café", "$20").at(34.0771, -118.2528),
            vec![
                PlaceVisit::new("1:00 PM (2h)", "Universal Studios Backlot Tour", "$30").at(34.1381, -118.3534),
                PlaceVisit::new("4:00 PM (2h)", "CityWalk Exploration", "$0").at(34.1373, -118.3526),
            ],
            "Taste homey brunch fare before exploring iconic movie sets and entertainment district vibes.",
        ),
        day(
            4,
            PlaceVisit::new("12:00 PM", "Shake Shack", "$18").at(34.0977, -118.3264),
            vec![
                PlaceVisit::new("1:30 PM (2h)", "Getty Center Tour", "$20").at(34.0776, -118.4741),
                PlaceVisit::new("5:00 PM (2h)", "Sunset Boulevard Drive", "$0").at(34.0967, -118.3425),
            ],
            "Grab a casual shake, then enjoy art, architecture, and a scenic drive into movie history.",
        ),
        day(
            5,
            PlaceVisit::new("1:00 PM", "Venice Beach Snack Stand", "$12").at(33.9858, -118.4725),
            vec![
                PlaceVisit::new("2:00 PM (2h)", "Venice Beach Skateboarders", "$0").at(33.985, -118.4695),
                PlaceVisit::new("5:00 PM (2h)", "Santa Monica Pier", "$10").at(34.0095, -118.4912),
            ],
            "Soak up beach culture with tasty snacks, street performances, and a seaside amusement experience.",
        ),
        day(
            6,
            PlaceVisit::new("1:00 PM", "The Grove Food Court", "$20").at(34.0725, -118.3576),
            vec![
                PlaceVisit::new("2:30 PM (2h)", "Warner Bros. Studio Tour", "$50").at(34.1538, -118.3371),
                PlaceVisit::new("5:00 PM (2h)", "Downtown Art District", "$0").at(34.0403, -118.2351),
            ],
            "End with a gourmet food hall meal and an immersive peek behind your favorite films, capped by local art browsing.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn la_context() -> SummaryContext {
        SummaryContext::new("Movie", "Los Angeles")
    }

    fn sample_payload() -> Value {
        json!({
            "success": true,
            "data": {
                "itinerary": [
                    {
                        "day": 1,
                        "activities": [
                            {
                                "time": "9:00 AM (2h)",
                                "poi": { "name": "Getty Center", "lat": 34.0776, "lng": -118.4741, "price_level": 2 }
                            },
                            {
                                "time": "2:00 PM",
                                "poi": { "name": "Venice Beach", "lat": 33.985, "lng": -118.4695 }
                            }
                        ]
                    },
                    {
                        "day": 2,
                        "activities": [
                            {
                                "time": "10:00 AM (3h)",
                                "poi": { "name": "Universal Studios", "lat": 34.1381, "lng": -118.3534, "price_level": 4 }
                            }
                        ]
                    }
                ]
            }
        })
    }

    #[test]
    fn test_normalize_day_count_and_shape() {
        let days = normalize(&sample_payload(), &la_context());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day_label, "Day 1");
        assert_eq!(days[1].day_label, "Day 2");
        assert_eq!(days[0].activities.len(), 2);
        assert_eq!(days[1].activities.len(), 1);
    }

    #[test]
    fn test_normalize_synthesizes_food() {
        let days = normalize(&sample_payload(), &la_context());
        let food = &days[0].food;
        assert_eq!(food.time, "12:00 PM");
        assert_eq!(food.place, "Local Restaurant");
        assert_eq!(food.cost, "$25");
        assert_eq!(food.lat, 34.0776);
        assert_eq!(food.lng, -118.4741);
    }

    #[test]
    fn test_normalize_activity_fields() {
        let days = normalize(&sample_payload(), &la_context());
        let getty = &days[0].activities[0];
        assert_eq!(getty.place, "Getty Center");
        assert_eq!(getty.time, "9:00 AM (2h)");
        assert_eq!(getty.cost, "$30");

        let venice = &days[0].activities[1];
        assert_eq!(venice.cost, "$20");
        assert_eq!(venice.lat, 33.985);

        assert_eq!(days[1].activities[0].cost, "$60");
    }

    #[test]
    fn test_normalize_summary_uses_context() {
        let days = normalize(&sample_payload(), &la_context());
        assert_eq!(days[0].summary, "Enjoy a Movie-themed day exploring Los Angeles.");

        let days = normalize(&sample_payload(), &SummaryContext::default());
        assert_eq!(days[0].summary, "Enjoy a travel-themed day exploring your destination.");
    }

    #[test]
    fn test_normalize_day_without_activities() {
        let payload = json!({ "data": { "itinerary": [ { "day": 1, "activities": [] } ] } });
        let days = normalize(&payload, &la_context());
        assert_eq!(days.len(), 1);
        assert!(days[0].activities.is_empty());
        assert_eq!(days[0].food.lat, 0.0);
        assert_eq!(days[0].food.lng, 0.0);
    }

    #[test]
    fn test_normalize_missing_coordinates_default_to_zero() {
        let payload = json!({
            "data": { "itinerary": [ { "activities": [ { "time": "1:00 PM", "poi": { "name": "Somewhere" } } ] } ] }
        });
        let days = normalize(&payload, &la_context());
        assert_eq!(days[0].activities[0].lat, 0.0);
        assert_eq!(days[0].activities[0].lng, 0.0);
        assert!(!days[0].food.has_coordinates());
    }

    #[test]
    fn test_normalize_malformed_payloads_are_empty() {
        let context = la_context();
        assert!(normalize(&Value::Null, &context).is_empty());
        assert!(normalize(&json!({}), &context).is_empty());
        assert!(normalize(&json!({ "data": {} }), &context).is_empty());
        assert!(normalize(&json!({ "data": { "itinerary": "nope" } }), &context).is_empty());
        assert!(normalize(&json!([1, 2, 3]), &context).is_empty());
        assert!(normalize(&json!({ "data": { "itinerary": [ { "activities": [ { "time": "1:00 PM" } ] } ] } }), &context).is_empty());
    }

    #[test]
    fn test_normalize_unsuccessful_response_is_empty() {
        let mut payload = sample_payload();
        payload["success"] = json!(false);
        assert!(normalize(&payload, &la_context()).is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let payload = sample_payload();
        let first = normalize(&payload, &la_context());
        let second = normalize(&payload, &la_context());
        assert_eq!(first, second);
    }

    #[test]
    fn test_fractional_price_level() {
        assert_eq!(activity_cost(Some(1.5)), "$22.5");
        assert_eq!(activity_cost(Some(0.0)), "$0");
        assert_eq!(activity_cost(None), "$20");
    }

    #[test]
    fn test_placeholder_itinerary() {
        let days = placeholder_itinerary();
        assert_eq!(days.len(), 6);
        for (i, day) in days.iter().enumerate() {
            assert_eq!(day.day_label, format!("Day {}", i + 1));
            assert_eq!(day.activities.len(), 2);
            assert!(day.food.has_coordinates());
        }
        assert_eq!(days[2].food.time, "11:30 AM");
    }

    #[test]
    fn test_canonical_day_json_shape() {
        let day = &placeholder_itinerary()[0];
        let value = serde_json::to_value(day).unwrap();
        assert_eq!(value["day"], "Day 1");
        assert_eq!(value["food"]["place"], "Grand Central Market");

        let back: ItineraryDay = serde_json::from_value(value).unwrap();
        assert_eq!(&back, day);
    }
}
