//! Map marker extraction from a canonical itinerary

use crate::itinerary::{ItineraryDay, PlaceVisit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A named marker for the map view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapLocation {
    /// 1-based marker id, sequential in output order
    pub id: usize,
    pub name: String,
    pub day: String,
    pub position: LatLng,
}

/// Collect map markers in day order, each day's meal before its activities.
/// Visits without a name or without coordinates are skipped.
pub fn extract_locations(days: &[ItineraryDay]) -> Vec<MapLocation> {
    days.iter()
        .flat_map(|day| {
            std::iter::once(&day.food)
                .chain(day.activities.iter())
                .filter(|visit| is_mappable(visit))
                .map(move |visit| (day.day_label.as_str(), visit))
        })
        .enumerate()
        .map(|(index, (day, visit))| MapLocation {
            id: index + 1,
            name: visit.place.clone(),
            day: day.to_string(),
            position: LatLng {
                lat: visit.lat,
                lng: visit.lng,
            },
        })
        .collect()
}

fn is_mappable(visit: &PlaceVisit) -> bool {
    !visit.place.trim().is_empty() && visit.has_coordinates()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::placeholder_itinerary;

    fn day(label: &str, food: PlaceVisit, activities: Vec<PlaceVisit>) -> ItineraryDay {
        ItineraryDay {
            day_label: label.to_string(),
            food,
            activities,
            summary: String::new(),
        }
    }

    #[test]
    fn test_zero_coordinates_are_excluded() {
        let days = vec![day(
            "Day 1",
            PlaceVisit::new("12:00 PM", "Local Restaurant", "$25"),
            vec![
                PlaceVisit::new("2:00 PM", "Pier", "$10").at(34.0, -118.0),
                PlaceVisit::new("4:00 PM", "Nowhere", "$0"),
            ],
        )];

        let locations = extract_locations(&days);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Pier");
        assert_eq!(locations[0].position, LatLng { lat: 34.0, lng: -118.0 });
    }

    #[test]
    fn test_unnamed_visits_are_excluded() {
        let days = vec![day(
            "Day 1",
            PlaceVisit::new("12:00 PM", "  ", "$25").at(1.0, 1.0),
            vec![PlaceVisit::new("2:00 PM", "Museum", "$10").at(2.0, 2.0)],
        )];

        let names: Vec<_> = extract_locations(&days).into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Museum"]);
    }

    #[test]
    fn test_order_is_day_then_food_then_activities() {
        let days = vec![
            day(
                "Day 1",
                PlaceVisit::new("12:00 PM", "Lunch A", "$25").at(1.0, 1.0),
                vec![
                    PlaceVisit::new("2:00 PM", "A1", "$0").at(1.1, 1.1),
                    PlaceVisit::new("4:00 PM", "A2", "$0").at(1.2, 1.2),
                ],
            ),
            day(
                "Day 2",
                PlaceVisit::new("12:00 PM", "Lunch B", "$25").at(2.0, 2.0),
                vec![PlaceVisit::new("9:00 AM", "B1", "$0").at(2.1, 2.1)],
            ),
        ];

        let locations = extract_locations(&days);
        let names: Vec<_> = locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Lunch A", "A1", "A2", "Lunch B", "B1"]);
        let ids: Vec<_> = locations.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(locations[3].day, "Day 2");
    }

    #[test]
    fn test_placeholder_locations() {
        let locations = extract_locations(&placeholder_itinerary());
        assert_eq!(locations.len(), 18);
        assert_eq!(locations[0].name, "Grand Central Market");
        assert_eq!(locations[17].name, "Downtown Art District");
    }

    #[test]
    fn test_empty_itinerary() {
        assert!(extract_locations(&[]).is_empty());
    }
}
