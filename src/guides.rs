//! Featured inspiration guides

use crate::TripError;
use serde::Serialize;
use std::str::FromStr;

/// Suggestions offered on the welcome screen
pub const WELCOME_PROMPTS: [&str; 3] = [
    "Explore LA's movie magic for 6 days",
    "Tour Tokyo's tech districts with my family",
    "Visit Paris for a food adventure",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "count")]
pub enum GuideKind {
    /// A day-by-day itinerary
    Itinerary(u32),
    /// A list of places
    List(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guide {
    pub title: &'static str,
    pub location: &'static str,
    pub sub_location: &'static str,
    pub author: &'static str,
    pub author_username: &'static str,
    #[serde(flatten)]
    pub kind: GuideKind,
    pub image: &'static str,
}

impl Guide {
    /// "N days" or "N places"
    pub fn badge(&self) -> String {
        match self.kind {
            GuideKind::Itinerary(days) => format!("{} days", days),
            GuideKind::List(places) => format!("{} places", places),
        }
    }

    /// "Location, SubLocation"
    pub fn place_line(&self) -> String {
        if self.sub_location.is_empty() {
            self.location.to_string()
        } else {
            format!("{}, {}", self.location, self.sub_location)
        }
    }

    fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || [self.location, self.sub_location, self.author_username]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuideTab {
    #[default]
    All,
    Itineraries,
    Lists,
}

impl GuideTab {
    fn admits(&self, kind: GuideKind) -> bool {
        matches!(
            (self, kind),
            (GuideTab::All, _) | (GuideTab::Itineraries, GuideKind::Itinerary(_)) | (GuideTab::Lists, GuideKind::List(_))
        )
    }
}

impl FromStr for GuideTab {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(GuideTab::All),
            "itineraries" | "itinerary" => Ok(GuideTab::Itineraries),
            "lists" | "list" => Ok(GuideTab::Lists),
            _ => Err(TripError::ParseError(format!("Invalid guide tab: {}", s))),
        }
    }
}

static FEATURED_GUIDES: [Guide; 6] = [
    Guide {
        title: "2 Days in Austin, TX",
        location: "Austin",
        sub_location: "Texas",
        author: "tripsonality",
        author_username: "tripsonality",
        kind: GuideKind::Itinerary(2),
        image: "https://images.unsplash.com/photo-1531218150217-54595bc2b934?w=800&auto=format",
    },
    Guide {
        title: "Museum & History Date in New York City",
        location: "New York",
        sub_location: "New York",
        author: "thatsumsum",
        author_username: "thatsumsum",
        kind: GuideKind::List(8),
        image: "https://images.unsplash.com/photo-1522083165195-3424ed129620?w=800&auto=format",
    },
    Guide {
        title: "Bar Hopping in Night NYC",
        location: "New York",
        sub_location: "New York",
        author: "emilyistraveling",
        author_username: "emilyistraveling",
        kind: GuideKind::List(5),
        image: "https://images.unsplash.com/photo-1534430480872-3498386e7856?w=800&auto=format",
    },
    Guide {
        title: "3 Days Culture trip in Salt Lake City",
        location: "Salt Lake City",
        sub_location: "Utah",
        author: "brandneweats",
        author_username: "brandneweats",
        kind: GuideKind::Itinerary(3),
        image: "https://plus.unsplash.com/premium_photo-1697730000221-148468fe7f6b?w=800&auto=format",
    },
    Guide {
        title: "5 Days Getaway in Honolulu",
        location: "Honolulu",
        sub_location: "Hawaii",
        author: "seemonterey",
        author_username: "seemonterey",
        kind: GuideKind::Itinerary(5),
        image: "https://images.unsplash.com/photo-1507699622108-4be3abd695ad?w=800&auto=format",
    },
    Guide {
        title: "Top 10 Restaurants in San Francisco",
        location: "San Francisco",
        sub_location: "California",
        author: "seemonterey",
        author_username: "seemonterey",
        kind: GuideKind::List(10),
        image: "https://images.unsplash.com/photo-1501594907352-04cda38ebc29?w=800&auto=format",
    },
];

pub fn featured_guides() -> &'static [Guide] {
    &FEATURED_GUIDES
}

/// Guides on `tab` whose location, region or username contains `query`
pub fn search(query: &str, tab: GuideTab) -> Vec<&'static Guide> {
    FEATURED_GUIDES
        .iter()
        .filter(|guide| tab.admits(guide.kind) && guide.matches_query(query))
        .collect()
}
