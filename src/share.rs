//! Shareable itinerary links
//!
//! The whole canonical itinerary travels in the `trip` query parameter as
//! URL-safe, unpadded base64 of its JSON form.

use crate::itinerary::ItineraryDay;
use crate::TripError;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Url;
use tracing::debug;

const TRIP_PARAM: &str = "trip";

pub fn encode_token(days: &[ItineraryDay]) -> Result<String, TripError> {
    let json = serde_json::to_vec(days)?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_token(token: &str) -> Result<Vec<ItineraryDay>, TripError> {
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| TripError::InvalidShareLink(format!("bad token encoding: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(|e| TripError::InvalidShareLink(format!("bad itinerary data: {}", e)))
}

/// Build a link to `base_url` carrying the itinerary
pub fn share_link(base_url: &str, days: &[ItineraryDay]) -> Result<String, TripError> {
    let mut url = Url::parse(base_url).map_err(|e| TripError::InvalidShareLink(format!("{}: {}", base_url, e)))?;
    let token = encode_token(days)?;
    debug!(days = days.len(), token_length = token.len(), "Encoded share token");
    url.query_pairs_mut().append_pair(TRIP_PARAM, &token);
    Ok(url.into())
}

/// Recover the itinerary from a link produced by [`share_link`]
pub fn parse_share_link(link: &str) -> Result<Vec<ItineraryDay>, TripError> {
    let url = Url::parse(link).map_err(|e| TripError::InvalidShareLink(format!("{}: {}", link, e)))?;
    let token = url
        .query_pairs()
        .find(|(key, _)| key == TRIP_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| TripError::InvalidShareLink(format!("no {} parameter in {}", TRIP_PARAM, link)))?;
    decode_token(&token)
}
