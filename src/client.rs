//! HTTP client for the remote trip planner

use crate::itinerary::{normalize, ItineraryDay, SummaryContext};
use crate::{parse_budget, Config, Mbti, TripError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

/// The trip form as the user fills it in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripForm {
    pub theme: String,
    pub location: String,
    /// Trip length in days, free text as typed
    pub dates: String,
    /// Interests and dislikes
    pub interests: String,
    pub mbti: Mbti,
    /// Budget label, e.g. "1500 USD"
    pub budget: String,
}

impl Default for TripForm {
    fn default() -> Self {
        Self {
            theme: "Movie".to_string(),
            location: "Los Angeles".to_string(),
            dates: "6".to_string(),
            interests: String::new(),
            mbti: Mbti::default(),
            budget: "1500 USD".to_string(),
        }
    }
}

impl TripForm {
    /// Check the required fields before anything is sent
    pub fn validate(&self) -> Result<(), TripError> {
        if self.location.trim().is_empty() {
            return Err(TripError::MissingField(
                "Please enter a location before generating an itinerary.".to_string(),
            ));
        }
        if self.dates.trim().is_empty() {
            return Err(TripError::MissingField(
                "Please enter the length of your trip before generating an itinerary.".to_string(),
            ));
        }
        Ok(())
    }

    /// Natural-language request sentence for the planner
    pub fn query(&self) -> String {
        let mut query = format!(
            "Plan a {}-day {} themed trip to {}.",
            self.dates.trim(),
            self.theme.trim(),
            self.location.trim()
        );
        let interests = self.interests.trim();
        if !interests.is_empty() {
            query.push_str(&format!(" Interests and dislikes: {}.", interests));
        }
        query
    }

    pub fn summary_context(&self) -> SummaryContext {
        SummaryContext::new(&self.theme, &self.location)
    }

    pub fn to_request(&self) -> Result<PlanRequest, TripError> {
        self.validate()?;
        Ok(PlanRequest {
            mbti: self.mbti,
            budget: parse_budget(&self.budget)?,
            query: self.query(),
            current_itinerary: None,
        })
    }
}

/// JSON body of the planning request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRequest {
    pub mbti: Mbti,
    pub budget: u32,
    pub query: String,
    /// Always sent as `null`
    pub current_itinerary: Option<Value>,
}

/// Client for the planning service
pub struct PlannerClient {
    http_client: Client,
    planner_url: String,
}

impl PlannerClient {
    pub fn new(config: &Config) -> Result<Self, TripError> {
        debug!(planner_url = %config.planner_url, "Creating planner client");
        let http_client = Client::builder()
            .user_agent(concat!("tripsonality/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http_client,
            planner_url: config.planner_url.clone(),
        })
    }

    pub fn planner_url(&self) -> &str {
        &self.planner_url
    }

    /// Send the form to the planner and normalize the reply.
    ///
    /// An empty result means the planner answered without a usable itinerary.
    #[instrument(level = "info", skip(self, form), fields(location = %form.location, mbti = %form.mbti))]
    pub async fn plan(&self, form: &TripForm) -> Result<Vec<ItineraryDay>, TripError> {
        let request = form.to_request()?;
        info!(query = %request.query, budget = request.budget, "Sending planning request");

        let start_time = std::time::Instant::now();
        let response = self.http_client.post(&self.planner_url).json(&request).send().await?;
        let status = response.status();

        info!(
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "Planning request completed"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Planner returned an error");
            return Err(TripError::PlannerStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let payload: Value = serde_json::from_str(&text)?;
        let days = normalize(&payload, &form.summary_context());

        if days.is_empty() {
            warn!("Planner response carried no itinerary");
        } else {
            info!(days = days.len(), "Received itinerary");
        }

        Ok(days)
    }
}
