// src/mcp_server.rs

use anyhow::Result;
use chrono::NaiveDate;
use rmcp::{
    model::{ServerCapabilities, ServerInfo},
    schemars, tool,
    transport::stdio,
    ServerHandler, ServiceExt,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use tripsonality::guides::{self, GuideTab};
use tripsonality::logging::init_file_logging;
use tripsonality::{
    extract_locations, parse_share_link, share_link, AppState, Config, Mbti, PlannerClient, TripError,
};

/// Trip planning MCP server. Holds one planning session.
#[derive(Clone)]
pub struct TripServer {
    config: Config,
    state: Arc<Mutex<AppState>>,
}

impl TripServer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(AppState::new(false))),
        }
    }
}

fn error_json(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}

#[derive(Debug, Deserialize, Clone, schemars::JsonSchema)]
pub struct PlanParams {
    #[schemars(description = "Destination (e.g., Los Angeles, Tokyo)")]
    pub location: String,
    #[schemars(description = "Trip length in days (e.g., 6)")]
    pub dates: String,
    #[schemars(description = "Trip theme (e.g., Movie, Food, Tech). Defaults to Movie")]
    pub theme: Option<String>,
    #[schemars(description = "Interests and dislikes, free text")]
    pub interests: Option<String>,
    #[schemars(description = "MBTI personality type (e.g., INFJ). Ignored after the first plan of a session")]
    pub mbti: Option<String>,
    #[schemars(description = "Budget: 500 USD, 1000 USD, 1500 USD, 2000 USD or 2500+ USD. Ignored after the first plan of a session")]
    pub budget: Option<String>,
}

#[derive(Debug, Deserialize, Clone, schemars::JsonSchema)]
pub struct ExportParams {
    #[schemars(description = "First day of the trip in YYYY-MM-DD format (default: today)")]
    pub start_date: Option<String>,
    #[schemars(description = "Directory to write trip-itinerary.ics into. When omitted only the content is returned")]
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone, schemars::JsonSchema)]
pub struct ShareParams {
    #[schemars(description = "Base URL for the link (default: configured share URL)")]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, schemars::JsonSchema)]
pub struct OpenShareParams {
    #[schemars(description = "A share link produced by share_itinerary")]
    pub link: String,
}

#[derive(Debug, Deserialize, Clone, schemars::JsonSchema)]
pub struct GuideSearchParams {
    #[schemars(description = "Filter by location or username")]
    pub search: Option<String>,
    #[schemars(description = "Tab: all, itineraries or lists (default: all)")]
    pub tab: Option<String>,
}

#[tool(tool_box)]
impl TripServer {
    /// Plan a trip and make it the session's current itinerary
    #[tool(description = "Plan a trip with the remote planner. The returned itinerary replaces the session's current one.")]
    async fn plan_itinerary(&self, #[tool(aggr)] params: PlanParams) -> String {
        info!(
            location = %params.location,
            dates = %params.dates,
            theme = params.theme.as_deref().unwrap_or("Movie"),
            "Plan request received"
        );

        let mbti = match params.mbti.as_deref().map(str::parse::<Mbti>).transpose() {
            Ok(mbti) => mbti,
            Err(e) => return error_json(e),
        };

        let client = match PlannerClient::new(&self.config) {
            Ok(client) => client,
            Err(e) => return error_json(e),
        };

        // The session mutex is only held to stage the request and to store the
        // result. The in-flight guard spans the planner call.
        let (_guard, form) = {
            let mut state = self.state.lock().await;
            if state.is_in_flight() {
                warn!("Plan request rejected, another request is in flight");
                return error_json(TripError::RequestInFlight);
            }

            let form = state.form_mut();
            form.location = params.location;
            form.dates = params.dates;
            if let Some(theme) = params.theme {
                form.theme = theme;
            }
            form.interests = params.interests.unwrap_or_default();

            if let Some(mbti) = mbti {
                if !state.set_mbti(mbti) {
                    debug!("Preferences locked, keeping session MBTI");
                }
            }
            if let Some(budget) = params.budget {
                if !state.set_budget(&budget) {
                    debug!("Preferences locked, keeping session budget");
                }
            }

            match state.begin_submission() {
                Ok(submission) => submission,
                Err(e) => {
                    warn!("Plan request rejected: {}", e);
                    return error_json(e);
                }
            }
        };

        let days = match client.plan(&form).await {
            Ok(days) => days,
            Err(e) => {
                error!("Plan request failed: {}", e);
                return error_json(format!("Planning failed: {}", e));
            }
        };

        let mut state = self.state.lock().await;
        if state.receive_itinerary(days) {
            info!(days = state.itinerary().len(), "Plan stored in session");
            serde_json::json!({ "itinerary": state.itinerary() }).to_string()
        } else {
            serde_json::json!({
                "itinerary": state.itinerary(),
                "message": "The planner returned no itinerary; the previous plan was kept."
            })
            .to_string()
        }
    }

    #[tool(description = "Return the session's current itinerary.")]
    async fn current_itinerary(&self) -> String {
        let state = self.state.lock().await;
        serde_json::json!({ "itinerary": state.itinerary() }).to_string()
    }

    #[tool(description = "Export the current itinerary as an iCalendar document (trip-itinerary.ics).")]
    async fn export_calendar(&self, #[tool(aggr)] params: ExportParams) -> String {
        let start = match params.start_date.as_deref() {
            Some(date) => match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                Ok(date) => date,
                Err(e) => return error_json(format!("Invalid start_date {}: {}", date, e)),
            },
            None => chrono::Local::now().date_naive(),
        };

        let export = {
            let state = self.state.lock().await;
            match state.export_calendar(start) {
                Ok(export) => export,
                Err(e) => {
                    error!("Calendar export failed: {}", e);
                    return error_json(e);
                }
            }
        };

        let written = match params.output_dir.map(PathBuf::from) {
            Some(dir) => match export.write_to(&dir) {
                Ok(path) => Some(path.display().to_string()),
                Err(e) => return error_json(e),
            },
            None => None,
        };

        serde_json::json!({
            "file_name": export.file_name,
            "mime_type": export.mime_type,
            "path": written,
            "content": export.content,
        })
        .to_string()
    }

    #[tool(description = "List map markers (name and coordinates) for the current itinerary.")]
    async fn map_locations(&self) -> String {
        let state = self.state.lock().await;
        let locations = extract_locations(state.itinerary());
        debug!(locations = locations.len(), "Extracted map locations");
        serde_json::json!({ "locations": locations }).to_string()
    }

    #[tool(description = "Create a share link carrying the current itinerary.")]
    async fn share_itinerary(&self, #[tool(aggr)] params: ShareParams) -> String {
        let base_url = params.base_url.unwrap_or_else(|| self.config.share_base_url.clone());
        let state = self.state.lock().await;
        match share_link(&base_url, state.itinerary()) {
            Ok(url) => serde_json::json!({ "url": url }).to_string(),
            Err(e) => error_json(e),
        }
    }

    #[tool(description = "Load the itinerary carried by a share link into the session.")]
    async fn open_share_link(&self, #[tool(aggr)] params: OpenShareParams) -> String {
        match parse_share_link(&params.link) {
            Ok(days) => {
                let mut state = self.state.lock().await;
                state.receive_itinerary(days);
                serde_json::json!({ "itinerary": state.itinerary() }).to_string()
            }
            Err(e) => {
                warn!("Rejected share link: {}", e);
                error_json(e)
            }
        }
    }

    #[tool(description = "Start over with the sample itinerary and unlocked preferences.")]
    async fn reset_session(&self) -> String {
        let mut state = self.state.lock().await;
        state.reset_session();
        serde_json::json!({ "message": "Session reset" }).to_string()
    }

    #[tool(description = "Browse featured inspiration guides, optionally filtered by location/username and tab.")]
    async fn search_guides(&self, #[tool(aggr)] params: GuideSearchParams) -> String {
        let tab = match params.tab.as_deref().unwrap_or("all").parse::<GuideTab>() {
            Ok(tab) => tab,
            Err(e) => return error_json(e),
        };
        let results = guides::search(params.search.as_deref().unwrap_or(""), tab);
        serde_json::json!({ "guides": results, "welcome_prompts": guides::WELCOME_PROMPTS }).to_string()
    }
}

#[tool(tool_box)]
impl ServerHandler for TripServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("A trip planning server. Plan an itinerary, then export it to a calendar, list its map locations or share it. Inspiration guides are available without planning.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = init_file_logging(&PathBuf::from("logs"), "tripsonality-mcp.log") {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = Config::load()?;
    info!(planner_url = %config.planner_url, "Starting trip planning MCP server");

    let server = TripServer::new(config);
    let transport = stdio();

    let service = server.serve(transport).await?;
    info!("MCP service started, waiting for requests");

    service.waiting().await?;

    info!("MCP service shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    fn plan_params() -> PlanParams {
        PlanParams {
            location: "Tokyo".to_string(),
            dates: "3".to_string(),
            theme: Some("Tech".to_string()),
            interests: None,
            mbti: None,
            budget: None,
        }
    }

    /// A server whose planner accepts the connection and never answers
    async fn server_with_silent_planner() -> (TripServer, TcpListener) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = Config {
            planner_url: format!("http://{}/plan", listener.local_addr().unwrap()),
            request_timeout_secs: 30,
            ..Config::default()
        };
        (TripServer::new(config), listener)
    }

    #[tokio::test]
    async fn test_reads_do_not_wait_for_planner() {
        let (server, listener) = server_with_silent_planner().await;

        let planning = tokio::spawn({
            let server = server.clone();
            async move { server.plan_itinerary(plan_params()).await }
        });
        let (socket, _) = timeout(Duration::from_secs(5), listener.accept()).await.unwrap().unwrap();

        let locations: Value = serde_json::from_str(
            &timeout(Duration::from_secs(1), server.map_locations()).await.unwrap(),
        )
        .unwrap();
        assert!(!locations["locations"].as_array().unwrap().is_empty());
        assert!(timeout(Duration::from_secs(1), server.current_itinerary()).await.is_ok());
        assert!(server.state.lock().await.is_in_flight());

        drop(socket);
        let result: Value = serde_json::from_str(&planning.await.unwrap()).unwrap();
        assert!(result["error"].as_str().unwrap().starts_with("Planning failed"));
        assert!(!server.state.lock().await.is_in_flight());
    }

    #[tokio::test]
    async fn test_second_plan_is_rejected_while_in_flight() {
        let (server, listener) = server_with_silent_planner().await;

        let planning = tokio::spawn({
            let server = server.clone();
            async move { server.plan_itinerary(plan_params()).await }
        });
        let (socket, _) = timeout(Duration::from_secs(5), listener.accept()).await.unwrap().unwrap();

        let second: Value = serde_json::from_str(
            &timeout(Duration::from_secs(1), server.plan_itinerary(plan_params())).await.unwrap(),
        )
        .unwrap();
        assert_eq!(second["error"], TripError::RequestInFlight.to_string());

        drop(socket);
        planning.await.unwrap();
    }

    #[tokio::test]
    async fn test_plan_is_not_blocked_by_a_reader() {
        let (server, listener) = server_with_silent_planner().await;

        let reader = server.state.lock().await;
        let planning = tokio::spawn({
            let server = server.clone();
            async move { server.plan_itinerary(plan_params()).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(reader);

        let (socket, _) = timeout(Duration::from_secs(5), listener.accept()).await.unwrap().unwrap();
        drop(socket);
        let result: Value = serde_json::from_str(&planning.await.unwrap()).unwrap();
        assert_ne!(result["error"], TripError::RequestInFlight.to_string());
    }

    #[tokio::test]
    async fn test_search_guides_lists_welcome_prompts() {
        let server = TripServer::new(Config::default());
        let result: Value = serde_json::from_str(
            &server
                .search_guides(GuideSearchParams {
                    search: None,
                    tab: None,
                })
                .await,
        )
        .unwrap();
        assert_eq!(result["guides"].as_array().unwrap().len(), 6);
        assert_eq!(result["welcome_prompts"][0], guides::WELCOME_PROMPTS[0]);
    }
}
