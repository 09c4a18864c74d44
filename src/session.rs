//! Application session state
//!
//! Holds the current itinerary, the welcome flag and the two input locks:
//! the preference lock (MBTI and budget freeze after the first submission)
//! and the in-flight lock (at most one planning request at a time).

use crate::calendar::{export_calendar, CalendarExport};
use crate::client::{PlannerClient, TripForm};
use crate::itinerary::{placeholder_itinerary, ItineraryDay};
use crate::{Mbti, TripError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Clears the in-flight flag when dropped, on success, error or unwind
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        debug!("Input lock released");
    }
}

#[derive(Debug)]
pub struct AppState {
    itinerary: Vec<ItineraryDay>,
    show_welcome: bool,
    preferences_locked: bool,
    form: TripForm,
    in_flight: Arc<AtomicBool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AppState {
    pub fn new(show_welcome: bool) -> Self {
        Self {
            itinerary: placeholder_itinerary(),
            show_welcome,
            preferences_locked: false,
            form: TripForm::default(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn itinerary(&self) -> &[ItineraryDay] {
        &self.itinerary
    }

    pub fn form(&self) -> &TripForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TripForm {
        &mut self.form
    }

    pub fn show_welcome(&self) -> bool {
        self.show_welcome
    }

    pub fn preferences_locked(&self) -> bool {
        self.preferences_locked
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Complete the welcome screen. The prompt becomes the interests field.
    pub fn start_session(&mut self, prompt: &str, mbti: Option<Mbti>, budget: Option<&str>) {
        if !prompt.trim().is_empty() {
            self.form.interests = prompt.to_string();
        }
        if let Some(mbti) = mbti {
            self.form.mbti = mbti;
        }
        if let Some(budget) = budget {
            self.form.budget = budget.to_string();
        }
        self.show_welcome = false;
        info!(mbti = %self.form.mbti, budget = %self.form.budget, "Session started");
    }

    /// Take the in-flight lock, failing if a request is already outstanding
    pub fn lock_inputs(&self) -> Result<InFlightGuard, TripError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TripError::RequestInFlight)?;
        debug!("Input lock acquired");
        Ok(InFlightGuard {
            flag: Arc::clone(&self.in_flight),
        })
    }

    /// Replace the itinerary wholesale. An empty result keeps the current one.
    pub fn receive_itinerary(&mut self, days: Vec<ItineraryDay>) -> bool {
        if days.is_empty() {
            warn!("No itinerary received, keeping current plan");
            return false;
        }
        info!(days = days.len(), "Itinerary replaced");
        self.itinerary = days;
        true
    }

    /// Back to the welcome screen with the placeholder trip
    pub fn reset_session(&mut self) {
        self.show_welcome = true;
        self.preferences_locked = false;
        self.itinerary = placeholder_itinerary();
        info!("Session reset");
    }

    /// Ignored while preferences are locked
    pub fn set_mbti(&mut self, mbti: Mbti) -> bool {
        if self.preferences_locked {
            return false;
        }
        self.form.mbti = mbti;
        true
    }

    /// Ignored while preferences are locked
    pub fn set_budget(&mut self, budget: &str) -> bool {
        if self.preferences_locked {
            return false;
        }
        self.form.budget = budget.to_string();
        true
    }

    /// Validate the form and take the in-flight lock for one planning request.
    ///
    /// Returns the guard together with the form to send. Preferences lock and
    /// the interests field clears here, so the caller can await the planner
    /// without borrowing the session and hand the result to
    /// [`receive_itinerary`](Self::receive_itinerary) afterwards.
    pub fn begin_submission(&mut self) -> Result<(InFlightGuard, TripForm), TripError> {
        self.form.validate()?;
        let guard = self.lock_inputs()?;

        let form = self.form.clone();
        self.preferences_locked = true;
        self.form.interests.clear();
        Ok((guard, form))
    }

    /// Run one planning round trip under the in-flight lock.
    ///
    /// Validation failures send nothing and leave the session untouched. On
    /// success the interests field is cleared and preferences lock; on a
    /// planner error the itinerary is left as it was.
    pub async fn submit(&mut self, client: &PlannerClient) -> Result<bool, TripError> {
        let (_guard, form) = self.begin_submission()?;

        match client.plan(&form).await {
            Ok(days) => Ok(self.receive_itinerary(days)),
            Err(e) => {
                error!(error = %e, "Planning request failed");
                Err(e)
            }
        }
    }

    /// Calendar export of the current itinerary
    pub fn export_calendar(&self, trip_start: NaiveDate) -> Result<CalendarExport, TripError> {
        export_calendar(&self.itinerary, trip_start)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WelcomeState {
    show_welcome: bool,
}

/// Persists the welcome-screen flag across runs
#[derive(Debug, Clone)]
pub struct WelcomeStore {
    path: PathBuf,
}

impl WelcomeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/tripsonality/session.json`
    pub fn default_location() -> Result<Self, TripError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| TripError::Config("Could not determine data directory".into()))?
            .join("tripsonality");
        Ok(Self::new(data_dir.join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable state means the welcome screen shows
    pub fn load(&self) -> bool {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str::<WelcomeState>(&contents) {
                Ok(state) => state.show_welcome,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session state");
                    true
                }
            },
            Err(_) => true,
        }
    }

    pub fn save(&self, show_welcome: bool) -> Result<(), TripError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(&WelcomeState { show_welcome })?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}
