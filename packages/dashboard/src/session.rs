//! The owned dashboard session.
//!
//! [`DashboardSession`] is the single owner of all transient state: the
//! point store, selection and filters, reference lists, notifications,
//! and the activity feed. It is mutated from one control flow only.
//!
//! Reloads are tagged with a monotonically increasing token. A reload is
//! split into [`DashboardSession::begin_reload`], which issues a
//! [`ReloadTicket`], and [`DashboardSession::complete_reload`], which
//! applies the fetched data only if no newer reload has started since.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mls_locator_client::{ApiError, PointApi};
use mls_locator_config::{LoadingConfig, LocatorConfig};
use mls_locator_point_models::{District, Mandal, PointRecord, PointStatus};

use crate::fallback;
use crate::filter::{SelectionState, page_count};
use crate::loader::{self, DataOrigin, DistrictLoad, SampleLoad};
use crate::notify::{ActivityLog, Level, NotificationCenter};
use crate::progress::ProgressCallback;
use crate::stats::PointStats;
use crate::store::PointStore;

/// What the main panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Ready,
    /// A mandal point load failed or came back empty. Cleared by the next
    /// successful load or [`DashboardSession::retry`].
    Error(String),
}

/// Backend reachability as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Unknown,
    Online,
    Demo,
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "Checking",
            Self::Online => "Online",
            Self::Demo => "Demo mode",
        })
    }
}

/// Issued by [`DashboardSession::begin_reload`]; identifies one reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadTicket {
    token: u64,
    district: Option<District>,
}

impl ReloadTicket {
    #[must_use]
    pub const fn district(&self) -> Option<&District> {
        self.district.as_ref()
    }
}

/// Data fetched by one reload.
#[derive(Debug, Clone, PartialEq)]
pub enum ReloadOutcome {
    District(DistrictLoad),
    Sample(SampleLoad),
}

/// Runs the fetch cascade for `ticket` without touching any session
/// state.
pub async fn fetch_for<A: PointApi + ?Sized>(
    api: &A,
    ticket: &ReloadTicket,
    config: &LoadingConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> ReloadOutcome {
    match &ticket.district {
        Some(district) => ReloadOutcome::District(
            loader::load_district(api, &district.code, config, progress).await,
        ),
        None => ReloadOutcome::Sample(loader::load_sample(api, config, progress).await),
    }
}

#[derive(Debug)]
pub struct DashboardSession {
    loading: LoadingConfig,
    fallback_user: String,

    store: PointStore,
    selection: SelectionState,
    districts: Vec<District>,
    mandals: Vec<Mandal>,
    codes: Vec<String>,
    origin: DataOrigin,
    view: ViewState,
    reload_token: u64,
    selected_point: Option<String>,
    last_updated: Option<DateTime<Utc>>,

    user: String,
    connectivity: Connectivity,
    notifications: NotificationCenter,
    activity: ActivityLog,
}

impl DashboardSession {
    #[must_use]
    pub fn new(config: &LocatorConfig) -> Self {
        Self {
            loading: config.loading.clone(),
            fallback_user: config.session.fallback_user.clone(),
            store: PointStore::new(),
            selection: SelectionState::default(),
            districts: Vec::new(),
            mandals: Vec::new(),
            codes: Vec::new(),
            origin: DataOrigin::Live,
            view: ViewState::Loading,
            reload_token: 0,
            selected_point: None,
            last_updated: None,
            user: config.session.fallback_user.clone(),
            connectivity: Connectivity::Unknown,
            notifications: NotificationCenter::new(config.session.notification_ttl()),
            activity: ActivityLog::default(),
        }
    }

    // ── Reference data ───────────────────────────────────────────────

    /// Fetches the current user, keeping the fallback name on failure.
    pub async fn load_user<A: PointApi + ?Sized>(&mut self, api: &A) {
        match api.current_user().await {
            Ok(info) if !info.user.trim().is_empty() => self.user = info.user,
            Ok(_) => self.user.clone_from(&self.fallback_user),
            Err(e) => {
                log::warn!("Failed to load user info, using fallback: {e}");
                self.user.clone_from(&self.fallback_user);
            }
        }
    }

    /// Probes the backend and records whether it is reachable.
    pub async fn check_health<A: PointApi + ?Sized>(&mut self, api: &A) -> Connectivity {
        self.connectivity = match api.health().await {
            Ok(health) => {
                log::debug!("Health: {health:?}");
                Connectivity::Online
            }
            Err(e) => {
                log::warn!("Health check failed, using demo mode: {e}");
                Connectivity::Demo
            }
        };
        self.connectivity
    }

    /// Loads the district list, substituting the built-in list on
    /// failure.
    pub async fn load_districts<A: PointApi + ?Sized>(&mut self, api: &A) {
        match api.districts().await {
            Ok(districts) => {
                log::info!("Loaded {} districts", districts.len());
                self.districts = districts;
            }
            Err(e) => {
                log::warn!("Failed to load districts: {e}");
                self.districts = fallback::fallback_districts();
                self.notify(
                    Level::Warning,
                    "Could not load districts from the server. Using the built-in list.",
                );
            }
        }
    }

    /// Loads the full code list used for autocomplete.
    pub async fn load_codes<A: PointApi + ?Sized>(&mut self, api: &A) {
        match api.all_codes().await {
            Ok(codes) => {
                log::info!("Loaded {} point codes", codes.len());
                self.codes = codes;
            }
            Err(e) => {
                log::warn!("Failed to load point codes: {e}");
                self.codes.clear();
                self.notify(Level::Warning, "Code suggestions are unavailable.");
            }
        }
    }

    // ── Reload ───────────────────────────────────────────────────────

    /// Starts a reload for `district` (`None` = all districts). Selection
    /// resets, and any reload still in flight becomes stale.
    pub fn begin_reload(&mut self, district: Option<District>) -> ReloadTicket {
        self.reload_token += 1;
        self.selection.set_district(district.clone());
        self.selected_point = None;
        self.view = ViewState::Loading;

        let message = district.as_ref().map_or_else(
            || "Loading data for all districts...".to_string(),
            |d| format!("Loading data for {} district...", d.name),
        );
        self.notify(Level::Info, message);

        ReloadTicket {
            token: self.reload_token,
            district,
        }
    }

    /// Whether `ticket` belongs to the newest reload.
    #[must_use]
    pub fn is_current(&self, ticket: &ReloadTicket) -> bool {
        ticket.token == self.reload_token
    }

    /// Applies `outcome` if `ticket` is still current. Returns `false`
    /// (and changes nothing) for a stale ticket.
    pub fn complete_reload(&mut self, ticket: &ReloadTicket, outcome: ReloadOutcome) -> bool {
        if !self.is_current(ticket) {
            log::info!(
                "Discarding stale reload {} (current is {})",
                ticket.token,
                self.reload_token
            );
            return false;
        }

        let now = Utc::now();
        match outcome {
            ReloadOutcome::District(load) => self.apply_district(ticket, load, now),
            ReloadOutcome::Sample(load) => self.apply_sample(load, now),
        }
        self.last_updated = Some(now);
        true
    }

    fn apply_district(&mut self, ticket: &ReloadTicket, load: DistrictLoad, now: DateTime<Utc>) {
        let name = ticket
            .district
            .as_ref()
            .map_or_else(String::new, |d| d.name.clone());

        self.origin = DataOrigin::Live;
        self.mandals = load.mandals;
        self.store.replace_all(load.points);

        self.view = ViewState::Ready;
        if let Some(error) = &load.mandal_error {
            log::warn!("No mandals for {name}, continuing with an empty district: {error}");
            self.notify(
                Level::Warning,
                format!("No mandals found for {name} district."),
            );
        } else if !load.failed_mandals.is_empty() {
            self.notify(
                Level::Warning,
                format!(
                    "{} of {} mandals could not be loaded",
                    load.failed_mandals.len(),
                    self.mandals.len()
                ),
            );
        }
        self.activity.record(
            "District Selected",
            format!(
                "Loaded {} MLS points for {name} district",
                self.store.len()
            ),
            now,
        );
        if load.mandal_error.is_none() {
            self.notify(Level::Success, "Data loaded successfully!");
        }
    }

    fn apply_sample(&mut self, load: SampleLoad, now: DateTime<Utc>) {
        self.origin = load.origin;
        self.store.replace_all(load.points);
        self.mandals.clear();
        self.view = ViewState::Ready;

        match load.origin {
            DataOrigin::Live => {
                self.activity.record(
                    "Data Loaded",
                    format!(
                        "Loaded sample data from {} MLS points across all districts",
                        self.store.len()
                    ),
                    now,
                );
                self.notify(Level::Success, "Data loaded successfully!");
            }
            DataOrigin::Demo => {
                self.activity.record(
                    "Fallback Data",
                    "Using sample data for demonstration",
                    now,
                );
                self.notify(Level::Warning, "Using demo data - API connection failed.");
            }
        }
    }

    /// Begins, runs, and completes a reload in one call.
    pub async fn reload<A: PointApi + ?Sized>(
        &mut self,
        api: &A,
        district: Option<District>,
        progress: &Arc<dyn ProgressCallback>,
    ) -> bool {
        let ticket = self.begin_reload(district);
        let outcome = fetch_for(api, &ticket, &self.loading, progress).await;
        self.complete_reload(&ticket, outcome)
    }

    /// Clears every selection and notification, then reloads all
    /// districts.
    pub async fn retry<A: PointApi + ?Sized>(
        &mut self,
        api: &A,
        progress: &Arc<dyn ProgressCallback>,
    ) -> bool {
        log::info!("Retrying from a clean selection");
        self.selection.reset();
        self.selected_point = None;
        self.notifications.clear();
        self.reload(api, None, progress).await
    }

    /// Fetches one district/mandal pair and merges the points into the
    /// store by code. A failed or empty fetch puts the view into
    /// [`ViewState::Error`]. Returns the number of points merged.
    pub async fn load_mandal<A: PointApi + ?Sized>(
        &mut self,
        api: &A,
        district: &District,
        mandal: &str,
    ) -> usize {
        let now = Utc::now();
        let points = match api.points(&district.code, mandal).await {
            Ok(points) => points,
            Err(e) => {
                log::warn!("Failed to load points for {}/{mandal}: {e}", district.code);
                Vec::new()
            }
        };

        self.last_updated = Some(now);
        if points.is_empty() {
            self.view = ViewState::Error(
                "No MLS points found for the selected district and mandal.".to_string(),
            );
            self.notify(Level::Info, "No MLS points found for the selected area.");
            return 0;
        }

        let count = points.len();
        self.origin = DataOrigin::Live;
        self.store.upsert_many(points);
        self.view = ViewState::Ready;
        self.activity.record(
            "Mandal Loaded",
            format!("Loaded {count} MLS points for {mandal}, {}", district.name),
            now,
        );
        self.notify(Level::Success, "Data loaded successfully!");
        count
    }

    // ── Search & selection ───────────────────────────────────────────

    /// Looks up one code and upserts the result. On failure an error
    /// notification is raised and the store is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] from the lookup.
    pub async fn search<A: PointApi + ?Sized>(
        &mut self,
        api: &A,
        code: &str,
    ) -> Result<PointRecord, ApiError> {
        let code = code.trim();
        match api.search(code).await {
            Ok(point) => {
                self.store.upsert_one(point.clone());
                self.selected_point = Some(point.code.clone());
                self.notify(Level::Success, format!("Found MLS point: {}", point.code));
                self.activity.record(
                    "Point Found",
                    format!("{} - {}", point.code, point.name),
                    Utc::now(),
                );
                Ok(point)
            }
            Err(e) => {
                let message = if e.is_not_found() {
                    format!("MLS code not found: {code}")
                } else {
                    format!("Search failed: {e}")
                };
                self.notify(Level::Error, message);
                Err(e)
            }
        }
    }

    /// Marks `code` as the point shown in the detail panel.
    pub fn select_point(&mut self, code: &str) -> Option<&PointRecord> {
        if self.store.contains(code) {
            self.selected_point = Some(code.to_string());
            self.store.get(code)
        } else {
            None
        }
    }

    #[must_use]
    pub fn selected_point(&self) -> Option<&PointRecord> {
        self.selected_point
            .as_deref()
            .and_then(|code| self.store.get(code))
    }

    pub fn clear_selected_point(&mut self) {
        self.selected_point = None;
    }

    // ── Filters ──────────────────────────────────────────────────────

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.selection.set_search(search);
    }

    pub fn set_status(&mut self, status: Option<PointStatus>) {
        self.selection.set_status(status);
    }

    pub fn set_mandal(&mut self, mandal: Option<String>) {
        self.selection.set_mandal(mandal);
    }

    pub fn clear_filters(&mut self) {
        self.selection.clear_filters();
    }

    pub fn next_page(&mut self) -> bool {
        let count = self.filtered().len();
        self.selection.next_page(count)
    }

    pub const fn prev_page(&mut self) -> bool {
        self.selection.prev_page()
    }

    pub fn go_to_page(&mut self, page: usize) {
        let count = self.filtered().len();
        self.selection.go_to_page(page, count);
    }

    /// Points passing the current filters, in store order.
    #[must_use]
    pub fn filtered(&self) -> Vec<&PointRecord> {
        self.selection.filter().apply(self.store.all())
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        page_count(self.filtered().len())
    }

    // ── Derived & accessors ──────────────────────────────────────────

    #[must_use]
    pub fn stats(&self) -> PointStats {
        PointStats::compute(self.store.all())
    }

    /// Display name for a district code, falling back to the code.
    #[must_use]
    pub fn district_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.districts
            .iter()
            .find(|d| d.code == code)
            .map_or(code, |d| d.name.as_str())
    }

    /// The known district with `code`, or an ad-hoc one named after the
    /// code.
    #[must_use]
    pub fn district_by_code(&self, code: &str) -> District {
        self.districts
            .iter()
            .find(|d| d.code == code)
            .cloned()
            .unwrap_or_else(|| District::new(code, code))
    }

    /// Raises a notification.
    pub fn notify(&mut self, level: Level, message: impl Into<String>) -> u64 {
        self.notifications.push(level, message, Utc::now())
    }

    /// Adds an entry to the activity feed.
    pub fn record_activity(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.activity.record(title, description, Utc::now());
    }

    #[must_use]
    pub const fn store(&self) -> &PointStore {
        &self.store
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    #[must_use]
    pub fn selected_district(&self) -> Option<&District> {
        self.selection.district()
    }

    #[must_use]
    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    #[must_use]
    pub fn mandals(&self) -> &[Mandal] {
        &self.mandals
    }

    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    #[must_use]
    pub const fn origin(&self) -> DataOrigin {
        self.origin
    }

    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    #[must_use]
    pub const fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    #[must_use]
    pub const fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub const fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    #[must_use]
    pub const fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    #[must_use]
    pub const fn loading_config(&self) -> &LoadingConfig {
        &self.loading
    }
}
