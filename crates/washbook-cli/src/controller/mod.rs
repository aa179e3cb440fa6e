//! Client session controller.
//!
//! Owns the [`ClientState`] snapshot, the durable session mirror and the two
//! refresh loops. Every public operation updates the banner before returning,
//! so front ends only need to re-render.

mod commands;
mod dispatch;
mod session;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use washbook_core::{Booking, Config, Machine};

use crate::api::{ApiClient, ApiError};
use crate::app::{ClientState, MessageKind, Toast, View};
use crate::demo;
use crate::refresh::RefreshTask;
use crate::session::Session;
use crate::storage::KeyValueStore;
use crate::ui::{self, PageContext};

pub use commands::BookingForm;
pub use dispatch::Intent;

const NETWORK_ERROR: &str = "Network error. Please try again.";
const SESSION_EXPIRED: &str = "Session expired. Please login again.";

/// Errors returned by controller operations. The banner already carries the
/// user-facing text when one of these is returned.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Storage error: {0}")]
    Storage(#[from] washbook_core::Error),
}

/// Runtime knobs resolved from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub refresh_interval: Duration,
    pub message_ttl: Duration,
    pub max_machines: usize,
    pub demo_fallback: bool,
}

impl Settings {
    pub const fn from_config(config: &Config) -> Self {
        Self {
            refresh_interval: config.refresh.interval(),
            message_ttl: config.display.message_ttl(),
            max_machines: config.display.max_machines,
            demo_fallback: config.display.demo_fallback,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Default)]
struct Tasks {
    dashboard: Option<RefreshTask>,
    global: Option<RefreshTask>,
}

struct Inner {
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    settings: Settings,
    state: Mutex<ClientState>,
    tasks: Mutex<Tasks>,
}

/// Cheaply cloneable handle to the controller.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("base_url", &self.inner.api.base_url())
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl Controller {
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>, settings: Settings) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                settings,
                state: Mutex::new(ClientState::default()),
                tasks: Mutex::new(Tasks::default()),
            }),
        }
    }

    /// Restore the stored session, then load the public machine list.
    pub async fn start(&self) -> ClientState {
        self.restore().await;
        self.inner.load_machines().await;
        self.snapshot()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn snapshot(&self) -> ClientState {
        self.inner.state().clone()
    }

    pub fn view(&self) -> View {
        self.inner.state().view
    }

    pub fn session(&self) -> Session {
        self.inner.state().session.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn dashboard_refresh_active(&self) -> bool {
        self.inner
            .tasks()
            .dashboard
            .as_ref()
            .is_some_and(RefreshTask::is_running)
    }

    pub fn global_refresh_active(&self) -> bool {
        self.inner
            .tasks()
            .global
            .as_ref()
            .is_some_and(RefreshTask::is_running)
    }

    /// The banner message, if it has not yet expired.
    pub fn message(&self) -> Option<Toast> {
        self.inner
            .state()
            .banner
            .visible_at(Instant::now(), self.inner.settings.message_ttl)
            .cloned()
    }

    /// Render the visible view as HTML.
    pub fn render(&self) -> String {
        let state = self.snapshot();
        let toast = state
            .banner
            .visible_at(Instant::now(), self.inner.settings.message_ttl)
            .cloned();
        ui::page(
            &state,
            PageContext {
                now: chrono::Local::now().naive_local(),
                max_machines: self.inner.settings.max_machines,
                toast: toast.as_ref(),
            },
        )
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn show_welcome(&self) {
        self.inner.show_welcome();
    }

    pub async fn show_user_dashboard(&self) -> Result<(), ClientError> {
        self.inner.require_session("view your bookings")?;
        self.inner.show_user_dashboard().await;
        Ok(())
    }

    pub async fn show_admin_dashboard(&self) -> Result<(), ClientError> {
        self.inner.require_admin("open the admin dashboard")?;
        self.inner.show_admin_dashboard().await;
        Ok(())
    }

    /// Refetch everything the current view shows.
    pub async fn refresh(&self) {
        self.inner.refresh_all().await;
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn epoch(&self) -> u64 {
        self.state().epoch
    }

    fn notify(&self, kind: MessageKind, text: impl Into<String>) {
        let text = text.into();
        debug!(kind = kind.as_str(), %text, "Banner message");
        self.state().banner.show(kind, text);
    }

    /// Apply `f` only if no session transition happened since `epoch`.
    fn apply(&self, epoch: u64, f: impl FnOnce(&mut ClientState)) -> bool {
        let mut state = self.state();
        if state.epoch != epoch {
            debug!(
                started = epoch,
                current = state.epoch,
                "Discarding response from a previous session"
            );
            return false;
        }
        f(&mut *state);
        true
    }

    /// Fallback data for a failed list load, or `None` to keep the current
    /// snapshot.
    fn list_fallback<T>(&self, what: &str, err: &ApiError, demo: fn() -> Vec<T>) -> Option<Vec<T>> {
        if err.is_network() && self.settings.demo_fallback {
            warn!(list = what, error = %err, "Server unreachable, showing demo data");
            return Some(demo());
        }
        warn!(list = what, error = %err, "Failed to load list");
        None
    }

    // =========================================================================
    // Loaders
    // =========================================================================

    async fn load_machines(&self) {
        let epoch = self.epoch();
        let machines = match self.api.list_machines().await {
            Ok(machines) => machines,
            Err(e) => match self.list_fallback("machines", &e, demo::machines) {
                Some(machines) => machines,
                None => return,
            },
        };
        debug!(count = machines.len(), "Loaded machines");
        self.apply(epoch, |s| s.machines = machines);
    }

    async fn load_admin_machines(&self) {
        let epoch = self.epoch();
        let machines = match self.api.list_admin_machines().await {
            Ok(machines) => machines,
            Err(e) => match self.list_fallback("admin machines", &e, demo::machines) {
                Some(machines) => machines,
                None => return,
            },
        };
        self.apply(epoch, |s| s.admin_machines = machines);
    }

    async fn load_user_bookings(&self) {
        let (epoch, user_id) = {
            let state = self.state();
            (state.epoch, state.session.identity().map(|i| i.id))
        };
        let Some(user_id) = user_id else {
            return;
        };
        let bookings: Vec<Booking> = match self.api.user_bookings(user_id).await {
            Ok(bookings) => bookings,
            Err(e) => match self.list_fallback("user bookings", &e, demo::user_bookings) {
                Some(bookings) => bookings,
                None => return,
            },
        };
        self.apply(epoch, |s| s.user_bookings = bookings);
    }

    async fn load_all_bookings(&self) {
        let (epoch, show_past) = {
            let state = self.state();
            (state.epoch, state.show_past)
        };
        let bookings = match self.api.all_bookings(show_past).await {
            Ok(bookings) => bookings,
            Err(e) => match self.list_fallback("all bookings", &e, demo::all_bookings) {
                Some(bookings) => bookings,
                None => return,
            },
        };
        self.apply(epoch, |s| {
            // A toggle while the request was in flight has its own fetch.
            if s.show_past == show_past {
                s.all_bookings = bookings;
            }
        });
    }

    fn refresh_bookable(&self) {
        let mut state = self.state();
        let bookable: Vec<Machine> = ui::bookable_machines(&state.machines, self.settings.max_machines);
        state.bookable = bookable;
    }

    async fn load_admin_data(&self) {
        tokio::join!(self.load_admin_machines(), self.load_all_bookings());
    }

    async fn refresh_all(&self) {
        let view = self.state().view;
        self.load_machines().await;
        match view {
            View::UserDashboard => {
                self.load_user_bookings().await;
                self.refresh_bookable();
            }
            View::AdminDashboard => self.load_admin_data().await,
            View::Welcome => {}
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    fn set_view(&self, view: View) {
        debug!(view = view.as_str(), "Showing view");
        self.state().view = view;
    }

    fn show_welcome(&self) {
        self.stop_dashboard_loop();
        self.set_view(View::Welcome);
    }

    async fn show_user_dashboard(self: &Arc<Self>) {
        self.set_view(View::UserDashboard);
        self.start_dashboard_loop();
        tokio::join!(self.load_user_bookings(), self.load_machines());
        self.refresh_bookable();
    }

    async fn show_admin_dashboard(&self) {
        self.stop_dashboard_loop();
        self.set_view(View::AdminDashboard);
        self.load_admin_data().await;
    }

    // =========================================================================
    // Refresh loops
    // =========================================================================

    /// Start (or restart) the loop that keeps the booking form's machine list
    /// current while the user dashboard is shown.
    fn start_dashboard_loop(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let task = RefreshTask::spawn("dashboard", self.settings.refresh_interval, move || {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return std::ops::ControlFlow::Break(());
                };
                if inner.state().session.is_guest() {
                    return std::ops::ControlFlow::Break(());
                }
                inner.load_machines().await;
                inner.refresh_bookable();
                std::ops::ControlFlow::Continue(())
            }
        });
        // Replacing the handle cancels the previous loop.
        self.tasks().dashboard = Some(task);
    }

    fn stop_dashboard_loop(&self) {
        if let Some(task) = self.tasks().dashboard.take() {
            debug!(task = task.name(), "Stopping refresh loop");
            task.stop();
        }
    }

    /// Start (or restart) the session-wide loop.
    fn start_global_loop(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let task = RefreshTask::spawn("global", self.settings.refresh_interval, move || {
            let weak = weak.clone();
            async move {
                let Some(inner) = weak.upgrade() else {
                    return std::ops::ControlFlow::Break(());
                };
                let session = inner.state().session.clone();
                match session {
                    Session::Guest => {}
                    Session::Admin(_) => {
                        inner.load_machines().await;
                        inner.load_admin_data().await;
                    }
                    Session::User(_) => {
                        inner.load_machines().await;
                        inner.load_user_bookings().await;
                    }
                }
                std::ops::ControlFlow::Continue(())
            }
        });
        self.tasks().global = Some(task);
    }

    fn stop_loops(&self) {
        let Tasks { dashboard, global } = std::mem::take(&mut *self.tasks());
        for task in dashboard.into_iter().chain(global) {
            debug!(task = task.name(), "Stopping refresh loop");
            task.stop();
        }
    }
}
