//! Client state held by the controller.

use std::time::Duration;

use tokio::time::Instant;

use washbook_core::{Booking, Machine};

use crate::api::MachineBookings;
use crate::session::Session;

/// Which of the three top-level views is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Welcome,
    UserDashboard,
    AdminDashboard,
}

impl View {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::UserDashboard => "user dashboard",
            Self::AdminDashboard => "admin dashboard",
        }
    }
}

/// Toast severity, used as the banner's CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

impl MessageKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A transient message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: MessageKind,
    pub text: String,
    pub shown_at: Instant,
}

/// Holds at most one toast; showing a new one replaces the old one.
#[derive(Debug, Clone, Default)]
pub struct Banner {
    current: Option<Toast>,
}

impl Banner {
    pub fn show(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.current = Some(Toast {
            kind,
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    /// The toast, if it is younger than `ttl` at `now`.
    pub fn visible_at(&self, now: Instant, ttl: Duration) -> Option<&Toast> {
        self.current
            .as_ref()
            .filter(|t| now.saturating_duration_since(t.shown_at) < ttl)
    }

    /// Last toast shown regardless of age.
    pub const fn last(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Result of the most recent "check booked slots" query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    /// `YYYY-MM-DD` as entered.
    pub date: String,
    pub bookings: Vec<Booking>,
}

/// Everything the views render from.
///
/// Collections are snapshots: each successful fetch replaces the whole vector.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    pub session: Session,
    /// Bumped on every session transition; responses started under an older
    /// epoch are discarded.
    pub epoch: u64,
    pub view: View,
    pub machines: Vec<Machine>,
    /// Machines offered in the booking form, recomputed from `machines`.
    pub bookable: Vec<Machine>,
    pub user_bookings: Vec<Booking>,
    pub admin_machines: Vec<Machine>,
    pub all_bookings: Vec<Booking>,
    /// Admin toggle: include bookings that already ended.
    pub show_past: bool,
    pub slots: Option<SlotQuery>,
    pub slots_expanded: bool,
    pub machine_bookings: Option<MachineBookings>,
    pub banner: Banner,
}

impl ClientState {
    /// Replace everything tied to the previous session. Public machine data and
    /// the banner survive the transition.
    pub fn begin(&mut self, session: Session) {
        let next = Self {
            session,
            epoch: self.epoch.wrapping_add(1),
            machines: std::mem::take(&mut self.machines),
            bookable: std::mem::take(&mut self.bookable),
            banner: std::mem::take(&mut self.banner),
            ..Self::default()
        };
        *self = next;
    }
}
