//! Domain types shared between the API client and the views.
//!
//! Field names follow the booking server's JSON so these structs deserialize
//! straight from its responses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Authenticated person as returned by the login/registration endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Identity {
    /// An identity is only trusted when it has both an id and a display name.
    pub fn is_valid(&self) -> bool {
        self.id != 0 && !self.username.trim().is_empty()
    }
}

/// Role of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Guest,
    User,
    Admin,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine status as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Available,
    InUse,
    Broken,
    /// Any value the server may add later. Displayed as available, never
    /// counted in the admin summary.
    #[serde(other)]
    Unknown,
}

impl MachineStatus {
    pub const ALL: [Self; 3] = [Self::Available, Self::InUse, Self::Broken];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::InUse => "in_use",
            Self::Broken => "broken",
            Self::Unknown => "unknown",
        }
    }

    /// Status used for display and booking eligibility.
    pub const fn effective(self) -> Self {
        match self {
            Self::InUse => Self::InUse,
            Self::Broken => Self::Broken,
            Self::Available | Self::Unknown => Self::Available,
        }
    }

    /// Banner text on public machine cards.
    pub const fn headline(self) -> &'static str {
        match self.effective() {
            Self::Broken => "OUT OF ORDER",
            Self::InUse => "CURRENTLY IN USE",
            _ => "CURRENTLY AVAILABLE",
        }
    }

    /// Lower-case human text, e.g. "in use".
    pub fn human(self) -> String {
        self.as_str().replacen('_', " ", 1)
    }

    pub const fn is_bookable(self) -> bool {
        matches!(self.effective(), Self::Available)
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MachineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "available" => Ok(Self::Available),
            "in_use" => Ok(Self::InUse),
            "broken" => Ok(Self::Broken),
            other => Err(format!(
                "unknown machine status '{other}' (expected available, in_use or broken)"
            )),
        }
    }
}

/// Washing machine snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub machine_name: String,
    pub status: MachineStatus,
    #[serde(default)]
    pub last_used_by: Option<i64>,
    #[serde(default)]
    pub last_used_by_name: Option<String>,
    #[serde(default)]
    pub last_used_time: Option<String>,
}

impl Machine {
    pub fn new(id: i64, name: impl Into<String>, status: MachineStatus) -> Self {
        Self {
            id,
            machine_name: name.into(),
            status,
            last_used_by: None,
            last_used_by_name: None,
            last_used_time: None,
        }
    }
}

/// Booking as listed by any of the booking endpoints.
///
/// The endpoints return different subsets of columns, so everything beyond
/// id, times and status is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    #[serde(default)]
    pub machine_id: Option<i64>,
    #[serde(default)]
    pub machine_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Booking {
    /// Only pending bookings can be cancelled from the personal list.
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case("pending")
    }
}
