//! Session model and its durable mirror.

use tracing::{debug, warn};

use washbook_core::{Identity, Result, Role};

use crate::storage::KeyValueStore;

/// Storage key holding the serialized identity.
pub const CURRENT_USER_KEY: &str = "currentUser";
/// Storage key holding `"true"` / `"false"`.
pub const IS_ADMIN_KEY: &str = "isAdmin";

/// The client's belief about who is logged in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Guest,
    User(Identity),
    Admin(Identity),
}

impl Session {
    pub fn new(identity: Identity, role: Role) -> Self {
        match role {
            Role::Guest => Self::Guest,
            Role::User => Self::User(identity),
            Role::Admin => Self::Admin(identity),
        }
    }

    pub const fn role(&self) -> Role {
        match self {
            Self::Guest => Role::Guest,
            Self::User(_) => Role::User,
            Self::Admin(_) => Role::Admin,
        }
    }

    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Guest => None,
            Self::User(identity) | Self::Admin(identity) => Some(identity),
        }
    }

    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    /// Credential for authenticated calls: the raw identity id.
    pub fn bearer(&self) -> Option<i64> {
        self.identity().map(|i| i.id).filter(|id| *id != 0)
    }

    pub fn username(&self) -> Option<&str> {
        self.identity().map(|i| i.username.as_str())
    }
}

/// What was found in durable storage at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restored {
    /// Nothing stored.
    Missing,
    /// A stored identity that passed validation.
    Valid(Session),
    /// Stored data that could not be trusted, with the reason.
    Invalid(String),
}

/// Read the stored session without trusting anything that fails validation.
pub fn load(store: &dyn KeyValueStore) -> Restored {
    let raw = match store.get(CURRENT_USER_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Restored::Missing,
        Err(e) => return Restored::Invalid(e.to_string()),
    };
    let identity: Identity = match serde_json::from_str(&raw) {
        Ok(identity) => identity,
        Err(e) => return Restored::Invalid(format!("unreadable identity: {e}")),
    };
    if !identity.is_valid() {
        return Restored::Invalid("identity lacks an id or a name".into());
    }
    let is_admin = matches!(store.get(IS_ADMIN_KEY), Ok(Some(flag)) if flag == "true");
    let role = if is_admin { Role::Admin } else { Role::User };
    debug!(user_id = identity.id, %role, "Stored session is valid");
    Restored::Valid(Session::new(identity, role))
}

/// Mirror a session into storage. Guests are stored as "nothing".
pub fn persist(store: &dyn KeyValueStore, session: &Session) -> Result<()> {
    match session.identity() {
        Some(identity) => {
            store.set(CURRENT_USER_KEY, &serde_json::to_string(identity)?)?;
            store.set(IS_ADMIN_KEY, if session.is_admin() { "true" } else { "false" })
        }
        None => clear(store),
    }
}

/// Remove both session keys. Both removals are attempted even if the first
/// fails.
pub fn clear(store: &dyn KeyValueStore) -> Result<()> {
    let user = store.remove(CURRENT_USER_KEY);
    let admin = store.remove(IS_ADMIN_KEY);
    if let Err(ref e) = user {
        warn!(error = %e, key = CURRENT_USER_KEY, "Failed to clear stored session");
    }
    user.and(admin)
}
