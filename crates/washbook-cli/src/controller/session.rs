//! Login, registration, restore and logout.

use std::sync::Arc;

use tracing::{info, warn};

use washbook_core::{Identity, Role};

use super::{ClientError, Controller, Inner, NETWORK_ERROR};
use crate::api::{AdminCredentials, ApiError, Registration, StudentCredentials};
use crate::app::{MessageKind, View};
use crate::session::{self, Restored, Session};

const GOOGLE_CONFIG_ERROR: &str =
    "Google Sign-In configuration error. Please contact administrator.";
const GOOGLE_RETRY: &str = "Google Sign-In failed. Please try again.";

impl Controller {
    /// Manual administrator login.
    pub async fn login_admin(&self, admin_id: &str, password: &str) -> Result<Session, ClientError> {
        let creds = AdminCredentials { admin_id, password };
        match self.inner.api.admin_login(&creds).await {
            Ok(identity) => {
                self.inner
                    .sign_in(identity, Role::Admin, "Admin login successful!")
                    .await
            }
            Err(e) => Err(self.inner.auth_failed(e, "Admin login failed")),
        }
    }

    /// Student login with id and password.
    pub async fn login_student(
        &self,
        student_id: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let creds = StudentCredentials {
            student_id,
            password,
        };
        match self.inner.api.student_login(&creds).await {
            Ok(identity) => {
                self.inner
                    .sign_in(identity, Role::User, "Login successful!")
                    .await
            }
            Err(e) => Err(self.inner.auth_failed(e, "Login failed")),
        }
    }

    /// Create a student account. The session is left untouched.
    pub async fn register(
        &self,
        student_id: &str,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        if [student_id, username, password]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(self.inner.reject("Please fill in all fields"));
        }
        let form = Registration {
            student_id,
            username,
            password,
        };
        match self.inner.api.register(&form).await {
            Ok(created) => {
                info!(user_id = ?created.id, "Registered account");
                self.inner.notify(
                    MessageKind::Success,
                    "Registration successful! Please log in.",
                );
                Ok(())
            }
            Err(e) => Err(self.inner.auth_failed(e, "Registration failed")),
        }
    }

    /// Google Sign-In: log in with the credential, registering the account
    /// when the server does not know it yet.
    pub async fn google_login(&self, credential: &str) -> Result<Session, ClientError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(self.inner.reject(GOOGLE_CONFIG_ERROR));
        }

        let login_err = match self.inner.api.google_login(credential).await {
            Ok(identity) => {
                return self
                    .inner
                    .sign_in(identity, Role::User, "Google Sign-In successful!")
                    .await;
            }
            Err(e) => e,
        };
        if login_err.is_network() {
            warn!(error = %login_err, "Google login request failed");
            self.inner.notify(MessageKind::Error, GOOGLE_RETRY);
            return Err(login_err.into());
        }

        info!(error = %login_err, "Google login rejected, registering account");
        match self.inner.api.google_register(credential).await {
            Ok(identity) => {
                self.inner
                    .sign_in(
                        identity,
                        Role::User,
                        "Account created and logged in successfully!",
                    )
                    .await
            }
            Err(e) if e.is_network() => {
                warn!(error = %e, "Google registration request failed");
                self.inner.notify(MessageKind::Error, GOOGLE_RETRY);
                Err(e.into())
            }
            Err(e) => Err(self.inner.auth_failed(e, "Google Sign-In failed")),
        }
    }

    /// Rehydrate the session from durable storage and show the matching view.
    pub async fn restore(&self) -> Session {
        match session::load(self.inner.store.as_ref()) {
            Restored::Missing => {
                self.inner.show_welcome();
                Session::Guest
            }
            Restored::Invalid(reason) => {
                warn!(%reason, "Discarding stored session");
                if let Err(e) = self.inner.end_session() {
                    warn!(error = %e, "Failed to clear stored session");
                }
                Session::Guest
            }
            Restored::Valid(restored) => {
                info!(
                    user = restored.username().unwrap_or_default(),
                    role = %restored.role(),
                    "Restored session"
                );
                self.inner.enter(restored.clone()).await;
                restored
            }
        }
    }

    /// End the session: stop both refresh loops, clear storage and show the
    /// welcome view.
    pub fn logout(&self) -> Result<(), ClientError> {
        let cleared = self.inner.end_session();
        self.inner
            .notify(MessageKind::Success, "Logged out successfully!");
        info!("Logged out");
        cleared.map_err(ClientError::from)
    }
}

impl Inner {
    /// Validate a freshly issued identity, persist it and enter the session.
    async fn sign_in(
        self: &Arc<Self>,
        identity: Identity,
        role: Role,
        success: &str,
    ) -> Result<Session, ClientError> {
        if !identity.is_valid() {
            warn!(user_id = identity.id, "Server returned an incomplete identity");
            return Err(self.reject("Login failed"));
        }
        let session = Session::new(identity, role);
        if let Err(e) = session::persist(self.store.as_ref(), &session) {
            warn!(error = %e, "Failed to store session");
        }
        info!(user = session.username().unwrap_or_default(), %role, "Signed in");
        self.notify(MessageKind::Success, success);
        self.enter(session.clone()).await;
        Ok(session)
    }

    /// Replace the in-memory session, start the global loop and show the
    /// session's dashboard.
    async fn enter(self: &Arc<Self>, session: Session) {
        let is_admin = session.is_admin();
        self.stop_loops();
        self.state().begin(session);
        self.start_global_loop();
        if is_admin {
            self.show_admin_dashboard().await;
        } else {
            self.show_user_dashboard().await;
        }
    }

    /// Drop to guest: loops cancelled, storage cleared, welcome view.
    pub(super) fn end_session(&self) -> washbook_core::Result<()> {
        self.stop_loops();
        {
            let mut state = self.state();
            state.begin(Session::Guest);
            state.view = View::Welcome;
        }
        session::clear(self.store.as_ref())
    }

    /// Show a validation message and build the matching error.
    pub(super) fn reject(&self, message: &str) -> ClientError {
        self.notify(MessageKind::Error, message);
        ClientError::Validation(message.to_string())
    }

    /// Report a failed login or registration.
    fn auth_failed(&self, err: ApiError, fallback: &str) -> ClientError {
        warn!(error = %err, "Authentication request failed");
        let text = if err.is_network() {
            NETWORK_ERROR
        } else {
            err.server_message().unwrap_or(fallback)
        };
        self.notify(MessageKind::Error, text);
        err.into()
    }
}
