//! Booking server REST client.
//!
//! Uses reqwest to call the JSON endpoints for authentication, machines and
//! bookings. Authenticated calls send `Authorization: Bearer <identity id>`.
//! The id is not a signed token; any caller who knows a user id can act as
//! that user. The client keeps the server's contract as-is.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use washbook_core::config::ApiConfig;
use washbook_core::{Booking, Identity, Machine, MachineStatus};

/// Booking server client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a usable response (connect, timeout, bad body).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status.
    #[error("Server error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// 401/403: the server no longer accepts the caller's identity.
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Server-provided message, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// `{ "message": ... }` body used for errors and acknowledgements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MachinesBody {
    #[serde(default)]
    machines: Vec<Machine>,
}

#[derive(Debug, Deserialize)]
struct BookingsBody {
    #[serde(default)]
    bookings: Vec<Booking>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    user: Identity,
}

#[derive(Debug, Deserialize)]
struct AdminBody {
    admin: Identity,
}

/// Upcoming bookings of a single machine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MachineBookings {
    pub machine_name: String,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

/// Acknowledgement of a created row (`booking_id`, `machine_id`, `user_id`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "booking_id", alias = "machine_id", alias = "user_id")]
    pub id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AdminCredentials<'a> {
    pub admin_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct StudentCredentials<'a> {
    pub student_id: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Registration<'a> {
    pub student_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
struct GoogleToken<'a> {
    token: &'a str,
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBooking {
    pub machine_id: i64,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Serialize)]
struct NewMachine<'a> {
    machine_name: &'a str,
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: MachineStatus,
}

/// Booking server REST client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client for the configured base URL.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("base_url is empty".into()));
        }

        // reqwest is built with rustls-no-provider; `Err` means a provider is
        // already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for an endpoint path.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(%method, %url, "API request");
        self.http.request(method, url)
    }

    fn authed(&self, method: Method, path: &str, bearer: i64) -> RequestBuilder {
        self.request(method, path).bearer_auth(bearer)
    }

    /// Send a request and decode a 2xx JSON body, or turn the response into
    /// [`ApiError::Status`] carrying the server's `message`.
    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }
        let message = resp
            .json::<MessageBody>()
            .await
            .ok()
            .and_then(|b| b.message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn admin_login(&self, creds: &AdminCredentials<'_>) -> Result<Identity, ApiError> {
        let body: AdminBody = Self::send(self.request(Method::POST, "/admin/login").json(creds)).await?;
        Ok(body.admin)
    }

    pub async fn student_login(
        &self,
        creds: &StudentCredentials<'_>,
    ) -> Result<Identity, ApiError> {
        let body: UserBody = Self::send(self.request(Method::POST, "/login").json(creds)).await?;
        Ok(body.user)
    }

    pub async fn register(&self, form: &Registration<'_>) -> Result<Created, ApiError> {
        Self::send(self.request(Method::POST, "/register").json(form)).await
    }

    pub async fn google_login(&self, token: &str) -> Result<Identity, ApiError> {
        let req = self
            .request(Method::POST, "/google-login")
            .json(&GoogleToken { token });
        let body: UserBody = Self::send(req).await?;
        Ok(body.user)
    }

    pub async fn google_register(&self, token: &str) -> Result<Identity, ApiError> {
        let req = self
            .request(Method::POST, "/google-register")
            .json(&GoogleToken { token });
        let body: UserBody = Self::send(req).await?;
        Ok(body.user)
    }

    // =========================================================================
    // Machines
    // =========================================================================

    pub async fn list_machines(&self) -> Result<Vec<Machine>, ApiError> {
        let body: MachinesBody = Self::send(self.request(Method::GET, "/machines")).await?;
        Ok(body.machines)
    }

    pub async fn list_admin_machines(&self) -> Result<Vec<Machine>, ApiError> {
        let body: MachinesBody = Self::send(self.request(Method::GET, "/admin/machines")).await?;
        Ok(body.machines)
    }

    pub async fn add_machine(&self, bearer: i64, machine_name: &str) -> Result<Created, ApiError> {
        let req = self
            .authed(Method::POST, "/admin/machines", bearer)
            .json(&NewMachine { machine_name });
        Self::send(req).await
    }

    pub async fn set_machine_status(
        &self,
        bearer: i64,
        machine_id: i64,
        status: MachineStatus,
    ) -> Result<MessageBody, ApiError> {
        let req = self
            .authed(
                Method::PUT,
                &format!("/admin/machines/{machine_id}/status"),
                bearer,
            )
            .json(&StatusUpdate { status });
        Self::send(req).await
    }

    pub async fn machine_bookings(
        &self,
        machine_id: i64,
        show_past: bool,
    ) -> Result<MachineBookings, ApiError> {
        let path = format!("/machines/{machine_id}/bookings?show_past={show_past}");
        Self::send(self.request(Method::GET, &path)).await
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    pub async fn create_booking(
        &self,
        bearer: i64,
        booking: &NewBooking,
    ) -> Result<Created, ApiError> {
        let req = self.authed(Method::POST, "/bookings", bearer).json(booking);
        Self::send(req).await
    }

    pub async fn cancel_booking(&self, bearer: i64, booking_id: i64) -> Result<MessageBody, ApiError> {
        let req = self.authed(Method::DELETE, &format!("/bookings/{booking_id}"), bearer);
        Self::send(req).await
    }

    pub async fn user_bookings(&self, user_id: i64) -> Result<Vec<Booking>, ApiError> {
        let path = format!("/bookings/user/{user_id}");
        let body: BookingsBody = Self::send(self.request(Method::GET, &path)).await?;
        Ok(body.bookings)
    }

    pub async fn bookings_by_date(&self, date: &str) -> Result<Vec<Booking>, ApiError> {
        let path = format!("/bookings/date/{date}");
        let body: BookingsBody = Self::send(self.request(Method::GET, &path)).await?;
        Ok(body.bookings)
    }

    pub async fn all_bookings(&self, show_past: bool) -> Result<Vec<Booking>, ApiError> {
        let path = format!("/admin/bookings?show_past={show_past}");
        let body: BookingsBody = Self::send(self.request(Method::GET, &path)).await?;
        Ok(body.bookings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.into(),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn empty_base_url_returns_config_error() {
        let err = ApiClient::new(&config("  ")).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn trailing_slash_stripped_from_base_url() {
        let client = ApiClient::new(&config("http://localhost:5000/api/")).unwrap();
        assert_eq!(client.url("/machines"), "http://localhost:5000/api/machines");
    }

    #[test]
    fn auth_statuses_are_classified() {
        let forbidden = ApiError::Status {
            status: 403,
            message: None,
        };
        let unauthorized = ApiError::Status {
            status: 401,
            message: Some("Invalid credentials".into()),
        };
        let conflict = ApiError::Status {
            status: 400,
            message: Some("Time slot conflicts with existing booking".into()),
        };
        assert!(forbidden.is_auth());
        assert!(unauthorized.is_auth());
        assert!(!conflict.is_auth());
        assert!(!conflict.is_network());
        assert_eq!(
            conflict.server_message(),
            Some("Time slot conflicts with existing booking")
        );
    }

    #[test]
    fn created_accepts_any_id_field() {
        let c: Created =
            serde_json::from_str(r#"{"message":"Machine added successfully","machine_id":9}"#)
                .unwrap();
        assert_eq!(c.id, Some(9));
        let c: Created = serde_json::from_str(r#"{"booking_id":4}"#).unwrap();
        assert_eq!(c.id, Some(4));
    }

    #[test]
    fn status_update_serializes_snake_case() {
        let json = serde_json::to_string(&StatusUpdate {
            status: MachineStatus::InUse,
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"in_use"}"#);
    }
}
