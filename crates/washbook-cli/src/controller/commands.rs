//! Mutating commands and read-only queries triggered by the user.

use chrono::{Local, TimeZone};
use tracing::{info, warn};

use washbook_core::time::{booking_window_in, parse_date, WindowError};
use washbook_core::MachineStatus;

use super::{ClientError, Controller, Inner, NETWORK_ERROR, SESSION_EXPIRED};
use crate::api::{ApiError, Created, NewBooking};
use crate::app::{MessageKind, SlotQuery};

/// Raw booking form fields as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    pub machine_id: String,
    /// `YYYY-MM-DDTHH:MM`, local wall clock.
    pub start_time: String,
    /// Hours, fractional (`0.5`).
    pub duration: String,
}

impl BookingForm {
    pub fn new(
        machine_id: impl Into<String>,
        start_time: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            machine_id: machine_id.into(),
            start_time: start_time.into(),
            duration: duration.into(),
        }
    }

    /// Build the request body, reading the start time in `tz`.
    pub fn to_request_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<NewBooking, &'static str> {
        let machine_id = self
            .machine_id
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or("Please select a machine")?;
        if self.start_time.trim().is_empty() {
            return Err("Please choose a start time");
        }
        let hours = self
            .duration
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite() && *h > 0.0)
            .ok_or("Please choose a valid duration")?;
        let window = booking_window_in(tz, &self.start_time, hours).map_err(|e| match e {
            WindowError::Start => "Please choose a valid start time",
            WindowError::Duration => "Please choose a valid duration",
        })?;
        Ok(NewBooking {
            machine_id,
            start_time: window.start_time,
            end_time: window.end_time,
        })
    }

    /// [`Self::to_request_in`] using the local time zone.
    pub fn to_request(&self) -> Result<NewBooking, &'static str> {
        self.to_request_in(&Local)
    }
}

impl Controller {
    /// `POST /bookings` for the signed-in user.
    pub async fn create_booking(&self, form: &BookingForm) -> Result<Created, ClientError> {
        let inner = &self.inner;
        let (epoch, bearer) = inner.require_session("make a booking")?;
        let booking = form.to_request().map_err(|msg| inner.reject(msg))?;

        match inner.api.create_booking(bearer, &booking).await {
            Ok(created) => {
                info!(
                    machine_id = booking.machine_id,
                    booking_id = ?created.id,
                    start = %booking.start_time,
                    "Booking created"
                );
                inner.notify(MessageKind::Success, "Booking created successfully!");
                tokio::join!(inner.load_user_bookings(), inner.load_machines());
                inner.refresh_bookable();
                Ok(created)
            }
            Err(e) => Err(inner.command_failed(epoch, e, "Booking failed")),
        }
    }

    /// `DELETE /bookings/{id}`.
    pub async fn cancel_booking(&self, booking_id: i64) -> Result<(), ClientError> {
        let inner = &self.inner;
        let (epoch, bearer) = inner.require_session("cancel a booking")?;

        match inner.api.cancel_booking(bearer, booking_id).await {
            Ok(_) => {
                info!(booking_id, "Booking cancelled");
                inner.notify(MessageKind::Success, "Booking cancelled successfully!");
                tokio::join!(inner.load_user_bookings(), inner.load_machines());
                inner.refresh_bookable();
                Ok(())
            }
            Err(e) => Err(inner.command_failed(epoch, e, "Failed to cancel booking")),
        }
    }

    /// Admin: `PUT /admin/machines/{id}/status`.
    pub async fn set_machine_status(
        &self,
        machine_id: i64,
        status: MachineStatus,
    ) -> Result<(), ClientError> {
        let inner = &self.inner;
        let (epoch, bearer) = inner.require_admin("update machine status")?;
        let name = inner.machine_name(machine_id);

        match inner.api.set_machine_status(bearer, machine_id, status).await {
            Ok(_) => {
                info!(machine_id, %status, "Machine status updated");
                inner.notify(
                    MessageKind::Success,
                    format!("{name} status updated to {} successfully!", status.human()),
                );
                tokio::join!(inner.load_admin_machines(), inner.load_machines());
                Ok(())
            }
            Err(e) => Err(inner.command_failed(epoch, e, "Failed to update machine status")),
        }
    }

    /// Admin: `POST /admin/machines`.
    pub async fn add_machine(&self, machine_name: &str) -> Result<Created, ClientError> {
        let inner = &self.inner;
        let (epoch, bearer) = inner.require_admin("add a machine")?;
        let machine_name = machine_name.trim();
        if machine_name.is_empty() {
            return Err(inner.reject("Please enter a machine name"));
        }

        match inner.api.add_machine(bearer, machine_name).await {
            Ok(created) => {
                info!(machine_id = ?created.id, machine_name, "Machine added");
                inner.notify(MessageKind::Success, "Machine added successfully!");
                tokio::join!(inner.load_admin_machines(), inner.load_machines());
                Ok(created)
            }
            Err(e) => Err(inner.command_failed(epoch, e, "Failed to add machine")),
        }
    }

    /// Load the bookings of one calendar day into the slot view.
    pub async fn check_slots(&self, date: &str) -> Result<(), ClientError> {
        let inner = &self.inner;
        let date = date.trim();
        if date.is_empty() {
            return Err(inner.reject("Please select a date"));
        }
        if parse_date(date).is_none() {
            return Err(inner.reject("Please select a valid date"));
        }

        let epoch = inner.epoch();
        match inner.api.bookings_by_date(date).await {
            Ok(bookings) => {
                info!(date, count = bookings.len(), "Loaded slots");
                inner.apply(epoch, |s| {
                    s.slots = Some(SlotQuery {
                        date: date.to_string(),
                        bookings,
                    });
                    s.slots_expanded = true;
                });
                Ok(())
            }
            Err(e) => Err(inner.query_failed(e, "Failed to load slots")),
        }
    }

    /// Load one machine's upcoming bookings into the modal.
    pub async fn show_machine_bookings(&self, machine_id: i64) -> Result<(), ClientError> {
        let inner = &self.inner;
        let epoch = inner.epoch();
        match inner.api.machine_bookings(machine_id, false).await {
            Ok(found) => {
                inner.apply(epoch, |s| s.machine_bookings = Some(found));
                Ok(())
            }
            Err(e) => Err(inner.query_failed(e, "Failed to load machine bookings")),
        }
    }

    pub fn close_machine_bookings(&self) {
        self.inner.state().machine_bookings = None;
    }

    /// Admin: flip between upcoming and all bookings, then reload. Returns
    /// the new setting.
    pub async fn toggle_past_bookings(&self) -> Result<bool, ClientError> {
        self.inner.require_admin("change the booking filter")?;
        let show_past = {
            let mut state = self.inner.state();
            state.show_past = !state.show_past;
            state.show_past
        };
        self.inner.load_all_bookings().await;
        Ok(show_past)
    }

    /// Expand or collapse the slot-checking section. Returns whether it is
    /// now expanded.
    pub fn toggle_slots(&self) -> bool {
        let mut state = self.inner.state();
        state.slots_expanded = !state.slots_expanded;
        state.slots_expanded
    }
}

impl Inner {
    /// Epoch and bearer of the current session. A missing identity forces a
    /// logout.
    pub(super) fn require_session(&self, action: &str) -> Result<(u64, i64), ClientError> {
        let (epoch, bearer) = {
            let state = self.state();
            (state.epoch, state.session.bearer())
        };
        if let Some(bearer) = bearer {
            return Ok((epoch, bearer));
        }
        warn!(action, "Command without a usable session");
        if let Err(e) = self.end_session() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.notify(MessageKind::Error, format!("Please login again to {action}"));
        Err(ClientError::NotLoggedIn)
    }

    pub(super) fn require_admin(&self, action: &str) -> Result<(u64, i64), ClientError> {
        let found = self.require_session(action)?;
        if !self.state().session.is_admin() {
            return Err(self.reject("Administrator access required"));
        }
        Ok(found)
    }

    fn machine_name(&self, machine_id: i64) -> String {
        let state = self.state();
        state
            .admin_machines
            .iter()
            .chain(&state.machines)
            .find(|m| m.id == machine_id)
            .map_or_else(|| format!("Machine #{machine_id}"), |m| m.machine_name.clone())
    }

    /// Report a failed command. 401/403 ends the session it was issued under.
    fn command_failed(&self, epoch: u64, err: ApiError, fallback: &str) -> ClientError {
        warn!(error = %err, "Command failed");
        if err.is_auth() {
            if self.epoch() == epoch {
                if let Err(e) = self.end_session() {
                    warn!(error = %e, "Failed to clear stored session");
                }
            }
            self.notify(MessageKind::Error, SESSION_EXPIRED);
            return ClientError::SessionExpired;
        }
        self.query_failed(err, fallback)
    }

    /// Report a failed request without touching the session.
    fn query_failed(&self, err: ApiError, fallback: &str) -> ClientError {
        let text = if err.is_network() {
            NETWORK_ERROR
        } else {
            err.server_message().unwrap_or(fallback)
        };
        self.notify(MessageKind::Error, text);
        err.into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn booking_form_builds_utc_window() {
        let form = BookingForm::new("3", "2025-06-25T10:00", "0.5");
        let req = form.to_request_in(&Utc).unwrap();
        assert_eq!(req.machine_id, 3);
        assert_eq!(req.start_time, "2025-06-25T10:00:00.000Z");
        assert_eq!(req.end_time, "2025-06-25T10:30:00.000Z");
    }

    #[test]
    fn booking_form_rejects_bad_fields() {
        let cases = [
            (BookingForm::new("", "2025-06-25T10:00", "1"), "Please select a machine"),
            (BookingForm::new("abc", "2025-06-25T10:00", "1"), "Please select a machine"),
            (BookingForm::new("1", " ", "1"), "Please choose a start time"),
            (BookingForm::new("1", "2025-06-25T10:00", "0"), "Please choose a valid duration"),
            (BookingForm::new("1", "2025-06-25T10:00", "-1"), "Please choose a valid duration"),
            (BookingForm::new("1", "2025-06-25T10:00", "NaN"), "Please choose a valid duration"),
            (BookingForm::new("1", "2025-06-25T10:00", "1e10"), "Please choose a valid duration"),
            (BookingForm::new("1", "tomorrow", "1"), "Please choose a valid start time"),
        ];
        for (form, expected) in cases {
            assert_eq!(form.to_request_in(&Utc).unwrap_err(), expected, "{form:?}");
        }
    }
}
