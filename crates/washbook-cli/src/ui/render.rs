//! HTML fragment rendering.
//!
//! Every function here is pure: snapshot (and, where needed, the current
//! time) in, markup out. All interpolated server text is escaped.

use std::fmt::Write;

use chrono::NaiveDateTime;

use washbook_core::time::{
    duration_between, format_date, format_date_time, format_time, NOT_AVAILABLE,
};
use washbook_core::{Booking, Machine, MachineStatus};

use super::html::escape;
use crate::api::MachineBookings;
use crate::app::{ClientState, Toast, View};

/// Durations offered in the booking form, in hours.
pub const DURATION_CHOICES: &[(f64, &str)] = &[
    (0.5, "30 minutes"),
    (1.0, "1 hour"),
    (1.5, "1.5 hours"),
    (2.0, "2 hours"),
];

/// The first `max` machines, the only ones ever displayed.
pub fn displayed_machines(machines: &[Machine], max: usize) -> &[Machine] {
    &machines[..machines.len().min(max)]
}

/// Displayed machines that can currently be booked.
pub fn bookable_machines(machines: &[Machine], max: usize) -> Vec<Machine> {
    displayed_machines(machines, max)
        .iter()
        .filter(|m| m.status.is_bookable())
        .cloned()
        .collect()
}

/// Count of machines per known status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub available: usize,
    pub in_use: usize,
    pub broken: usize,
}

impl StatusCounts {
    pub fn tally(machines: &[Machine]) -> Self {
        machines.iter().fold(Self::default(), |mut acc, m| {
            match m.status {
                MachineStatus::Available => acc.available += 1,
                MachineStatus::InUse => acc.in_use += 1,
                MachineStatus::Broken => acc.broken += 1,
                MachineStatus::Unknown => {}
            }
            acc
        })
    }
}

fn text_or_na(s: Option<&str>) -> String {
    escape(s.unwrap_or(NOT_AVAILABLE))
}

fn local_range(b: &Booking) -> String {
    format!(
        "{} - {}",
        escape(&format_date_time(Some(&b.start_time))),
        escape(&format_date_time(Some(&b.end_time)))
    )
}

// =============================================================================
// Machines
// =============================================================================

pub fn machine_cards(machines: &[Machine], max: usize) -> String {
    let mut out = String::new();
    for m in displayed_machines(machines, max) {
        let status = m.status.effective();
        let last_used = if m.last_used_by.is_some() {
            format!(
                "<p class=\"last-used\">Last used: {}</p>",
                escape(&format_date_time(m.last_used_time.as_deref()))
            )
        } else {
            String::new()
        };
        let _ = write!(
            out,
            "<div class=\"machine-card {status}\" data-machine-id=\"{id}\">\
             <div class=\"machine-header\"><h4>{name}</h4>\
             <div class=\"machine-status status-{status}\">{headline}</div></div>\
             <div class=\"machine-info\">{last_used}\
             <button class=\"btn-info btn-small\" data-intent=\"machine-bookings\" data-machine-id=\"{id}\">View Bookings</button>\
             </div></div>",
            status = status.as_str(),
            id = m.id,
            name = escape(&m.machine_name),
            headline = status.headline(),
        );
    }
    out
}

pub fn machine_select(bookable: &[Machine]) -> String {
    let mut out = String::from(
        "<select id=\"machineSelect\" name=\"machineId\"><option value=\"\">Choose a machine</option>",
    );
    for m in bookable {
        let _ = write!(
            out,
            "<option value=\"{}\">{}</option>",
            m.id,
            escape(&m.machine_name)
        );
    }
    out.push_str("</select>");
    out
}

/// Booking form; the start time cannot be earlier than `now`.
pub fn booking_form(bookable: &[Machine], now: NaiveDateTime) -> String {
    let mut durations = String::new();
    for (hours, label) in DURATION_CHOICES {
        let _ = write!(durations, "<option value=\"{hours}\">{label}</option>");
    }
    format!(
        "<form id=\"bookingForm\" data-intent=\"create-booking\">{select}\
         <input type=\"datetime-local\" id=\"startTime\" name=\"startTime\" min=\"{min}\" required>\
         <select id=\"duration\" name=\"duration\">{durations}</select>\
         <button type=\"submit\" class=\"btn-primary\">Book Now</button></form>",
        select = machine_select(bookable),
        min = now.format("%Y-%m-%dT%H:%M"),
    )
}

pub fn admin_machine_cards(machines: &[Machine]) -> String {
    let mut out = String::new();
    for m in machines {
        let last_used = m.last_used_by_name.as_deref().map_or_else(String::new, |name| {
            format!(
                "<p class=\"last-used\">Last used by: {}</p><p class=\"last-used-time\">Time: {}</p>",
                escape(name),
                escape(&format_date_time(m.last_used_time.as_deref()))
            )
        });
        let mut controls = String::new();
        for (status, class, label) in [
            (MachineStatus::Available, "btn-success", "Available"),
            (MachineStatus::InUse, "btn-warning", "In Use"),
            (MachineStatus::Broken, "btn-danger", "Broken"),
        ] {
            let active = if m.status == status { " active" } else { "" };
            let _ = write!(
                controls,
                "<button class=\"{class} btn-small{active}\" data-intent=\"set-status\" \
                 data-machine-id=\"{}\" data-status=\"{}\">{label}</button>",
                m.id,
                status.as_str()
            );
        }
        let _ = write!(
            out,
            "<div class=\"admin-machine-card\" data-machine-id=\"{id}\"><div class=\"machine-info\">\
             <h4>{name}</h4><span class=\"machine-status status-{status}\">{label}</span>{last_used}</div>\
             <div class=\"machine-controls\">{controls}</div></div>",
            id = m.id,
            name = escape(&m.machine_name),
            status = m.status.as_str(),
            label = m.status.human().to_uppercase(),
        );
    }
    out
}

pub fn status_summary(machines: &[Machine]) -> String {
    let counts = StatusCounts::tally(machines);
    format!(
        "<div class=\"status-summary\">\
         <span id=\"availableCount\">{}</span>\
         <span id=\"inUseCount\">{}</span>\
         <span id=\"brokenCount\">{}</span></div>",
        counts.available, counts.in_use, counts.broken
    )
}

// =============================================================================
// Bookings
// =============================================================================

/// The signed-in user's bookings; pending ones get a cancel button.
pub fn user_booking_cards(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "<p>No bookings found.</p>".to_string();
    }
    let mut out = String::new();
    for b in bookings {
        let cancel = if b.is_pending() {
            format!(
                "<button class=\"btn-danger btn-small\" data-intent=\"cancel-booking\" data-booking-id=\"{}\">Cancel</button>",
                b.id
            )
        } else {
            String::new()
        };
        let _ = write!(
            out,
            "<div class=\"booking-card\"><div class=\"booking-info\">\
             <div><strong>{machine}</strong></div><div>{range}</div>\
             <div class=\"booking-status status-{status}\">{status_upper}</div>{cancel}</div></div>",
            machine = text_or_na(b.machine_name.as_deref()),
            range = local_range(b),
            status = escape(&b.status),
            status_upper = escape(&b.status.to_uppercase()),
        );
    }
    out
}

/// Every booking, for the admin panel.
pub fn admin_booking_cards(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "<p>No bookings found.</p>".to_string();
    }
    let mut out = String::new();
    for b in bookings {
        let _ = write!(
            out,
            "<div class=\"booking-card\"><div class=\"booking-info\">\
             <div><strong>{user}</strong><br><small>{student}</small></div>\
             <div><strong>{machine}</strong></div><div>{range}</div>\
             <div class=\"booking-status status-{status}\">{status_upper}</div></div></div>",
            user = text_or_na(b.username.as_deref()),
            student = text_or_na(b.student_id.as_deref()),
            machine = text_or_na(b.machine_name.as_deref()),
            range = local_range(b),
            status = escape(&b.status),
            status_upper = escape(&b.status.to_uppercase()),
        );
    }
    out
}

/// Group a day's bookings under every known machine, in machine order.
/// Bookings for machines not in `machines` are dropped.
pub fn group_by_machine<'a>(
    machines: &'a [Machine],
    bookings: &'a [Booking],
) -> Vec<(&'a str, Vec<&'a Booking>)> {
    let mut groups: Vec<(&str, Vec<&Booking>)> = Vec::new();
    for m in machines {
        if !groups.iter().any(|(name, _)| *name == m.machine_name) {
            groups.push((&m.machine_name, Vec::new()));
        }
    }
    for b in bookings {
        let Some(name) = b.machine_name.as_deref() else {
            continue;
        };
        if let Some((_, group)) = groups.iter_mut().find(|(n, _)| *n == name) {
            group.push(b);
        }
    }
    groups
}

/// Booked slots for `date`, grouped by machine.
pub fn slots(date: &str, bookings: &[Booking], machines: &[Machine]) -> String {
    let pretty = escape(&format_date(date));
    if bookings.is_empty() {
        return format!("<p class=\"no-slots\">No bookings found for {pretty}</p>");
    }
    let mut groups = String::new();
    for (name, group) in group_by_machine(machines, bookings) {
        let mut items = String::new();
        if group.is_empty() {
            items.push_str(
                "<p class=\"no-slots-machine\">No bookings for this machine on this date.</p>",
            );
        }
        for b in group {
            let _ = write!(
                items,
                "<div class=\"slot-item\" data-intent=\"slot-details\" data-booking-id=\"{id}\">\
                 <span class=\"slot-time\">{start} - {end}</span>\
                 <span class=\"slot-user\">{user}</span>\
                 <span class=\"slot-status {status}\">{status}</span></div>",
                id = b.id,
                start = escape(&format_time(&b.start_time)),
                end = escape(&format_time(&b.end_time)),
                user = text_or_na(b.username.as_deref()),
                status = escape(&b.status),
            );
        }
        let _ = write!(
            groups,
            "<div class=\"machine-slot-group\"><h5 class=\"machine-title\">{}</h5>\
             <div class=\"slots-list\">{items}</div></div>",
            escape(name)
        );
    }
    format!("<h4>Bookings for {pretty}</h4><div class=\"machines-slots\">{groups}</div>")
}

/// Detail card for one booked slot.
pub fn slot_details(b: &Booking) -> String {
    let duration = duration_between(&b.start_time, &b.end_time)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let rows = [
        ("Booking ID", format!("#{}", b.id)),
        ("Student Name", text_or_na(b.username.as_deref())),
        ("Student ID", text_or_na(b.student_id.as_deref())),
        ("Machine", text_or_na(b.machine_name.as_deref())),
        ("Date", escape(&format_date(&b.start_time))),
        (
            "Time",
            format!(
                "{} - {}",
                escape(&format_time(&b.start_time)),
                escape(&format_time(&b.end_time))
            ),
        ),
        ("Duration", escape(&duration)),
        (
            "Status",
            format!(
                "<span class=\"status-badge {0}\">{0}</span>",
                escape(&b.status)
            ),
        ),
        (
            "Booked on",
            escape(&format_date_time(b.created_at.as_deref())),
        ),
    ];
    let mut out = String::from("<div class=\"booking-details-card\">");
    for (label, value) in rows {
        let _ = write!(
            out,
            "<div class=\"detail-row\"><strong>{label}:</strong> {value}</div>"
        );
    }
    out.push_str("</div>");
    out
}

/// Modal listing one machine's current bookings.
pub fn machine_bookings_modal(mb: &MachineBookings) -> String {
    let mut list = String::new();
    if mb.bookings.is_empty() {
        list.push_str("<p class=\"no-bookings\">No current bookings for this machine.</p>");
    }
    for b in &mb.bookings {
        let _ = write!(
            list,
            "<div class=\"booking-item\"><div class=\"booking-header\">\
             <h4>Booking #{id}</h4><span class=\"status-badge {status}\">{status}</span></div>\
             <div class=\"booking-details\">\
             <p><strong>Student:</strong> {user} ({student})</p>\
             <p><strong>Time:</strong> {range}</p>\
             <p><strong>Booked on:</strong> {created}</p></div></div>",
            id = b.id,
            status = escape(&b.status),
            user = text_or_na(b.username.as_deref()),
            student = text_or_na(b.student_id.as_deref()),
            range = local_range(b),
            created = escape(&format_date_time(b.created_at.as_deref())),
        );
    }
    format!(
        "<div id=\"machineBookingsModal\" class=\"modal\"><div class=\"modal-content\">\
         <h2 id=\"machineBookingsTitle\">{} - Current Bookings</h2>\
         <div id=\"machineBookingsList\" class=\"bookings-list\">{list}</div></div></div>",
        escape(&mb.machine_name)
    )
}

// =============================================================================
// Page
// =============================================================================

pub fn banner(toast: &Toast) -> String {
    format!(
        "<div class=\"message {}\">{}</div>",
        toast.kind.as_str(),
        escape(&toast.text)
    )
}

/// Inputs for [`page`] that do not live in the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub now: NaiveDateTime,
    pub max_machines: usize,
    pub toast: Option<&'a Toast>,
}

/// Render the whole visible view. Exactly one of the three sections is
/// emitted.
pub fn page(state: &ClientState, ctx: PageContext<'_>) -> String {
    let mut out = String::from("<main class=\"main\">");
    if let Some(toast) = ctx.toast {
        out.push_str(&banner(toast));
    }
    let machines = machine_cards(&state.machines, ctx.max_machines);
    match state.view {
        View::Welcome => {
            let _ = write!(
                out,
                "<section id=\"welcomeSection\"><div id=\"machineList\">{machines}</div></section>"
            );
        }
        View::UserDashboard => {
            let slot_body = match (&state.slots, state.slots_expanded) {
                (Some(q), true) => slots(&q.date, &q.bookings, &state.machines),
                _ => String::new(),
            };
            let modal = state
                .machine_bookings
                .as_ref()
                .map(machine_bookings_modal)
                .unwrap_or_default();
            let _ = write!(
                out,
                "<section id=\"userDashboard\"><h2>Welcome, <span id=\"userName\">{name}</span></h2>\
                 <div id=\"machineList\">{machines}</div>{form}\
                 <div id=\"userBookings\">{bookings}</div>\
                 <div id=\"slotsContent\"{hidden}><input type=\"date\" id=\"slotDate\" value=\"{today}\">\
                 <div id=\"slotsDisplay\">{slot_body}</div></div>{modal}</section>",
                name = escape(state.session.username().unwrap_or_default()),
                form = booking_form(&state.bookable, ctx.now),
                bookings = user_booking_cards(&state.user_bookings),
                hidden = if state.slots_expanded { "" } else { " hidden" },
                today = ctx.now.format("%Y-%m-%d"),
            );
        }
        View::AdminDashboard => {
            let toggle = if state.show_past {
                "Hide Past Bookings"
            } else {
                "Show Past Bookings"
            };
            let _ = write!(
                out,
                "<section id=\"adminDashboard\">{summary}\
                 <div id=\"adminMachineList\">{admin_machines}</div>\
                 <form id=\"addMachineForm\" data-intent=\"add-machine\"><input name=\"machineName\" required>\
                 <button type=\"submit\">Add Machine</button></form>\
                 <button id=\"togglePastBookingsBtn\" data-intent=\"toggle-past\">{toggle}</button>\
                 <div id=\"allBookings\">{bookings}</div></section>",
                summary = status_summary(&state.admin_machines),
                admin_machines = admin_machine_cards(&state.admin_machines),
                bookings = admin_booking_cards(&state.all_bookings),
            );
        }
    }
    out.push_str("</main>");
    out
}
