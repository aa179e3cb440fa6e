//! Student subcommands: machines, book, cancel, bookings, slots,
//! machine-bookings.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use washbook_core::time::today;

use crate::controller::{BookingForm, Controller};
use crate::output::{finish, write_banner, write_fragment};
use crate::ui;

/// Public machine board.
pub async fn machines(controller: &Controller) -> anyhow::Result<()> {
    let state = controller.start().await;
    let max = controller.settings().max_machines;
    let mut out = io::stdout();
    write_banner(&mut out, controller)?;
    write_fragment(&mut out, "machines", &ui::machine_cards(&state.machines, max))?;
    if !state.session.is_guest() {
        write_fragment(&mut out, "booking form", &ui::machine_select(&state.bookable))?;
    }
    Ok(())
}

pub async fn book(
    controller: &Controller,
    machine: &str,
    start: &str,
    duration: &str,
) -> anyhow::Result<()> {
    controller.restore().await;
    let form = BookingForm::new(machine, start, duration);
    let result = controller.create_booking(&form).await;
    let created = finish(controller, result)?;
    let mut out = io::stdout();
    if let Some(id) = created.id {
        writeln!(out, "Booking ID: {id}")?;
    }
    write_fragment(
        &mut out,
        "my bookings",
        &ui::user_booking_cards(&controller.snapshot().user_bookings),
    )?;
    Ok(())
}

pub async fn cancel(controller: &Controller, booking_id: i64) -> anyhow::Result<()> {
    controller.restore().await;
    let result = controller.cancel_booking(booking_id).await;
    finish(controller, result)?;
    write_fragment(
        &mut io::stdout(),
        "my bookings",
        &ui::user_booking_cards(&controller.snapshot().user_bookings),
    )?;
    Ok(())
}

/// The signed-in user's bookings.
pub async fn bookings(controller: &Controller) -> anyhow::Result<()> {
    let state = controller.start().await;
    let mut out = io::stdout();
    if state.session.is_guest() {
        writeln!(out, "Not logged in")?;
        return Ok(());
    }
    write_fragment(&mut out, "my bookings", &ui::user_booking_cards(&state.user_bookings))?;
    Ok(())
}

/// Booked slots for a date, grouped by machine.
pub async fn slots(
    controller: &Controller,
    date: Option<String>,
    details: bool,
) -> anyhow::Result<()> {
    controller.start().await;
    let date = date.unwrap_or_else(today);
    let result = controller.check_slots(&date).await;
    finish(controller, result)?;

    let state = controller.snapshot();
    let Some(query) = state.slots else {
        return Ok(());
    };
    let mut out = io::stdout();
    write_fragment(
        &mut out,
        "slots",
        &ui::slots(&query.date, &query.bookings, &state.machines),
    )?;
    if details {
        for booking in &query.bookings {
            write_fragment(&mut out, "slot details", &ui::slot_details(booking))?;
        }
    }
    Ok(())
}

pub async fn machine_bookings(controller: &Controller, machine_id: i64) -> anyhow::Result<()> {
    let result = controller.show_machine_bookings(machine_id).await;
    finish(controller, result)?;
    if let Some(found) = controller.snapshot().machine_bookings {
        write_fragment(
            &mut io::stdout(),
            "machine bookings",
            &ui::machine_bookings_modal(&found),
        )?;
    }
    Ok(())
}
