//! View rendering components.

mod html;
mod render;
#[cfg(test)]
mod render_tests;

pub use html::escape;
pub use render::{
    admin_booking_cards, admin_machine_cards, banner, bookable_machines, booking_form,
    displayed_machines, group_by_machine, machine_bookings_modal, machine_cards, machine_select,
    page, slot_details, slots, status_summary, user_booking_cards, PageContext, StatusCounts,
    DURATION_CHOICES,
};
