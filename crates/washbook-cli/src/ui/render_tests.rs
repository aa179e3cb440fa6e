//! Tests for HTML view rendering.

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use tokio::time::Instant;

    use washbook_core::{Booking, Identity, Machine, MachineStatus};

    use crate::api::MachineBookings;
    use crate::app::{ClientState, MessageKind, SlotQuery, Toast, View};
    use crate::session::Session;
    use crate::ui::*;

    fn booking(id: i64, machine: &str, status: &str) -> Booking {
        Booking {
            id,
            machine_id: None,
            machine_name: Some(machine.into()),
            username: Some("Asha".into()),
            student_id: Some("20BCS042".into()),
            start_time: "2025-06-25T10:00:00".into(),
            end_time: "2025-06-25T11:30:00".into(),
            status: status.into(),
            created_at: Some("2025-06-20 08:15:00".into()),
        }
    }

    fn nine_machines() -> Vec<Machine> {
        (1..=9)
            .map(|i| {
                let status = match i % 3 {
                    0 => MachineStatus::Broken,
                    1 => MachineStatus::Available,
                    _ => MachineStatus::InUse,
                };
                Machine::new(i, format!("Machine {i}"), status)
            })
            .collect()
    }

    fn ctx<'a>(toast: Option<&'a Toast>) -> PageContext<'a> {
        PageContext {
            now: NaiveDate::from_ymd_opt(2025, 6, 25)
                .and_then(|d| d.and_hms_opt(9, 5, 0))
                .unwrap(),
            max_machines: 8,
            toast,
        }
    }

    // =========================================================================
    // Machines
    // =========================================================================

    #[test]
    fn only_first_eight_machines_are_displayed() {
        let machines = nine_machines();
        let html = machine_cards(&machines, 8);
        assert!(html.contains("Machine 8"));
        assert!(!html.contains("Machine 9"));
    }

    #[test]
    fn machine_select_is_available_subset_of_displayed() {
        let mut machines = nine_machines();
        // Machine 10 is available but beyond the display limit.
        machines.push(Machine::new(10, "Machine 10", MachineStatus::Available));

        let bookable = bookable_machines(&machines, 8);
        let ids: Vec<i64> = bookable.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 4, 7]);

        let html = machine_select(&bookable);
        assert!(html.starts_with(
            "<select id=\"machineSelect\" name=\"machineId\"><option value=\"\">Choose a machine</option>"
        ));
        assert_eq!(html.matches("<option").count(), 4);
        assert!(!html.contains("Machine 10"));
    }

    #[test]
    fn machine_card_labels_follow_status() {
        let machines = vec![
            Machine::new(1, "A", MachineStatus::Available),
            Machine::new(2, "B", MachineStatus::InUse),
            Machine::new(3, "C", MachineStatus::Broken),
            Machine::new(4, "D", MachineStatus::Unknown),
        ];
        let html = machine_cards(&machines, 8);
        assert_eq!(html.matches("CURRENTLY AVAILABLE").count(), 2);
        assert!(html.contains("CURRENTLY IN USE"));
        assert!(html.contains("OUT OF ORDER"));
        assert!(html.contains("machine-card in_use"));
        assert!(!html.contains("unknown"));
    }

    #[test]
    fn last_used_line_only_when_present() {
        let mut used = Machine::new(1, "A", MachineStatus::Available);
        used.last_used_by = Some(7);
        used.last_used_time = Some("2025-06-25T10:00:00".into());
        let html = machine_cards(&[used, Machine::new(2, "B", MachineStatus::Available)], 8);
        assert_eq!(html.matches("Last used:").count(), 1);
        assert!(html.contains("25 Jun 2025, 10:00 am"));
    }

    #[test]
    fn admin_machine_card_marks_active_status() {
        let mut m = Machine::new(3, "Dryer <3>", MachineStatus::InUse);
        m.last_used_by_name = Some("Asha".into());
        let html = admin_machine_cards(&[m]);
        assert!(html.contains("Dryer &lt;3&gt;"));
        assert!(html.contains("IN USE"));
        assert_eq!(html.matches(" active\"").count(), 1);
        assert!(html.contains("btn-warning btn-small active"));
        assert!(html.contains("Last used by: Asha"));
        assert!(html.contains("Time: N/A"));
    }

    #[test]
    fn status_counts_ignore_unknown() {
        let mut machines = nine_machines();
        machines.push(Machine::new(99, "X", MachineStatus::Unknown));
        let counts = StatusCounts::tally(&machines);
        assert_eq!(
            counts,
            StatusCounts {
                available: 3,
                in_use: 3,
                broken: 3
            }
        );
        assert!(status_summary(&machines).contains("<span id=\"brokenCount\">3</span>"));
    }

    // =========================================================================
    // Bookings
    // =========================================================================

    #[test]
    fn empty_user_bookings() {
        assert_eq!(user_booking_cards(&[]), "<p>No bookings found.</p>");
        assert_eq!(admin_booking_cards(&[]), "<p>No bookings found.</p>");
    }

    #[test]
    fn cancel_button_only_on_pending() {
        let html = user_booking_cards(&[
            booking(1, "Machine 1", "pending"),
            booking(2, "Machine 1", "confirmed"),
        ]);
        assert_eq!(html.matches("data-intent=\"cancel-booking\"").count(), 1);
        assert!(html.contains("data-booking-id=\"1\""));
        assert!(html.contains("CONFIRMED"));
    }

    #[test]
    fn admin_booking_shows_user_and_student_id() {
        let mut b = booking(5, "Machine 2", "confirmed");
        b.student_id = None;
        let html = admin_booking_cards(&[b]);
        assert!(html.contains("<strong>Asha</strong>"));
        assert!(html.contains("<small>N/A</small>"));
        assert!(html.contains("25 Jun 2025, 10:00 am - 25 Jun 2025, 11:30 am"));
    }

    #[test]
    fn empty_slots_have_no_groups() {
        let machines = nine_machines();
        let html = slots("2025-06-25", &[], &machines);
        assert_eq!(
            html,
            "<p class=\"no-slots\">No bookings found for 25 June 2025</p>"
        );
        assert!(!html.contains("machine-slot-group"));
    }

    #[test]
    fn slots_grouped_in_machine_order() {
        let machines = vec![
            Machine::new(1, "Machine 1", MachineStatus::Available),
            Machine::new(2, "Machine 2", MachineStatus::Broken),
        ];
        let bookings = vec![
            booking(1, "Machine 2", "confirmed"),
            booking(2, "Ghost Machine", "confirmed"),
        ];
        let html = slots("2025-06-25", &bookings, &machines);

        assert!(html.starts_with("<h4>Bookings for 25 June 2025</h4>"));
        assert_eq!(html.matches("machine-slot-group").count(), 2);
        let first = html.find("Machine 1").unwrap();
        let second = html.find("Machine 2").unwrap();
        assert!(first < second);
        assert_eq!(
            html.matches("No bookings for this machine on this date.").count(),
            1
        );
        assert!(!html.contains("Ghost Machine"));
        assert!(html.contains("10:00 am - 11:30 am"));
    }

    #[test]
    fn grouping_drops_bookings_without_machine() {
        let machines = vec![Machine::new(1, "Machine 1", MachineStatus::Available)];
        let mut orphan = booking(3, "", "pending");
        orphan.machine_name = None;
        let bookings = vec![orphan, booking(4, "Machine 1", "pending")];
        let groups = group_by_machine(&machines, &bookings);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[0].1[0].id, 4);
    }

    #[test]
    fn slot_details_card() {
        let html = slot_details(&booking(12, "Machine 1", "pending"));
        assert!(html.contains("<strong>Booking ID:</strong> #12"));
        assert!(html.contains("<strong>Date:</strong> 25 June 2025"));
        assert!(html.contains("<strong>Duration:</strong> 1.5 hours"));
        assert!(html.contains("<strong>Booked on:</strong> 20 Jun 2025, 08:15 am"));
    }

    #[test]
    fn machine_bookings_modal_empty_and_filled() {
        let empty = MachineBookings {
            machine_name: "Machine 3".into(),
            bookings: Vec::new(),
        };
        let html = machine_bookings_modal(&empty);
        assert!(html.contains("Machine 3 - Current Bookings"));
        assert!(html.contains("No current bookings for this machine."));

        let filled = MachineBookings {
            machine_name: "Machine 3".into(),
            bookings: vec![booking(8, "Machine 3", "confirmed")],
        };
        let html = machine_bookings_modal(&filled);
        assert!(html.contains("Booking #8"));
        assert!(html.contains("Asha (20BCS042)"));
        assert!(!html.contains("No current bookings"));
    }

    // =========================================================================
    // Page
    // =========================================================================

    fn user_state() -> ClientState {
        ClientState {
            session: Session::User(Identity {
                id: 1,
                student_id: "S1".into(),
                username: "<asha>".into(),
                email: None,
                role: None,
            }),
            view: View::UserDashboard,
            machines: nine_machines(),
            bookable: bookable_machines(&nine_machines(), 8),
            ..ClientState::default()
        }
    }

    #[test]
    fn page_renders_exactly_one_view() {
        let mut state = user_state();
        for (view, id) in [
            (View::Welcome, "welcomeSection"),
            (View::UserDashboard, "userDashboard"),
            (View::AdminDashboard, "adminDashboard"),
        ] {
            state.view = view;
            let html = page(&state, ctx(None));
            assert!(html.contains(id), "{} missing {id}", view.as_str());
            let sections = ["welcomeSection", "userDashboard", "adminDashboard"]
                .iter()
                .filter(|s| html.contains(*s))
                .count();
            assert_eq!(sections, 1);
        }
    }

    #[test]
    fn user_dashboard_escapes_name_and_sets_form_defaults() {
        let html = page(&user_state(), ctx(None));
        assert!(html.contains("Welcome, <span id=\"userName\">&lt;asha&gt;</span>"));
        assert!(html.contains("min=\"2025-06-25T09:05\""));
        assert!(html.contains("id=\"slotDate\" value=\"2025-06-25\""));
        assert!(html.contains("<option value=\"0.5\">30 minutes</option>"));
        assert!(html.contains("id=\"slotsContent\" hidden"));
    }

    #[test]
    fn expanded_slots_section_shows_results() {
        let mut state = user_state();
        state.slots_expanded = true;
        state.slots = Some(SlotQuery {
            date: "2025-06-25".into(),
            bookings: Vec::new(),
        });
        let html = page(&state, ctx(None));
        assert!(html.contains("No bookings found for 25 June 2025"));
        assert!(!html.contains("slotsContent\" hidden"));
    }

    #[test]
    fn admin_toggle_label_follows_show_past() {
        let mut state = user_state();
        state.view = View::AdminDashboard;
        assert!(page(&state, ctx(None)).contains("Show Past Bookings"));
        state.show_past = true;
        assert!(page(&state, ctx(None)).contains("Hide Past Bookings"));
    }

    #[tokio::test(start_paused = true)]
    async fn banner_is_rendered_first() {
        let toast = Toast {
            kind: MessageKind::Error,
            text: "Booking failed".into(),
            shown_at: Instant::now(),
        };
        let html = page(&ClientState::default(), ctx(Some(&toast)));
        assert!(html.starts_with(
            "<main class=\"main\"><div class=\"message error\">Booking failed</div>"
        ));
    }
}
