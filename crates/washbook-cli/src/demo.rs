//! Placeholder data shown when the server cannot be reached.

use washbook_core::{Booking, Machine, MachineStatus};

pub fn machines() -> Vec<Machine> {
    vec![
        Machine::new(1, "Machine 1", MachineStatus::Available),
        Machine::new(2, "Machine 2", MachineStatus::InUse),
        Machine::new(3, "Machine 3", MachineStatus::Available),
        Machine::new(4, "Machine 4", MachineStatus::Broken),
    ]
}

fn sample_booking() -> Booking {
    Booking {
        id: 1,
        machine_id: Some(1),
        machine_name: Some("Machine 1".into()),
        username: None,
        student_id: None,
        start_time: "2025-06-25T10:00:00".into(),
        end_time: "2025-06-25T12:00:00".into(),
        status: "confirmed".into(),
        created_at: None,
    }
}

pub fn user_bookings() -> Vec<Booking> {
    vec![sample_booking()]
}

pub fn all_bookings() -> Vec<Booking> {
    vec![Booking {
        username: Some("John Doe".into()),
        student_id: Some("20BCS001".into()),
        ..sample_booking()
    }]
}
