//! Declarative mapping from user intents to controller operations.

use tracing::debug;

use washbook_core::MachineStatus;

use super::{BookingForm, ClientError, Controller};

/// Everything a front end can ask the controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AdminLogin { admin_id: String, password: String },
    StudentLogin { student_id: String, password: String },
    Register {
        student_id: String,
        username: String,
        password: String,
    },
    GoogleSignIn { credential: String },
    Logout,
    CreateBooking(BookingForm),
    CancelBooking { booking_id: i64 },
    SetMachineStatus {
        machine_id: i64,
        status: MachineStatus,
    },
    AddMachine { machine_name: String },
    CheckSlots { date: String },
    ShowMachineBookings { machine_id: i64 },
    CloseMachineBookings,
    TogglePastBookings,
    ToggleSlots,
    Refresh,
}

impl Intent {
    /// Stable name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AdminLogin { .. } => "admin-login",
            Self::StudentLogin { .. } => "student-login",
            Self::Register { .. } => "register",
            Self::GoogleSignIn { .. } => "google-sign-in",
            Self::Logout => "logout",
            Self::CreateBooking(_) => "create-booking",
            Self::CancelBooking { .. } => "cancel-booking",
            Self::SetMachineStatus { .. } => "set-status",
            Self::AddMachine { .. } => "add-machine",
            Self::CheckSlots { .. } => "check-slots",
            Self::ShowMachineBookings { .. } => "machine-bookings",
            Self::CloseMachineBookings => "close-machine-bookings",
            Self::TogglePastBookings => "toggle-past",
            Self::ToggleSlots => "toggle-slots",
            Self::Refresh => "refresh",
        }
    }
}

impl Controller {
    /// Run the handler bound to `intent`.
    pub async fn dispatch(&self, intent: Intent) -> Result<(), ClientError> {
        debug!(intent = intent.name(), "Dispatching intent");
        match intent {
            Intent::AdminLogin { admin_id, password } => {
                self.login_admin(&admin_id, &password).await.map(drop)
            }
            Intent::StudentLogin {
                student_id,
                password,
            } => self.login_student(&student_id, &password).await.map(drop),
            Intent::Register {
                student_id,
                username,
                password,
            } => self.register(&student_id, &username, &password).await,
            Intent::GoogleSignIn { credential } => self.google_login(&credential).await.map(drop),
            Intent::Logout => self.logout(),
            Intent::CreateBooking(form) => self.create_booking(&form).await.map(drop),
            Intent::CancelBooking { booking_id } => self.cancel_booking(booking_id).await,
            Intent::SetMachineStatus { machine_id, status } => {
                self.set_machine_status(machine_id, status).await
            }
            Intent::AddMachine { machine_name } => self.add_machine(&machine_name).await.map(drop),
            Intent::CheckSlots { date } => self.check_slots(&date).await,
            Intent::ShowMachineBookings { machine_id } => {
                self.show_machine_bookings(machine_id).await
            }
            Intent::CloseMachineBookings => {
                self.close_machine_bookings();
                Ok(())
            }
            Intent::TogglePastBookings => self.toggle_past_bookings().await.map(drop),
            Intent::ToggleSlots => {
                self.toggle_slots();
                Ok(())
            }
            Intent::Refresh => {
                self.refresh().await;
                Ok(())
            }
        }
    }
}
