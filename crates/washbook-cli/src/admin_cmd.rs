//! Admin subcommands: machines, bookings, add-machine, set-status.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use washbook_core::MachineStatus;

use crate::controller::Controller;
use crate::output::{finish, write_fragment};
use crate::ui;

/// Admin subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AdminAction {
    /// Machines with their status controls and summary counts.
    Machines,
    /// All bookings.
    Bookings {
        /// Include bookings that already ended.
        #[arg(long)]
        past: bool,
    },
    /// Add a machine.
    AddMachine {
        /// Display name (e.g. "Machine 9").
        name: String,
    },
    /// Set a machine's status.
    SetStatus {
        /// Machine ID.
        id: i64,
        /// available, in_use or broken.
        #[arg(value_parser = parse_status)]
        status: MachineStatus,
    },
}

fn parse_status(s: &str) -> Result<MachineStatus, String> {
    s.parse()
}

/// Execute an admin subcommand.
pub async fn run(controller: &Controller, action: AdminAction) -> anyhow::Result<()> {
    let state = controller.start().await;
    if !state.session.is_admin() {
        anyhow::bail!("Administrator login required. Use `washbook login admin`");
    }
    let mut out = io::stdout();
    match action {
        AdminAction::Machines => {}
        AdminAction::Bookings { past } => {
            if past != state.show_past {
                let result = controller.toggle_past_bookings().await;
                finish(controller, result)?;
            }
            let state = controller.snapshot();
            writeln!(
                out,
                "Showing {} bookings",
                if state.show_past { "all" } else { "upcoming" }
            )?;
            write_fragment(&mut out, "all bookings", &ui::admin_booking_cards(&state.all_bookings))?;
            return Ok(());
        }
        AdminAction::AddMachine { name } => {
            let result = controller.add_machine(&name).await;
            finish(controller, result)?;
        }
        AdminAction::SetStatus { id, status } => {
            let result = controller.set_machine_status(id, status).await;
            finish(controller, result)?;
        }
    }
    let machines = controller.snapshot().admin_machines;
    write_fragment(&mut out, "status summary", &ui::status_summary(&machines))?;
    write_fragment(&mut out, "admin machines", &ui::admin_machine_cards(&machines))?;
    Ok(())
}
