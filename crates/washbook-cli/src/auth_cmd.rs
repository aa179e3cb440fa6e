//! Auth subcommands: login, register, logout, status.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use crate::controller::Controller;
use crate::output::finish;

/// Login methods.
#[derive(clap::Subcommand, Debug)]
pub enum LoginAction {
    /// Administrator login.
    Admin {
        /// Admin id.
        #[arg(short, long)]
        id: String,
        /// Password.
        #[arg(short, long)]
        password: String,
    },
    /// Student login.
    Student {
        /// Student id (e.g. "20BCS001").
        #[arg(short, long)]
        student_id: String,
        /// Password.
        #[arg(short, long)]
        password: String,
    },
    /// Google Sign-In with an ID token credential.
    Google {
        /// Credential issued by Google Identity Services.
        #[arg(long, env = "WASHBOOK_GOOGLE_CREDENTIAL", default_value = "")]
        credential: String,
    },
}

/// Log in and show the resulting dashboard.
pub async fn login(controller: &Controller, action: LoginAction) -> anyhow::Result<()> {
    let result = match action {
        LoginAction::Admin { id, password } => controller.login_admin(&id, &password).await,
        LoginAction::Student {
            student_id,
            password,
        } => controller.login_student(&student_id, &password).await,
        LoginAction::Google { credential } => controller.google_login(&credential).await,
    };
    let session = finish(controller, result)?;
    let mut out = io::stdout();
    if let Some(name) = session.username() {
        writeln!(out, "Logged in as {name} ({})", session.role())?;
    }
    Ok(())
}

pub async fn register(
    controller: &Controller,
    student_id: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let result = controller.register(student_id, username, password).await;
    finish(controller, result)
}

pub fn logout(controller: &Controller) -> anyhow::Result<()> {
    let result = controller.logout();
    finish(controller, result)
}

/// Show the stored session and the view it restores to.
pub async fn status(controller: &Controller) -> anyhow::Result<()> {
    let state = controller.start().await;
    let mut out = io::stdout();
    match state.session.identity() {
        Some(identity) => {
            writeln!(out, "Logged in as: {}", identity.username)?;
            writeln!(out, "User ID: {}", identity.id)?;
            if !identity.student_id.is_empty() {
                writeln!(out, "Student ID: {}", identity.student_id)?;
            }
            writeln!(out, "Role: {}", state.session.role())?;
        }
        None => writeln!(out, "Not logged in")?,
    }
    writeln!(out, "View: {}", state.view.as_str())?;
    Ok(())
}
