//! Washbook CLI
//!
//! Terminal front end for the laundry-machine booking service. Rendered views
//! go to stdout, logs to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use washbook_cli::admin_cmd::{self, AdminAction};
use washbook_cli::api::ApiClient;
use washbook_cli::auth_cmd::{self, LoginAction};
use washbook_cli::storage::{FileStore, KeyValueStore};
use washbook_cli::{booking_cmd, watch, Controller, Settings};
use washbook_core::config::{load_config, validate};
use washbook_core::tracing_init::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "washbook")]
#[command(version, about = "Laundry machine booking client", long_about = None)]
struct Cli {
    /// Booking server base URL (overrides config and WASHBOOK_API_BASE).
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Session storage file (default: ~/.washbook/storage.json).
    #[arg(long, global = true, env = "WASHBOOK_STORAGE")]
    storage: Option<PathBuf>,

    /// Refresh period in seconds.
    #[arg(long, global = true)]
    refresh_secs: Option<u64>,

    /// Never substitute demo data when the server is unreachable.
    #[arg(long, global = true)]
    no_demo: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the stored session.
    Status,
    /// Log in.
    Login {
        #[command(subcommand)]
        action: LoginAction,
    },
    /// Create a student account.
    Register {
        #[arg(short, long)]
        student_id: String,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out and forget the stored session.
    Logout,
    /// Show the machine board.
    Machines,
    /// Book a machine.
    Book {
        /// Machine ID.
        #[arg(short, long)]
        machine: String,
        /// Local start time, YYYY-MM-DDTHH:MM.
        #[arg(short, long)]
        start: String,
        /// Duration in hours (0.5, 1, 1.5, 2).
        #[arg(short, long, default_value = "1")]
        duration: String,
    },
    /// Cancel a pending booking.
    Cancel {
        /// Booking ID.
        id: i64,
    },
    /// List your bookings.
    Bookings,
    /// Show booked slots for a date.
    Slots {
        /// YYYY-MM-DD (default: today).
        #[arg(short, long)]
        date: Option<String>,
        /// Also print a details card per booking.
        #[arg(long)]
        details: bool,
    },
    /// Show a machine's upcoming bookings.
    MachineBookings {
        /// Machine ID.
        id: i64,
    },
    /// Administrator commands.
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Keep refreshing and reprint the current view until Ctrl+C.
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config()?;
    if let Some(base) = cli.api_base {
        config.api.base_url = base;
    }
    if let Some(secs) = cli.refresh_secs {
        config.refresh.interval_secs = secs;
    }
    if cli.no_demo {
        config.display.demo_fallback = false;
    }
    validate(&config)?;

    let default_filter = match cli.command {
        Commands::Watch => "washbook=warn".to_string(),
        _ => format!("washbook={}", config.log_level),
    };
    init_tracing(&default_filter, cli.log_json);
    info!(version = env!("CARGO_PKG_VERSION"), api = %config.api.base_url, "Starting washbook CLI");

    let store: Arc<dyn KeyValueStore> = match cli.storage {
        Some(path) => Arc::new(FileStore::new(path)),
        None => Arc::new(FileStore::open_default()?),
    };
    let api = ApiClient::new(&config.api)?;
    let controller = Controller::new(api, store, Settings::from_config(&config));

    match cli.command {
        Commands::Status => auth_cmd::status(&controller).await,
        Commands::Login { action } => auth_cmd::login(&controller, action).await,
        Commands::Register {
            student_id,
            username,
            password,
        } => auth_cmd::register(&controller, &student_id, &username, &password).await,
        Commands::Logout => {
            controller.restore().await;
            auth_cmd::logout(&controller)
        }
        Commands::Machines => booking_cmd::machines(&controller).await,
        Commands::Book {
            machine,
            start,
            duration,
        } => booking_cmd::book(&controller, &machine, &start, &duration).await,
        Commands::Cancel { id } => booking_cmd::cancel(&controller, id).await,
        Commands::Bookings => booking_cmd::bookings(&controller).await,
        Commands::Slots { date, details } => booking_cmd::slots(&controller, date, details).await,
        Commands::MachineBookings { id } => booking_cmd::machine_bookings(&controller, id).await,
        Commands::Admin { action } => admin_cmd::run(&controller, action).await,
        Commands::Watch => watch::run(&controller).await,
    }
}
