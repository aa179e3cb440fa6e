//! `Washbook` Core Library
//!
//! Shared functionality for `Washbook` components:
//! - Domain types mirrored from the booking server (identity, machine, booking)
//! - Configuration resolution and hierarchy
//! - Common error types
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod time;
pub mod tracing_init;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::{Booking, Identity, Machine, MachineStatus, Role};
