//! Washbook Client Library
//!
//! Session controller for the laundry-machine booking service: REST client,
//! durable session storage, cancellable refresh loops, intent dispatch and
//! HTML view rendering. The `washbook` binary drives it from the terminal.

pub mod admin_cmd;
pub mod api;
pub mod app;
pub mod auth_cmd;
pub mod booking_cmd;
pub mod controller;
pub mod demo;
pub mod output;
pub mod refresh;
pub mod session;
pub mod storage;
pub mod ui;
pub mod watch;

pub use controller::{BookingForm, ClientError, Controller, Intent, Settings};
