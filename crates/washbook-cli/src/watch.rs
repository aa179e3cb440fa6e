//! `washbook watch`: keep the refresh loops running and reprint the view.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::controller::Controller;

/// Print the current view now and after every refresh period until Ctrl+C.
pub async fn run(controller: &Controller) -> anyhow::Result<()> {
    controller.start().await;
    let period = controller.settings().refresh_interval;
    let mut timer = tokio::time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(period_secs = period.as_secs(), "Watching");

    let mut out = io::stdout();
    loop {
        tokio::select! {
            _ = timer.tick() => {
                writeln!(
                    out,
                    "<!-- {} | dashboard refresh: {} | global refresh: {} -->",
                    controller.view().as_str(),
                    on_off(controller.dashboard_refresh_active()),
                    on_off(controller.global_refresh_active()),
                )?;
                writeln!(out, "{}", controller.render())?;
                out.flush()?;
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Interrupted, stopping");
                break;
            }
        }
    }
    Ok(())
}

const fn on_off(active: bool) -> &'static str {
    if active { "on" } else { "off" }
}
