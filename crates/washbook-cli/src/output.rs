//! Shared stdout helpers for the subcommands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use crate::controller::{ClientError, Controller};

/// Print the banner message, if one is showing.
pub fn write_banner(out: &mut impl Write, controller: &Controller) -> io::Result<()> {
    if let Some(toast) = controller.message() {
        writeln!(out, "[{}] {}", toast.kind.as_str(), toast.text)?;
    }
    Ok(())
}

/// Print a titled HTML fragment.
pub fn write_fragment(out: &mut impl Write, title: &str, html: &str) -> io::Result<()> {
    writeln!(out, "<!-- {title} -->")?;
    writeln!(out, "{html}")
}

/// Print the banner, then turn a failed operation into an error for `main`.
pub fn finish<T>(controller: &Controller, result: Result<T, ClientError>) -> anyhow::Result<T> {
    write_banner(&mut io::stdout(), controller)?;
    Ok(result?)
}
