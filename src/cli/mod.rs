//! Command implementations
//!
//! One module per subcommand. Each `run` takes the resolved workspace paths
//! and prints user-facing messaging; engine errors bubble up to main.

pub mod action;
pub mod confidence;
pub mod dependency;
pub mod element;
pub mod file;
pub mod improvement;
pub mod init;
pub mod phase;
pub mod start;
pub mod status;

use colored::Colorize;

/// Print non-fatal warnings the way every command does.
pub(crate) fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("{}", format!("⚠ {warning}").yellow());
    }
}
