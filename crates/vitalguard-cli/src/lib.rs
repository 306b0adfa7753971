//! Command-line interface for the VitalGuard safety monitor.
//!
//! Exposes the clap command tree so the argument surface can be unit
//! tested without spawning the binary.

use clap::{Parser, Subcommand};

pub mod monitor;
pub mod render;

pub use monitor::MonitorArgs;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "vitalguard",
    about = "Wearable safety monitor with escalation prompts and alert dispatch",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a monitoring session against the simulated sensor
    Monitor(MonitorArgs),
    /// Print version information
    Version,
}
