//! VitalGuard CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vitalguard_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Monitor(args) => {
            vitalguard_cli::monitor::execute(args).await?;
        }
        Commands::Version => {
            println!("vitalguard {}", env!("CARGO_PKG_VERSION"));
            println!("core version: {}", vitalguard_core::VERSION);
        }
    }

    Ok(())
}
