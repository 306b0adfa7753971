//! `monitor` subcommand: run a live session against the simulated sensor.

use std::time::Duration;

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use vitalguard_core::alert::{ConsoleAlertSink, EmergencyContact};
use vitalguard_core::monitor::MonitorSession;
use vitalguard_core::sensor::SimulatedSensor;
use vitalguard_core::timer::CommandStream;
use vitalguard_core::{SessionConfig, SessionSummary};

use crate::render::ConsoleRenderer;

/// Options for the `monitor` subcommand.
#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Baseline resting heart rate in BPM (40-100)
    #[arg(long, default_value_t = 75)]
    pub baseline: u32,

    /// 4-6 digit safety PIN required on YES/REMOVE responses
    #[arg(long)]
    pub pin: Option<String>,

    /// Seconds the wearer has to answer a safety prompt
    #[arg(long, default_value_t = 15)]
    pub response_timeout: u64,

    /// Seconds between monitoring cycles
    #[arg(long, default_value_t = 10)]
    pub cycle_delay: u64,

    /// Seed for the simulated sensor (omit for random readings)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Run a monitoring session until removal or Ctrl-C.
pub async fn execute(args: MonitorArgs) -> anyhow::Result<()> {
    let config = SessionConfig::builder()
        .baseline_heart_rate(args.baseline)
        .pin(args.pin.clone())
        .response_timeout(Duration::from_secs(args.response_timeout))
        .cycle_delay(Duration::from_secs(args.cycle_delay))
        .build()
        .context("invalid session settings")?;

    print_banner(&config);
    tracing::debug!(seed = ?args.seed, "starting simulated monitor session");

    let sensor = match args.seed {
        Some(seed) => SimulatedSensor::seeded(seed),
        None => SimulatedSensor::new(),
    };
    let sink = ConsoleAlertSink::new(vec![
        EmergencyContact::new("Mother", "(555) 010-2234"),
        EmergencyContact::new("Father", "(555) 010-8841"),
        EmergencyContact::new("Trusted Friend", "(555) 010-5577"),
    ]);
    let renderer = ConsoleRenderer::new(config.pin.is_some());

    let (commands_tx, commands) = CommandStream::channel(8);
    spawn_stdin_reader(commands_tx);

    let mut session = MonitorSession::new(config, sensor, sink, renderer, commands);

    // Ctrl-C drops the running loop mid-cycle; the final safety check still
    // runs on that path.
    let summary = {
        let run = session.run();
        tokio::pin!(run);
        tokio::select! {
            summary = &mut run => Some(summary),
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}", "Interrupt received. Running final safety check.".yellow());
                None
            }
        }
    };
    let summary = match summary {
        Some(summary) => summary,
        None => session.end_session().await,
    };

    print_summary(&summary);
    Ok(())
}

fn print_banner(config: &SessionConfig) {
    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  VITALGUARD SAFETY MONITOR".bold());
    println!("{}", "═".repeat(60).cyan());
    println!("  Baseline heart rate: {} bpm", config.baseline_heart_rate);
    println!(
        "  Safety PIN: {}",
        if config.pin.is_some() { "enabled" } else { "disabled" }
    );
    println!(
        "  Response timeout: {}s | Cycle delay: {}s",
        config.response_timeout.as_secs(),
        config.cycle_delay.as_secs()
    );
    println!("{}", "═".repeat(60).cyan());
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn print_summary(summary: &SessionSummary) {
    let rows = vec![
        SummaryRow {
            metric: "Cycles completed",
            value: summary.cycles.to_string(),
        },
        SummaryRow {
            metric: "Prompts issued",
            value: summary.prompts_issued.to_string(),
        },
        SummaryRow {
            metric: "Alerts sent",
            value: summary.alerts_sent.to_string(),
        },
        SummaryRow {
            metric: "Peak abnormality score",
            value: format!("{:.0}%", summary.peak_score),
        },
        SummaryRow {
            metric: "Safe at exit",
            value: if summary.safe_at_exit { "yes" } else { "no" }.to_string(),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("\n{}", "Session summary".bold());
    println!("{table}");
}

/// Forward stdin lines into the command channel. The reader task ends when
/// stdin closes or the session drops the receiver.
fn spawn_stdin_reader(tx: mpsc::Sender<String>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
}
