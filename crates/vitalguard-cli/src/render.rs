//! Console rendering of session events.

use colored::Colorize;

use vitalguard_core::command::RejectReason;
use vitalguard_core::events::{PromptKind, SessionEvent, SessionObserver};
use vitalguard_core::protocol::{CycleStatus, PromptReason};
use vitalguard_core::score::MAX_SCORE;

const GAUGE_WIDTH: usize = 20;

/// Renders session events to the terminal.
///
/// Purely observational; never touches the session state.
pub struct ConsoleRenderer {
    pin_enabled: bool,
}

impl ConsoleRenderer {
    /// Create a renderer. `pin_enabled` controls how the REMOVE hint is
    /// worded in the inter-cycle countdown.
    pub fn new(pin_enabled: bool) -> Self {
        Self { pin_enabled }
    }

    fn print_gauge(&self, score: f64) {
        let filled = ((score / MAX_SCORE) * GAUGE_WIDTH as f64).round() as usize;
        let filled = filled.min(GAUGE_WIDTH);
        let bar = format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(GAUGE_WIDTH - filled)
        );
        let colored_bar = if score <= 45.0 {
            bar.green()
        } else if score <= 70.0 {
            bar.yellow()
        } else {
            bar.red()
        };
        println!("  Abnormality: [{}] {:.0}%", colored_bar, score);
    }

    fn print_prompt(&self, kind: &PromptKind, timeout_secs: u64, pin_required: bool) {
        match kind {
            PromptKind::Cycle(reason) => {
                let headline = match reason {
                    PromptReason::Reprompt => {
                        "No response received last time. Are you safe?".to_string()
                    }
                    PromptReason::Escalation => {
                        "Abnormal readings detected. Are you safe?".to_string()
                    }
                    PromptReason::SharpJump { delta } => format!(
                        "Your readings jumped sharply (+{delta:.0} points). Are you safe?"
                    ),
                    PromptReason::ConsecutiveAbnormal { count } => format!(
                        "Readings have been abnormal for {count} cycles in a row. Are you safe?"
                    ),
                };
                println!("\n  {}", headline.yellow().bold());
                if pin_required {
                    println!(
                        "  Reply {} within {} seconds.",
                        "YES <PIN>".bold(),
                        timeout_secs
                    );
                } else {
                    println!("  Reply {} within {} seconds.", "YES".bold(), timeout_secs);
                }
            }
            PromptKind::FinalCheck => {
                println!("\n{}", "=".repeat(60));
                println!("{}", "  FINAL SAFETY CHECK".bold());
                println!("{}", "=".repeat(60));
                println!(
                    "  Before the device deactivates, confirm you are safe.\n  Reply {} within {} seconds. No PIN needed.",
                    "YES".bold(),
                    timeout_secs
                );
            }
        }
    }
}

impl SessionObserver for ConsoleRenderer {
    fn on_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::CycleStarted { cycle, reading } => {
                println!("\n{}", format!("── Cycle {cycle} ──").cyan());
                let motion = if reading.motion_detected {
                    "moving".green()
                } else {
                    "stationary".yellow()
                };
                println!(
                    "  Heart rate: {} bpm | Motion: {}",
                    reading.heart_rate, motion
                );
            }
            SessionEvent::Collecting { cycle, required } => {
                println!("  Collecting baseline readings ({cycle}/{required})...");
            }
            SessionEvent::ScoreComputed { score, .. } => {
                self.print_gauge(*score);
            }
            SessionEvent::Status { status } => match status {
                CycleStatus::Normal => {
                    println!("  {}", "Status: normal".green());
                }
                CycleStatus::EpisodeCleared => {
                    println!("  {}", "Readings back to normal. Episode cleared.".green());
                }
                CycleStatus::Tracking { consecutive } => {
                    println!(
                        "  {}",
                        format!("Still abnormal ({consecutive} consecutive). Watching closely.")
                            .yellow()
                    );
                }
            },
            SessionEvent::PromptIssued {
                kind,
                timeout,
                pin_required,
            } => {
                self.print_prompt(kind, timeout.as_secs(), *pin_required);
            }
            SessionEvent::PromptExpired => {
                println!("  {}", "No response received in time.".red());
            }
            SessionEvent::CommandRejected { reason } => {
                let message = match reason {
                    RejectReason::Empty => "Empty response.",
                    RejectReason::MissingPin => "That command needs your PIN.",
                    RejectReason::WrongPin => "Incorrect PIN.",
                    RejectReason::Unrecognized => "Response not understood.",
                };
                println!("  {}", message.red());
            }
            SessionEvent::SafetyConfirmed { alert_cleared } => {
                println!("  {}", "Safety confirmed. Thank you.".green());
                if *alert_cleared {
                    println!(
                        "  {}",
                        "Your contacts will be notified that you are okay.".green()
                    );
                }
            }
            SessionEvent::AlertDispatched { trigger, cycle } => {
                println!(
                    "  {}",
                    format!("Alert dispatched ({trigger}) on cycle {cycle}.")
                        .red()
                        .bold()
                );
            }
            SessionEvent::RemovalDetected => {
                println!("  {}", "Removal request accepted. Ending session.".cyan());
            }
            SessionEvent::RemovalRejected => {
                println!(
                    "  {}",
                    "Removal rejected: incorrect or missing PIN. Monitoring continues.".red()
                );
            }
            SessionEvent::CycleDelayStarted { delay } => {
                let hint = if self.pin_enabled { "REMOVE <PIN>" } else { "REMOVE" };
                println!(
                    "  {}",
                    format!("Next reading in {}s (type {hint} to stop)...", delay.as_secs())
                        .dimmed()
                );
            }
            SessionEvent::FinalCheckPassed => {
                println!("  {}", "Safety confirmed. Device deactivated.".green().bold());
            }
            SessionEvent::SessionEnded { .. } => {}
        }
    }
}
