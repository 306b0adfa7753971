//! Session orchestration.
//!
//! [`MonitorSession`] drives the monitoring loop: acquire a reading, update
//! the window, run one protocol cycle (which may suspend on a confirmation
//! prompt), then wait out the inter-cycle delay. Exactly one cycle is in
//! flight at a time; the prompt wait and the delay wait are the only
//! suspension points and both go through the same cancellable
//! [`CommandStream`] wait. Every exit path runs the final safety check.

use chrono::Utc;

use crate::alert::{AlertContext, AlertSink, AlertTrigger};
use crate::command::{classify_prompt_reply, is_affirmative, parse_command, CommandKind, PromptReply};
use crate::events::{PromptKind, SessionEvent, SessionObserver};
use crate::protocol::{CycleDirective, PromptOutcome, PromptReason, ProtocolEffect, ProtocolState};
use crate::score::abnormality_score;
use crate::sensor::SensorSource;
use crate::timer::{CommandStream, WaitOutcome};
use crate::window::ReadingWindow;
use crate::SessionConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cycles spent collecting readings before scoring starts.
pub const COLLECTING_CYCLES: u64 = 4;

/// Totals reported when a session ends.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionSummary {
    /// Monitoring cycles completed.
    pub cycles: u64,
    /// Confirmation prompts issued (final check included).
    pub prompts_issued: u32,
    /// Alerts dispatched to emergency contacts.
    pub alerts_sent: u32,
    /// Highest abnormality score observed.
    pub peak_score: f64,
    /// Whether the final safety check was answered affirmatively.
    pub safe_at_exit: bool,
}

/// How a wearer's prompt response resolved, termination included.
enum SafetyReply {
    Confirmed,
    Unsafe,
    Terminate,
}

/// A monitoring session over a sensor, an alert sink, and an observer.
///
/// Single owner of the window and protocol state; never shared.
pub struct MonitorSession<S, A, O> {
    config: SessionConfig,
    sensor: S,
    alerts: A,
    observer: O,
    commands: CommandStream,
    window: ReadingWindow,
    state: ProtocolState,
    cycle: u64,
    prompts_issued: u32,
    alerts_sent: u32,
    peak_score: f64,
}

impl<S, A, O> MonitorSession<S, A, O>
where
    S: SensorSource,
    A: AlertSink,
    O: SessionObserver,
{
    /// Create a session. Monitoring starts when [`run`](Self::run) is
    /// awaited.
    pub fn new(
        config: SessionConfig,
        sensor: S,
        alerts: A,
        observer: O,
        commands: CommandStream,
    ) -> Self {
        Self {
            config,
            sensor,
            alerts,
            observer,
            commands,
            window: ReadingWindow::new(),
            state: ProtocolState::new(),
            cycle: 0,
            prompts_issued: 0,
            alerts_sent: 0,
            peak_score: 0.0,
        }
    }

    /// Run the monitoring loop until a valid REMOVE ends the session.
    ///
    /// The loop has no failure exits: timeouts and malformed input resolve
    /// to the conservative unsafe interpretation and alert-sink errors are
    /// logged and swallowed. External interrupts are the caller's job: drop
    /// this future and call [`end_session`](Self::end_session).
    pub async fn run(&mut self) -> SessionSummary {
        tracing::info!(
            baseline_bpm = self.config.baseline_heart_rate,
            pin_enabled = self.config.pin.is_some(),
            escalation_threshold = self.config.escalation_threshold,
            "monitoring session started"
        );

        loop {
            self.cycle += 1;
            let reading = self.sensor.next_reading();
            self.window.push(reading);
            self.emit(SessionEvent::CycleStarted {
                cycle: self.cycle,
                reading,
            });

            if self.cycle <= COLLECTING_CYCLES {
                tracing::debug!(cycle = self.cycle, "collecting initial window");
                self.emit(SessionEvent::Collecting {
                    cycle: self.cycle,
                    required: COLLECTING_CYCLES,
                });
            } else if self.run_cycle().await {
                return self.end_session().await;
            }

            if self.wait_between_cycles().await {
                return self.end_session().await;
            }
        }
    }

    /// Score the window and run one protocol cycle. Returns true when the
    /// wearer requested termination.
    async fn run_cycle(&mut self) -> bool {
        let score = abnormality_score(&self.window);
        self.peak_score = self.peak_score.max(score);
        self.emit(SessionEvent::ScoreComputed {
            cycle: self.cycle,
            score,
        });
        tracing::debug!(cycle = self.cycle, score, "abnormality score computed");

        let (next, directive) = self.state.observe(score, &self.config.thresholds());
        self.state = next;

        match directive {
            CycleDirective::Continue(status) => {
                self.emit(SessionEvent::Status { status });
            }
            CycleDirective::Prompt(reason) => {
                match self.prompt_safety(reason.clone()).await {
                    SafetyReply::Terminate => {
                        self.emit(SessionEvent::RemovalDetected);
                        return true;
                    }
                    reply => {
                        let outcome = match reply {
                            SafetyReply::Confirmed => PromptOutcome::Confirmed,
                            _ => PromptOutcome::Unsafe,
                        };
                        let (next, effect) = self.state.resolve(&reason, outcome);
                        self.state = next;
                        match effect {
                            ProtocolEffect::ConfirmedSafe { alert_cleared } => {
                                self.emit(SessionEvent::SafetyConfirmed { alert_cleared });
                            }
                            ProtocolEffect::AlertRequired => {
                                let trigger = match reason {
                                    PromptReason::Reprompt => AlertTrigger::RepromptUnanswered,
                                    _ => AlertTrigger::NoConfirmation,
                                };
                                self.dispatch_alert(trigger, score).await;
                            }
                        }
                    }
                }
            }
        }

        self.state = self.state.with_score_recorded(score);
        false
    }

    /// Issue a confirmation prompt and wait for the response.
    async fn prompt_safety(&mut self, reason: PromptReason) -> SafetyReply {
        self.prompts_issued += 1;
        self.emit(SessionEvent::PromptIssued {
            kind: PromptKind::Cycle(reason),
            timeout: self.config.response_timeout,
            pin_required: self.config.pin.is_some(),
        });

        match self.commands.next_within(self.config.response_timeout).await {
            WaitOutcome::Expired => {
                self.emit(SessionEvent::PromptExpired);
                SafetyReply::Unsafe
            }
            WaitOutcome::Command(line) => match classify_prompt_reply(&line, self.config.pin()) {
                PromptReply::Confirmed => SafetyReply::Confirmed,
                PromptReply::Terminate => SafetyReply::Terminate,
                PromptReply::Unsafe(reason) => {
                    self.emit(SessionEvent::CommandRejected { reason });
                    SafetyReply::Unsafe
                }
            },
        }
    }

    /// Inter-cycle delay, interruptible by a PIN-gated REMOVE. Any other
    /// input just ends the wait early. Returns true on a valid REMOVE.
    async fn wait_between_cycles(&mut self) -> bool {
        self.emit(SessionEvent::CycleDelayStarted {
            delay: self.config.cycle_delay,
        });

        match self.commands.next_within(self.config.cycle_delay).await {
            WaitOutcome::Expired => false,
            WaitOutcome::Command(line) => {
                match parse_command(&line, self.config.pin()) {
                    Some(command) if command.kind == CommandKind::Remove => {
                        if command.pin_accepted() {
                            self.emit(SessionEvent::RemovalDetected);
                            true
                        } else {
                            // Unlike a failed prompt, a bad PIN here just
                            // keeps monitoring going.
                            tracing::warn!("REMOVE rejected: incorrect or missing PIN");
                            self.emit(SessionEvent::RemovalRejected);
                            false
                        }
                    }
                    _ => false,
                }
            }
        }
    }

    /// Run the final safety check and finish the session.
    ///
    /// Public so an interrupt handler can route a cancelled session
    /// through the same unconditional check.
    pub async fn end_session(&mut self) -> SessionSummary {
        let safe = self.final_safety_check().await;
        let summary = SessionSummary {
            cycles: self.cycle,
            prompts_issued: self.prompts_issued,
            alerts_sent: self.alerts_sent,
            peak_score: self.peak_score,
            safe_at_exit: safe,
        };
        tracing::info!(
            cycles = summary.cycles,
            alerts = summary.alerts_sent,
            safe_at_exit = summary.safe_at_exit,
            "monitoring session ended"
        );
        self.emit(SessionEvent::SessionEnded {
            summary: summary.clone(),
        });
        summary
    }

    /// Unconditional confirmation before termination, regardless of the
    /// escalation state. Anything other than an explicit YES within the
    /// timeout dispatches a precautionary alert. Not PIN gated.
    pub async fn final_safety_check(&mut self) -> bool {
        self.prompts_issued += 1;
        self.emit(SessionEvent::PromptIssued {
            kind: PromptKind::FinalCheck,
            timeout: self.config.response_timeout,
            pin_required: false,
        });

        match self.commands.next_within(self.config.response_timeout).await {
            WaitOutcome::Command(line) if is_affirmative(&line) => {
                self.emit(SessionEvent::FinalCheckPassed);
                true
            }
            WaitOutcome::Command(_) => {
                self.dispatch_alert(AlertTrigger::FinalCheckFailed, self.last_score())
                    .await;
                false
            }
            WaitOutcome::Expired => {
                self.emit(SessionEvent::PromptExpired);
                self.dispatch_alert(AlertTrigger::FinalCheckFailed, self.last_score())
                    .await;
                false
            }
        }
    }

    /// Fire-and-forget alert dispatch. Sink errors are logged, never
    /// propagated.
    async fn dispatch_alert(&mut self, trigger: AlertTrigger, score: f64) {
        let context = AlertContext {
            cycle: self.cycle,
            score,
            trigger,
            timestamp: Utc::now(),
        };
        tracing::warn!(
            cycle = context.cycle,
            score = context.score,
            trigger = %context.trigger,
            "dispatching emergency alert"
        );
        if let Err(error) = self.alerts.send_alert(&context).await {
            tracing::warn!(sink = self.alerts.name(), %error, "alert sink failed");
        }
        self.alerts_sent += 1;
        self.emit(SessionEvent::AlertDispatched {
            trigger,
            cycle: self.cycle,
        });
    }

    fn last_score(&self) -> f64 {
        self.state.last_score.unwrap_or(0.0)
    }

    fn emit(&mut self, event: SessionEvent) {
        self.observer.on_event(&event);
    }

    /// Current protocol state (read-only).
    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    /// Cycles completed so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}
