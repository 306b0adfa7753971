//! Session events for observers and renderers.
//!
//! The orchestrator emits one event per notable moment in a cycle; a
//! [`SessionObserver`] is purely observational and never feeds back into
//! the state machine. The CLI uses this to drive its console rendering,
//! tests use it to record and script sessions.

use std::time::Duration;

use crate::alert::AlertTrigger;
use crate::command::RejectReason;
use crate::monitor::SessionSummary;
use crate::protocol::{CycleStatus, PromptReason};
use crate::types::SensorReading;

/// Which prompt is on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    /// In-cycle confirmation prompt, with the protocol's reason.
    Cycle(PromptReason),
    /// Unconditional final safety check at session end.
    FinalCheck,
}

/// One notable moment in a monitoring session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A cycle began and a reading was taken.
    CycleStarted {
        /// Cycle number, starting at 1.
        cycle: u64,
        /// The reading just taken.
        reading: SensorReading,
    },
    /// Still filling the initial window; no scoring this cycle.
    Collecting {
        /// Current cycle number.
        cycle: u64,
        /// Cycles required before scoring starts.
        required: u64,
    },
    /// Abnormality score computed for this cycle.
    ScoreComputed {
        /// Current cycle number.
        cycle: u64,
        /// Score in [0, 100].
        score: f64,
    },
    /// Cycle needed no prompt.
    Status {
        /// The no-prompt status.
        status: CycleStatus,
    },
    /// A confirmation prompt was issued and the bounded wait started.
    PromptIssued {
        /// Which prompt.
        kind: PromptKind,
        /// How long the wearer has to answer.
        timeout: Duration,
        /// Whether responses must carry the PIN token.
        pin_required: bool,
    },
    /// The prompt deadline passed with no input.
    PromptExpired,
    /// A response arrived but did not establish safety.
    CommandRejected {
        /// Why the response was rejected.
        reason: RejectReason,
    },
    /// Wearer confirmed safety.
    SafetyConfirmed {
        /// An outstanding alert was acknowledged; contacts should be told
        /// the wearer is fine.
        alert_cleared: bool,
    },
    /// An alert went out to emergency contacts.
    AlertDispatched {
        /// What triggered it.
        trigger: AlertTrigger,
        /// Cycle it was raised in.
        cycle: u64,
    },
    /// Valid removal request received; final safety check is next.
    RemovalDetected,
    /// Inter-cycle REMOVE rejected for a missing or wrong PIN; monitoring
    /// continues.
    RemovalRejected,
    /// Inter-cycle delay started (interruptible by REMOVE).
    CycleDelayStarted {
        /// Configured delay.
        delay: Duration,
    },
    /// Final safety check answered affirmatively.
    FinalCheckPassed,
    /// Session is over.
    SessionEnded {
        /// Totals for the session.
        summary: SessionSummary,
    },
}

/// Observer callback for session events.
pub trait SessionObserver: Send {
    /// Called synchronously for every event, in order.
    fn on_event(&mut self, event: &SessionEvent);
}

/// Observer that ignores everything.
pub struct NullObserver;

impl SessionObserver for NullObserver {
    fn on_event(&mut self, _event: &SessionEvent) {}
}
