//! Emergency alert dispatch.
//!
//! The state machine treats alert delivery as fire-and-forget: a sink
//! failure is logged by the orchestrator and never fed back into the
//! escalation logic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// What caused an alert to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTrigger {
    /// Escalation prompt timed out or got a non-affirmative response.
    NoConfirmation,
    /// The re-issued prompt after an unanswered cycle also failed.
    RepromptUnanswered,
    /// Final safety check failed at session end.
    FinalCheckFailed,
}

impl std::fmt::Display for AlertTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertTrigger::NoConfirmation => write!(f, "no safety confirmation"),
            AlertTrigger::RepromptUnanswered => write!(f, "repeated prompt unanswered"),
            AlertTrigger::FinalCheckFailed => write!(f, "final safety check failed"),
        }
    }
}

/// Context handed to the sink for one alert.
#[derive(Debug, Clone)]
pub struct AlertContext {
    /// Monitoring cycle the alert was raised in.
    pub cycle: u64,
    /// Abnormality score at the time of the alert.
    pub score: f64,
    /// What triggered the alert.
    pub trigger: AlertTrigger,
    /// Dispatch time.
    pub timestamp: DateTime<Utc>,
}

/// Notification dispatch to emergency contacts.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Sink name, for logging.
    fn name(&self) -> &str;

    /// Send an alert. Assumed to succeed from the state machine's
    /// perspective; errors are logged and swallowed by the caller.
    async fn send_alert(&self, context: &AlertContext) -> crate::Result<()>;
}

/// A pre-configured emergency contact.
#[derive(Debug, Clone)]
pub struct EmergencyContact {
    /// Contact display name.
    pub name: String,
    /// Phone number to notify.
    pub phone: String,
}

impl EmergencyContact {
    /// Create a contact.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

/// Console sink: prints the notification block instead of sending SMS or
/// push messages. Stands in for a real delivery integration.
#[derive(Debug, Default)]
pub struct ConsoleAlertSink {
    contacts: Vec<EmergencyContact>,
}

impl ConsoleAlertSink {
    /// Create a sink for the given contacts.
    pub fn new(contacts: Vec<EmergencyContact>) -> Self {
        Self { contacts }
    }
}

#[async_trait]
impl AlertSink for ConsoleAlertSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn send_alert(&self, context: &AlertContext) -> crate::Result<()> {
        println!("\n{}", "!".repeat(60));
        println!("{}", "  🚨  EMERGENCY ALERT SENT TO PRE-SAVED CONTACTS  🚨");
        println!("{}", "!".repeat(60));
        println!(
            "Trigger: {} (cycle {}, score {:.0}%) at {}",
            context.trigger,
            context.cycle,
            context.score,
            context.timestamp.format("%H:%M:%S UTC")
        );
        println!("Notifying contacts...");
        for contact in &self.contacts {
            println!("  ✓ {} - {}", contact.name, contact.phone);
        }
        println!("Alert message: 'Safety concern detected. Please check on me.'");
        println!("{}\n", "!".repeat(60));
        Ok(())
    }
}
