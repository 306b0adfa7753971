//! # VitalGuard Core
//!
//! Monitoring engine for a wearable personal-safety device. The engine
//! ingests periodic physiological readings (heart rate plus a motion flag),
//! derives a rolling abnormality score from a sliding window of the most
//! recent readings, and drives an escalation protocol: when the score
//! crosses the escalation threshold the wearer is asked to confirm safety
//! within a bounded time window, repeated refusals or timeouts are tracked,
//! and emergency contacts are notified when warranted.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   readings    ┌───────────────┐   score   ┌───────────────┐
//! │ SensorSource ├──────────────►│ ReadingWindow ├──────────►│ ProtocolState │
//! └──────────────┘               │   + scorer    │           │  (pure FSM)   │
//!                                └───────────────┘           └───────┬───────┘
//!                                                                    │ directives
//!                ┌──────────────┐   commands    ┌───────────────┐    │
//!                │ CommandStream├──────────────►│ MonitorSession│◄───┘
//!                └──────────────┘               │ (orchestrator)│
//!                                               └───┬───────┬───┘
//!                                          alerts   │       │ events
//!                                        AlertSink ◄┘       └► SessionObserver
//! ```
//!
//! The protocol itself is a set of pure transitions over [`ProtocolState`]
//! (see [`protocol`]); [`MonitorSession`] owns the single logical thread of
//! control and is the only mutator of session state, so no locking is
//! required.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vitalguard_core::{
//!     alert::ConsoleAlertSink, events::NullObserver, monitor::MonitorSession,
//!     sensor::SimulatedSensor, timer::CommandStream, SessionConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vitalguard_core::MonitorError> {
//!     let config = SessionConfig::builder()
//!         .baseline_heart_rate(72)
//!         .pin(Some("1234".to_string()))
//!         .build()?;
//!
//!     let (_commands_tx, commands) = CommandStream::channel(8);
//!     let mut session = MonitorSession::new(
//!         config,
//!         SimulatedSensor::new(),
//!         ConsoleAlertSink::default(),
//!         NullObserver,
//!         commands,
//!     );
//!     let summary = session.run().await;
//!     println!("alerts sent: {}", summary.alerts_sent);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod alert;
pub mod command;
pub mod events;
pub mod monitor;
pub mod protocol;
pub mod score;
pub mod sensor;
pub mod timer;
pub mod types;
pub mod window;

use std::time::Duration;

pub use monitor::{MonitorSession, SessionSummary};
pub use protocol::{ProtocolState, Thresholds};
pub use types::SensorReading;
pub use window::ReadingWindow;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for monitoring operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Unified error type for monitoring operations.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Invalid session configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Alert dispatch failure. Never fatal to a session; the orchestrator
    /// logs it and continues monitoring.
    #[error("alert dispatch error: {0}")]
    Alert(String),

    /// I/O error from a command channel or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Immutable per-session configuration.
///
/// Built once before monitoring starts; the setup flow that collects the
/// baseline heart rate and PIN from the wearer lives outside the core.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wearer's resting heart rate in BPM (validated to 40-100).
    pub baseline_heart_rate: u32,
    /// Optional 4-6 digit PIN required on YES/REMOVE responses.
    pub pin: Option<String>,
    /// Abnormality score above which the wearer must confirm safety.
    pub escalation_threshold: f64,
    /// Score increase between consecutive cycles treated as a sharp jump.
    pub sharp_jump_threshold: f64,
    /// How long the wearer has to answer a safety prompt.
    pub response_timeout: Duration,
    /// Delay between monitoring cycles.
    pub cycle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            baseline_heart_rate: 75,
            pin: None,
            escalation_threshold: 45.0,
            sharp_jump_threshold: 20.0,
            response_timeout: Duration::from_secs(15),
            cycle_delay: Duration::from_secs(10),
        }
    }
}

impl SessionConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Required PIN token, if PIN gating is enabled.
    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }

    /// Protocol thresholds derived from this configuration.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            escalation: self.escalation_threshold,
            sharp_jump: self.sharp_jump_threshold,
        }
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Set the baseline heart rate (validated on build).
    pub fn baseline_heart_rate(mut self, bpm: u32) -> Self {
        self.config.baseline_heart_rate = bpm;
        self
    }

    /// Set or disable the safety PIN (validated on build).
    pub fn pin(mut self, pin: Option<String>) -> Self {
        self.config.pin = pin;
        self
    }

    /// Set the escalation threshold.
    pub fn escalation_threshold(mut self, threshold: f64) -> Self {
        self.config.escalation_threshold = threshold.clamp(0.0, 100.0);
        self
    }

    /// Set the sharp jump threshold.
    pub fn sharp_jump_threshold(mut self, threshold: f64) -> Self {
        self.config.sharp_jump_threshold = threshold.clamp(0.0, 100.0);
        self
    }

    /// Set the response timeout.
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    /// Set the inter-cycle delay.
    pub fn cycle_delay(mut self, delay: Duration) -> Self {
        self.config.cycle_delay = delay;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<SessionConfig> {
        let config = self.config;
        if !(40..=100).contains(&config.baseline_heart_rate) {
            return Err(MonitorError::Config(format!(
                "baseline heart rate must be 40-100 bpm, got {}",
                config.baseline_heart_rate
            )));
        }
        if let Some(pin) = config.pin() {
            if !(4..=6).contains(&pin.len()) || !pin.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MonitorError::Config(
                    "PIN must be 4-6 digits".to_string(),
                ));
            }
        }
        Ok(config)
    }
}
