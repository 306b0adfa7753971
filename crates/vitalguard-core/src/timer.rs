//! Cancellable bounded wait over the wearer command channel.
//!
//! Both suspension points of a session (the confirmation prompt and the
//! inter-cycle delay) are the same primitive: wait up to a deadline for a
//! command line, resolving with either the line or an expiry signal, never
//! both. The underlying channel is fed by whatever input source the caller
//! wires up (stdin in the CLI, a test script in tests).

use std::time::Duration;

use tokio::sync::mpsc;

/// Result of a bounded wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A command line arrived before the deadline.
    Command(String),
    /// The deadline passed with no input.
    Expired,
}

/// Receiving half of the wearer command channel.
pub struct CommandStream {
    rx: mpsc::Receiver<String>,
    closed: bool,
}

impl CommandStream {
    /// Wrap an existing receiver.
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx, closed: false }
    }

    /// Create a channel pair with the given buffer capacity.
    pub fn channel(capacity: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }

    /// Wait up to `timeout` for the next command line.
    ///
    /// Once the sending side is gone (input source closed), every wait
    /// degrades to a plain delay so the monitoring loop keeps its cadence.
    pub async fn next_within(&mut self, timeout: Duration) -> WaitOutcome {
        if self.closed {
            tokio::time::sleep(timeout).await;
            return WaitOutcome::Expired;
        }

        tokio::select! {
            _ = tokio::time::sleep(timeout) => WaitOutcome::Expired,
            line = self.rx.recv() => match line {
                Some(line) => WaitOutcome::Command(line),
                None => {
                    self.closed = true;
                    tokio::time::sleep(timeout).await;
                    WaitOutcome::Expired
                }
            },
        }
    }
}
