//! Fixed-capacity sliding window of recent sensor readings.

use crate::types::SensorReading;

/// Number of readings retained for scoring.
pub const WINDOW_CAPACITY: usize = 5;

/// Ordered window of the most recent readings, oldest first.
///
/// Owned exclusively by the monitoring session; pushing beyond capacity
/// evicts the oldest reading.
#[derive(Debug, Clone, Default)]
pub struct ReadingWindow {
    readings: Vec<SensorReading>,
}

impl ReadingWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            readings: Vec::with_capacity(WINDOW_CAPACITY),
        }
    }

    /// Append a reading, evicting the oldest once past capacity.
    pub fn push(&mut self, reading: SensorReading) {
        self.readings.push(reading);
        if self.readings.len() > WINDOW_CAPACITY {
            self.readings.remove(0);
        }
    }

    /// Number of readings currently held.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the window holds no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Whether the window has reached capacity (scoring prerequisite).
    pub fn is_full(&self) -> bool {
        self.readings.len() == WINDOW_CAPACITY
    }

    /// Iterate readings oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SensorReading> {
        self.readings.iter()
    }

    /// Most recent reading, if any.
    pub fn latest(&self) -> Option<&SensorReading> {
        self.readings.last()
    }
}
