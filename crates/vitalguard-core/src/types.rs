//! Sensor reading domain types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single sensor sample from the wearable.
///
/// Immutable once created. The motion flag comes from the accelerometer
/// and is what separates an exercising wearer (elevated heart rate, moving)
/// from a potentially incapacitated one (abnormal heart rate, stationary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    /// Heart rate in beats per minute.
    pub heart_rate: u32,
    /// Whether the accelerometer detected motion at sample time.
    pub motion_detected: bool,
}

impl SensorReading {
    /// Create a new reading.
    pub fn new(heart_rate: u32, motion_detected: bool) -> Self {
        Self {
            heart_rate,
            motion_detected,
        }
    }
}
