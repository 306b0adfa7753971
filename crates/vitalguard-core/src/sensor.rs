//! Reading acquisition.

use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::types::SensorReading;

/// Supplies one reading per monitoring cycle.
///
/// In production this would wrap a smartwatch heart-rate monitor and
/// accelerometer; the core only requires a synchronous, prompt call.
pub trait SensorSource: Send {
    /// Produce the next reading.
    fn next_reading(&mut self) -> SensorReading;
}

/// Simulated sensor with a distribution weighted toward the patterns the
/// protocol is meant to catch: 60% stationary, and heart rate 40% in the
/// 50-80 resting band, 30% elevated (80-130), 30% depressed (40-50).
pub struct SimulatedSensor {
    rng: StdRng,
}

impl SimulatedSensor {
    /// Sensor seeded from entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sensor for reproducible demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for SimulatedSensor {
    fn next_reading(&mut self) -> SensorReading {
        let motion = self.rng.gen::<f64>() > 0.6;

        let heart_rate = if self.rng.gen::<f64>() < 0.4 {
            self.rng.gen_range(50..=80)
        } else if self.rng.gen::<f64>() < 0.5 {
            self.rng.gen_range(80..=130)
        } else {
            self.rng.gen_range(40..=50)
        };

        SensorReading::new(heart_rate, motion)
    }
}

/// Replays a fixed sequence of readings, repeating the last one once
/// exhausted. Used for deterministic tests and scripted demos.
pub struct ScriptedSensor {
    queue: VecDeque<SensorReading>,
    last: SensorReading,
}

impl ScriptedSensor {
    /// Build from a reading sequence.
    pub fn new(readings: impl IntoIterator<Item = SensorReading>) -> Self {
        Self {
            queue: readings.into_iter().collect(),
            last: SensorReading::new(72, true),
        }
    }
}

impl SensorSource for ScriptedSensor {
    fn next_reading(&mut self) -> SensorReading {
        if let Some(reading) = self.queue.pop_front() {
            self.last = reading;
        }
        self.last
    }
}
