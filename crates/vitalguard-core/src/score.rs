//! Abnormality scoring over a window of readings.
//!
//! A reading contributes points only when the wearer is stationary with a
//! heart rate outside the 50-80 BPM band; motion or an in-band rate
//! contributes nothing. The stationary requirement is what keeps exercise
//! and ordinary stress from registering as abnormal.

use crate::window::ReadingWindow;

/// Maximum abnormality score.
pub const MAX_SCORE: f64 = 100.0;

/// Compute the abnormality score for the current window.
///
/// Deterministic and side-effect free. Returns 0 while the window is still
/// filling (insufficient data policy); otherwise sums per-reading points
/// and caps the total at [`MAX_SCORE`].
pub fn abnormality_score(window: &ReadingWindow) -> f64 {
    if !window.is_full() {
        return 0.0;
    }
    let points: u32 = window.iter().map(reading_points).sum();
    f64::from(points.min(MAX_SCORE as u32))
}

/// Points contributed by one reading. Higher deviation scores higher;
/// the bradycardia side has its own two bands.
fn reading_points(reading: &crate::types::SensorReading) -> u32 {
    if reading.motion_detected {
        return 0;
    }
    let hr = reading.heart_rate;
    if (50..=80).contains(&hr) {
        return 0;
    }
    if hr > 110 {
        25
    } else if hr > 100 {
        20
    } else if hr > 90 {
        15
    } else if hr > 80 {
        10
    } else if hr < 45 {
        20
    } else {
        // 45 <= hr < 50
        10
    }
}
