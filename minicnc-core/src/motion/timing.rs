//! Pulse width and travel-time math
//!
//! There is no position feedback. A move is held for as long as the servo
//! needs to cover the angular distance at its configured speed, then the
//! signal is released.
//!
//! The travel model is linear and ignores servo acceleration.

use core::time::Duration;

/// Largest commandable angle (degrees)
pub const MAX_ANGLE_DEG: u8 = 180;

/// Duty cycle applied when a channel is claimed (arming signal)
pub const IDLE_DUTY_PERCENT: f32 = 10.0;

/// Pulse width at 0° (ms)
const BASE_PULSE_MS: f64 = 0.5;

/// Pulse width added over the full 0-180° range (ms)
const PULSE_SPAN_MS: f64 = 2.5;

/// Added to every settle time so a zero-distance move still waits
const SETTLE_EPSILON_S: f64 = 0.001;

/// Validate a requested angle, returning it as 0-180
pub fn checked_angle(angle_deg: i32) -> Option<u8> {
    u8::try_from(angle_deg)
        .ok()
        .filter(|a| *a <= MAX_ANGLE_DEG)
}

/// Pulse width in milliseconds for an angle
pub fn pulse_width_ms(angle_deg: u8) -> f64 {
    BASE_PULSE_MS + (angle_deg as f64 / MAX_ANGLE_DEG as f64) * PULSE_SPAN_MS
}

/// Pulse width expressed as a duty-cycle percentage at `frequency_hz`
///
/// One period is `1000 / frequency_hz` ms, so `10 / frequency_hz` is one
/// percent of it.
pub fn duty_percent(pulse_width_ms: f64, frequency_hz: u32) -> f64 {
    pulse_width_ms / (10.0 / frequency_hz as f64)
}

/// Degrees the horn travels to reach `target`
///
/// The position of a fresh servo is unknown, so the first move assumes
/// the full range.
pub fn travel_degrees(last: Option<u8>, target: u8) -> u8 {
    match last {
        Some(last) => last.abs_diff(target),
        None => MAX_ANGLE_DEG,
    }
}

/// Time to hold the signal for a move of `travel_deg`
///
/// `speed_deg_per_sec` must be positive and finite (see
/// [`ServoConfig::validate`](crate::ServoConfig::validate)). Waits too long
/// for a `Duration` saturate to `Duration::MAX`.
pub fn settle_time(travel_deg: u8, speed_deg_per_sec: f32) -> Duration {
    let secs = travel_deg as f64 / speed_deg_per_sec as f64 + SETTLE_EPSILON_S;
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
