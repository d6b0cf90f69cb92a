//! Servo timing model
//!
//! Angle to pulse width, pulse width to duty cycle, and the open-loop
//! settle time for a move.

pub mod timing;

pub use timing::{
    checked_angle, duty_percent, pulse_width_ms, settle_time, travel_degrees, IDLE_DUTY_PERCENT,
    MAX_ANGLE_DEG,
};
