//! Servo and controller errors

use minicnc_hal::PwmError;

use crate::config::Label;

/// Errors returned by [`ServoActuator`](crate::ServoActuator) and
/// [`AxisController`](crate::AxisController)
///
/// Validation errors are returned before any hardware is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// Requested angle outside 0-180°
    OutOfRangeAngle { label: Label, angle: i32 },
    /// Controller not set up, or actuator already shut down
    NotReady,
    /// Claiming or configuring hardware failed during setup
    SetupFailure(PwmError),
    /// Zero frequency or non-positive angular speed
    InvalidConfig { label: Label },
    /// Channel rejected a write during a move
    Pwm(PwmError),
}

impl core::fmt::Display for ServoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ServoError::OutOfRangeAngle { label, angle } => write!(
                f,
                "servo {} can only rotate between 0 and 180 degrees (got {})",
                label, angle
            ),
            ServoError::NotReady => f.write_str("controller not ready"),
            ServoError::SetupFailure(e) => write!(f, "setup failed: {}", e),
            ServoError::InvalidConfig { label } => {
                write!(f, "servo {} has an invalid configuration", label)
            }
            ServoError::Pwm(e) => write!(f, "pwm error: {}", e),
        }
    }
}
