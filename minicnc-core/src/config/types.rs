//! Configuration type definitions
//!
//! A [`ServoConfig`] is fixed when its actuator is created; nothing in the
//! crate mutates it afterwards.

use heapless::String;

use crate::error::ServoError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Default PWM frequency (standard hobby servo frame rate)
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 50;

/// Default angular speed in degrees per second
pub const DEFAULT_ANGULAR_SPEED_DEG_PER_S: f32 = 600.0;

/// Label used when none is configured
pub const DEFAULT_LABEL: &str = "unknown";

/// Human-readable name for diagnostics
pub type Label = String<MAX_LABEL_LEN>;

/// Build a label, truncating to [`MAX_LABEL_LEN`] bytes on a char boundary
pub fn label(s: &str) -> Label {
    let mut out = Label::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Axis roles of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in setup/shutdown order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Slot index (X = 0, Y = 1, Z = 2)
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Lowercase name as used in `machine.toml` section headers
    pub const fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Per-servo configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoConfig {
    /// Hardware channel (GPIO number under the default numbering scheme)
    pub channel_id: u8,
    /// PWM frequency in Hz
    pub pwm_frequency_hz: u32,
    /// How fast the servo horn travels, used to size the settle wait
    pub angular_speed_deg_per_sec: f32,
    /// Display label
    pub label: Label,
}

impl ServoConfig {
    /// Create a config for `channel_id` with default frequency, speed and label
    pub fn new(channel_id: u8) -> Self {
        Self {
            channel_id,
            pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            angular_speed_deg_per_sec: DEFAULT_ANGULAR_SPEED_DEG_PER_S,
            label: label(DEFAULT_LABEL),
        }
    }

    /// Set the label (truncated to [`MAX_LABEL_LEN`])
    pub fn with_label(mut self, name: &str) -> Self {
        self.label = label(name);
        self
    }

    /// Set the PWM frequency
    pub fn with_frequency(mut self, hz: u32) -> Self {
        self.pwm_frequency_hz = hz;
        self
    }

    /// Set the angular speed
    pub fn with_speed(mut self, deg_per_sec: f32) -> Self {
        self.angular_speed_deg_per_sec = deg_per_sec;
        self
    }

    /// Reject values the timing model cannot work with
    ///
    /// Frequency must be non-zero and speed positive and finite.
    pub fn validate(&self) -> Result<(), ServoError> {
        let speed = self.angular_speed_deg_per_sec;
        if self.pwm_frequency_hz == 0 || !speed.is_finite() || speed <= 0.0 {
            return Err(ServoError::InvalidConfig {
                label: self.label.clone(),
            });
        }
        Ok(())
    }
}

/// Whole-machine configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    /// Machine name
    pub name: Label,
    pub x: ServoConfig,
    pub y: ServoConfig,
    pub z: ServoConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: label(DEFAULT_LABEL),
            x: ServoConfig::new(13).with_label("x axis"),
            y: ServoConfig::new(17).with_label("y axis"),
            z: ServoConfig::new(4).with_label("z axis"),
        }
    }
}

impl MachineConfig {
    /// Config for one axis
    pub fn axis(&self, axis: Axis) -> &ServoConfig {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Mutable config for one axis
    pub fn axis_mut(&mut self, axis: Axis) -> &mut ServoConfig {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}
