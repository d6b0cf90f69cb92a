//! PWM abstractions
//!
//! A [`PwmBackend`] is the process-wide PWM/GPIO context: it is initialized
//! once with a pin numbering scheme, hands out exclusively-owned
//! [`PwmChannel`]s by channel id, and is released once at shutdown.

/// Errors reported by PWM implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// Channel id does not exist on this hardware
    InvalidChannel,
    /// Channel is already owned by someone else
    AlreadyClaimed,
    /// Context was initialized twice without a release in between
    AlreadyInitialized,
    /// Channel requested before the context was initialized
    NotInitialized,
    /// Numbering scheme not available on this hardware
    UnsupportedScheme,
    /// Frequency cannot be generated (zero or out of range)
    InvalidFrequency,
    /// Duty cycle outside 0-100%
    InvalidDuty,
}

impl core::fmt::Display for PwmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            PwmError::InvalidChannel => "invalid PWM channel",
            PwmError::AlreadyClaimed => "PWM channel already in use",
            PwmError::AlreadyInitialized => "PWM context already initialized",
            PwmError::NotInitialized => "PWM context not initialized",
            PwmError::UnsupportedScheme => "pin numbering scheme not supported",
            PwmError::InvalidFrequency => "PWM frequency out of range",
            PwmError::InvalidDuty => "duty cycle outside 0-100%",
        };
        f.write_str(msg)
    }
}

/// How channel ids given in configuration map to physical pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NumberingScheme {
    /// Chip GPIO numbers (BCM numbering on a Raspberry Pi)
    #[default]
    Gpio,
    /// Physical header pin positions
    Board,
}

/// A single PWM-capable output
///
/// Implementations own the underlying hardware exclusively for as long as
/// the value exists.
pub trait PwmChannel {
    /// Set the PWM frequency in Hz
    fn set_frequency(&mut self, hz: u32) -> Result<(), PwmError>;

    /// Set the duty cycle as a percentage of one period (0.0-100.0)
    fn set_duty_cycle(&mut self, percent: f32) -> Result<(), PwmError>;

    /// Stop generating the signal
    fn stop(&mut self) -> Result<(), PwmError>;

    /// Drive the output low without stopping the channel
    ///
    /// A hobby servo stops holding torque (and stops jittering) when it
    /// sees no pulses.
    fn release(&mut self) -> Result<(), PwmError> {
        self.set_duty_cycle(0.0)
    }
}

/// Process-wide PWM context
///
/// Holds the pin numbering mode and the set of channels that may be claimed.
/// There is one backend per process; it must be initialized exactly once
/// before claiming and released exactly once at teardown.
pub trait PwmBackend {
    /// Channel type handed out by [`PwmBackend::claim`]
    type Channel: PwmChannel;

    /// Select the numbering scheme and prepare the hardware
    ///
    /// Returns [`PwmError::AlreadyInitialized`] when called twice without
    /// an intervening [`PwmBackend::release`].
    fn initialize(&mut self, scheme: NumberingScheme) -> Result<(), PwmError>;

    /// Claim a channel for exclusive use
    fn claim(&mut self, channel_id: u8) -> Result<Self::Channel, PwmError>;

    /// Tear down the context
    ///
    /// Releasing an uninitialized context is a no-op.
    fn release(&mut self);

    /// Check whether [`PwmBackend::initialize`] has succeeded and not been released
    fn is_initialized(&self) -> bool;
}
