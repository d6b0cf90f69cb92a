//! PWM slice outputs for hobby servos
//!
//! Each RP2040 PWM slice drives two pins (A = even GPIO, B = odd GPIO) with
//! one shared counter. Servos run at tens of Hz, so every servo gets a
//! slice of its own and the counter period is set per output.
//!
//! Embassy peripherals are typed, so outputs are built in the firmware for
//! the pins the board wires to servos and registered here by GPIO number:
//!
//! ```ignore
//! let mut bank = PwmBank::new();
//! bank.register(26, Pwm::new_output_a(p.PWM_SLICE5, p.PIN_26, Config::default()))?;
//! bank.initialize(NumberingScheme::Gpio)?;
//! let x = bank.claim(26)?;
//! ```

use embassy_rp::pwm::{Config, Pwm};
use minicnc_hal::{NumberingScheme, PwmBackend, PwmChannel, PwmError};

/// System clock frequency (default RP2040 configuration)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// Number of GPIO pins on the RP2040
pub const NUM_GPIO: usize = 30;

/// Counter settings for a PWM frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SliceTiming {
    /// Integer clock divider (1-255)
    pub divider: u8,
    /// Counter wrap value; one period is `top + 1` ticks
    pub top: u16,
}

/// Calculate divider and wrap value for a target frequency
///
/// Picks the smallest integer divider that keeps the period within the
/// 16-bit counter, which maximizes duty-cycle resolution. Returns `None`
/// when the frequency is zero or cannot be reached.
pub fn calc_timing(freq_hz: u32) -> Option<SliceTiming> {
    if freq_hz == 0 {
        return None;
    }

    // ticks per period at divider 1
    let ticks = SYS_CLK_HZ / freq_hz;
    if ticks < 2 {
        return None;
    }

    let divider = ticks.div_ceil(1 << 16).max(1);
    if divider > u8::MAX as u32 {
        return None;
    }

    let top = SYS_CLK_HZ / (divider * freq_hz) - 1;
    Some(SliceTiming {
        divider: divider as u8,
        top: top as u16,
    })
}

/// Convert a duty-cycle percentage into a compare value
pub fn duty_to_compare(percent: f32, top: u16) -> Result<u16, PwmError> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(PwmError::InvalidDuty);
    }
    let period = top as f32 + 1.0;
    let compare = (percent / 100.0 * period + 0.5) as u32;
    Ok(compare.min(top as u32 + 1) as u16)
}

/// Which output of the slice the servo is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    A,
    B,
}

/// One slice output used as a servo signal
pub struct PwmOutput {
    pwm: Pwm<'static>,
    config: Config,
    side: Side,
}

impl PwmOutput {
    fn new(gpio: u8, pwm: Pwm<'static>) -> Self {
        let mut config = Config::default();
        config.enable = false;
        Self {
            pwm,
            config,
            side: if gpio % 2 == 0 { Side::A } else { Side::B },
        }
    }

    fn set_compare(&mut self, compare: u16) {
        match self.side {
            Side::A => self.config.compare_a = compare,
            Side::B => self.config.compare_b = compare,
        }
    }
}

impl PwmChannel for PwmOutput {
    fn set_frequency(&mut self, hz: u32) -> Result<(), PwmError> {
        let timing = calc_timing(hz).ok_or(PwmError::InvalidFrequency)?;
        self.config.divider = fixed::FixedU16::from_num(timing.divider);
        self.config.top = timing.top;
        self.config.enable = true;
        self.pwm.set_config(&self.config);
        Ok(())
    }

    fn set_duty_cycle(&mut self, percent: f32) -> Result<(), PwmError> {
        let compare = duty_to_compare(percent, self.config.top)?;
        self.set_compare(compare);
        self.pwm.set_config(&self.config);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PwmError> {
        self.set_compare(0);
        self.config.enable = false;
        self.pwm.set_config(&self.config);
        Ok(())
    }
}

/// The RP2040 PWM context
///
/// Holds the outputs the firmware wired up. A claimed output is owned by
/// its actuator and disabled when dropped, so each output can be claimed
/// once per boot.
pub struct PwmBank {
    outputs: [Option<PwmOutput>; NUM_GPIO],
    /// Bitmask of GPIOs that were registered (claimed or not)
    registered: u32,
    initialized: bool,
}

impl Default for PwmBank {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self {
            outputs: [const { None }; NUM_GPIO],
            registered: 0,
            initialized: false,
        }
    }

    /// Register a PWM output built for `gpio`
    pub fn register(&mut self, gpio: u8, pwm: Pwm<'static>) -> Result<(), PwmError> {
        if gpio as usize >= NUM_GPIO {
            return Err(PwmError::InvalidChannel);
        }
        if self.is_registered(gpio) {
            return Err(PwmError::AlreadyClaimed);
        }
        self.outputs[gpio as usize] = Some(PwmOutput::new(gpio, pwm));
        self.registered |= 1 << gpio;
        Ok(())
    }

    /// Check if an output was registered for `gpio`
    pub fn is_registered(&self, gpio: u8) -> bool {
        if gpio as usize >= NUM_GPIO {
            return false;
        }
        self.registered & (1 << gpio) != 0
    }

    /// Check if `gpio` can still be claimed
    pub fn is_available(&self, gpio: u8) -> bool {
        self.outputs
            .get(gpio as usize)
            .is_some_and(|slot| slot.is_some())
    }
}

impl PwmBackend for PwmBank {
    type Channel = PwmOutput;

    fn initialize(&mut self, scheme: NumberingScheme) -> Result<(), PwmError> {
        if self.initialized {
            return Err(PwmError::AlreadyInitialized);
        }
        // The RP2040 has no header layout of its own
        if scheme != NumberingScheme::Gpio {
            return Err(PwmError::UnsupportedScheme);
        }
        self.initialized = true;
        Ok(())
    }

    fn claim(&mut self, channel_id: u8) -> Result<PwmOutput, PwmError> {
        if !self.initialized {
            return Err(PwmError::NotInitialized);
        }
        if !self.is_registered(channel_id) {
            return Err(PwmError::InvalidChannel);
        }
        self.outputs[channel_id as usize]
            .take()
            .ok_or(PwmError::AlreadyClaimed)
    }

    fn release(&mut self) {
        // Disable anything still in the bank
        for output in self.outputs.iter_mut().flatten() {
            let _ = output.stop();
        }
        self.initialized = false;
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}
