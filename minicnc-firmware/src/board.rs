//! Board wiring
//!
//! Embassy hands out typed peripherals, so every pin that may carry a servo
//! signal is bound to its PWM slice here and registered with the bank by
//! GPIO number. `machine.toml` then picks among these pins.
//!
//! | GPIO | Slice | Output | Default axis |
//! |------|-------|--------|--------------|
//! | 26   | 5     | A      | X            |
//! | 13   | 6     | B      | X (fallback) |
//! | 17   | 0     | B      | Y            |
//! | 4    | 2     | A      | Z            |
//! | 6    | 3     | A      | spare        |
//!
//! GPIO13 is where the built-in defaults expect X, so the firmware still
//! runs when `machine.toml` is rejected.

use defmt::*;
use embassy_rp::pwm::{Config, Pwm};
use embassy_rp::Peripherals;
use minicnc_hal_rp2040::PwmBank;

/// Build the PWM bank for the servo header
pub fn pwm_bank(p: Peripherals) -> PwmBank {
    let outputs = [
        (26, Pwm::new_output_a(p.PWM_SLICE5, p.PIN_26, Config::default())),
        (13, Pwm::new_output_b(p.PWM_SLICE6, p.PIN_13, Config::default())),
        (17, Pwm::new_output_b(p.PWM_SLICE0, p.PIN_17, Config::default())),
        (4, Pwm::new_output_a(p.PWM_SLICE2, p.PIN_4, Config::default())),
        (6, Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, Config::default())),
    ];

    let mut bank = PwmBank::new();
    for (gpio, pwm) in outputs {
        if let Err(e) = bank.register(gpio, pwm) {
            warn!("GPIO{} not registered: {}", gpio, e);
        }
    }
    bank
}
