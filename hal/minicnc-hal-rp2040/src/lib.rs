//! RP2040-specific HAL for the minicnc servo firmware
//!
//! This crate provides the RP2040 implementation of the shared
//! `minicnc-hal` PWM traits:
//!
//! - [`pwm::PwmBank`]: the PWM context, a bank of board-wired PWM outputs
//!   handed out by GPIO number
//! - [`pwm::PwmOutput`]: one slice output driven as a servo signal

#![no_std]

pub mod pwm;

// Re-export shared traits from minicnc-hal for convenience
pub use minicnc_hal::{PwmBackend, PwmChannel, PwmError};
pub use pwm::{PwmBank, PwmOutput};
