//! Board-agnostic core logic for the minicnc servo controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Configuration types and the `machine.toml` parser
//! - Servo timing model (pulse width, duty cycle, settle time)
//! - [`ServoActuator`]: one servo on one PWM channel
//! - [`AxisController`]: the X/Y/Z device and its setup/shutdown lifecycle
//!
//! Hardware is reached only through the `minicnc-hal` traits and
//! `embedded_hal::delay::DelayNs`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod motion;
pub mod servo;

#[cfg(test)]
mod mock;

pub use config::{Axis, Label, MachineConfig, ServoConfig};
pub use controller::AxisController;
pub use error::ServoError;
pub use servo::{ServoActuator, ServoState};
