//! minicnc Hardware Abstraction Layer
//!
//! This crate defines the PWM capability the servo logic is written
//! against. Chip-specific HALs (RP2040, ...) implement it, and tests
//! implement it with recording fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  minicnc-core (ServoActuator, axes)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  minicnc-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ minicnc-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`pwm::PwmChannel`] - One PWM output (frequency, duty cycle, stop)
//! - [`pwm::PwmBackend`] - Process-wide PWM context that hands out channels

#![no_std]
#![deny(unsafe_code)]

pub mod pwm;

// Re-export key traits at crate root for convenience
pub use pwm::{NumberingScheme, PwmBackend, PwmChannel, PwmError};
