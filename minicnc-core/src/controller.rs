//! Three-axis servo controller
//!
//! Owns the PWM backend and the X/Y/Z actuators and manages their
//! lifecycle as one device:
//!
//! ```text
//!   new() ──► not ready ──setup()──► ready ──shutdown()──► not ready
//!                 │                                 ▲
//!                 └──setup() fails part-way─────────┘ (shutdown still required)
//! ```
//!
//! Axes move one at a time; every [`AxisController::turn`] blocks until its
//! servo has settled.
//!
//! Dropping the controller runs [`AxisController::shutdown`], so hardware is
//! released on early returns as well.

use embedded_hal::delay::DelayNs;
use minicnc_hal::{NumberingScheme, PwmBackend, PwmError};

use crate::config::{Axis, MachineConfig, ServoConfig};
use crate::error::ServoError;
use crate::servo::ServoActuator;

/// Actuator type for a given backend
pub type Actuator<B, D> = ServoActuator<<B as PwmBackend>::Channel, D>;

/// The X/Y/Z servo device
pub struct AxisController<B, D>
where
    B: PwmBackend,
    D: DelayNs + Clone,
{
    config: MachineConfig,
    backend: B,
    delay: D,
    /// Actuators indexed by [`Axis::index`]; `Some` once claimed in setup
    servos: [Option<Actuator<B, D>>; 3],
    ready: bool,
}

impl<B, D> AxisController<B, D>
where
    B: PwmBackend,
    D: DelayNs + Clone,
{
    /// Create a controller from per-axis configs
    ///
    /// No hardware is touched until [`setup`](Self::setup).
    pub fn new(x: ServoConfig, y: ServoConfig, z: ServoConfig, backend: B, delay: D) -> Self {
        let config = MachineConfig {
            x,
            y,
            z,
            ..MachineConfig::default()
        };
        Self::from_config(config, backend, delay)
    }

    /// Create a controller from a machine description
    pub fn from_config(config: MachineConfig, backend: B, delay: D) -> Self {
        Self {
            config,
            backend,
            delay,
            servos: [None, None, None],
            ready: false,
        }
    }

    /// Initialize the PWM context and claim X, Y, then Z
    ///
    /// All axis configs are validated before the hardware is touched. If a
    /// claim fails part-way the axes already claimed stay with the
    /// controller and the error is returned; call [`shutdown`](Self::shutdown)
    /// to release them.
    pub fn setup(&mut self) -> Result<(), ServoError> {
        if self.backend.is_initialized() || self.servos.iter().any(Option::is_some) {
            return Err(ServoError::SetupFailure(PwmError::AlreadyInitialized));
        }

        for axis in Axis::ALL {
            self.config.axis(axis).validate()?;
        }

        self.backend
            .initialize(NumberingScheme::Gpio)
            .map_err(ServoError::SetupFailure)?;

        for axis in Axis::ALL {
            let config = self.config.axis(axis).clone();
            let channel = self
                .backend
                .claim(config.channel_id)
                .map_err(ServoError::SetupFailure)?;
            let servo = ServoActuator::new(config, channel, self.delay.clone())?;
            self.servos[axis.index()] = Some(servo);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("{}: all axes ready", self.config.name.as_str());

        self.ready = true;
        Ok(())
    }

    /// Move one axis and block until it has settled
    pub fn turn(&mut self, axis: Axis, angle_deg: i32) -> Result<(), ServoError> {
        if !self.ready {
            return Err(ServoError::NotReady);
        }
        self.servos[axis.index()]
            .as_mut()
            .ok_or(ServoError::NotReady)?
            .turn(angle_deg)
    }

    /// Move X, Y, then Z to 0°
    pub fn home(&mut self) -> Result<(), ServoError> {
        for axis in Axis::ALL {
            self.turn(axis, 0)?;
        }
        Ok(())
    }

    /// Stop every claimed axis (X, Y, Z) and release the PWM context
    ///
    /// Safe to call at any time and any number of times. Channel errors are
    /// logged and skipped so cleanup always runs to the end.
    pub fn shutdown(&mut self) {
        self.ready = false;

        for slot in self.servos.iter_mut() {
            if let Some(mut servo) = slot.take() {
                if let Err(_e) = servo.shutdown() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("{}: stop failed: {}", servo.label().as_str(), _e);
                }
            }
        }

        if self.backend.is_initialized() {
            self.backend.release();

            #[cfg(feature = "defmt")]
            defmt::info!("{}: pwm released", self.config.name.as_str());
        }
    }

    /// Check if setup completed and shutdown has not run since
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Actuator for one axis, if claimed
    pub fn axis(&self, axis: Axis) -> Option<&Actuator<B, D>> {
        self.servos[axis.index()].as_ref()
    }

    /// Get the configuration
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Borrow the PWM backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B, D> Drop for AxisController<B, D>
where
    B: PwmBackend,
    D: DelayNs + Clone,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}
