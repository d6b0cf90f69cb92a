//! minicnc - Three-Axis Servo Firmware
//!
//! Drives the X, Y and Z hobby servos of a small plotter-style machine
//! from an RP2040. Moves are open-loop: each axis is held at its target
//! for the estimated travel time and then released.
//!
//! The demo program homes every axis, then sweeps them between 0° and
//! 180° with a two second pause at each end.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use embedded_hal::delay::DelayNs;
use {defmt_rtt as _, panic_probe as _};

use minicnc_core::config::parse_machine_config;
use minicnc_core::{Axis, AxisController, MachineConfig, ServoError};
use minicnc_hal_rp2040::PwmBank;

/// Embedded configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

/// Pause at each end of the sweep
const DWELL_SECS: u64 = 2;

mod board;

type Machine = AxisController<PwmBank, SpinDelay>;

/// Busy-wait delay on the embassy time driver, one copy per axis
#[derive(Clone, Copy)]
struct SpinDelay;

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        embassy_time::block_for(Duration::from_nanos(ns as u64));
    }

    fn delay_us(&mut self, us: u32) {
        embassy_time::block_for(Duration::from_micros(us as u64));
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("minicnc starting...");

    let p = embassy_rp::init(Default::default());

    let config = load_config();
    let bank = board::pwm_bank(p);
    let mut machine = AxisController::from_config(config, bank, SpinDelay);

    match machine.setup() {
        Ok(()) => {
            if let Err(e) = run(&mut machine).await {
                error!("Motion failed: {}", e);
            }
        }
        Err(e) => error!("Setup failed: {}", e),
    }

    machine.shutdown();
    info!("All axes released, idling");

    loop {
        Timer::after_secs(60).await;
    }
}

/// Load the embedded machine.toml, falling back to the reference wiring
fn load_config() -> MachineConfig {
    match parse_machine_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Loaded machine '{}'", config.name.as_str());
            config
        }
        Err(e) => {
            warn!("machine.toml rejected ({}), using defaults", e);
            MachineConfig::default()
        }
    }
}

/// Home, then sweep every axis end to end until a move fails
async fn run(machine: &mut Machine) -> Result<(), ServoError> {
    machine.home()?;
    info!("Homed");
    Timer::after_secs(DWELL_SECS).await;

    loop {
        for angle in [180, 0] {
            for axis in Axis::ALL {
                machine.turn(axis, angle)?;
            }
            debug!("All axes at {} deg", angle);
            Timer::after_secs(DWELL_SECS).await;
        }
    }
}
