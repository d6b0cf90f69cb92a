//! Hobby servo on a PWM channel
//!
//! A move is open-loop: the duty cycle for the target angle is applied,
//! held for the estimated travel time, then dropped to 0% so the servo
//! does not hum or jitter at rest.
//!
//! # Usage
//!
//! ```ignore
//! let mut servo = ServoActuator::new(ServoConfig::new(26), channel, Delay)?;
//! servo.turn(0)?;   // blocks ~301 ms (first move assumes full travel)
//! servo.turn(90)?;  // blocks ~151 ms
//! servo.shutdown()?;
//! ```

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use minicnc_hal::{PwmChannel, PwmError};

use crate::config::{Label, ServoConfig};
use crate::error::ServoError;
use crate::motion::{
    checked_angle, duty_percent, pulse_width_ms, settle_time, travel_degrees, IDLE_DUTY_PERCENT,
};

/// Actuator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoState {
    /// Channel claimed and armed; moves are accepted
    Ready,
    /// Channel stopped; terminal
    Stopped,
}

/// One servo bound to one exclusively-owned PWM channel
///
/// Moves block the calling thread through `D` for the settle time. Taking
/// `&mut self` in [`turn`](Self::turn) means at most one move per actuator
/// is ever in flight.
pub struct ServoActuator<C: PwmChannel, D: DelayNs> {
    config: ServoConfig,
    channel: C,
    delay: D,
    /// Angle last commanded and held (None until the first move completes)
    last_angle_deg: Option<u8>,
    state: ServoState,
}

impl<C: PwmChannel, D: DelayNs> ServoActuator<C, D> {
    /// Take ownership of `channel`, set the PWM frequency and arm the servo
    /// with the idle duty cycle
    ///
    /// If the channel rejects the setup it is stopped before the error is
    /// returned.
    pub fn new(config: ServoConfig, mut channel: C, delay: D) -> Result<Self, ServoError> {
        config.validate()?;

        let armed = channel
            .set_frequency(config.pwm_frequency_hz)
            .and_then(|()| channel.set_duty_cycle(IDLE_DUTY_PERCENT));
        if let Err(e) = armed {
            let _ = channel.stop();
            return Err(ServoError::SetupFailure(e));
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{}: armed on channel {} at {} Hz",
            config.label.as_str(),
            config.channel_id,
            config.pwm_frequency_hz
        );

        Ok(Self {
            config,
            channel,
            delay,
            last_angle_deg: None,
            state: ServoState::Ready,
        })
    }

    /// Move to `angle_deg` (0-180) and block until the servo has settled
    ///
    /// Out-of-range angles fail with [`ServoError::OutOfRangeAngle`] before
    /// the channel is touched. After a successful call
    /// [`last_angle`](Self::last_angle) is `angle_deg`.
    pub fn turn(&mut self, angle_deg: i32) -> Result<(), ServoError> {
        if self.state != ServoState::Ready {
            return Err(ServoError::NotReady);
        }
        let angle = checked_angle(angle_deg).ok_or_else(|| ServoError::OutOfRangeAngle {
            label: self.config.label.clone(),
            angle: angle_deg,
        })?;

        let pulse_ms = pulse_width_ms(angle);
        let duty = duty_percent(pulse_ms, self.config.pwm_frequency_hz);
        self.channel
            .set_duty_cycle(duty as f32)
            .map_err(ServoError::Pwm)?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{}: setting cycle to {} ({} ms)",
            self.config.label.as_str(),
            duty,
            pulse_ms
        );

        let travel = travel_degrees(self.last_angle_deg, angle);
        let settle = settle_time(travel, self.config.angular_speed_deg_per_sec);
        self.hold(settle);

        // The horn is at the target now, whether or not the release below succeeds
        self.last_angle_deg = Some(angle);

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "{}: releasing after {} deg of travel",
            self.config.label.as_str(),
            travel
        );

        self.channel.release().map_err(ServoError::Pwm)
    }

    /// Block for `settle`, rounded to the nearest microsecond
    ///
    /// `DelayNs::delay_us` takes a `u32`, so long waits are split into
    /// chunks.
    fn hold(&mut self, settle: Duration) {
        let mut micros = (settle.as_nanos() + 500) / 1_000;
        while micros > 0 {
            let chunk = u32::try_from(micros).unwrap_or(u32::MAX);
            self.delay.delay_us(chunk);
            micros -= u128::from(chunk);
        }
    }

    /// Stop the channel
    ///
    /// Only the first call reaches the hardware; later calls return `Ok`.
    pub fn shutdown(&mut self) -> Result<(), PwmError> {
        if self.state == ServoState::Stopped {
            return Ok(());
        }
        self.state = ServoState::Stopped;
        self.channel.stop()
    }

    /// Angle last commanded and held
    pub fn last_angle(&self) -> Option<u8> {
        self.last_angle_deg
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServoState {
        self.state
    }

    /// Get the configuration
    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// Display label
    pub fn label(&self) -> &Label {
        &self.config.label
    }

    /// Borrow the underlying channel
    pub fn channel(&self) -> &C {
        &self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, Log, MockChannel, MockDelay};

    fn servo(log: &Log, config: ServoConfig) -> ServoActuator<MockChannel, MockDelay> {
        let ch = MockChannel::new(config.channel_id, log);
        ServoActuator::new(config, ch, MockDelay::new(log)).unwrap()
    }

    #[test]
    fn test_new_arms_channel() {
        let log = Log::default();
        let s = servo(&log, ServoConfig::new(26).with_label("x axis"));

        assert_eq!(s.state(), ServoState::Ready);
        assert_eq!(s.last_angle(), None);
        assert_eq!(
            log.events(),
            [Event::Frequency(26, 50), Event::Duty(26, 10.0)]
        );
    }

    #[test]
    fn test_new_rejects_invalid_config_before_hardware() {
        let log = Log::default();
        let ch = MockChannel::new(3, &log);
        let result = ServoActuator::new(
            ServoConfig::new(3).with_speed(0.0),
            ch,
            MockDelay::new(&log),
        );
        assert!(matches!(result, Err(ServoError::InvalidConfig { .. })));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_turn_sequence() {
        let log = Log::default();
        let mut s = servo(&log, ServoConfig::new(26));
        log.clear();

        s.turn(0).unwrap();

        let events = log.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Event::Duty(26, d) if (d - 2.5).abs() < 1e-4));
        assert!(matches!(events[1], Event::Delay(_)));
        assert_eq!(events[2], Event::Duty(26, 0.0));
        assert_eq!(s.last_angle(), Some(0));
    }

    #[test]
    fn test_first_move_waits_full_range() {
        let log = Log::default();
        let mut s = servo(&log, ServoConfig::new(1));

        s.turn(10).unwrap();

        // 180 / 600 + 0.001 s
        assert_eq!(log.delays(), [301_000_000]);
    }

    #[test]
    fn test_zero_then_full_sweep_at_600() {
        let log = Log::default();
        let mut s = servo(&log, ServoConfig::new(1));
        s.turn(0).unwrap();
        log.clear();

        s.turn(180).unwrap();

        assert_eq!(log.delays(), [301_000_000]);
        let duty = log.duties(1)[0];
        assert!((duty - 15.0).abs() < 1e-4);
        assert_eq!(s.last_angle(), Some(180));
    }

    #[test]
    fn test_wait_scales_with_distance() {
        let log = Log::default();
        let mut s = servo(&log, ServoConfig::new(1).with_speed(60.0));
        s.turn(90).unwrap();
        log.clear();

        s.turn(120).unwrap();
        s.turn(120).unwrap();

        // 30 / 60 + 0.001 s, then 0 / 60 + 0.001 s
        assert_eq!(log.delays(), [501_000_000, 1_000_000]);
    }

    #[test]
    fn test_long_wait_is_split_not_capped() {
        let log = Log::default();
        let mut s = servo(&log, ServoConfig::new(1).with_speed(0.01));

        s.turn(10).unwrap();

        // 180 / 0.01 + 0.001 s, more than u32::MAX microseconds
        let delays = log.delays();
        assert!(delays.len() > 1);
        assert!(delays.iter().all(|ns| *ns <= u32::MAX as u64 * 1_000));
        let total_s = delays.iter().sum::<u64>() as f64 / 1e9;
        assert!((total_s - 18_000.001).abs() < 0.01);
        assert_eq!(log.events().last(), Some(&Event::Duty(1, 0.0)));
    }

    #[test]
    fn test_arming_failure_stops_channel() {
        let log = Log::default();
        let ch = MockChannel::new(3, &log).failing_frequency();

        let result = ServoActuator::new(ServoConfig::new(3), ch, MockDelay::new(&log));

        assert!(matches!(
            result,
            Err(ServoError::SetupFailure(PwmError::InvalidFrequency))
        ));
        assert_eq!(log.events(), [Event::Stop(3)]);
    }

    #[test]
    fn test_failed_release_still_records_angle() {
        let log = Log::default();
        let ch = MockChannel::new(5, &log).failing_release();
        let mut s = ServoActuator::new(ServoConfig::new(5), ch, MockDelay::new(&log)).unwrap();
        log.clear();

        assert_eq!(s.turn(90), Err(ServoError::Pwm(PwmError::InvalidDuty)));
        assert_eq!(s.last_angle(), Some(90));
        assert_eq!(log.delays().len(), 1);
        assert_eq!(log.duties(5).len(), 1);
    }

    #[test]
    fn test_out_of_range_touches_nothing() {
        let log = Log::default();
        let mut s = servo(&log, ServoConfig::new(7).with_label("y axis"));
        s.turn(45).unwrap();
        log.clear();

        for angle in [-1, 181, 360, i32::MIN] {
            let err = s.turn(angle).unwrap_err();
            assert_eq!(
                err,
                ServoError::OutOfRangeAngle {
                    label: crate::config::label("y axis"),
                    angle,
                }
            );
        }

        assert!(log.events().is_empty());
        assert_eq!(s.last_angle(), Some(45));
    }

    #[test]
    fn test_duty_rejected_by_channel_keeps_last_angle() {
        let log = Log::default();
        // 3.0 ms at 400 Hz is 120% duty
        let mut s = servo(&log, ServoConfig::new(2).with_frequency(400));
        log.clear();

        assert_eq!(s.turn(180), Err(ServoError::Pwm(PwmError::InvalidDuty)));
        assert_eq!(s.last_angle(), None);
        assert!(log.delays().is_empty());
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let log = Log::default();
        let mut s = servo(&log, ServoConfig::new(9));

        s.shutdown().unwrap();
        s.shutdown().unwrap();

        assert_eq!(log.stops(9), 1);
        assert_eq!(s.state(), ServoState::Stopped);
    }

    #[test]
    fn test_turn_after_shutdown_is_not_ready() {
        let log = Log::default();
        let mut s = servo(&log, ServoConfig::new(9));
        s.shutdown().unwrap();
        log.clear();

        assert_eq!(s.turn(90), Err(ServoError::NotReady));
        assert!(log.events().is_empty());
    }
}
