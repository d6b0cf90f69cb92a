//! Recording test doubles for the PWM traits and the delay
//!
//! Channel, backend and delay share one [`Log`] so tests can assert on the
//! exact order of hardware calls.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use minicnc_hal::{NumberingScheme, PwmBackend, PwmChannel, PwmError};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Initialize(NumberingScheme),
    Claim(u8),
    Frequency(u8, u32),
    Duty(u8, f32),
    Stop(u8),
    Release,
    Delay(u64),
}

#[derive(Debug, Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Duty cycles written to one channel, in order
    pub fn duties(&self, channel: u8) -> Vec<f32> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Duty(c, d) if *c == channel => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn stops(&self, channel: u8) -> usize {
        self.count(|e| *e == Event::Stop(channel))
    }

    pub fn releases(&self) -> usize {
        self.count(|e| *e == Event::Release)
    }

    /// Delays in nanoseconds, in order
    pub fn delays(&self) -> Vec<u64> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Delay(ns) => Some(*ns),
                _ => None,
            })
            .collect()
    }

    fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| f(e)).count()
    }
}

pub struct MockChannel {
    pub id: u8,
    log: Log,
    fail_frequency: bool,
    /// Reject writes of 0% duty
    fail_release: bool,
}

impl MockChannel {
    pub fn new(id: u8, log: &Log) -> Self {
        Self {
            id,
            log: log.clone(),
            fail_frequency: false,
            fail_release: false,
        }
    }

    pub fn failing_frequency(mut self) -> Self {
        self.fail_frequency = true;
        self
    }

    pub fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }
}

impl PwmChannel for MockChannel {
    fn set_frequency(&mut self, hz: u32) -> Result<(), PwmError> {
        if hz == 0 || self.fail_frequency {
            return Err(PwmError::InvalidFrequency);
        }
        self.log.push(Event::Frequency(self.id, hz));
        Ok(())
    }

    fn set_duty_cycle(&mut self, percent: f32) -> Result<(), PwmError> {
        if !(0.0..=100.0).contains(&percent) || (self.fail_release && percent == 0.0) {
            return Err(PwmError::InvalidDuty);
        }
        self.log.push(Event::Duty(self.id, percent));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PwmError> {
        self.log.push(Event::Stop(self.id));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockBackend {
    pub log: Log,
    initialized: bool,
    claimed: Vec<u8>,
    /// Channel ids that report as taken by another process
    busy: Vec<u8>,
}

impl MockBackend {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            ..Default::default()
        }
    }

    pub fn with_busy(mut self, channel_id: u8) -> Self {
        self.busy.push(channel_id);
        self
    }
}

impl PwmBackend for MockBackend {
    type Channel = MockChannel;

    fn initialize(&mut self, scheme: NumberingScheme) -> Result<(), PwmError> {
        if self.initialized {
            return Err(PwmError::AlreadyInitialized);
        }
        self.initialized = true;
        self.log.push(Event::Initialize(scheme));
        Ok(())
    }

    fn claim(&mut self, channel_id: u8) -> Result<MockChannel, PwmError> {
        if !self.initialized {
            return Err(PwmError::NotInitialized);
        }
        if self.busy.contains(&channel_id) || self.claimed.contains(&channel_id) {
            return Err(PwmError::AlreadyClaimed);
        }
        self.claimed.push(channel_id);
        self.log.push(Event::Claim(channel_id));
        Ok(MockChannel::new(channel_id, &self.log))
    }

    fn release(&mut self) {
        if self.initialized {
            self.initialized = false;
            self.claimed.clear();
            self.log.push(Event::Release);
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[derive(Clone)]
pub struct MockDelay {
    log: Log,
}

impl MockDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.push(Event::Delay(ns as u64));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.push(Event::Delay(us as u64 * 1_000));
    }
}
