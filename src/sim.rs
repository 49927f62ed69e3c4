//! Host-side doubles for the hardware traits.
//!
//! Time only moves when the counter is read, which is how every busy loop in
//! the crate makes progress.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::clock::CycleCounter;
use crate::motor::{Drive, DriveCommand};
use crate::sampler::AnalogSource;

pub fn leak<T>(value: T) -> &'static mut T {
    Box::leak(Box::new(value))
}

/// Simulated time in counter units.
#[derive(Clone, Default)]
pub struct SimTime(Rc<Cell<u64>>);

impl SimTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.0.get()
    }

    fn advance(&self) -> u64 {
        let now = self.0.get() + 1;
        self.0.set(now);
        now
    }
}

/// Counter that advances simulated time by one count per read.
pub struct SimCounter {
    time: SimTime,
    base: u64,
    rate_hz: u32,
}

impl SimCounter {
    pub fn new(time: &SimTime, rate_hz: u32) -> Self {
        Self {
            time: time.clone(),
            base: time.now(),
            rate_hz,
        }
    }
}

impl CycleCounter for SimCounter {
    fn restart(&mut self) {
        self.base = self.time.now();
    }

    fn elapsed(&mut self) -> u32 {
        (self.time.advance() - self.base) as u32
    }

    fn rate_hz(&self) -> u32 {
        self.rate_hz
    }
}

/// Input pin fed by simulated time.
#[derive(Clone)]
pub enum SimInput {
    /// 50% duty square wave with the given period in counts, high first.
    Square { time: SimTime, period: u64 },
    /// Stuck line.
    Constant(bool),
}

impl ErrorType for SimInput {
    type Error = Infallible;
}

impl InputPin for SimInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(match self {
            SimInput::Square { time, period } => time.now() % *period < *period / 2,
            SimInput::Constant(level) => *level,
        })
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Output pin whose level can be inspected through any clone.
#[derive(Clone, Default)]
pub struct RecordingPin(Rc<Cell<bool>>);

impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

/// ADC returning queued codes per channel, falling back to a stationary level.
#[derive(Clone, Default)]
pub struct ScriptedAdc {
    inner: Rc<RefCell<AdcScript>>,
}

#[derive(Default)]
struct AdcScript {
    queued: [VecDeque<u16>; 4],
    level: [u16; 4],
    reads: [usize; 4],
}

impl ScriptedAdc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_level(&self, channel: u8, code: u16) {
        self.inner.borrow_mut().level[usize::from(channel)] = code;
    }

    pub fn queue(&self, channel: u8, codes: &[u16]) {
        self.inner.borrow_mut().queued[usize::from(channel)].extend(codes.iter().copied());
    }

    pub fn reads(&self, channel: u8) -> usize {
        self.inner.borrow().reads[usize::from(channel)]
    }
}

impl AnalogSource for ScriptedAdc {
    fn read_raw(&mut self, channel: u8) -> u16 {
        let mut script = self.inner.borrow_mut();
        let ch = usize::from(channel);
        script.reads[ch] += 1;
        match script.queued[ch].pop_front() {
            Some(code) => code,
            None => script.level[ch],
        }
    }
}

/// Drive that remembers every command it was given.
#[derive(Clone, Default)]
pub struct RecordingDrive(Rc<RefCell<Vec<DriveCommand>>>);

impl RecordingDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<DriveCommand> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<DriveCommand> {
        self.0.borrow().last().copied()
    }
}

impl Drive for RecordingDrive {
    fn apply(&mut self, command: DriveCommand) {
        self.0.borrow_mut().push(command);
    }
}
