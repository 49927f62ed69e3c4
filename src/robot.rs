//! The robot as the controller sees it.
//!
//! [`Platform`] is the narrow, object-safe surface the state machine drives.
//! [`Robot`] implements it on top of the drivers in this crate.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::{BusyClock, CycleCounter};
use crate::config::RobotConfig;
use crate::diagnostics;
use crate::motor::{Drive, DriveCommand};
use crate::probe::{self, FrequencyProbe};
use crate::pwm::PwmShared;
use crate::sampler::{self, AnalogSource, PeakSampler};
use crate::sequencer::PickupSequence;

/// Sensing and actuation used by [`crate::autonomy::Autonomy`].
pub trait Platform {
    fn drive(&mut self, command: DriveCommand);

    /// Blocks for `ms` milliseconds.
    fn wait_ms(&mut self, ms: u32);

    /// Probes the detector oscillator; `true` when a coin is underneath.
    fn metal_detected(&mut self) -> bool;

    /// Samples both perimeter detectors; `true` when either sees the wire.
    fn perimeter_detected(&mut self) -> bool;

    /// Runs the full pickup script.
    fn pick_up(&mut self);
}

/// Sink for diagnostic text lines.
pub type Reporter = fn(&[u8]);

fn discard(_: &[u8]) {}

pub struct Robot<D, P, A, C, M> {
    drive: D,
    probe: FrequencyProbe<P>,
    sampler: PeakSampler<A>,
    clock: BusyClock<C>,
    magnet: M,
    servos: &'static PwmShared,
    config: RobotConfig,
    report: Reporter,
}

impl<D, P, A, C, M> Robot<D, P, A, C, M>
where
    D: Drive,
    P: InputPin,
    A: AnalogSource,
    C: CycleCounter,
    M: OutputPin,
{
    pub fn new(
        drive: D,
        probe_pin: P,
        adc: A,
        counter: C,
        mut magnet: M,
        servos: &'static PwmShared,
        config: RobotConfig,
    ) -> Self {
        let _ = magnet.set_low();
        Self {
            drive,
            probe: FrequencyProbe::new(probe_pin),
            sampler: PeakSampler::new(adc),
            clock: BusyClock::new(counter),
            magnet,
            servos,
            config,
            report: discard,
        }
    }

    /// Sends diagnostic lines to `report` instead of dropping them.
    pub fn with_reporter(mut self, report: Reporter) -> Self {
        self.report = report;
        self
    }

    pub fn clock(&mut self) -> &mut BusyClock<C> {
        &mut self.clock
    }

    /// Probe count and derived frequency, `None` when the line is silent.
    pub fn metal_frequency(&mut self) -> (u32, Option<u32>) {
        let periods = self.config.probe_periods;
        let count = self.probe.measure(&mut self.clock, periods);
        (count, probe::frequency_hz(count, periods, self.clock.rate_hz()))
    }

    /// Burst peaks of both perimeter channels as raw ADC codes.
    pub fn perimeter_peaks(&mut self) -> [u16; 2] {
        self.config
            .perimeter_channels
            .map(|channel| self.sampler.peak_code(channel))
    }
}

impl<D, P, A, C, M> Platform for Robot<D, P, A, C, M>
where
    D: Drive,
    P: InputPin,
    A: AnalogSource,
    C: CycleCounter,
    M: OutputPin,
{
    fn drive(&mut self, command: DriveCommand) {
        debug!("drive {}", command);
        self.drive.apply(command);
    }

    fn wait_ms(&mut self, ms: u32) {
        self.clock.wait_ms(ms);
    }

    fn metal_detected(&mut self) -> bool {
        let (count, frequency) = self.metal_frequency();
        (self.report)(diagnostics::probe_line(count, frequency).as_bytes());
        self.clock.wait_ms(self.config.probe_settle_ms);

        match frequency {
            Some(hz) if hz > self.config.metal_threshold_hz => {
                info!("metal at {} Hz", hz);
                true
            }
            _ => false,
        }
    }

    fn perimeter_detected(&mut self) -> bool {
        let peaks = self.perimeter_peaks();
        let millivolts = peaks.map(sampler::to_millivolts);
        (self.report)(diagnostics::perimeter_line(millivolts).as_bytes());

        let threshold = self.config.perimeter_threshold_mv;
        let breach = peaks.iter().any(|&code| sampler::exceeds_millivolts(code, threshold));
        if breach {
            info!("perimeter at {} mV / {} mV", millivolts[0], millivolts[1]);
        }
        breach
    }

    fn pick_up(&mut self) {
        PickupSequence::run(self.servos, &mut self.magnet, &mut self.clock);
    }
}
