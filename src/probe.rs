//! Edge-polled period measurement for the metal detector oscillator.
//!
//! A coin near the detector coil raises the oscillator frequency. The probe
//! counts how long `n` full periods take by polling the input pin; the caller
//! turns that count into a frequency. Works for roughly 200 Hz to 700 kHz on
//! the target; outside that band the timeout wins and the probe reports no
//! signal.

use embedded_hal::digital::InputPin;

use crate::clock::{BusyClock, CycleCounter, Timeout};

pub struct FrequencyProbe<P> {
    pin: P,
}

impl<P: InputPin> FrequencyProbe<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Counter value across `periods` full periods of the input, or 0 when
    /// the line is silent or stuck.
    ///
    /// Every edge wait gives up once a quarter second's worth of counts has
    /// passed since the last counter restart.
    pub fn measure<C: CycleCounter>(&mut self, clock: &mut BusyClock<C>, periods: u32) -> u32 {
        let limit = clock.rate_hz() / 4;
        match self.count_periods(clock, periods, limit) {
            Ok(count) => count,
            Err(Timeout) => {
                debug!("frequency probe timed out");
                0
            }
        }
    }

    fn count_periods<C: CycleCounter>(&mut self, clock: &mut BusyClock<C>, periods: u32, limit: u32) -> Result<u32, Timeout> {
        let pin = &mut self.pin;

        // Sync to a rising edge.
        clock.restart();
        clock.spin_while(limit, || is_high(pin))?;
        clock.restart();
        clock.spin_while(limit, || !is_high(pin))?;

        clock.restart();
        for _ in 0..periods {
            clock.spin_while(limit, || is_high(pin))?;
            clock.spin_while(limit, || !is_high(pin))?;
        }

        Ok(clock.elapsed())
    }
}

// A pin that cannot be read counts as low.
fn is_high<P: InputPin>(pin: &mut P) -> bool {
    matches!(pin.is_high(), Ok(true))
}

/// Frequency in Hz from a probe count, `None` for the no-signal sentinel.
pub fn frequency_hz(count: u32, periods: u32, rate_hz: u32) -> Option<u32> {
    if count == 0 {
        return None;
    }
    let hz = u64::from(periods) * u64::from(rate_hz) / u64::from(count);
    Some(u32::try_from(hz).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimCounter, SimInput, SimTime};

    const RATE: u32 = 1_000_000;

    fn probe_on(input: SimInput, time: &SimTime) -> (FrequencyProbe<SimInput>, BusyClock<SimCounter>) {
        (FrequencyProbe::new(input), BusyClock::new(SimCounter::new(time, RATE)))
    }

    #[test]
    fn measures_n_periods_of_a_square_wave() {
        for period in [4u64, 10, 37, 250, 2_000] {
            let time = SimTime::new();
            let input = SimInput::Square { time: time.clone(), period };
            let (mut probe, mut clock) = probe_on(input, &time);

            let count = u64::from(probe.measure(&mut clock, 100));
            let expected = 100 * period;
            assert!(count.abs_diff(expected) <= 2, "period {}: count {} expected {}", period, count, expected);
        }
    }

    #[test]
    fn stuck_high_line_reads_zero() {
        let time = SimTime::new();
        let (mut probe, mut clock) = probe_on(SimInput::Constant(true), &time);

        assert_eq!(probe.measure(&mut clock, 100), 0);
        assert_eq!(time.now(), u64::from(RATE / 4) + 1);
    }

    #[test]
    fn stuck_low_line_reads_zero() {
        let time = SimTime::new();
        let (mut probe, mut clock) = probe_on(SimInput::Constant(false), &time);

        assert_eq!(probe.measure(&mut clock, 100), 0);
    }

    #[test]
    fn signal_too_slow_for_the_budget_reads_zero() {
        // 100 periods of 1 Hz cannot fit in a quarter second.
        let time = SimTime::new();
        let input = SimInput::Square { time: time.clone(), period: u64::from(RATE) };
        let (mut probe, mut clock) = probe_on(input, &time);

        assert_eq!(probe.measure(&mut clock, 100), 0);
    }

    #[test]
    fn frequency_from_count() {
        assert_eq!(frequency_hz(0, 100, RATE), None);
        assert_eq!(frequency_hz(1_000, 100, RATE), Some(100_000));
        assert_eq!(frequency_hz(1_880, 100, RATE), Some(53_191));
        assert_eq!(frequency_hz(1, 100, 40_000_000), Some(4_000_000_000));
        assert_eq!(frequency_hz(1, u32::MAX, u32::MAX), Some(u32::MAX));
    }
}
