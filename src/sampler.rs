//! Peak-hold sampling of the perimeter detectors.
//!
//! The perimeter wire induces short pulses in the pickup coils, so the decision
//! uses the highest reading in a burst rather than an average.

use crate::config::{ADC_BURST, ADC_FULL_SCALE, ADC_VREF_MV};

/// Single-shot ADC conversion on a numbered input.
pub trait AnalogSource {
    /// Samples, converts and returns the raw code for `channel`.
    fn read_raw(&mut self, channel: u8) -> u16;
}

pub struct PeakSampler<A> {
    adc: A,
    burst: usize,
}

impl<A: AnalogSource> PeakSampler<A> {
    pub fn new(adc: A) -> Self {
        Self {
            adc,
            burst: ADC_BURST,
        }
    }

    /// Highest raw code over one burst on `channel`.
    pub fn peak_code(&mut self, channel: u8) -> u16 {
        let mut peak = 0;
        for _ in 0..self.burst {
            let code = self.adc.read_raw(channel);
            if code > peak {
                peak = code;
            }
        }
        peak
    }
}

/// Raw code to millivolts against the 3.3 V reference, truncated.
pub fn to_millivolts(code: u16) -> u32 {
    u32::from(code) * ADC_VREF_MV / ADC_FULL_SCALE
}

/// `true` when `code` is strictly above `threshold_mv`.
///
/// Compared in code units scaled by the full-scale value so no fraction of a
/// millivolt is lost.
pub fn exceeds_millivolts(code: u16, threshold_mv: u32) -> bool {
    u64::from(code) * u64::from(ADC_VREF_MV) > u64::from(threshold_mv) * u64::from(ADC_FULL_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ScriptedAdc;

    #[test]
    fn code_scaling() {
        assert_eq!(to_millivolts(0), 0);
        assert_eq!(to_millivolts(4095), 3300);
        assert_eq!(to_millivolts(1241), 1000);
        assert_eq!(to_millivolts(1242), 1000);
        assert_eq!(to_millivolts(1243), 1001);
    }

    #[test]
    fn threshold_keeps_sub_millivolt_precision() {
        // 1240 is 0.99927 V, 1241 is 1.00007 V.
        assert!(!exceeds_millivolts(1240, 1000));
        assert!(exceeds_millivolts(1241, 1000));
        assert!(exceeds_millivolts(1242, 1000));
        assert!(!exceeds_millivolts(0, 0));
        assert!(exceeds_millivolts(1, 0));
        assert!(!exceeds_millivolts(4095, 3300));
    }

    #[test]
    fn reports_burst_maximum() {
        let adc = ScriptedAdc::new();
        adc.set_level(0, 200);
        let mut burst = vec![200u16; 100];
        burst[63] = 2048;
        burst[10] = 1500;
        adc.queue(0, &burst);

        let mut sampler = PeakSampler::new(adc.clone());
        assert_eq!(sampler.peak_code(0), 2048);
        assert_eq!(adc.reads(0), ADC_BURST);
    }

    #[test]
    fn pulse_outside_the_burst_is_missed() {
        let adc = ScriptedAdc::new();
        let mut burst = vec![100u16; 101];
        burst[100] = 4000;
        adc.queue(1, &burst);

        let mut sampler = PeakSampler::new(adc);
        assert_eq!(sampler.peak_code(1), 100);
        assert_eq!(sampler.peak_code(1), 4000);
    }

    #[test]
    fn stationary_input_is_idempotent() {
        let adc = ScriptedAdc::new();
        adc.set_level(1, 3000);

        let mut sampler = PeakSampler::new(adc);
        let first = sampler.peak_code(1);
        assert_eq!(first, 3000);
        for _ in 0..5 {
            assert_eq!(sampler.peak_code(1), first);
        }
        assert_eq!(sampler.peak_code(0), 0);
    }
}
