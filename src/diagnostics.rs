//! Human-readable status lines for the serial console.
//!
//! Nothing in the control loop depends on these; they exist so a terminal on
//! the USB port can watch the sensors while tuning thresholds.

use core::fmt::Write as FmtWrite;

use heapless::String;

use crate::autonomy::Mode;

/// One terminal line, CRLF terminated.
pub type Line = String<64>;

/// Printed once at power-up.
pub const BANNER: &str = "\x1b[2J\x1b[1;1H\r\n\
Coin picker\r\n\
Perimeter peaks on ADC0/ADC1 (GPIO 26, 27)\r\n\
Metal detector period on GPIO 14\r\n\
H-bridge on GPIO 2-5, magnet on GPIO 15\r\n\
Servo PWM on GPIO 10, 11\r\n\r\n";

// A line that does not fit is sent truncated rather than dropped.
fn line(args: core::fmt::Arguments) -> Line {
    let mut out = Line::new();
    let _ = FmtWrite::write_fmt(&mut out, args);
    out
}

/// Metal probe result: frequency and raw count, or `NO SIGNAL`.
pub fn probe_line(count: u32, frequency_hz: Option<u32>) -> Line {
    match frequency_hz {
        Some(hz) => line(format_args!("f={}Hz, count={}\r\n", hz, count)),
        None => line(format_args!("NO SIGNAL\r\n")),
    }
}

/// Peak voltages of both perimeter detectors.
pub fn perimeter_line(millivolts: [u32; 2]) -> Line {
    let [a, b] = millivolts;
    line(format_args!(
        "ADC[0]={}.{:03}V, ADC[1]={}.{:03}V\r\n",
        a / 1000,
        a % 1000,
        b / 1000,
        b % 1000
    ))
}

pub fn state_line(mode: Mode) -> Line {
    line(format_args!("State: {}\r\n", mode.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_lines() {
        assert_eq!(probe_line(1_000, Some(100_000)).as_str(), "f=100000Hz, count=1000\r\n");
        assert_eq!(probe_line(0, None).as_str(), "NO SIGNAL\r\n");
    }

    #[test]
    fn perimeter_voltages_keep_three_decimals() {
        assert_eq!(perimeter_line([1_005, 3_300]).as_str(), "ADC[0]=1.005V, ADC[1]=3.300V\r\n");
        assert_eq!(perimeter_line([0, 42]).as_str(), "ADC[0]=0.000V, ADC[1]=0.042V\r\n");
    }

    #[test]
    fn state_names() {
        assert_eq!(state_line(Mode::Search).as_str(), "State: SEARCH\r\n");
        assert_eq!(state_line(Mode::Evade).as_str(), "State: EVADE\r\n");
    }

    #[test]
    fn worst_case_lines_fit() {
        let long = probe_line(u32::MAX, Some(u32::MAX));
        assert!(long.ends_with("\r\n"));
        let long = perimeter_line([u32::MAX, u32::MAX]);
        assert!(long.len() <= 64);
    }
}
