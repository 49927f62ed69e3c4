//! Named constants and tunables for the robot.
//!
//! Timing constants are in milliseconds unless the name says otherwise. PWM
//! widths are in ticks of [`TICK_US`].

/// Tick source period in microseconds.
pub const TICK_US: u32 = 10;

/// Tick source rate in Hz.
pub const TICK_HZ: u32 = 1_000_000 / TICK_US;

/// Ticks per servo frame (2000 * 10 µs = 20 ms).
pub const FRAME_LENGTH: u16 = 2000;

/// Largest width that still returns the pin low inside a frame.
pub const MAX_PULSE_WIDTH: u16 = FRAME_LENGTH - 1;

/// Lift servo (channel A) resting width.
pub const LIFT_REST: u16 = 95;

/// Gripper servo (channel B) resting width.
pub const GRIPPER_REST: u16 = 240;

/// Signal periods measured per metal probe.
pub const PROBE_PERIODS: u32 = 100;

/// Oscillator frequency above which a coin is under the detector coil.
pub const METAL_THRESHOLD_HZ: u32 = 53_200;

/// Conversions per perimeter burst.
pub const ADC_BURST: usize = 100;

/// ADC full-scale code (12-bit converter).
pub const ADC_FULL_SCALE: u32 = 4095;

/// ADC reference voltage in millivolts.
pub const ADC_VREF_MV: u32 = 3300;

/// Peak voltage above which the perimeter wire is under a sensor.
pub const PERIMETER_THRESHOLD_MV: u32 = 1000;

/// ADC inputs wired to the two perimeter peak detectors.
pub const PERIMETER_CHANNELS: [u8; 2] = [0, 1];

/// Pause after every metal probe.
pub const PROBE_SETTLE_MS: u32 = 100;

/// Pause around stop/start transitions while retrieving.
pub const SETTLE_MS: u32 = 100;

/// Reverse time used both to centre a coin and to back off the perimeter.
pub const REVERSE_MS: u32 = 250;

/// Seed mixed into the evade turn duration.
pub const TURN_SEED: u32 = 2;

/// Grace period at power-up so a host terminal can attach before the banner.
pub const STARTUP_WAIT_MS: u32 = 500;

/// Detection parameters used by [`crate::robot::Robot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub struct RobotConfig {
    pub probe_periods: u32,
    pub metal_threshold_hz: u32,
    pub probe_settle_ms: u32,
    pub perimeter_threshold_mv: u32,
    pub perimeter_channels: [u8; 2],
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            probe_periods: PROBE_PERIODS,
            metal_threshold_hz: METAL_THRESHOLD_HZ,
            probe_settle_ms: PROBE_SETTLE_MS,
            perimeter_threshold_mv: PERIMETER_THRESHOLD_MV,
            perimeter_channels: PERIMETER_CHANNELS,
        }
    }
}

/// Manoeuvre timing used by [`crate::autonomy::Autonomy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub struct ControllerConfig {
    pub settle_ms: u32,
    pub reverse_ms: u32,
    pub turn_seed: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            settle_ms: SETTLE_MS,
            reverse_ms: REVERSE_MS,
            turn_seed: TURN_SEED,
        }
    }
}
