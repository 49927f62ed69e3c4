//! Software servo PWM.
//!
//! One periodic tick drives two output pins. Each frame is [`FRAME_LENGTH`]
//! ticks long; both pins go high at frame start and each drops low once the
//! frame position reaches its channel's width. The widths and the frame
//! position live in [`PwmShared`] so the main loop can retarget the servos while
//! the tick interrupt keeps running.

use core::sync::atomic::{AtomicU16, Ordering};

use embedded_hal::digital::OutputPin;

use crate::config::{FRAME_LENGTH, GRIPPER_REST, LIFT_REST, MAX_PULSE_WIDTH};

/// Servo output selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub enum ServoChannel {
    /// Channel A, raises and lowers the magnet arm.
    Lift,
    /// Channel B, opens and closes the gripper.
    Gripper,
}

/// State shared between the tick interrupt and the main loop.
///
/// Every field is a single atomic word, so a write from the main loop can never
/// be observed half done by the interrupt.
pub struct PwmShared {
    lift: AtomicU16,
    gripper: AtomicU16,
    frame: AtomicU16,
}

impl PwmShared {
    /// Both channels start at their resting widths.
    pub const fn new() -> Self {
        Self {
            lift: AtomicU16::new(LIFT_REST),
            gripper: AtomicU16::new(GRIPPER_REST),
            frame: AtomicU16::new(0),
        }
    }

    fn slot(&self, channel: ServoChannel) -> &AtomicU16 {
        match channel {
            ServoChannel::Lift => &self.lift,
            ServoChannel::Gripper => &self.gripper,
        }
    }

    /// Sets a channel's pulse width in ticks, clamped below the frame length.
    pub fn set_channel_width(&self, channel: ServoChannel, ticks: u16) {
        let clamped = ticks.min(MAX_PULSE_WIDTH);
        if clamped != ticks {
            warn!("{} width {} clamped to {}", channel, ticks, clamped);
        }
        self.slot(channel).store(clamped, Ordering::Relaxed);
    }

    pub fn channel_width(&self, channel: ServoChannel) -> u16 {
        self.slot(channel).load(Ordering::Relaxed)
    }

    /// Current tick position inside the frame.
    pub fn frame_position(&self) -> u16 {
        self.frame.load(Ordering::Relaxed)
    }
}

impl Default for PwmShared {
    fn default() -> Self {
        Self::new()
    }
}

/// Tick-driven frame generator owning the two servo pins.
pub struct FrameGenerator<A, B> {
    shared: &'static PwmShared,
    lift_pin: A,
    gripper_pin: B,
}

impl<A, B> FrameGenerator<A, B>
where
    A: OutputPin,
    B: OutputPin,
{
    /// Takes the pins and starts a fresh frame.
    pub fn new(shared: &'static PwmShared, lift_pin: A, gripper_pin: B) -> Self {
        let mut generator = Self {
            shared,
            lift_pin,
            gripper_pin,
        };
        generator.shared.frame.store(0, Ordering::Relaxed);
        generator.start_frame();
        generator
    }

    /// Advances the frame by one tick. Called from the tick interrupt.
    pub fn on_tick(&mut self) {
        let lift = self.shared.lift.load(Ordering::Relaxed);
        let gripper = self.shared.gripper.load(Ordering::Relaxed);

        let position = self.shared.frame.load(Ordering::Relaxed) + 1;

        if position == lift {
            let _ = self.lift_pin.set_low();
        }
        if position == gripper {
            let _ = self.gripper_pin.set_low();
        }

        if position >= FRAME_LENGTH {
            self.shared.frame.store(0, Ordering::Relaxed);
            self.start_frame();
        } else {
            self.shared.frame.store(position, Ordering::Relaxed);
        }
    }

    // A zero width never matches a position, so that pin is held low instead.
    fn start_frame(&mut self) {
        if self.shared.lift.load(Ordering::Relaxed) > 0 {
            let _ = self.lift_pin.set_high();
        } else {
            let _ = self.lift_pin.set_low();
        }
        if self.shared.gripper.load(Ordering::Relaxed) > 0 {
            let _ = self.gripper_pin.set_high();
        } else {
            let _ = self.gripper_pin.set_low();
        }
    }
}
