//! H-bridge drive patterns.
//!
//! Two motor channels, each controlled by a pin pair (A0/A1 for the left
//! wheel, B0/B1 for the right). A command writes all four pins at once and
//! simply replaces whatever was driven before.

use embedded_hal::digital::{OutputPin, PinState};

/// Robot motion commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub enum DriveCommand {
    Forward,
    Backward,
    /// Spin left in place.
    Left,
    /// Spin right in place.
    Right,
    Stop,
}

impl DriveCommand {
    /// Pin levels as `[A0, A1, B0, B1]`.
    pub const fn levels(self) -> [bool; 4] {
        match self {
            DriveCommand::Forward => [true, false, false, true],
            DriveCommand::Backward => [false, true, true, false],
            DriveCommand::Left => [false, true, false, true],
            DriveCommand::Right => [true, false, true, false],
            DriveCommand::Stop => [false, false, false, false],
        }
    }
}

/// Anything that can carry out a [`DriveCommand`].
pub trait Drive {
    fn apply(&mut self, command: DriveCommand);
}

pub struct MotorDriver<A0, A1, B0, B1> {
    a0: A0,
    a1: A1,
    b0: B0,
    b1: B1,
}

impl<A0, A1, B0, B1> MotorDriver<A0, A1, B0, B1>
where
    A0: OutputPin,
    A1: OutputPin,
    B0: OutputPin,
    B1: OutputPin,
{
    /// Takes the four bridge pins and stops the motors.
    pub fn new(a0: A0, a1: A1, b0: B0, b1: B1) -> Self {
        let mut driver = Self { a0, a1, b0, b1 };
        driver.apply(DriveCommand::Stop);
        driver
    }
}

impl<A0, A1, B0, B1> Drive for MotorDriver<A0, A1, B0, B1>
where
    A0: OutputPin,
    A1: OutputPin,
    B0: OutputPin,
    B1: OutputPin,
{
    fn apply(&mut self, command: DriveCommand) {
        let [a0, a1, b0, b1] = command.levels();
        let _ = self.a0.set_state(PinState::from(a0));
        let _ = self.a1.set_state(PinState::from(a1));
        let _ = self.b0.set_state(PinState::from(b0));
        let _ = self.b1.set_state(PinState::from(b1));
    }
}
