//! Magnet pickup script.
//!
//! The lift (channel A) lowers the magnet onto the coin, the gripper
//! (channel B) swings round, the magnet grabs, the arm sweeps up to drop the
//! coin into the hopper and everything returns to rest. The script is a fixed
//! table of stages. [`PickupSequence`] walks it one action at a time and tells
//! the caller how long to hold before the next step, so it can be driven either
//! by [`PickupSequence::run`] or by an external scheduler.

use embedded_hal::digital::OutputPin;

use crate::clock::{BusyClock, CycleCounter};
use crate::config::{GRIPPER_REST, LIFT_REST};
use crate::pwm::{PwmShared, ServoChannel};

use ServoChannel::{Gripper, Lift};

/// One row of the pickup script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub enum Stage {
    /// Hold without changing anything.
    Hold(u32),
    /// Set one channel, then hold.
    Set { channel: ServoChannel, ticks: u16, hold_ms: u32 },
    /// `count` settings starting at `start` and moving by `step`, each held.
    Ramp { channel: ServoChannel, start: u16, step: i16, count: u16, hold_ms: u32 },
    /// Switch the magnet, then hold.
    Magnet { on: bool, hold_ms: u32 },
}

impl Stage {
    /// Number of actions the stage expands to.
    pub const fn actions(&self) -> u16 {
        match self {
            Stage::Ramp { count, .. } => *count,
            _ => 1,
        }
    }
}

pub const PICKUP_SCRIPT: [Stage; 17] = [
    Stage::Hold(1000),
    // Neutral.
    Stage::Set { channel: Lift, ticks: LIFT_REST, hold_ms: 1000 },
    Stage::Set { channel: Gripper, ticks: GRIPPER_REST, hold_ms: 1000 },
    // Lower the arm, open the gripper.
    Stage::Set { channel: Lift, ticks: 60, hold_ms: 1000 },
    Stage::Set { channel: Gripper, ticks: 90, hold_ms: 1000 },
    Stage::Magnet { on: true, hold_ms: 200 },
    // Raise with the coin.
    Stage::Ramp { channel: Lift, start: 80, step: 20, count: 6, hold_ms: 100 },
    Stage::Set { channel: Lift, ticks: 200, hold_ms: 200 },
    Stage::Set { channel: Lift, ticks: 180, hold_ms: 1000 },
    // Close the gripper.
    Stage::Ramp { channel: Gripper, start: 90, step: 8, count: 16, hold_ms: 100 },
    Stage::Hold(1000),
    // Over the hopper.
    Stage::Ramp { channel: Lift, start: 180, step: 4, count: 15, hold_ms: 100 },
    Stage::Set { channel: Lift, ticks: 240, hold_ms: 1000 },
    Stage::Magnet { on: false, hold_ms: 1000 },
    // Back down.
    Stage::Ramp { channel: Lift, start: 220, step: -20, count: 7, hold_ms: 100 },
    // Rest.
    Stage::Set { channel: Lift, ticks: LIFT_REST, hold_ms: 1000 },
    Stage::Set { channel: Gripper, ticks: GRIPPER_REST, hold_ms: 1000 },
];

/// Outcome of one [`PickupSequence::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub enum SequenceStatus {
    /// An action was applied; hold this many milliseconds before stepping again.
    Hold(u32),
    Done,
}

/// Cursor over [`PICKUP_SCRIPT`].
#[derive(Clone, Debug, Default)]
pub struct PickupSequence {
    stage: usize,
    action: u16,
}

impl PickupSequence {
    pub const fn new() -> Self {
        Self { stage: 0, action: 0 }
    }

    pub fn is_done(&self) -> bool {
        self.stage >= PICKUP_SCRIPT.len()
    }

    /// Applies the next action of the script.
    pub fn step<M: OutputPin>(&mut self, servos: &PwmShared, magnet: &mut M) -> SequenceStatus {
        let Some(stage) = PICKUP_SCRIPT.get(self.stage) else {
            return SequenceStatus::Done;
        };

        let hold = match *stage {
            Stage::Hold(ms) => ms,
            Stage::Set { channel, ticks, hold_ms } => {
                servos.set_channel_width(channel, ticks);
                hold_ms
            }
            Stage::Ramp { channel, start, step, count: _, hold_ms } => {
                let offset = i32::from(step) * i32::from(self.action);
                let ticks = (i32::from(start) + offset).clamp(0, i32::from(u16::MAX)) as u16;
                servos.set_channel_width(channel, ticks);
                hold_ms
            }
            Stage::Magnet { on, hold_ms } => {
                let _ = if on { magnet.set_high() } else { magnet.set_low() };
                debug!("magnet {}", on);
                hold_ms
            }
        };

        self.action += 1;
        if self.action >= stage.actions() {
            self.stage += 1;
            self.action = 0;
        }

        SequenceStatus::Hold(hold)
    }

    /// Runs a fresh pickup from the first stage to the last, blocking for the
    /// whole script.
    pub fn run<M, C>(servos: &PwmShared, magnet: &mut M, clock: &mut BusyClock<C>)
    where
        M: OutputPin,
        C: CycleCounter,
    {
        info!("pickup sequence start");
        let mut sequence = Self::new();
        while let SequenceStatus::Hold(ms) = sequence.step(servos, magnet) {
            clock.wait_ms(ms);
        }
        info!("pickup sequence done");
    }
}
