//! Autonomous behaviour as a typed state machine.
//!
//! The robot stows its arm once, then cruises forward probing for coins and
//! for the arena perimeter. A coin is backed onto and picked up; the perimeter
//! is backed away from with a pseudo-random turn. Each [`AutonomyEvent::Poll`]
//! is one pass of the control loop.

use typed_fsm::{state_machine, Transition};

use crate::config::ControllerConfig;
use crate::motor::DriveCommand;
use crate::robot::Platform;

/// Turn duration in milliseconds for the `n`th evade.
///
/// `(124859 + 3571805 * seed * n) mod 4000`, floored into the upper range by
/// adding 1000 to anything below 1000. Arithmetic wraps at 32 bits, so every
/// input maps into `1000..=3999`.
pub fn random_turn_ms(seed: u32, n: u32) -> u32 {
    let t = 3_571_805u32
        .wrapping_mul(seed)
        .wrapping_mul(n)
        .wrapping_add(124_859)
        % 4000;
    if t < 1000 { t + 1000 } else { t }
}

// FSM Context
pub struct AutonomyContext {
    pub platform: &'static mut dyn Platform,
    pub config: ControllerConfig,
    /// Completed evades; feeds the turn generator.
    pub turns: u32,
    pub pickups: u32,
}

// FSM Events
#[derive(Clone, Copy, Debug)]
pub enum AutonomyEvent {
    Poll,
}

state_machine! {
    Name: AutonomyFsm,
    Context: AutonomyContext,
    Event: AutonomyEvent,
    States: {
        // State: park the arm before moving
        Startup => {
            entry: |ctx| {
                info!("stowing arm");
                ctx.platform.drive(DriveCommand::Stop);
                ctx.platform.pick_up();
            }
            process: |_ctx, evt| {
                match evt {
                    AutonomyEvent::Poll => Transition::To(AutonomyFsm::Search),
                }
            }
        },

        // State: cruise and probe, metal first
        Search => {
            entry: |ctx| {
                ctx.platform.drive(DriveCommand::Forward);
            }
            process: |ctx, evt| {
                match evt {
                    AutonomyEvent::Poll => {
                        if ctx.platform.metal_detected() {
                            Transition::To(AutonomyFsm::Retrieve)
                        } else if ctx.platform.perimeter_detected() {
                            Transition::To(AutonomyFsm::Evade)
                        } else {
                            Transition::None
                        }
                    }
                }
            }
        },

        // State: back onto the coin and lift it
        Retrieve => {
            entry: |ctx| {
                let settle = ctx.config.settle_ms;
                ctx.platform.drive(DriveCommand::Stop);
                ctx.platform.wait_ms(settle);
                ctx.platform.drive(DriveCommand::Backward);
                ctx.platform.wait_ms(ctx.config.reverse_ms);
                ctx.platform.drive(DriveCommand::Stop);
                ctx.platform.wait_ms(settle);
                ctx.platform.pick_up();
                ctx.platform.wait_ms(settle);
                ctx.pickups += 1;
                info!("pickup {} done", ctx.pickups);
            }
            process: |ctx, evt| {
                match evt {
                    // Resume, then finish this pass with the perimeter check.
                    AutonomyEvent::Poll => {
                        ctx.platform.drive(DriveCommand::Forward);
                        if ctx.platform.perimeter_detected() {
                            Transition::To(AutonomyFsm::Evade)
                        } else {
                            Transition::To(AutonomyFsm::Search)
                        }
                    }
                }
            }
        },

        // State: back off the wire and turn away
        Evade => {
            entry: |ctx| {
                let turn = random_turn_ms(ctx.config.turn_seed, ctx.turns);
                info!("evading, turn {} ms", turn);
                ctx.platform.drive(DriveCommand::Backward);
                ctx.platform.wait_ms(ctx.config.reverse_ms);
                ctx.platform.drive(DriveCommand::Right);
                ctx.platform.wait_ms(turn);
                ctx.platform.drive(DriveCommand::Stop);
                ctx.turns = ctx.turns.wrapping_add(1);
            }
            process: |_ctx, evt| {
                match evt {
                    AutonomyEvent::Poll => Transition::To(AutonomyFsm::Search),
                }
            }
        }
    }
}

/// Coarse state for logs and the serial console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(test), derive(defmt::Format))]
pub enum Mode {
    Startup,
    Search,
    Retrieve,
    Evade,
}

impl Mode {
    pub const fn name(self) -> &'static str {
        match self {
            Mode::Startup => "STARTUP",
            Mode::Search => "SEARCH",
            Mode::Retrieve => "RETRIEVE",
            Mode::Evade => "EVADE",
        }
    }
}

/// The state machine together with its context.
pub struct Autonomy {
    fsm: AutonomyFsm,
    ctx: AutonomyContext,
}

impl Autonomy {
    pub fn new(platform: &'static mut dyn Platform, config: ControllerConfig) -> Self {
        Self {
            fsm: AutonomyFsm::Startup,
            ctx: AutonomyContext {
                platform,
                config,
                turns: 0,
                pickups: 0,
            },
        }
    }

    /// Enters the initial state, which runs the stowing pickup.
    pub fn start(&mut self) {
        self.fsm.init(&mut self.ctx);
    }

    /// One pass of the control loop.
    pub fn poll(&mut self) -> Mode {
        self.fsm.dispatch(&mut self.ctx, &AutonomyEvent::Poll);
        let mode = self.mode();
        debug!("mode {}", mode);
        mode
    }

    pub fn mode(&self) -> Mode {
        match self.fsm {
            AutonomyFsm::Startup => Mode::Startup,
            AutonomyFsm::Search => Mode::Search,
            AutonomyFsm::Retrieve => Mode::Retrieve,
            AutonomyFsm::Evade => Mode::Evade,
        }
    }

    pub fn turns(&self) -> u32 {
        self.ctx.turns
    }

    pub fn pickups(&self) -> u32 {
        self.ctx.pickups
    }
}
