//! SPDX-License-Identifier: MIT OR Apache-2.0
//!
//! # Coin Picker Control Core
//!
//! Hardware-independent control logic for an autonomous coin collecting robot:
//! - **Servo PWM:** two software PWM channels generated from one 10 µs tick (`pwm.rs`).
//! - **Sensing:** edge-polled frequency probe and ADC peak sampler (`probe.rs`, `sampler.rs`).
//! - **Actuation:** H-bridge drive patterns and the magnet pickup script (`motor.rs`, `sequencer.rs`).
//! - **FSM:** typed state machine for the search / retrieve / evade behaviour (`autonomy.rs`).
//!
//! Everything here is written against `embedded-hal` traits so it runs on the
//! RP2350 firmware and in host tests alike.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod autonomy;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod motor;
pub mod probe;
pub mod pwm;
pub mod robot;
pub mod sampler;
pub mod sequencer;

#[cfg(test)]
mod sim;
