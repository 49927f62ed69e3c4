//! SPDX-License-Identifier: MIT OR Apache-2.0
//!
//! # Coin Picker Firmware
//!
//! Autonomous coin collector on a Raspberry Pi Pico 2 (RP2350):
//! - **Hardware Module:** board bring-up and pin assignment (`hardware.rs`).
//! - **USB Module:** diagnostic console with its own interrupt (`usb_module.rs`).
//! - **Control core:** the `coin_picker` library, whose typed state machine
//!   runs in the main loop.
//!
//! The servo frame generator lives in the PWM wrap interrupt, which has the
//! highest priority and shares nothing with thread mode but atomics once it
//! is running. Everything else runs in thread mode and blocks on the
//! busy-wait clock.

#![no_std]
#![no_main]

// --- Imports ---
use core::cell::RefCell;
use critical_section::Mutex;
use defmt::*;
use defmt_rtt as _;
use panic_probe as _;

use coin_picker::autonomy::Autonomy;
use coin_picker::config::{ControllerConfig, RobotConfig, STARTUP_WAIT_MS};
use coin_picker::diagnostics;
use coin_picker::pwm::PwmShared;
use coin_picker::robot::Robot;

// --- Modules ---
mod usb_module;
mod hardware;
use hardware::{FirmwareRobot, ServoTick};

// --- HAL Selection ---
use rp235x_hal as hal;
use hal::entry;
use hal::pac;

use rp235x_hal::pac::interrupt;

// --- Bootloader Configuration ---

#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: hal::block::ImageDef = hal::block::ImageDef::secure_exe();

// --- Shared State ---

// Servo setpoints, written by the pickup sequence and read by the tick
static SERVOS: PwmShared = PwmShared::new();

// Hand-off slot for the frame generator; emptied by the first tick
static SERVO_TICK: Mutex<RefCell<Option<ServoTick>>> = Mutex::new(RefCell::new(None));

/// Entry point.
#[entry]
fn main() -> ! {
    info!("Program start");

    // 1. Initialize Hardware Stack (Clocks, cycle counter, GPIO, PWM tick, ADC, USB)
    let hw = hardware::init(&SERVOS);

    // 2. Hand the frame generator to the tick interrupt, then start ticking
    critical_section::with(|cs| {
        SERVO_TICK.borrow_ref_mut(cs).replace(hw.servo_tick);
    });
    unsafe {
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::PWM_IRQ_WRAP_0);
    }

    // 3. Assemble the robot
    let mut robot = Robot::new(
        hw.drive,
        hw.probe_pin,
        hw.adc,
        hw.counter,
        hw.magnet,
        &SERVOS,
        RobotConfig::default(),
    )
    .with_reporter(usb_module::write);

    robot.clock().wait_ms(STARTUP_WAIT_MS);
    usb_module::write(diagnostics::BANNER.as_bytes());

    // 4. The controller keeps the robot for the life of the program
    let robot: &'static mut FirmwareRobot = cortex_m::singleton!(: FirmwareRobot = robot).unwrap();
    let mut autonomy = Autonomy::new(robot, ControllerConfig::default());
    autonomy.start();

    // 5. Main Application Loop
    loop {
        let mode = autonomy.poll();
        usb_module::write(diagnostics::state_line(mode).as_bytes());
    }
}

// --- Interrupt Handlers ---

/// Servo Tick
///
/// PWM slice 7 wraps every 10 µs; each wrap advances both servo outputs by
/// one step of the 20 ms frame.
#[allow(non_snake_case)]
#[interrupt]
fn PWM_IRQ_WRAP_0() {
    static mut TICK: Option<ServoTick> = None;

    // Only the first entry takes a critical section, to claim the generator.
    if TICK.is_none() {
        *TICK = critical_section::with(|cs| SERVO_TICK.borrow_ref_mut(cs).take());
    }

    if let Some(tick) = TICK {
        tick.slice.clear_interrupt();
        tick.frame.on_tick();
    }
}

// --- Metadata ---

#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [hal::binary_info::EntryAddr; 4] = [
    hal::binary_info::rp_cargo_bin_name!(),
    hal::binary_info::rp_cargo_version!(),
    hal::binary_info::rp_program_description!(c"Autonomous coin picker"),
    hal::binary_info::rp_program_build_attribute!()
];
