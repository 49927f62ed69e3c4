//! Hardware Abstraction Module
//!
//! Brings up the RP2350 and hands the control core its peripherals:
//! clocks, the core cycle counter, the 10 µs servo tick, GPIO for the
//! H-bridge / magnet / probe, the ADC for the perimeter detectors and the USB
//! console.
//!
//! | Function              | GPIO   |
//! | --------------------- | ------ |
//! | H-bridge A0, A1       | 2, 3   |
//! | H-bridge B0, B1       | 4, 5   |
//! | Lift servo (PWM A)    | 10     |
//! | Gripper servo (PWM B) | 11     |
//! | Metal detector input  | 14     |
//! | Magnet driver         | 15     |
//! | Perimeter ADC0, ADC1  | 26, 27 |

use cortex_m::peripheral::DWT;
use rp235x_hal as hal;
use hal::Clock;
use hal::pac;

use coin_picker::clock::CycleCounter;
use coin_picker::config::TICK_HZ;
use coin_picker::motor::MotorDriver;
use coin_picker::pwm::{FrameGenerator, PwmShared};
use coin_picker::robot::Robot;
use coin_picker::sampler::AnalogSource;

use crate::usb_module;

/// External crystal frequency used by the Raspberry Pi Pico 2.
const XTAL_FREQ_HZ: u32 = 12_000_000u32;

// NVIC priorities, lower is more urgent. The servo tick preempts everything.
const TICK_PRIORITY: u8 = 0x00;
const USB_PRIORITY: u8 = 0x80;

type Output<I> = hal::gpio::Pin<I, hal::gpio::FunctionSio<hal::gpio::SioOutput>, hal::gpio::PullDown>;

pub type DrivePins = MotorDriver<
    Output<hal::gpio::bank0::Gpio2>,
    Output<hal::gpio::bank0::Gpio3>,
    Output<hal::gpio::bank0::Gpio4>,
    Output<hal::gpio::bank0::Gpio5>,
>;

pub type LiftPin = Output<hal::gpio::bank0::Gpio10>;
pub type GripperPin = Output<hal::gpio::bank0::Gpio11>;
pub type MagnetPin = Output<hal::gpio::bank0::Gpio15>;

pub type ProbePin = hal::gpio::Pin<
    hal::gpio::bank0::Gpio14,
    hal::gpio::FunctionSio<hal::gpio::SioInput>,
    hal::gpio::PullUp,
>;

/// The robot as wired on this board.
pub type FirmwareRobot = Robot<DrivePins, ProbePin, PerimeterAdc, CoreCycles, MagnetPin>;

/// PWM slice used only for its wrap interrupt.
pub type TickSlice = hal::pwm::Slice<hal::pwm::Pwm7, hal::pwm::FreeRunning>;

/// Everything the tick interrupt owns.
pub struct ServoTick {
    pub frame: FrameGenerator<LiftPin, GripperPin>,
    pub slice: TickSlice,
}

/// DWT CYCCNT at the system clock rate, restarted by remembering a base value.
///
/// Wraps after about 28 s at 150 MHz; no single wait comes close.
pub struct CoreCycles {
    base: u32,
    rate_hz: u32,
}

impl CycleCounter for CoreCycles {
    fn restart(&mut self) {
        self.base = DWT::cycle_count();
    }

    fn elapsed(&mut self) -> u32 {
        DWT::cycle_count().wrapping_sub(self.base)
    }

    fn rate_hz(&self) -> u32 {
        self.rate_hz
    }
}

/// Single-shot conversions by direct register access.
pub struct PerimeterAdc {
    _adc: hal::Adc,
}

impl AnalogSource for PerimeterAdc {
    fn read_raw(&mut self, channel: u8) -> u16 {
        unsafe {
            let adc_regs = &(*pac::ADC::ptr());

            // Previous conversion (if any) must be finished before reselecting
            while adc_regs.cs().read().ready().bit_is_clear() {}
            adc_regs.cs().modify(|_, w| {
                w.ainsel().bits(channel)
                 .start_once().set_bit()
            });
            while adc_regs.cs().read().ready().bit_is_clear() {}

            adc_regs.result().read().result().bits()
        }
    }
}

/// Initialized peripherals handed to `main`.
pub struct Hardware {
    pub drive: DrivePins,
    pub probe_pin: ProbePin,
    pub magnet: MagnetPin,
    pub adc: PerimeterAdc,
    pub counter: CoreCycles,
    pub servo_tick: ServoTick,
}

/// Initializes the entire hardware stack.
///
/// This function:
/// 1.  Takes ownership of the raw PAC and core peripherals.
/// 2.  Configures the Watchdog and Clocks (System & USB).
/// 3.  Starts the DWT cycle counter as the busy-wait counter.
/// 4.  Ranks the servo tick above the USB interrupt.
/// 5.  Configures GPIO (bridge, magnet, probe input, servo outputs).
/// 6.  Arms PWM slice 7 to wrap every 10 µs as the servo tick.
/// 7.  Enables the ADC and its two perimeter inputs.
/// 8.  Initializes the USB Serial module.
///
/// The tick interrupt is configured but left masked; `main` unmasks it once
/// the frame generator has been published.
pub fn init(servos: &'static PwmShared) -> Hardware {
    // 1. Take ownership of raw peripherals
    let mut pac = pac::Peripherals::take().unwrap();
    let mut core = cortex_m::Peripherals::take().unwrap();
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    // 2. Configure Clocks
    let clocks = hal::clocks::init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    // 3. Busy-wait counter
    core.DCB.enable_trace();
    core.DWT.enable_cycle_counter();
    let sys_hz = clocks.system_clock.freq().to_Hz();
    let counter = CoreCycles { base: 0, rate_hz: sys_hz };

    // 4. Interrupt priorities, set while both lines are still masked
    unsafe {
        core.NVIC.set_priority(pac::Interrupt::PWM_IRQ_WRAP_0, TICK_PRIORITY);
        core.NVIC.set_priority(pac::Interrupt::USBCTRL_IRQ, USB_PRIORITY);
    }

    // 5. Configure GPIOs
    let sio = hal::Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let drive = MotorDriver::new(
        pins.gpio2.into_push_pull_output(),
        pins.gpio3.into_push_pull_output(),
        pins.gpio4.into_push_pull_output(),
        pins.gpio5.into_push_pull_output(),
    );
    let magnet = pins.gpio15.into_push_pull_output();
    let probe_pin = pins.gpio14.into_pull_up_input();

    let frame = FrameGenerator::new(
        servos,
        pins.gpio10.into_push_pull_output(),
        pins.gpio11.into_push_pull_output(),
    );

    // 6. Servo tick: sysclk / TICK_HZ counts per wrap
    let pwm_slices = hal::pwm::Slices::new(pac.PWM, &mut pac.RESETS);
    let mut slice = pwm_slices.pwm7;
    let top = sys_hz / TICK_HZ - 1;
    slice.set_div_int(1);
    slice.set_top(top as u16);
    slice.enable_interrupt0();
    slice.enable();

    // 7. Configure ADC (polled single-shot)
    let adc = hal::Adc::new(pac.ADC, &mut pac.RESETS);
    let _perimeter_a = hal::adc::AdcPin::new(pins.gpio26).unwrap();
    let _perimeter_b = hal::adc::AdcPin::new(pins.gpio27).unwrap();

    // 8. Configure USB Serial (via module)
    usb_module::init(
        pac.USB,
        pac.USB_DPRAM,
        clocks.usb_clock,
        &mut pac.RESETS,
    );

    Hardware {
        drive,
        probe_pin,
        magnet,
        adc: PerimeterAdc { _adc: adc },
        counter,
        servo_tick: ServoTick { frame, slice },
    }
}
