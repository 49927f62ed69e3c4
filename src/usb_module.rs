//! USB Module
//!
//! Diagnostic console over USB CDC serial. The stack is serviced from the
//! `USBCTRL_IRQ` handler so the port stays enumerated while the control loop
//! spins through multi-second holds. Output is best effort: bytes that do not
//! fit in the endpoint buffer are dropped.
//!
//! The console is shared between thread mode and `USBCTRL_IRQ` only. Thread
//! mode masks that single line around each access instead of taking a global
//! critical section, so the servo tick is never held off by USB traffic.

use core::ptr::addr_of_mut;

use cortex_m::peripheral::NVIC;
use usb_device::bus::UsbBusAllocator;
use usb_device::prelude::*;
use usbd_serial::SerialPort;

use rp235x_hal as hal;
use hal::pac;
use hal::usb::UsbBus;

use rp235x_hal::pac::interrupt;

struct Console {
    device: UsbDevice<'static, UsbBus>,
    serial: SerialPort<'static, UsbBus>,
}

static mut BUS: Option<UsbBusAllocator<UsbBus>> = None;
static mut CONSOLE: Option<Console> = None;

/// Brings up the CDC port and unmasks the USB interrupt.
pub fn init(
    usb_periph: pac::USB,
    usb_dpram: pac::USB_DPRAM,
    usb_clock: hal::clocks::UsbClock,
    resets: &mut pac::RESETS,
) {
    let bus = UsbBus::new(usb_periph, usb_dpram, usb_clock, true, resets);

    // Safety: runs once from `hardware::init`, before USBCTRL_IRQ is unmasked.
    let allocator: &'static UsbBusAllocator<UsbBus> =
        unsafe { (*addr_of_mut!(BUS)).insert(UsbBusAllocator::new(bus)) };

    let serial = SerialPort::new(allocator);
    let device = UsbDeviceBuilder::new(allocator, UsbVidPid(0x16c0, 0x27dd))
        .strings(&[StringDescriptors::default()
            .manufacturer("Coin Picker")
            .product("Coin Picker Console")
            .serial_number("COIN01")])
        .unwrap()
        .device_class(usbd_serial::USB_CLASS_CDC)
        .build();

    // Safety: as above, the interrupt cannot observe the write.
    unsafe {
        *addr_of_mut!(CONSOLE) = Some(Console { device, serial });
        NVIC::unmask(pac::Interrupt::USBCTRL_IRQ);
    }
}

/// Queues bytes on the console; silently drops them if no host is attached.
///
/// Matches `coin_picker::robot::Reporter`. Thread mode only.
pub fn write(data: &[u8]) {
    NVIC::mask(pac::Interrupt::USBCTRL_IRQ);
    cortex_m::asm::dsb();
    cortex_m::asm::isb();

    // Safety: USBCTRL_IRQ is masked, so nothing else touches the console.
    if let Some(console) = unsafe { (*addr_of_mut!(CONSOLE)).as_mut() } {
        let _ = console.serial.write(data);
    }

    unsafe { NVIC::unmask(pac::Interrupt::USBCTRL_IRQ) };
}

/// USB Interrupt Handler
///
/// Enumeration and endpoint traffic. Input from the host is read and
/// discarded; the console is output only. Runs below the servo tick.
#[allow(non_snake_case)]
#[interrupt]
fn USBCTRL_IRQ() {
    // Safety: thread mode masks this interrupt around its own accesses.
    let Some(console) = (unsafe { (*addr_of_mut!(CONSOLE)).as_mut() }) else {
        return;
    };

    if console.device.poll(&mut [&mut console.serial]) {
        let mut buf = [0u8; 64];
        let _ = console.serial.read(&mut buf);
    }
}
