// Copyright (c) 2026 ADNT Sarl <info@adnt.io>
// SPDX-License-Identifier: MIT

//! Board bring-up for the sample firmware: clocks, timer, LED, and the
//! static USB bus the console runs on.

use rp2040_hal as hal;
use rp2040_hal::usb::UsbBus;
use usb_device::class_prelude::UsbBusAllocator;

pub type LedPin =
    hal::gpio::Pin<hal::gpio::bank0::Gpio25, hal::gpio::FunctionSioOutput, hal::gpio::PullDown>;

pub struct Board {
    pub timer: hal::Timer,
    pub led: LedPin,
    pub usb_bus: &'static UsbBusAllocator<UsbBus>,
}

/// Bring the chip up far enough for the console. One-shot: both the PAC
/// peripherals and the USB bus singleton can only be claimed once.
pub fn init() -> Board {
    let mut pac = hal::pac::Peripherals::take().unwrap();

    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);
    let clocks = hal::clocks::init_clocks_and_plls(
        12_000_000u32,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let sio = hal::Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let usb_bus = cortex_m::singleton!(
        : UsbBusAllocator<UsbBus> = UsbBusAllocator::new(UsbBus::new(
            pac.USBCTRL_REGS,
            pac.USBCTRL_DPRAM,
            clocks.usb_clock,
            true,
            &mut pac.RESETS,
        ))
    )
    .unwrap();

    Board {
        timer,
        led: pins.gpio25.into_push_pull_output(),
        usb_bus,
    }
}
