// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Peripheral initialization for the bootloader.
//!
//! Board wiring: W5500 on SPI0 (GP16 MISO, GP17 CS, GP18 SCK, GP19 MOSI),
//! recovery buttons on GP2/GP3 (active low), LED on GP25.

use embedded_hal::digital::OutputPin;
use rp2040_hal as hal;
use rp2040_hal::Clock;
use rp2040_hal::fugit::RateExtU32;
use rp2040_hal::gpio::{bank0, FunctionSioInput, FunctionSioOutput, FunctionSpi, Pin};
use rp2040_hal::gpio::{PullDown, PullUp};
use rp2040_hal::spi::{Enabled, Spi};

pub type LedPin = Pin<bank0::Gpio25, FunctionSioOutput, PullDown>;
pub type RecoveryPinA = Pin<bank0::Gpio2, FunctionSioInput, PullUp>;
pub type RecoveryPinB = Pin<bank0::Gpio3, FunctionSioInput, PullUp>;
pub type EthCsPin = Pin<bank0::Gpio17, FunctionSioOutput, PullDown>;

pub type EthSpiPins = (
    Pin<bank0::Gpio19, FunctionSpi, PullDown>, // MOSI
    Pin<bank0::Gpio16, FunctionSpi, PullDown>, // MISO
    Pin<bank0::Gpio18, FunctionSpi, PullDown>, // SCK
);
pub type EthSpi = Spi<Enabled, hal::pac::SPI0, EthSpiPins>;

pub struct Peripherals {
    pub led_pin: LedPin,
    pub recovery_a: RecoveryPinA,
    pub recovery_b: RecoveryPinB,
    pub timer: hal::Timer,
    pub eth_spi: EthSpi,
    pub eth_cs: EthCsPin,
}

pub fn init() -> Peripherals {
    let mut pac = unsafe { hal::pac::Peripherals::steal() };

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

    let spi_pins: EthSpiPins = (
        pins.gpio19.into_function(),
        pins.gpio16.into_function(),
        pins.gpio18.into_function(),
    );
    let eth_spi = Spi::<_, _, _, 8>::new(pac.SPI0, spi_pins).init(
        &mut pac.RESETS,
        clocks.peripheral_clock.freq(),
        10u32.MHz(),
        embedded_hal::spi::MODE_0,
    );

    // W5500 is deselected until the first transfer
    let mut eth_cs = pins.gpio17.into_push_pull_output();
    eth_cs.set_high().ok();

    Peripherals {
        led_pin: pins.gpio25.into_push_pull_output(),
        recovery_a: pins.gpio2.into_pull_up_input(),
        recovery_b: pins.gpio3.into_pull_up_input(),
        timer,
        eth_spi,
        eth_cs,
    }
}
