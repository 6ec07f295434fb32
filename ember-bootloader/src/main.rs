// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Ember Bootloader for RP2040: fail-safe A/B firmware update with an
//! Ethernet recovery endpoint (W5500).
//!
//! On every reset the persisted flags plus the recovery pins select exactly
//! one of: recovery, rollback, swap-and-arm, passthrough.

#![no_std]
#![no_main]

mod boot;
mod dhcp;
mod flash;
mod handoff;
mod net;
mod peripherals;
mod recovery;
mod w5500;

use defmt_rtt as _;
use embedded_hal::digital::InputPin;
use panic_probe as _;

use ember_common::boot_fsm::{self, BootAction, BootFlags, TriggerPolicy};
use ember_common::metadata::{self, InfoRecord};

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

#[entry]
fn main() -> ! {
    defmt::println!("Bootloader init");

    let mut p = peripherals::init();

    ember_common::blink(&mut p.led_pin, &mut p.timer, 3, 200);
    flash::init();

    let mut dev = flash::RomFlash;
    let rec = metadata::read_record(&mut dev).unwrap_or_else(|_| InfoRecord::default_new());
    let flags = BootFlags::from_record(&rec);

    // Either recovery pin held low at reset forces recovery.
    let pin_low =
        p.recovery_a.is_low().unwrap_or(false) || p.recovery_b.is_low().unwrap_or(false);
    let trigger = boot_fsm::recovery_trigger(TriggerPolicy::GpioOnly, pin_low, &flags);

    defmt::println!(
        "flags: should_rollback={} has_new_firmware={} after_rollback={} swap_size={} trigger={}",
        flags.should_rollback,
        flags.has_new_firmware,
        flags.after_rollback,
        rec.swap_size(),
        trigger
    );

    match boot_fsm::decide_boot_action(trigger, &flags) {
        BootAction::Recovery => recovery::run(&mut p),
        BootAction::Rollback => boot::run_rollback(&mut p),
        BootAction::SwapAndArm => boot::run_swap_and_arm(&mut p),
        BootAction::Passthrough => boot::run_passthrough(&mut p),
    }
}
