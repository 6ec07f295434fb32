// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! The three non-recovery boot paths: rollback, swap-and-arm, passthrough.
//!
//! Each path performs its slot swap and flag transition, then hands off to
//! the application. A storage failure is logged and the hand-off happens
//! anyway: the flag state in the info sector stays observable across reset,
//! and an unbootable result is recovered through the recovery trigger.

use embedded_hal::delay::DelayNs;

use ember_common::blockdev::StorageError;
use ember_common::boot_fsm;
use ember_common::layout::{FLASH_APP_START, FLASH_SECTOR_SIZE, FLASH_SWAP_SPACE_LENGTH};
use ember_common::{metadata, swap};

use crate::flash::{self, RomFlash};
use crate::handoff;
use crate::peripherals::Peripherals;

/// Swap the staged region between the slots, whole loop under one flash
/// critical section so no interrupt lands between a half-swapped pair.
fn swap_staged(dev: &mut RomFlash) -> Result<(), StorageError> {
    let rec = metadata::read_record(dev)?;
    let n_sectors = swap::sectors_for_swap(
        rec.swap_size(),
        FLASH_SWAP_SPACE_LENGTH,
        FLASH_SECTOR_SIZE,
    );
    flash::with_flash_critical(|| swap::swap_slots(dev, n_sectors))
}

/// Restore the previous image and remember that we did.
pub fn rollback(dev: &mut RomFlash) -> Result<(), StorageError> {
    swap_staged(dev)?;
    metadata::update_record(dev, boot_fsm::apply_rollback)
}

/// Install the staged image and arm the rollback: unless the new application
/// commits, the next reset undoes the swap.
pub fn swap_and_arm(dev: &mut RomFlash) -> Result<(), StorageError> {
    swap_staged(dev)?;
    metadata::update_record(dev, boot_fsm::apply_swap_and_arm)
}

/// Install a recovery upload with no arming: the operator already decided
/// this image is the one to run.
pub fn swap_and_commit(dev: &mut RomFlash) -> Result<(), StorageError> {
    swap_staged(dev)?;
    metadata::update_record(dev, boot_fsm::apply_swap_and_commit)
}

/// Commit the running image. Skips the sector cycle when the flags are
/// already clear, which is the common case on every ordinary boot.
pub fn passthrough_commit(dev: &mut RomFlash) -> Result<(), StorageError> {
    let rec = metadata::read_record(dev)?;
    if !rec.should_rollback() && !rec.has_new_firmware() {
        return Ok(());
    }
    metadata::update_record(dev, boot_fsm::apply_passthrough_commit)
}

pub fn run_rollback(p: &mut Peripherals) -> ! {
    defmt::println!("Rollback path");
    let mut dev = RomFlash;
    if let Err(e) = rollback(&mut dev) {
        defmt::println!("rollback: {=str}", e.as_str());
    }
    finish(p)
}

pub fn run_swap_and_arm(p: &mut Peripherals) -> ! {
    defmt::println!("Swap-and-arm path");
    let mut dev = RomFlash;
    if let Err(e) = swap_and_arm(&mut dev) {
        defmt::println!("swap-and-arm: {=str}", e.as_str());
    }
    finish(p)
}

pub fn run_passthrough(p: &mut Peripherals) -> ! {
    defmt::println!("Passthrough path");
    let mut dev = RomFlash;
    if let Err(e) = passthrough_commit(&mut dev) {
        defmt::println!("commit: {=str}", e.as_str());
    }
    finish(p)
}

const RAM_START: u32 = 0x2000_0000;
const RAM_END: u32 = 0x2004_2000;

/// Sanity-check the application vector table before jumping: initial SP in
/// RAM, reset vector a thumb address inside the APP slot. A blank or
/// half-written slot fails this and lands in recovery instead of in a jump
/// to 0xFFFF_FFFE.
fn app_vector_table_is_sane() -> bool {
    let initial_sp = unsafe { (FLASH_APP_START as *const u32).read_volatile() };
    let reset_vector = unsafe { (FLASH_APP_START as *const u32).offset(1).read_volatile() };

    let sp_ok = (RAM_START..=RAM_END).contains(&initial_sp);
    let app_range = FLASH_APP_START..FLASH_APP_START + FLASH_SWAP_SPACE_LENGTH;
    let reset_ok = reset_vector & 1 == 1 && app_range.contains(&(reset_vector & !1));
    sp_ok && reset_ok
}

fn finish(p: &mut Peripherals) -> ! {
    if !app_vector_table_is_sane() {
        defmt::println!("No bootable image in APP slot, entering recovery");
        crate::recovery::run(p);
    }
    defmt::println!("Jumping to application...");
    p.timer.delay_ms(10u32);
    unsafe { handoff::start_application() }
}
