// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash operations exported to the running application.
//!
//! This is the application's half of the update contract:
//! - confirm a healthy boot (clear `should_rollback` / `has_new_firmware`)
//! - query whether this boot follows an update or a rollback
//! - stage a new image into the download slot and request the swap
//!
//! The info sector is written with the same whole-sector
//! read-modify-erase-program discipline the bootloader uses.

use crate::layout::{
    addr_to_offset, FLASH_DOWNLOAD_SLOT_START, FLASH_INFO_START, FLASH_PAGE_SIZE,
    FLASH_SECTOR_SIZE, FLASH_SWAP_SPACE_LENGTH, WRITE_ALIGN,
};
use crate::metadata::InfoRecord;

/// Read the info record from flash. Corrupt records read as all-false.
pub fn read_info() -> InfoRecord {
    let rec = unsafe { InfoRecord::read_from(FLASH_INFO_START) };
    if rec.is_valid() {
        rec
    } else {
        InfoRecord::default_new()
    }
}

/// Write the info record back (erase sector, program padded to one page).
///
/// # Safety
/// Caller must ensure no other flash operation is in flight.
pub unsafe fn write_info(rec: &mut InfoRecord) {
    rec.seal();

    let offset = addr_to_offset(FLASH_INFO_START);
    let mut page = [0xFFu8; FLASH_PAGE_SIZE as usize];
    let src = rec.as_bytes();
    page[..src.len()].copy_from_slice(src);

    flash_erase_and_program(offset, &page);
}

fn update_info(f: impl FnOnce(&mut InfoRecord)) {
    let mut rec = read_info();
    f(&mut rec);
    unsafe {
        write_info(&mut rec);
    }
}

/// The application observed a healthy boot of a freshly installed image.
pub fn mark_has_no_new_firmware() {
    update_info(|rec| rec.set_has_new_firmware(false));
}

/// Commit: keep the currently running image across the next reset.
pub fn mark_should_not_rollback() {
    update_info(|rec| rec.set_should_rollback(false));
}

/// True when the bootloader installed a new image on the last reset and the
/// application has not yet acknowledged it.
pub fn is_after_firmware_update() -> bool {
    read_info().has_new_firmware()
}

/// True when the running image is the result of a rollback.
pub fn is_after_rollback() -> bool {
    read_info().after_rollback()
}

/// Erase the whole download slot in preparation for staging a new image.
/// Also drops the valid mark; the slot contents are untrusted from here on.
pub fn initialize_download_slot() {
    update_info(|rec| rec.set_download_slot_valid(false));

    let offset = addr_to_offset(FLASH_DOWNLOAD_SLOT_START);
    let num_sectors = FLASH_SWAP_SPACE_LENGTH / FLASH_SECTOR_SIZE;

    cortex_m::interrupt::free(|_| unsafe {
        rp2040_hal::rom_data::connect_internal_flash();
        rp2040_hal::rom_data::flash_exit_xip();

        for i in 0..num_sectors {
            rp2040_hal::rom_data::flash_range_erase(
                offset + i * FLASH_SECTOR_SIZE,
                FLASH_SECTOR_SIZE as usize,
                FLASH_SECTOR_SIZE,
                0x20, // SECTOR_ERASE command
            );
        }

        rp2040_hal::rom_data::flash_flush_cache();
        rp2040_hal::rom_data::flash_enter_cmd_xip();
    });
}

/// Program one aligned chunk of image data at `offset` within the download
/// slot. `offset` and `data.len()` must be multiples of the write alignment,
/// and the slot must have been initialized first.
///
/// Returns false on a bounds or alignment violation.
pub fn write_to_flash_aligned(data: &[u8], offset: u32) -> bool {
    let len = data.len() as u32;
    if offset % WRITE_ALIGN as u32 != 0 || len % WRITE_ALIGN as u32 != 0 {
        return false;
    }
    if offset.saturating_add(len) > FLASH_SWAP_SPACE_LENGTH {
        return false;
    }

    let flash_offset = addr_to_offset(FLASH_DOWNLOAD_SLOT_START) + offset;
    cortex_m::interrupt::free(|_| unsafe {
        rp2040_hal::rom_data::connect_internal_flash();
        rp2040_hal::rom_data::flash_exit_xip();
        rp2040_hal::rom_data::flash_range_program(flash_offset, data.as_ptr(), data.len());
        rp2040_hal::rom_data::flash_flush_cache();
        rp2040_hal::rom_data::flash_enter_cmd_xip();
    });

    true
}

/// Declare the staged image complete: record its size and SHA-256 digest and
/// mark the slot valid for the next swap.
pub fn mark_download_slot_valid(size: u32, digest: &[u8; 32]) {
    update_info(|rec| {
        rec.set_swap_size(size);
        rec.set_digest(digest);
        rec.set_download_slot_valid(true);
    });
}

pub fn mark_download_slot_invalid() {
    update_info(|rec| rec.set_download_slot_valid(false));
}

/// Request the swap: set `has_new_firmware` and soft-reset into the
/// bootloader. Returns false (without resetting) when the download slot was
/// never marked valid.
pub fn perform_update() -> bool {
    if !read_info().download_slot_valid() {
        return false;
    }

    update_info(|rec| rec.set_has_new_firmware(true));

    // Give any in-flight peripheral traffic a moment to drain.
    cortex_m::asm::delay(100_000);
    cortex_m::peripheral::SCB::sys_reset();
}

/// Reboot normally.
pub fn reboot() -> ! {
    cortex_m::peripheral::SCB::sys_reset();
}

// --- Internal helpers ---

unsafe fn flash_erase_and_program(offset: u32, data: &[u8]) {
    cortex_m::interrupt::free(|_| unsafe {
        rp2040_hal::rom_data::connect_internal_flash();
        rp2040_hal::rom_data::flash_exit_xip();
        rp2040_hal::rom_data::flash_range_erase(
            offset,
            FLASH_SECTOR_SIZE as usize,
            FLASH_SECTOR_SIZE,
            0x20,
        );
        rp2040_hal::rom_data::flash_flush_cache();
        rp2040_hal::rom_data::flash_enter_cmd_xip();

        rp2040_hal::rom_data::connect_internal_flash();
        rp2040_hal::rom_data::flash_exit_xip();
        rp2040_hal::rom_data::flash_range_program(offset, data.as_ptr(), data.len());
        rp2040_hal::rom_data::flash_flush_cache();
        rp2040_hal::rom_data::flash_enter_cmd_xip();
    });
}
