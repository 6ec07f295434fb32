// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Sector-granular image swap between the APP and DOWNLOAD slots.
//!
//! After `swap_slots(dev, n)` the first `n` sectors of the two slots have
//! exchanged contents, which makes the operation self-inverse. The swap is
//! not power-fail atomic at image level; the bootloader runs the whole loop
//! under one flash critical section, and a device interrupted mid-sector is
//! brought back through the recovery path.

use crate::blockdev::{BlockDevice, StorageError};
use crate::layout::{
    FLASH_APP_START, FLASH_DOWNLOAD_SLOT_START, FLASH_SECTOR_SIZE, SLOT_SECTOR_COUNT,
};

/// Number of sectors participating in a swap of `swap_size` bytes.
/// 0 or a size beyond the slot means the whole slot.
pub fn sectors_for_swap(swap_size: u32, slot_len: u32, sector_size: u32) -> u32 {
    if swap_size == 0 || swap_size > slot_len {
        slot_len / sector_size
    } else {
        swap_size.div_ceil(sector_size)
    }
}

/// Exchange the first `n_sectors` sectors of APP and DOWNLOAD.
///
/// Per sector: read both sides into RAM, erase both, program crosswise.
pub fn swap_slots<D: BlockDevice>(dev: &mut D, n_sectors: u32) -> Result<(), StorageError> {
    let n_sectors = n_sectors.min(SLOT_SECTOR_COUNT);

    let mut app_buf = [0u8; FLASH_SECTOR_SIZE as usize];
    let mut dl_buf = [0u8; FLASH_SECTOR_SIZE as usize];

    for i in 0..n_sectors {
        let app = FLASH_APP_START + i * FLASH_SECTOR_SIZE;
        let dl = FLASH_DOWNLOAD_SLOT_START + i * FLASH_SECTOR_SIZE;

        dev.read(app, &mut app_buf)?;
        dev.read(dl, &mut dl_buf)?;

        dev.erase(app, FLASH_SECTOR_SIZE)?;
        dev.erase(dl, FLASH_SECTOR_SIZE)?;

        dev.program(app, &dl_buf)?;
        dev.program(dl, &app_buf)?;
    }

    Ok(())
}
