// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Flash memory map shared by the bootloader, the application ABI, and the
//! host tools.
//!
//! The same values are exported by the linker scripts as `__FLASH_APP_START`,
//! `__FLASH_DOWNLOAD_SLOT_START`, `__FLASH_SWAP_SPACE_LENGTH` and
//! `__FLASH_INFO_START`; keep both in sync when moving a region.

pub const FLASH_BASE: u32 = 0x1000_0000;

/// Active application slot. The application executes in place from here.
pub const FLASH_APP_START: u32 = 0x1001_0000;
/// Staging slot written by the recovery server and by the running application.
pub const FLASH_DOWNLOAD_SLOT_START: u32 = 0x1010_0000;
/// Length of each slot. Both slots participate in the sector swap.
pub const FLASH_SWAP_SPACE_LENGTH: u32 = 0x000F_0000; // 960 KiB
/// Single sector holding the persisted [`InfoRecord`](crate::metadata::InfoRecord).
pub const FLASH_INFO_START: u32 = 0x101F_0000;

pub const FLASH_SECTOR_SIZE: u32 = 4096;
pub const FLASH_PAGE_SIZE: u32 = 256;

/// Minimum program granularity. Upload traffic is staged in chunks of this size.
pub const WRITE_ALIGN: usize = FLASH_PAGE_SIZE as usize;

pub const SLOT_SECTOR_COUNT: u32 = FLASH_SWAP_SPACE_LENGTH / FLASH_SECTOR_SIZE;

// Layout invariants: sector-aligned slots of equal length, disjoint from the
// info sector and from each other.
const _: () = assert!(FLASH_APP_START % FLASH_SECTOR_SIZE == 0);
const _: () = assert!(FLASH_DOWNLOAD_SLOT_START % FLASH_SECTOR_SIZE == 0);
const _: () = assert!(FLASH_INFO_START % FLASH_SECTOR_SIZE == 0);
const _: () = assert!(FLASH_SWAP_SPACE_LENGTH % FLASH_SECTOR_SIZE == 0);
const _: () = assert!(FLASH_APP_START + FLASH_SWAP_SPACE_LENGTH <= FLASH_DOWNLOAD_SLOT_START);
const _: () = assert!(FLASH_DOWNLOAD_SLOT_START + FLASH_SWAP_SPACE_LENGTH <= FLASH_INFO_START);

/// Convert an absolute XIP flash address to a flash-relative offset.
pub fn addr_to_offset(abs_addr: u32) -> u32 {
    abs_addr - FLASH_BASE
}
