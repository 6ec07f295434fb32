// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the image swap engine against the RAM-backed block device.

use ember_common::layout::{
    FLASH_APP_START, FLASH_BASE, FLASH_DOWNLOAD_SLOT_START, FLASH_SECTOR_SIZE,
    FLASH_SWAP_SPACE_LENGTH, SLOT_SECTOR_COUNT,
};
use ember_common::swap::{sectors_for_swap, swap_slots};
use ember_common::testing::MemFlash;

const DEVICE_LEN: usize = 2 * 1024 * 1024;
const SECTOR: u32 = FLASH_SECTOR_SIZE;

fn device() -> MemFlash {
    MemFlash::new(FLASH_BASE, DEVICE_LEN)
}

fn app_pattern(i: usize) -> u8 {
    (i % 251) as u8
}

fn dl_pattern(i: usize) -> u8 {
    ((i * 7 + 13) % 253) as u8
}

/// Fill both slots with distinguishable patterns.
fn fill_slots(dev: &mut MemFlash, len: usize) {
    let app: Vec<u8> = (0..len).map(app_pattern).collect();
    let dl: Vec<u8> = (0..len).map(dl_pattern).collect();
    dev.fill(FLASH_APP_START, &app);
    dev.fill(FLASH_DOWNLOAD_SLOT_START, &dl);
}

// =============================================================================
// sectors_for_swap
// =============================================================================

#[test]
fn test_sectors_zero_means_whole_slot() {
    assert_eq!(
        sectors_for_swap(0, FLASH_SWAP_SPACE_LENGTH, SECTOR),
        SLOT_SECTOR_COUNT
    );
}

#[test]
fn test_sectors_overflow_means_whole_slot() {
    assert_eq!(
        sectors_for_swap(FLASH_SWAP_SPACE_LENGTH + 1, FLASH_SWAP_SPACE_LENGTH, SECTOR),
        SLOT_SECTOR_COUNT
    );
    assert_eq!(
        sectors_for_swap(u32::MAX, FLASH_SWAP_SPACE_LENGTH, SECTOR),
        SLOT_SECTOR_COUNT
    );
}

#[test]
fn test_sectors_rounds_up() {
    assert_eq!(sectors_for_swap(1, FLASH_SWAP_SPACE_LENGTH, SECTOR), 1);
    assert_eq!(sectors_for_swap(SECTOR, FLASH_SWAP_SPACE_LENGTH, SECTOR), 1);
    assert_eq!(
        sectors_for_swap(SECTOR + 1, FLASH_SWAP_SPACE_LENGTH, SECTOR),
        2
    );
    assert_eq!(
        sectors_for_swap(200 * 1024, FLASH_SWAP_SPACE_LENGTH, SECTOR),
        50
    );
}

#[test]
fn test_sectors_exact_slot_length() {
    assert_eq!(
        sectors_for_swap(FLASH_SWAP_SPACE_LENGTH, FLASH_SWAP_SPACE_LENGTH, SECTOR),
        SLOT_SECTOR_COUNT
    );
}

// =============================================================================
// swap_slots
// =============================================================================

#[test]
fn test_swap_exchanges_sector_contents() {
    let mut dev = device();
    let len = 3 * SECTOR as usize;
    fill_slots(&mut dev, len);

    swap_slots(&mut dev, 3).unwrap();

    for i in 0..len {
        assert_eq!(dev.slice(FLASH_APP_START + i as u32, 1)[0], dl_pattern(i));
        assert_eq!(
            dev.slice(FLASH_DOWNLOAD_SLOT_START + i as u32, 1)[0],
            app_pattern(i)
        );
    }
}

#[test]
fn test_swap_is_self_inverse() {
    let mut dev = device();
    let len = 4 * SECTOR as usize;
    fill_slots(&mut dev, len);

    let app_before: Vec<u8> = dev.slice(FLASH_APP_START, len).to_vec();
    let dl_before: Vec<u8> = dev.slice(FLASH_DOWNLOAD_SLOT_START, len).to_vec();

    swap_slots(&mut dev, 4).unwrap();
    swap_slots(&mut dev, 4).unwrap();

    assert_eq!(dev.slice(FLASH_APP_START, len), &app_before[..]);
    assert_eq!(dev.slice(FLASH_DOWNLOAD_SLOT_START, len), &dl_before[..]);
}

#[test]
fn test_swap_leaves_sectors_past_n_untouched() {
    let mut dev = device();
    let len = 4 * SECTOR as usize;
    fill_slots(&mut dev, len);

    swap_slots(&mut dev, 2).unwrap();

    // First two sectors exchanged
    assert_eq!(dev.slice(FLASH_APP_START, 1)[0], dl_pattern(0));
    // Third and fourth untouched
    let off = 2 * SECTOR as usize;
    assert_eq!(
        dev.slice(FLASH_APP_START + off as u32, 1)[0],
        app_pattern(off)
    );
    assert_eq!(
        dev.slice(FLASH_DOWNLOAD_SLOT_START + off as u32, 1)[0],
        dl_pattern(off)
    );
}

#[test]
fn test_swap_sector_count_is_clamped_to_slot() {
    let mut dev = device();
    fill_slots(&mut dev, SECTOR as usize);

    // More sectors than the slot holds must not walk into the info sector.
    swap_slots(&mut dev, SLOT_SECTOR_COUNT + 10).unwrap();
    assert_eq!(dev.slice(FLASH_APP_START, 1)[0], dl_pattern(0));
}

/// Any number of arm/rollback cycles without a commit keeps the original APP
/// bytes in exactly one of the two slots.
#[test]
fn test_original_image_survives_swap_cycles() {
    let mut dev = device();
    let len = 2 * SECTOR as usize;
    fill_slots(&mut dev, len);

    let original: Vec<u8> = dev.slice(FLASH_APP_START, len).to_vec();

    for cycle in 1..=5 {
        swap_slots(&mut dev, 2).unwrap();

        let in_app = dev.slice(FLASH_APP_START, len) == &original[..];
        let in_dl = dev.slice(FLASH_DOWNLOAD_SLOT_START, len) == &original[..];
        assert!(
            in_app ^ in_dl,
            "cycle {cycle}: original image must live in exactly one slot"
        );
    }
}

#[test]
fn test_swap_propagates_storage_errors() {
    let mut dev = device();
    fill_slots(&mut dev, SECTOR as usize);

    dev.fail_next_erase = true;
    assert!(swap_slots(&mut dev, 1).is_err());
}
