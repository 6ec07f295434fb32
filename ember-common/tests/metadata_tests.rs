// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the persisted metadata store.

use ember_common::blockdev::{BlockDevice, StorageError};
use ember_common::layout::{FLASH_BASE, FLASH_INFO_START, FLASH_SECTOR_SIZE};
use ember_common::metadata::{read_record, update_record, write_record, InfoRecord};
use ember_common::testing::MemFlash;

const DEVICE_LEN: usize = 2 * 1024 * 1024;

fn device() -> MemFlash {
    MemFlash::new(FLASH_BASE, DEVICE_LEN)
}

// =============================================================================
// Boot-time state
// =============================================================================

#[test]
fn test_blank_sector_reads_all_false() {
    let mut dev = device();
    let rec = read_record(&mut dev).unwrap();

    assert!(!rec.has_new_firmware());
    assert!(!rec.after_rollback());
    assert!(!rec.should_rollback());
    assert!(!rec.download_slot_valid());
    assert_eq!(rec.swap_size(), 0);
    assert_eq!(rec.digest(), &[0u8; 32]);
}

#[test]
fn test_garbage_sector_reads_all_false() {
    let mut dev = device();
    let junk: Vec<u8> = (0..64u32).map(|i| (i * 17 + 3) as u8).collect();
    dev.fill(FLASH_INFO_START, &junk);

    let rec = read_record(&mut dev).unwrap();
    assert!(!rec.should_rollback());
    assert!(!rec.has_new_firmware());
}

#[test]
fn test_torn_write_is_rejected_by_crc() {
    let mut dev = device();
    update_record(&mut dev, |rec| rec.set_should_rollback(true)).unwrap();

    // Corrupt one byte of the stored record
    let byte = dev.slice(FLASH_INFO_START + 8, 1)[0];
    dev.fill(FLASH_INFO_START + 8, &[byte ^ 0x01]);

    let rec = read_record(&mut dev).unwrap();
    assert!(!rec.should_rollback(), "corrupt record must read as all-false");
}

// =============================================================================
// Round-trips and field independence
// =============================================================================

#[test]
fn test_write_read_round_trip() {
    let mut dev = device();
    let digest = [0xAB; 32];

    let mut rec = InfoRecord::default_new();
    rec.set_has_new_firmware(true);
    rec.set_swap_size(123_456);
    rec.set_digest(&digest);
    write_record(&mut dev, &mut rec).unwrap();

    let back = read_record(&mut dev).unwrap();
    assert!(back.has_new_firmware());
    assert!(!back.should_rollback());
    assert_eq!(back.swap_size(), 123_456);
    assert_eq!(back.digest(), &digest);
}

#[test]
fn test_setter_preserves_other_fields() {
    let mut dev = device();
    let digest = [0x5A; 32];

    update_record(&mut dev, |rec| {
        rec.set_swap_size(64 * 1024);
        rec.set_digest(&digest);
        rec.set_download_slot_valid(true);
    })
    .unwrap();

    update_record(&mut dev, |rec| rec.set_has_new_firmware(true)).unwrap();

    let rec = read_record(&mut dev).unwrap();
    assert!(rec.has_new_firmware());
    assert!(rec.download_slot_valid());
    assert_eq!(rec.swap_size(), 64 * 1024);
    assert_eq!(rec.digest(), &digest);
}

#[test]
fn test_update_erases_sector_before_program() {
    let mut dev = device();
    update_record(&mut dev, |rec| rec.set_should_rollback(true)).unwrap();
    update_record(&mut dev, |rec| rec.set_should_rollback(false)).unwrap();

    // Two updates, two erase-program cycles (MemFlash would panic on a
    // program over unerased bytes otherwise).
    assert_eq!(dev.erase_count, 2);
    assert_eq!(dev.program_count, 2);

    let rec = read_record(&mut dev).unwrap();
    assert!(!rec.should_rollback());
}

// =============================================================================
// Error paths
// =============================================================================

#[test]
fn test_program_failure_surfaces() {
    let mut dev = device();
    dev.fail_next_program = true;

    let err = update_record(&mut dev, |rec| rec.set_should_rollback(true)).unwrap_err();
    assert_eq!(err, StorageError::Program);
}

#[test]
fn test_erase_failure_surfaces() {
    let mut dev = device();
    dev.fail_next_erase = true;

    let err = update_record(&mut dev, |rec| rec.set_should_rollback(true)).unwrap_err();
    assert_eq!(err, StorageError::Erase);
}

#[test]
fn test_failed_write_leaves_readable_state() {
    let mut dev = device();
    update_record(&mut dev, |rec| rec.set_after_rollback(true)).unwrap();

    // Erase succeeds, program fails: the sector is blank afterwards.
    dev.fail_next_program = true;
    update_record(&mut dev, |rec| rec.set_should_rollback(true)).unwrap_err();

    // The store still boots into the defined all-false state.
    let rec = read_record(&mut dev).unwrap();
    assert!(!rec.after_rollback());
    assert!(!rec.should_rollback());
}

// =============================================================================
// Record geometry
// =============================================================================

#[test]
fn test_record_fits_one_page() {
    let mut dev = device();
    update_record(&mut dev, |rec| rec.set_download_slot_valid(true)).unwrap();

    // Only the first page of the info sector is programmed; the rest of the
    // sector stays erased.
    let rest = dev.slice(FLASH_INFO_START + 256, (FLASH_SECTOR_SIZE - 256) as usize);
    assert!(rest.iter().all(|&b| b == 0xFF));
}

#[test]
fn test_program_requires_prior_erase_contract() {
    let mut dev = device();
    let mut rec = InfoRecord::default_new();
    write_record(&mut dev, &mut rec).unwrap();

    // Direct page program over the occupied sector violates the contract.
    let page = [0u8; 256];
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = dev.program(FLASH_INFO_START, &page);
    }));
    assert!(result.is_err());
}
