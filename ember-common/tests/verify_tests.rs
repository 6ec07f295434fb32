// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the staged-image integrity verifier.

use sha2::{Digest, Sha256};

use ember_common::layout::{FLASH_BASE, FLASH_DOWNLOAD_SLOT_START};
use ember_common::testing::MemFlash;
use ember_common::verify::verify_image;

const DEVICE_LEN: usize = 2 * 1024 * 1024;

fn device_with_image(image: &[u8]) -> MemFlash {
    let mut dev = MemFlash::new(FLASH_BASE, DEVICE_LEN);
    dev.fill(FLASH_DOWNLOAD_SLOT_START, image);
    dev
}

#[test]
fn test_matching_digest_verifies() {
    let image: Vec<u8> = (0..128 * 1024).map(|i| (i % 256) as u8).collect();
    let mut dev = device_with_image(&image);
    let digest: [u8; 32] = Sha256::digest(&image).into();

    let ok = verify_image(
        &mut dev,
        FLASH_DOWNLOAD_SLOT_START,
        image.len() as u32,
        &digest,
    )
    .unwrap();
    assert!(ok);
}

#[test]
fn test_single_flipped_bit_fails() {
    let image: Vec<u8> = (0..4096).map(|i| (i % 256) as u8).collect();
    let digest: [u8; 32] = Sha256::digest(&image).into();

    let mut tampered = image.clone();
    tampered[2048] ^= 0x01;
    let mut dev = device_with_image(&tampered);

    let ok = verify_image(
        &mut dev,
        FLASH_DOWNLOAD_SLOT_START,
        image.len() as u32,
        &digest,
    )
    .unwrap();
    assert!(!ok);
}

#[test]
fn test_length_not_a_chunk_multiple() {
    // 1000 bytes exercises the short final read
    let image: Vec<u8> = (0..1000).map(|i| (i * 3 % 256) as u8).collect();
    let mut dev = device_with_image(&image);
    let digest: [u8; 32] = Sha256::digest(&image).into();

    let ok = verify_image(
        &mut dev,
        FLASH_DOWNLOAD_SLOT_START,
        image.len() as u32,
        &digest,
    )
    .unwrap();
    assert!(ok);
}

#[test]
fn test_zero_length_hashes_nothing() {
    let mut dev = MemFlash::new(FLASH_BASE, DEVICE_LEN);
    let empty: [u8; 32] = Sha256::digest(b"").into();

    let ok = verify_image(&mut dev, FLASH_DOWNLOAD_SLOT_START, 0, &empty).unwrap();
    assert!(ok);

    let ok = verify_image(&mut dev, FLASH_DOWNLOAD_SLOT_START, 0, &[0u8; 32]).unwrap();
    assert!(!ok);
}

#[test]
fn test_length_changes_digest() {
    let image: Vec<u8> = vec![0xAA; 2048];
    let mut dev = device_with_image(&image);
    let digest: [u8; 32] = Sha256::digest(&image).into();

    // Verifying a prefix with the full-image digest must fail
    let ok = verify_image(&mut dev, FLASH_DOWNLOAD_SLOT_START, 1024, &digest).unwrap();
    assert!(!ok);
}
