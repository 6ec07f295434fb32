// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Staged-image integrity check: SHA-256 over the download slot against the
//! digest persisted in the info sector.

use sha2::{Digest, Sha256};

use crate::blockdev::{BlockDevice, StorageError};

/// Hash the first `length` bytes at `base` in small chunks and compare with
/// `expected`. `true` means the staged image matches.
pub fn verify_image<D: BlockDevice>(
    dev: &mut D,
    base: u32,
    length: u32,
    expected: &[u8; 32],
) -> Result<bool, StorageError> {
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; 256];
    let mut addr = base;
    let mut remaining = length as usize;

    while remaining > 0 {
        let n = remaining.min(chunk.len());
        dev.read(addr, &mut chunk[..n])?;
        hasher.update(&chunk[..n]);
        addr += n as u32;
        remaining -= n;
    }

    Ok(hasher.finalize().as_slice() == expected)
}
