// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Persisted boot metadata: four flags, the swap size, and the image digest,
//! all living in the single `INFO` flash sector.
//!
//! Storage policy: any mutation reads the whole record, changes it in RAM,
//! erases the sector, and programs the record back padded to one page. A
//! CRC-32 over the record body guards against torn writes; a record that
//! fails the magic or CRC check is treated as all-false.

use crc::{Crc, CRC_32_ISO_HDLC};

use crate::blockdev::{BlockDevice, StorageError};
use crate::layout::{FLASH_INFO_START, FLASH_PAGE_SIZE, FLASH_SECTOR_SIZE};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

pub const INFO_MAGIC: u32 = 0xF07A_DA7A;

/// A flag word is true only when it holds exactly this value. Erased flash
/// reads 0xFFFF_FFFF, so a blank sector yields a well-defined all-false state.
const FLAG_SET: u32 = 1;

fn flag_word(v: bool) -> u32 {
    if v {
        FLAG_SET
    } else {
        0
    }
}

// --- InfoRecord (repr(C), 64 bytes) ---

#[repr(C)]
#[derive(Clone, Copy)]
pub struct InfoRecord {
    magic: u32,
    has_new_firmware: u32,
    after_rollback: u32,
    should_rollback: u32,
    download_slot_valid: u32,
    swap_size: u32,
    digest: [u8; 32],
    _reserved0: u32,
    crc: u32, // CRC-32 over all preceding bytes
}

const _: () = assert!(core::mem::size_of::<InfoRecord>() == 64);

const RECORD_SIZE: usize = core::mem::size_of::<InfoRecord>();
const CRC_COVERED: usize = RECORD_SIZE - 4;

impl InfoRecord {
    /// The state a fresh or corrupted device boots into: all flags false.
    pub fn default_new() -> Self {
        let mut rec = Self {
            magic: INFO_MAGIC,
            has_new_firmware: 0,
            after_rollback: 0,
            should_rollback: 0,
            download_slot_valid: 0,
            swap_size: 0,
            digest: [0u8; 32],
            _reserved0: 0,
            crc: 0,
        };
        rec.seal();
        rec
    }

    pub fn is_valid(&self) -> bool {
        self.magic == INFO_MAGIC && self.crc == self.compute_crc()
    }

    fn compute_crc(&self) -> u32 {
        CRC32.checksum(&self.as_bytes()[..CRC_COVERED])
    }

    /// Recompute the record CRC after a mutation. Called by the store before
    /// every program; exposed for tests that build records by hand.
    pub fn seal(&mut self) {
        self.crc = self.compute_crc();
    }

    pub fn has_new_firmware(&self) -> bool {
        self.has_new_firmware == FLAG_SET
    }

    pub fn set_has_new_firmware(&mut self, v: bool) {
        self.has_new_firmware = flag_word(v);
    }

    pub fn after_rollback(&self) -> bool {
        self.after_rollback == FLAG_SET
    }

    pub fn set_after_rollback(&mut self, v: bool) {
        self.after_rollback = flag_word(v);
    }

    pub fn should_rollback(&self) -> bool {
        self.should_rollback == FLAG_SET
    }

    pub fn set_should_rollback(&mut self, v: bool) {
        self.should_rollback = flag_word(v);
    }

    pub fn download_slot_valid(&self) -> bool {
        self.download_slot_valid == FLAG_SET
    }

    pub fn set_download_slot_valid(&mut self, v: bool) {
        self.download_slot_valid = flag_word(v);
    }

    /// Bytes from the low end of each slot that take part in the next swap.
    /// 0 means "whole slot".
    pub fn swap_size(&self) -> u32 {
        self.swap_size
    }

    pub fn set_swap_size(&mut self, size: u32) {
        self.swap_size = size;
    }

    /// SHA-256 of the staged image, supplied by the uploader.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn set_digest(&mut self, digest: &[u8; 32]) {
        self.digest = *digest;
    }

    pub fn as_bytes(&self) -> &[u8] {
        unsafe {
            core::slice::from_raw_parts(self as *const Self as *const u8, RECORD_SIZE)
        }
    }

    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        unsafe { core::ptr::read_unaligned(buf.as_ptr() as *const Self) }
    }

    /// Read a record from a raw address via a volatile read.
    ///
    /// # Safety
    /// `addr` must point to a readable region of at least 64 bytes, aligned
    /// to 4 bytes.
    pub unsafe fn read_from(addr: u32) -> Self {
        core::ptr::read_volatile(addr as *const Self)
    }
}

// --- Store operations over a BlockDevice ---

/// Load the record from the info sector. Corrupt or blank records come back
/// as the all-false default so every boot starts from a defined state.
pub fn read_record<D: BlockDevice>(dev: &mut D) -> Result<InfoRecord, StorageError> {
    let mut buf = [0u8; RECORD_SIZE];
    dev.read(FLASH_INFO_START, &mut buf)?;
    let rec = InfoRecord::from_bytes(&buf);
    Ok(if rec.is_valid() {
        rec
    } else {
        InfoRecord::default_new()
    })
}

/// Persist the record: erase the info sector, program the sealed record
/// padded to a full page.
pub fn write_record<D: BlockDevice>(dev: &mut D, rec: &mut InfoRecord) -> Result<(), StorageError> {
    rec.seal();

    dev.erase(FLASH_INFO_START, FLASH_SECTOR_SIZE)?;

    let mut page = [0xFFu8; FLASH_PAGE_SIZE as usize];
    page[..RECORD_SIZE].copy_from_slice(rec.as_bytes());
    dev.program(FLASH_INFO_START, &page)
}

/// Apply a single mutation with the whole-sector read-modify-erase-program
/// discipline every writer must follow.
pub fn update_record<D: BlockDevice>(
    dev: &mut D,
    f: impl FnOnce(&mut InfoRecord),
) -> Result<(), StorageError> {
    let mut rec = read_record(dev)?;
    f(&mut rec);
    write_record(dev, &mut rec)
}
